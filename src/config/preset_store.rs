use crate::models::preset::Preset;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PresetStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON-backed list of presets
#[derive(Debug)]
pub struct PresetStore {
    path: PathBuf,
    presets: Vec<Preset>,
}

impl PresetStore {
    /// `~/Library/Application Support/WindowTemplates/presets.json` on macOS
    pub fn default_path() -> PathBuf {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.join("WindowTemplates").join("presets.json")
    }

    /// Open the store at `path`, creating its directory if needed.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and also treated as empty so a bad file never blocks startup.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PresetStoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let presets = match Self::read(&path) {
            Ok(presets) => presets,
            Err(err) => {
                warn!("Ignoring unreadable presets file {}: {}", path.display(), err);
                Vec::new()
            }
        };

        debug!("Loaded {} presets from {}", presets.len(), path.display());
        Ok(Self { path, presets })
    }

    fn read(path: &Path) -> Result<Vec<Preset>, PresetStoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, id: Uuid) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.id == id)
    }

    /// Find a preset by id or by case-insensitive name
    pub fn find(&self, query: &str) -> Option<&Preset> {
        if let Ok(id) = Uuid::parse_str(query) {
            if let Some(preset) = self.get(id) {
                return Some(preset);
            }
        }

        self.presets
            .iter()
            .find(|preset| preset.name.eq_ignore_ascii_case(query.trim()))
    }

    /// Append a preset and return its id
    pub fn add(&mut self, preset: Preset) -> Uuid {
        let id = preset.id;
        self.presets.push(preset);
        id
    }

    /// Append a new, empty preset and return its id
    pub fn add_untitled(&mut self) -> Uuid {
        self.add(Preset::untitled())
    }

    /// Insert or replace a preset with the same id
    pub fn upsert(&mut self, preset: Preset) {
        match self.presets.iter_mut().find(|existing| existing.id == preset.id) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Preset> {
        let index = self.presets.iter().position(|preset| preset.id == id)?;
        Some(self.presets.remove(index))
    }

    /// Write all presets atomically
    pub fn save(&self) -> Result<(), PresetStoreError> {
        let content = serde_json::to_string_pretty(&self.presets)?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(temp_path, &self.path)?;

        debug!("Saved {} presets to {}", self.presets.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NormalizedRect, Target};
    use tempfile::TempDir;

    fn sample_preset(name: &str) -> Preset {
        Preset::new(
            name,
            vec![
                Target::new("com.apple.Safari", NormalizedRect::new(0.0, 0.0, 0.5, 1.0)),
                Target::new("com.apple.Terminal", NormalizedRect::new(0.5, 0.0, 0.5, 1.0)),
            ],
        )
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = PresetStore::open(dir.path().join("sub").join("presets.json")).unwrap();
        assert!(store.presets().is_empty());
        assert!(dir.path().join("sub").exists());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("presets.json");

        let mut store = PresetStore::open(&path).unwrap();
        let preset = sample_preset("Coding");
        store.upsert(preset.clone());
        store.save().unwrap();

        let reloaded = PresetStore::open(&path).unwrap();
        assert_eq!(reloaded.presets(), &[preset]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("presets.json");
        fs::write(&path, "{ not json").unwrap();

        let store = PresetStore::open(&path).unwrap();
        assert!(store.presets().is_empty());
    }

    #[test]
    fn test_find_by_name_or_id() {
        let dir = TempDir::new().unwrap();
        let mut store = PresetStore::open(dir.path().join("presets.json")).unwrap();
        let preset = sample_preset("Writing");
        let id = preset.id;
        store.upsert(preset);

        assert_eq!(store.find("writing").map(|p| p.id), Some(id));
        assert_eq!(store.find(&id.to_string()).map(|p| p.id), Some(id));
        assert!(store.find("Reading").is_none());
    }

    #[test]
    fn test_add_upsert_remove() {
        let dir = TempDir::new().unwrap();
        let mut store = PresetStore::open(dir.path().join("presets.json")).unwrap();

        let id = store.add_untitled();
        assert_eq!(store.get(id).unwrap().name, "New Preset");

        let mut renamed = store.get(id).unwrap().clone();
        renamed.name = "Morning".to_string();
        store.upsert(renamed);
        assert_eq!(store.presets().len(), 1);
        assert_eq!(store.get(id).unwrap().name, "Morning");

        let named = store.add(Preset::new("Evening", Vec::new()));
        assert_eq!(store.presets().len(), 2);
        assert_eq!(store.find("evening").map(|p| p.id), Some(named));

        assert!(store.remove(named).is_some());
        assert!(store.remove(id).is_some());
        assert!(store.remove(id).is_none());
        assert!(store.presets().is_empty());
    }
}
