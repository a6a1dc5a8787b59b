//! Preset model: a named, reusable multi-window layout

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::target::Target;

/// Named, ordered collection of placement targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: Uuid,
    pub name: String,
    pub targets: Vec<Target>,
}

/// Targets of a preset that share one application, in preset order
#[derive(Debug, Clone, PartialEq)]
pub struct TargetGroup<'a> {
    pub app_bundle_id: &'a str,
    pub targets: Vec<&'a Target>,
}

impl Preset {
    pub const DEFAULT_NAME: &'static str = "New Preset";

    pub fn new(name: impl Into<String>, targets: Vec<Target>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            targets,
        }
    }

    /// Empty preset as created by the editor's "add" action
    pub fn untitled() -> Self {
        Self::new(Self::DEFAULT_NAME, Vec::new())
    }

    /// Partition targets by application.
    ///
    /// Groups come out in the order their application first appears and
    /// keep the relative order of their targets, so the Nth target of an
    /// application is always paired with that application's Nth window.
    pub fn groups(&self) -> Vec<TargetGroup<'_>> {
        let mut groups: Vec<TargetGroup<'_>> = Vec::new();

        for target in &self.targets {
            match groups
                .iter_mut()
                .find(|group| group.app_bundle_id == target.app_bundle_id)
            {
                Some(group) => group.targets.push(target),
                None => groups.push(TargetGroup {
                    app_bundle_id: &target.app_bundle_id,
                    targets: vec![target],
                }),
            }
        }

        groups
    }

    /// Distinct applications referenced by this preset
    pub fn applications(&self) -> Vec<&str> {
        self.groups()
            .into_iter()
            .map(|group| group.app_bundle_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::normalized_rect::NormalizedRect;

    fn half(left: bool) -> NormalizedRect {
        NormalizedRect::new(if left { 0.0 } else { 0.5 }, 0.0, 0.5, 1.0)
    }

    #[test]
    fn test_groups_preserve_order_within_application() {
        let preset = Preset::new(
            "Work",
            vec![
                Target::new("com.apple.Safari", half(true)),
                Target::new("com.apple.Terminal", half(false)),
                Target::new("com.apple.Safari", half(false)),
            ],
        );

        let groups = preset.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].app_bundle_id, "com.apple.Safari");
        assert_eq!(groups[0].targets.len(), 2);
        assert_eq!(groups[0].targets[0].rect, half(true));
        assert_eq!(groups[0].targets[1].rect, half(false));
        assert_eq!(groups[1].app_bundle_id, "com.apple.Terminal");
    }

    #[test]
    fn test_empty_preset_has_no_groups() {
        let preset = Preset::untitled();
        assert_eq!(preset.name, "New Preset");
        assert!(preset.groups().is_empty());
        assert!(preset.applications().is_empty());
    }

    #[test]
    fn test_preset_json_round_trip() {
        let preset = Preset::new(
            "Work",
            vec![Target::new("com.apple.Safari", half(true))],
        );

        let json = serde_json::to_string(&preset).unwrap();
        assert!(json.contains("\"appBundleID\":\"com.apple.Safari\""));

        let decoded: Preset = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, preset);
    }
}
