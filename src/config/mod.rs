//! Configuration and persistence for Window Templates

pub mod preset_store;
pub mod settings;

pub use preset_store::{PresetStore, PresetStoreError};
pub use settings::{OrchestratorSettings, Settings, SettingsError};
