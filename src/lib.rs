//! Window Templates - Save and Restore Multi-Window Layouts on macOS
//!
//! A preset is a named list of (application, normalized rectangle) pairs.
//! Applying a preset launches every referenced application in the background,
//! opens extra windows where an application has fewer than the preset asks
//! for, and moves each window into its slot on the active display.

pub mod cli;
pub mod config;
pub mod logging;
pub mod macos;
pub mod models;
pub mod services;

pub use models::*;
pub use services::*;

/// Result type alias for Window Templates operations
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to Window Templates operations
#[derive(thiserror::Error, Debug)]
pub enum WindowTemplatesError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Failed to launch {bundle_id}: {reason}")]
    LaunchFailed { bundle_id: String, reason: String },

    #[error("No new-window affordance available for {0}")]
    AffordanceUnavailable(String),

    #[error("No active display available")]
    DisplayUnavailable,

    #[error("Window not found: {0}")]
    WindowNotFound(u32),

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("macOS API error: {0}")]
    MacOSAPIError(String),

    #[error("Interrupted")]
    Interrupted,
}
