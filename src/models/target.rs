//! A single application window slot inside a preset

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::normalized_rect::NormalizedRect;

/// "This application's Nth window should occupy this rectangle."
///
/// N is the position of the target among the targets of the same
/// application within its preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: Uuid,

    /// Bundle identifier of the application, e.g. `com.apple.Safari`
    #[serde(rename = "appBundleID")]
    pub app_bundle_id: String,

    pub rect: NormalizedRect,
}

impl Target {
    pub fn new(app_bundle_id: impl Into<String>, rect: NormalizedRect) -> Self {
        Self {
            id: Uuid::new_v4(),
            app_bundle_id: app_bundle_id.into(),
            rect,
        }
    }
}
