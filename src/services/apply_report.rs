//! Outcome of applying a preset

use crate::models::geometry::ReferenceArea;
use crate::models::preset::Preset;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Why a group of targets produced no placements
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The application could not be resolved or launched
    LaunchFailed(String),
    /// The application had no eligible window, even after asking for one
    NoWindows,
    /// Windows existed but none accepted its new frame
    PlacementFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::LaunchFailed(reason) => write!(f, "launch failed: {reason}"),
            SkipReason::NoWindows => write!(f, "no eligible windows"),
            SkipReason::PlacementFailed => write!(f, "no window could be placed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupOutcome {
    /// Every target received a window
    Placed,
    /// Some targets were placed, the rest were skipped or failed
    Partial,
    Skipped(SkipReason),
}

/// What happened to the targets of one application
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReport {
    pub bundle_id: String,
    pub targets: usize,
    /// Windows that appeared in response to new-window requests
    pub windows_opened: usize,
    /// The application offered no way to open another window
    pub affordance_unavailable: bool,
    pub placed: usize,
    pub failed_placements: usize,
    /// Targets left without a window
    pub skipped_targets: usize,
    pub outcome: GroupOutcome,
}

impl GroupReport {
    pub(crate) fn new(bundle_id: &str, targets: usize) -> Self {
        Self {
            bundle_id: bundle_id.to_string(),
            targets,
            windows_opened: 0,
            affordance_unavailable: false,
            placed: 0,
            failed_placements: 0,
            skipped_targets: targets,
            outcome: GroupOutcome::Skipped(SkipReason::NoWindows),
        }
    }

    pub(crate) fn skipped(bundle_id: &str, targets: usize, reason: SkipReason) -> Self {
        Self {
            outcome: GroupOutcome::Skipped(reason),
            ..Self::new(bundle_id, targets)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.outcome == GroupOutcome::Placed
    }
}

impl fmt::Display for GroupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            GroupOutcome::Skipped(reason) => write!(f, "{}: skipped ({reason})", self.bundle_id),
            _ => {
                write!(f, "{}: placed {}/{}", self.bundle_id, self.placed, self.targets)?;
                if self.windows_opened > 0 {
                    write!(f, ", opened {} window(s)", self.windows_opened)?;
                }
                if self.failed_placements > 0 {
                    write!(f, ", {} placement(s) failed", self.failed_placements)?;
                }
                if self.affordance_unavailable {
                    write!(f, ", no new-window affordance")?;
                }
                Ok(())
            }
        }
    }
}

/// Summary of one apply call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyReport {
    pub preset_id: Uuid,
    pub preset_name: String,
    /// Usable display area the preset was mapped against; `None` when no
    /// display was available and nothing was attempted
    pub area: Option<ReferenceArea>,
    pub applied_at: DateTime<Utc>,
    pub groups: Vec<GroupReport>,
}

impl ApplyReport {
    pub(crate) fn new(preset: &Preset, area: Option<ReferenceArea>) -> Self {
        Self {
            preset_id: preset.id,
            preset_name: preset.name.clone(),
            area,
            applied_at: Utc::now(),
            groups: Vec::new(),
        }
    }

    pub fn placed(&self) -> usize {
        self.groups.iter().map(|group| group.placed).sum()
    }

    pub fn targets(&self) -> usize {
        self.groups.iter().map(|group| group.targets).sum()
    }

    pub fn group(&self, bundle_id: &str) -> Option<&GroupReport> {
        self.groups.iter().find(|group| group.bundle_id == bundle_id)
    }

    pub fn is_complete(&self) -> bool {
        self.area.is_some() && self.groups.iter().all(GroupReport::is_complete)
    }
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.area.is_none() {
            return writeln!(
                f,
                "Did not apply '{}': no active display",
                self.preset_name
            );
        }
        writeln!(
            f,
            "Applied '{}': {}/{} windows placed",
            self.preset_name,
            self.placed(),
            self.targets()
        )?;
        for group in &self.groups {
            writeln!(f, "  {group}")?;
        }
        Ok(())
    }
}
