//! Absolute screen geometry shared by the mapper, the display adapters and
//! the orchestrator

use serde::{Deserialize, Serialize};

/// Usable on-screen area (display minus menu bar and Dock) in absolute
/// pixels, top-left origin, as expected by the Accessibility position API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ReferenceArea {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert a frame reported with a bottom-left origin (AppKit) into the
    /// top-left origin used for window placement. `primary_height` is the
    /// full height of the screen that owns the global origin.
    pub fn from_bottom_left(x: f64, y: f64, width: f64, height: f64, primary_height: f64) -> Self {
        Self::new(x, primary_height - y - height, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, rect: &PixelRect) -> bool {
        rect.x >= self.x
            && rect.y >= self.y
            && rect.right() <= self.right()
            && rect.bottom() <= self.bottom()
    }
}

/// Integral window frame produced by the geometry mapper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

impl std::fmt::Display for PixelRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_left_frame_flips_to_top_left() {
        // 1440 tall screen, 25px menu bar on top, 70px Dock at the bottom
        let area = ReferenceArea::from_bottom_left(0.0, 70.0, 2560.0, 1345.0, 1440.0);
        assert_eq!(area, ReferenceArea::new(0.0, 25.0, 2560.0, 1345.0));
    }

    #[test]
    fn containment_checks_all_edges() {
        let area = ReferenceArea::new(0.0, 25.0, 1000.0, 800.0);
        assert!(area.contains(&PixelRect::new(0.0, 25.0, 1000.0, 800.0)));
        assert!(!area.contains(&PixelRect::new(0.0, 24.0, 10.0, 10.0)));
        assert!(!area.contains(&PixelRect::new(500.0, 25.0, 501.0, 10.0)));
    }
}
