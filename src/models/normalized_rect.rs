//! Resolution-independent rectangle stored in presets

use serde::{Deserialize, Serialize};

use crate::models::geometry::{PixelRect, ReferenceArea};
use crate::services::geometry_mapper;

/// Position and size expressed as fractions of a reference area.
///
/// The origin is the top-left corner, `x` grows rightward and `y` grows
/// downward. Values are conventionally in `[0, 1]` but nothing is enforced
/// here: out-of-range values are absorbed when the rect is mapped onto a
/// display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedRect {
    pub const ZERO: NormalizedRect = NormalizedRect::new(0.0, 0.0, 0.0, 0.0);
    pub const FULL: NormalizedRect = NormalizedRect::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rect a grid cell covers, `col`/`row` counted from the top-left.
    /// Cells outside the grid are pulled back onto its last row/column.
    pub fn grid_cell(cols: u32, rows: u32, col: u32, row: u32) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let col = col.min(cols - 1);
        let row = row.min(rows - 1);

        Self::new(
            f64::from(col) / f64::from(cols),
            f64::from(row) / f64::from(rows),
            1.0 / f64::from(cols),
            1.0 / f64::from(rows),
        )
    }

    /// Copy of this rect with every component clamped the same way the
    /// mapper clamps it. Mapping the result is identical to mapping `self`.
    pub fn clamped(&self) -> Self {
        let x = clamp_unit(self.x, 1.0);
        let y = clamp_unit(self.y, 1.0);
        Self::new(x, y, clamp_unit(self.width, 1.0 - x), clamp_unit(self.height, 1.0 - y))
    }

    /// Absolute pixel geometry of this rect inside `area`.
    pub fn to_pixel_rect(&self, area: &ReferenceArea) -> PixelRect {
        geometry_mapper::map(self, area)
    }
}

impl Default for NormalizedRect {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Clamp `value` into `[0, upper]`. NaN collapses to zero.
pub(crate) fn clamp_unit(value: f64, upper: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(upper.max(0.0))
}
