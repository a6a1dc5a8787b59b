//! Maps normalized preset rectangles onto absolute display pixels

use crate::models::geometry::{PixelRect, ReferenceArea};
use crate::models::normalized_rect::{clamp_unit, NormalizedRect};

/// Map `rect` into `area`.
///
/// x/y are clamped to `[0, 1]` first, then width/height are clamped against
/// the remaining distance to the far edge, so the result is always contained
/// in `area`. All four edges are floored independently: two rects sharing a
/// normalized edge share the same pixel edge, with no gap or overlap.
pub fn map(rect: &NormalizedRect, area: &ReferenceArea) -> PixelRect {
    let cx = clamp_unit(rect.x, 1.0);
    let cy = clamp_unit(rect.y, 1.0);
    let cw = clamp_unit(rect.width, 1.0 - cx);
    let ch = clamp_unit(rect.height, 1.0 - cy);

    let left = (area.x + area.width * cx).floor();
    let top = (area.y + area.height * cy).floor();
    let right = (area.x + area.width * (cx + cw)).floor();
    let bottom = (area.y + area.height * (cy + ch)).floor();

    PixelRect::new(left, top, right - left, bottom - top)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> ReferenceArea {
        ReferenceArea::new(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn full_tile_covers_area() {
        let mapped = map(&NormalizedRect::FULL, &area());
        assert_eq!(mapped, PixelRect::new(0.0, 0.0, 1000.0, 800.0));
    }

    #[test]
    fn right_half() {
        let mapped = map(&NormalizedRect::new(0.5, 0.0, 0.5, 1.0), &area());
        assert_eq!(mapped, PixelRect::new(500.0, 0.0, 500.0, 800.0));
    }

    #[test]
    fn halves_share_edge() {
        let left = map(&NormalizedRect::new(0.0, 0.0, 0.5, 1.0), &area());
        let right = map(&NormalizedRect::new(0.5, 0.0, 0.5, 1.0), &area());
        assert_eq!(left.right(), 500.0);
        assert_eq!(right.x, 500.0);
    }

    #[test]
    fn thirds_tile_without_gaps_on_odd_width() {
        let area = ReferenceArea::new(3.0, 25.0, 1001.0, 799.0);
        let third = 1.0 / 3.0;
        let cells: Vec<_> = (0..3)
            .map(|i| map(&NormalizedRect::new(third * i as f64, 0.0, third, 1.0), &area))
            .collect();

        assert_eq!(cells[0].x, 3.0);
        assert_eq!(cells[0].right(), cells[1].x);
        assert_eq!(cells[1].right(), cells[2].x);
        assert!(area.contains(&cells[2]));
    }

    #[test]
    fn offset_area_is_respected() {
        let area = ReferenceArea::new(1440.0, 25.0, 1920.0, 1055.0);
        let mapped = map(&NormalizedRect::new(0.5, 0.5, 0.5, 0.5), &area);
        assert_eq!(mapped.x, 2400.0);
        assert_eq!(mapped.y, 552.0);
        assert!(area.contains(&mapped));
    }

    #[test]
    fn degenerate_input_is_absorbed() {
        let mapped = map(&NormalizedRect::new(-1.0, 2.0, 5.0, -3.0), &area());
        assert!(mapped.width >= 0.0);
        assert!(mapped.height >= 0.0);
        assert!(area().contains(&mapped));
        assert_eq!(mapped, PixelRect::new(0.0, 800.0, 1000.0, 0.0));
    }

    #[test]
    fn zero_size_maps_to_zero_size() {
        let mapped = map(&NormalizedRect::new(0.25, 0.25, 0.0, 0.0), &area());
        assert_eq!(mapped, PixelRect::new(250.0, 200.0, 0.0, 0.0));
    }
}
