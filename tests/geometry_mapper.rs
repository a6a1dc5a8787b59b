//! Properties of the normalized-to-pixel mapping

use window_templates::models::{NormalizedRect, PixelRect, ReferenceArea};
use window_templates::services::geometry_mapper::map;

fn areas() -> Vec<ReferenceArea> {
    vec![
        ReferenceArea::new(0.0, 0.0, 1000.0, 800.0),
        ReferenceArea::new(0.0, 25.0, 1440.0, 875.0),
        ReferenceArea::new(1920.0, 38.0, 2560.0, 1402.0),
        ReferenceArea::new(-1280.0, 0.0, 1280.0, 1024.0),
    ]
}

fn sample_rects() -> Vec<NormalizedRect> {
    let mut rects = vec![
        NormalizedRect::FULL,
        NormalizedRect::ZERO,
        NormalizedRect::new(0.5, 0.0, 0.5, 1.0),
        NormalizedRect::new(0.25, 0.25, 0.5, 0.5),
        NormalizedRect::new(0.9, 0.9, 0.5, 0.5),
        NormalizedRect::new(-0.5, 1.5, 2.0, -1.0),
        NormalizedRect::new(f64::NAN, 0.5, f64::INFINITY, f64::NEG_INFINITY),
    ];
    for cols in 1..=4 {
        for rows in 1..=3 {
            for col in 0..cols {
                for row in 0..rows {
                    rects.push(NormalizedRect::grid_cell(cols, rows, col, row));
                }
            }
        }
    }
    rects
}

#[test]
fn test_clamping_is_idempotent() {
    for rect in sample_rects() {
        let once = rect.clamped();
        assert_eq!(once.clamped(), once, "clamping {:?} twice changed it", rect);
    }
}

#[test]
fn test_mapping_clamped_input_matches_mapping_raw_input() {
    let mut rects = sample_rects();
    rects.push(NormalizedRect::new(-1.0, 2.0, 5.0, -3.0));
    rects.push(NormalizedRect::new(0.8, -0.5, 0.5, 3.0));

    for area in areas() {
        for rect in &rects {
            assert_eq!(
                map(&rect.clamped(), &area),
                map(rect, &area),
                "clamping {:?} before mapping changed the result over {:?}",
                rect,
                area
            );
        }
    }
}

#[test]
fn test_mapped_rects_stay_inside_the_area() {
    for area in areas() {
        for rect in sample_rects() {
            let pixels = map(&rect, &area);
            assert!(
                area.contains(&pixels),
                "{:?} mapped to {} escapes {:?}",
                rect,
                pixels,
                area
            );
            assert!(pixels.width >= 0.0 && pixels.height >= 0.0);
        }
    }
}

#[test]
fn test_adjacent_cells_share_edges() {
    for area in areas() {
        for cols in [2u32, 4, 8] {
            let cells: Vec<PixelRect> = (0..cols)
                .map(|col| map(&NormalizedRect::grid_cell(cols, 1, col, 0), &area))
                .collect();

            for pair in cells.windows(2) {
                assert_eq!(
                    pair[0].right(),
                    pair[1].x,
                    "gap or overlap between {} and {} for {} columns",
                    pair[0],
                    pair[1],
                    cols
                );
            }
        }
    }
}

#[test]
fn test_degenerate_input_is_safe() {
    let area = ReferenceArea::new(0.0, 0.0, 1000.0, 800.0);
    let pixels = map(
        &NormalizedRect::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN),
        &area,
    );
    assert_eq!(pixels, PixelRect::new(0.0, 0.0, 0.0, 0.0));

    let pixels = map(&NormalizedRect::new(2.0, -3.0, 4.0, 5.0), &area);
    assert_eq!(pixels, PixelRect::new(1000.0, 0.0, 0.0, 800.0));

    for area in areas() {
        let pixels = map(&NormalizedRect::new(-1.0, 2.0, 5.0, -3.0), &area);
        assert!(pixels.width >= 0.0 && pixels.height >= 0.0);
        assert!(area.contains(&pixels));
    }
}

#[test]
fn test_full_tile_and_right_half() {
    let area = ReferenceArea::new(0.0, 0.0, 1000.0, 800.0);
    assert_eq!(
        map(&NormalizedRect::FULL, &area),
        PixelRect::new(0.0, 0.0, 1000.0, 800.0)
    );
    assert_eq!(
        map(&NormalizedRect::new(0.5, 0.0, 0.5, 1.0), &area),
        PixelRect::new(500.0, 0.0, 500.0, 800.0)
    );
}
