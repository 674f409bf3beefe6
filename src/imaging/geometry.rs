//! Pure geometry for the three actions.
//!
//! Symbolic dimensions are resolved against a probed image here, and crop
//! windows are placed on the 3×3 anchor grid. Nothing in this module touches
//! the filesystem or the external tool.

use super::probe::ImageInfo;
use crate::types::{Action, ActionKind, Anchor, CropOrigin, Dimension};

/// Stand-in for a zero crop offset. The external tool misplaces a crop whose
/// offset component is a literal `0`.
pub const ZERO_OFFSET_PLACEHOLDER: f64 = 0.0001;

/// Crop window offsets from the top-left corner, ready to pass to the tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropOffset {
    pub x: f64,
    pub y: f64,
}

/// Concrete values for one action against one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedGeometry {
    pub width: u32,
    pub height: u32,
    /// Only ever set for crops.
    pub offset: Option<CropOffset>,
}

/// Resolve an action's width and height against an image.
///
/// `x` takes the native value. `m` derives one axis from the other through
/// the aspect ratio, where "the other" is its literal value or, failing that,
/// its native value.
///
/// ```text
/// 800×600, width 400, height m  →  400 × round(400 / 1.333) = 400×300
/// 800×600, width m, height 300  →  round(300 × 1.333) × 300 = 400×300
/// ```
pub fn resolve_dimensions(width: Dimension, height: Dimension, info: &ImageInfo) -> (u32, u32) {
    let width_base = match width {
        Dimension::Literal(n) => n,
        _ => info.width,
    };
    let height_base = match height {
        Dimension::Literal(n) => n,
        _ => info.height,
    };

    let w = match width {
        Dimension::Literal(n) => n,
        Dimension::DeriveFromHeight => derive(height_base as f64 * info.aspect_ratio),
        Dimension::UseNative | Dimension::DeriveFromWidth => info.width,
    };
    let h = match height {
        Dimension::Literal(n) => n,
        Dimension::DeriveFromWidth => derive(width_base as f64 / info.aspect_ratio),
        Dimension::UseNative | Dimension::DeriveFromHeight => info.height,
    };
    (w, h)
}

fn derive(value: f64) -> u32 {
    if value.is_finite() {
        (value.round() as u32).max(1)
    } else {
        1
    }
}

/// Raw pixel offsets for an anchor cell.
///
/// Edge rows and columns use the full difference between native and target
/// size; the middle row and column use half of it. The difference is signed:
/// a target larger than the image gives a negative offset.
///
/// ```text
/// native 2000, target 1000:   row 0 → 0   row 1 → 500   row 2 → 1000
/// ```
pub fn anchor_offset(anchor: Anchor, native: (u32, u32), target: (u32, u32)) -> (i64, i64) {
    let dx = native.0 as i64 - target.0 as i64;
    let dy = native.1 as i64 - target.1 as i64;
    (place(anchor.col(), dx), place(anchor.row(), dy))
}

fn place(index: u8, delta: i64) -> i64 {
    match index {
        0 => 0,
        1 => delta >> 1,
        _ => delta,
    }
}

/// Replace an exact zero with [`ZERO_OFFSET_PLACEHOLDER`].
pub fn nonzero_offset(value: f64) -> f64 {
    if value == 0.0 {
        ZERO_OFFSET_PLACEHOLDER
    } else {
        value
    }
}

/// Crop offsets for a crop origin, or `None` to leave placement to the tool.
pub fn crop_offset(origin: CropOrigin, native: (u32, u32), target: (u32, u32)) -> Option<CropOffset> {
    let (x, y) = match origin {
        CropOrigin::ToolDefault => return None,
        CropOrigin::Anchor(anchor) => {
            let (x, y) = anchor_offset(anchor, native, target);
            (x as f64, y as f64)
        }
        CropOrigin::Offset { x, y } => (x as f64, y as f64),
    };
    Some(CropOffset {
        x: nonzero_offset(x),
        y: nonzero_offset(y),
    })
}

/// Resolve one action against one image.
pub fn resolve(action: &Action, info: &ImageInfo, origin: CropOrigin) -> ResolvedGeometry {
    let (width, height) = resolve_dimensions(action.width, action.height, info);
    let offset = match action.kind {
        ActionKind::Crop => crop_offset(origin, (info.width, info.height), (width, height)),
        ActionKind::Pad | ActionKind::Scale => None,
    };
    ResolvedGeometry {
        width,
        height,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(width: u32, height: u32) -> ImageInfo {
        ImageInfo::new(width, height, 72.0, false)
    }

    fn anchor(cell: u8) -> Anchor {
        Anchor::new(cell).unwrap()
    }

    // =========================================================================
    // resolve_dimensions
    // =========================================================================

    #[test]
    fn literal_dimensions_pass_through() {
        assert_eq!(
            resolve_dimensions(Dimension::Literal(10), Dimension::Literal(20), &info(800, 600)),
            (10, 20)
        );
    }

    #[test]
    fn native_takes_image_value() {
        assert_eq!(
            resolve_dimensions(Dimension::UseNative, Dimension::Literal(100), &info(800, 600)),
            (800, 100)
        );
        assert_eq!(
            resolve_dimensions(Dimension::Literal(100), Dimension::UseNative, &info(800, 600)),
            (100, 600)
        );
    }

    #[test]
    fn height_from_width_keeps_aspect() {
        assert_eq!(
            resolve_dimensions(
                Dimension::Literal(400),
                Dimension::DeriveFromWidth,
                &info(800, 600)
            ),
            (400, 300)
        );
    }

    #[test]
    fn width_from_height_keeps_aspect() {
        assert_eq!(
            resolve_dimensions(
                Dimension::DeriveFromHeight,
                Dimension::Literal(300),
                &info(800, 600)
            ),
            (400, 300)
        );
    }

    #[test]
    fn derived_values_are_rounded() {
        // 1000 / (3 / 2) = 666.67
        assert_eq!(
            resolve_dimensions(
                Dimension::Literal(1000),
                Dimension::DeriveFromWidth,
                &info(1500, 1000)
            ),
            (1000, 667)
        );
    }

    #[test]
    fn derive_against_native_other_axis() {
        assert_eq!(
            resolve_dimensions(
                Dimension::UseNative,
                Dimension::DeriveFromWidth,
                &info(800, 600)
            ),
            (800, 600)
        );
    }

    #[test]
    fn derived_value_never_collapses_to_zero() {
        assert_eq!(
            resolve_dimensions(
                Dimension::Literal(1),
                Dimension::DeriveFromWidth,
                &info(4000, 10)
            ),
            (1, 1)
        );
    }

    // =========================================================================
    // Anchors and offsets
    // =========================================================================

    #[test]
    fn anchor_rows_place_vertical_offset() {
        let native = (1000, 2000);
        let target = (1000, 1000);
        for cell in 0..=2 {
            assert_eq!(anchor_offset(anchor(cell), native, target).1, 0);
        }
        for cell in 3..=5 {
            assert_eq!(anchor_offset(anchor(cell), native, target).1, 500);
        }
        for cell in 6..=8 {
            assert_eq!(anchor_offset(anchor(cell), native, target).1, 1000);
        }
    }

    #[test]
    fn anchor_columns_place_horizontal_offset() {
        let native = (900, 100);
        let target = (300, 100);
        assert_eq!(anchor_offset(anchor(3), native, target).0, 0);
        assert_eq!(anchor_offset(anchor(4), native, target).0, 300);
        assert_eq!(anchor_offset(anchor(5), native, target).0, 600);
    }

    #[test]
    fn center_anchor_halves_both_axes() {
        assert_eq!(
            anchor_offset(anchor(4), (2000, 2000), (1000, 1000)),
            (500, 500)
        );
    }

    #[test]
    fn oversized_target_gives_negative_offsets() {
        assert_eq!(anchor_offset(anchor(8), (100, 100), (150, 120)), (-50, -20));
        // Arithmetic halving rounds toward negative infinity.
        assert_eq!(anchor_offset(anchor(4), (100, 100), (101, 101)), (-1, -1));
    }

    #[test]
    fn odd_delta_halves_down() {
        assert_eq!(anchor_offset(anchor(4), (101, 101), (100, 100)), (0, 0));
        assert_eq!(anchor_offset(anchor(4), (103, 103), (100, 100)), (1, 1));
    }

    #[test]
    fn zero_offset_is_replaced_per_axis() {
        let offset = crop_offset(CropOrigin::Anchor(anchor(2)), (800, 600), (400, 600)).unwrap();
        assert_eq!(offset.x, 400.0);
        assert_eq!(offset.y, ZERO_OFFSET_PLACEHOLDER);

        let offset = crop_offset(CropOrigin::Anchor(anchor(0)), (800, 600), (400, 300)).unwrap();
        assert_eq!(offset.x, ZERO_OFFSET_PLACEHOLDER);
        assert_eq!(offset.y, ZERO_OFFSET_PLACEHOLDER);
    }

    #[test]
    fn explicit_offset_also_avoids_zero() {
        let offset = crop_offset(CropOrigin::Offset { x: 0, y: 40 }, (800, 600), (10, 10)).unwrap();
        assert_eq!(offset, CropOffset {
            x: ZERO_OFFSET_PLACEHOLDER,
            y: 40.0
        });
    }

    #[test]
    fn tool_default_emits_no_offset() {
        assert_eq!(crop_offset(CropOrigin::ToolDefault, (800, 600), (10, 10)), None);
    }

    // =========================================================================
    // resolve
    // =========================================================================

    #[test]
    fn only_crops_get_offsets() {
        let origin = CropOrigin::Anchor(anchor(8));
        let img = info(800, 600);
        for kind in [ActionKind::Pad, ActionKind::Scale] {
            let action = Action {
                kind,
                width: Dimension::Literal(400),
                height: Dimension::Literal(300),
                pad_colour: "FFFFFF".into(),
            };
            assert_eq!(resolve(&action, &img, origin).offset, None);
        }

        let crop = Action {
            kind: ActionKind::Crop,
            width: Dimension::Literal(400),
            height: Dimension::Literal(300),
            pad_colour: "FFFFFF".into(),
        };
        assert_eq!(
            resolve(&crop, &img, origin),
            ResolvedGeometry {
                width: 400,
                height: 300,
                offset: Some(CropOffset { x: 400.0, y: 300.0 }),
            }
        );
    }
}
