//! Canvas size and pattern grid derived from the aspect ratio.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::config::{AspectRatio, Axis};
use crate::error::MarkerError;

/// Largest canvas, in pixels, a layout may describe (1 GiB of RGBA).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// Canvas dimensions plus the (columns, rows) grid used by the patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Grid columns.
    pub columns: u32,
    /// Grid rows.
    pub rows: u32,
}

impl Layout {
    /// Compute the layout for an aspect ratio and a target dimension.
    ///
    /// `dimension` fixes the side named by `axis`; the other side is scaled by
    /// the ratio and rounded to the nearest pixel.
    ///
    /// # Errors
    /// Returns [`MarkerError::InvalidDimension`] if `dimension` is zero, or
    /// [`MarkerError::DimensionTooLarge`] if the canvas would exceed
    /// [`MAX_CANVAS_PIXELS`].
    pub fn new(aspect: AspectRatio, axis: Axis, dimension: u32) -> Result<Self, MarkerError> {
        if dimension == 0 {
            return Err(MarkerError::InvalidDimension(dimension));
        }
        let (ratio_w, ratio_h) = aspect.ratio();
        let scaled = |num: u32, den: u32| -> u64 {
            let v = (f64::from(dimension) * f64::from(num) / f64::from(den)).round();
            (v as u64).max(1)
        };
        let (width, height) = match axis {
            Axis::Width => (u64::from(dimension), scaled(ratio_h, ratio_w)),
            Axis::Height => (scaled(ratio_w, ratio_h), u64::from(dimension)),
        };
        if width.saturating_mul(height) > MAX_CANVAS_PIXELS {
            return Err(MarkerError::DimensionTooLarge { width, height });
        }
        let (columns, rows) = aspect.grid();
        // Both sides are at most MAX_CANVAS_PIXELS, well inside u32.
        Ok(Self {
            width: width as u32,
            height: height as u32,
            columns,
            rows,
        })
    }

    /// Width of one grid cell in pixels.
    #[must_use]
    pub fn increment_x(&self) -> f64 {
        f64::from(self.width) / f64::from(self.columns)
    }

    /// Height of one grid cell in pixels.
    #[must_use]
    pub fn increment_y(&self) -> f64 {
        f64::from(self.height) / f64::from(self.rows)
    }

    /// Number of grid cells.
    #[must_use]
    pub fn cells(&self) -> u32 {
        self.columns * self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_grid_table() {
        assert_eq!(AspectRatio::FourThree.grid(), (16, 12));
        assert_eq!(AspectRatio::SixteenNine.grid(), (20, 12));
        assert_eq!(AspectRatio::Square.grid(), (12, 12));
    }

    #[test]
    fn test_width_constrained() {
        let layout = Layout::new(AspectRatio::FourThree, Axis::Width, 800).unwrap();
        assert_eq!((layout.width, layout.height), (800, 600));
        assert_eq!(layout.increment_x(), 50.0);
        assert_eq!(layout.increment_y(), 50.0);
    }

    #[test]
    fn test_height_constrained() {
        let layout = Layout::new(AspectRatio::SixteenNine, Axis::Height, 720).unwrap();
        assert_eq!((layout.width, layout.height), (1280, 720));
        assert_eq!((layout.columns, layout.rows), (20, 12));
    }

    #[test]
    fn test_rounds_to_nearest() {
        // 1001 * 9 / 16 = 563.0625
        let layout = Layout::new(AspectRatio::SixteenNine, Axis::Width, 1001).unwrap();
        assert_eq!(layout.height, 563);
        // 101 * 3 / 4 = 75.75
        let layout = Layout::new(AspectRatio::FourThree, Axis::Width, 101).unwrap();
        assert_eq!(layout.height, 76);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert_eq!(
            Layout::new(AspectRatio::Square, Axis::Width, 0),
            Err(MarkerError::InvalidDimension(0))
        );
    }

    #[test]
    fn test_canvas_pixel_limit() {
        // 16384 * 16384 is exactly the limit.
        let layout = Layout::new(AspectRatio::Square, Axis::Width, 16_384).unwrap();
        assert_eq!(u64::from(layout.width) * u64::from(layout.height), MAX_CANVAS_PIXELS);
        assert_eq!(
            Layout::new(AspectRatio::Square, Axis::Height, 16_385),
            Err(MarkerError::DimensionTooLarge {
                width: 16_385,
                height: 16_385
            })
        );
        assert_eq!(
            Layout::new(AspectRatio::FourThree, Axis::Width, 100_000),
            Err(MarkerError::DimensionTooLarge {
                width: 100_000,
                height: 75_000
            })
        );
        assert!(matches!(
            Layout::new(AspectRatio::SixteenNine, Axis::Height, u32::MAX),
            Err(MarkerError::DimensionTooLarge { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_constrained_side_is_exact(dim in 1u32..5000, use_width in any::<bool>()) {
            for aspect in AspectRatio::all() {
                let axis = if use_width { Axis::Width } else { Axis::Height };
                let layout = Layout::new(*aspect, axis, dim).unwrap();
                let fixed = if use_width { layout.width } else { layout.height };
                prop_assert_eq!(fixed, dim);
                prop_assert!(layout.width >= 1 && layout.height >= 1);
                let (c, r) = aspect.grid();
                prop_assert_eq!(layout.cells(), c * r);
            }
        }
    }
}
