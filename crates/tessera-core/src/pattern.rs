//! Pattern strategies: mosaic, chaos and dot matrix.
//!
//! Each strategy paints onto any [`Surface`] using the palette and layout.
//! Every random choice goes through the injected [`RandomSource`], in a fixed
//! sample order, so a replayed sequence reproduces a marker exactly.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::color::Rgb;
use crate::config::PatternKind;
use crate::layout::Layout;
use crate::palette::Palette;
use crate::random::RandomSource;
use crate::surface::{Paint, Surface, MOSAIC_ALPHA};

/// A way of filling the canvas with shapes.
pub trait PatternStrategy {
    /// Name used in selections and logs.
    const NAME: &'static str;

    /// Paint the shapes. The background is already filled.
    fn draw<S, R>(&self, layout: &Layout, palette: &Palette, surface: &mut S, rng: &mut R)
    where
        S: Surface + ?Sized,
        R: RandomSource + ?Sized;
}

/// Triangle tiling with translucent circles on top.
///
/// The grid is walked in 2x2 blocks; each block is cut into eight triangles
/// along its midlines. For grids with an odd number of columns or rows the
/// last block hangs over the canvas edge and is clipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mosaic;

/// Randomly placed circles, squares and upward triangles.
#[derive(Clone, Copy, Debug, Default)]
pub struct Chaos;

/// One centered square per grid cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct DotMatrix;

/// Triangle vertices of a 2x2 block, in units of one cell, relative to the
/// block origin. The first four cover the upper row, the last four the lower.
const MOSAIC_TRIANGLES: [[[f64; 2]; 3]; 8] = [
    [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
    [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
    [[1.0, 0.0], [2.0, 0.0], [1.0, 1.0]],
    [[2.0, 0.0], [1.0, 1.0], [2.0, 1.0]],
    [[0.0, 1.0], [0.0, 2.0], [1.0, 1.0]],
    [[0.0, 2.0], [1.0, 2.0], [1.0, 1.0]],
    [[1.0, 1.0], [2.0, 1.0], [2.0, 2.0]],
    [[1.0, 1.0], [1.0, 2.0], [2.0, 2.0]],
];

/// Number of translucent circles drawn over the mosaic tiling.
#[must_use]
pub fn mosaic_circle_count(layout: &Layout) -> usize {
    (1.5 * f64::from(layout.cells())).round() as usize
}

impl PatternStrategy for Mosaic {
    const NAME: &'static str = "mosaic";

    fn draw<S, R>(&self, layout: &Layout, palette: &Palette, surface: &mut S, rng: &mut R)
    where
        S: Surface + ?Sized,
        R: RandomSource + ?Sized,
    {
        let incr_x = layout.increment_x();
        let incr_y = layout.increment_y();
        let width = f64::from(layout.width);
        let height = f64::from(layout.height);

        for i in 0..layout.columns.div_ceil(2) {
            for j in 0..layout.rows.div_ceil(2) {
                let ox = 2.0 * f64::from(i) * incr_x;
                let oy = 2.0 * f64::from(j) * incr_y;
                for tri in MOSAIC_TRIANGLES {
                    let Some(color) = palette.pick(rng) else {
                        return;
                    };
                    let points = tri.map(|[u, v]| [ox + u * incr_x, oy + v * incr_y]);
                    surface.fill_polygon(&points, Paint::opaque(color));
                }
            }
        }

        let min_diameter = incr_x / 10.0;
        for _ in 0..mosaic_circle_count(layout) {
            let diameter = rng.next_unit() * (incr_x - min_diameter) + min_diameter;
            let Some(color) = palette.pick(rng) else {
                return;
            };
            let cx = rng.next_unit() * width;
            let cy = rng.next_unit() * height;
            let r = diameter / 2.0;
            surface.fill_ellipse(cx, cy, r, r, Paint::with_alpha(color, MOSAIC_ALPHA));
        }
    }
}

/// Shape drawn by one chaos step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChaosShape {
    Circle,
    Square,
    Triangle,
}

impl ChaosShape {
    fn from_index(idx: usize) -> Self {
        match idx {
            0 => ChaosShape::Circle,
            1 => ChaosShape::Square,
            _ => ChaosShape::Triangle,
        }
    }
}

impl PatternStrategy for Chaos {
    const NAME: &'static str = "chaos";

    fn draw<S, R>(&self, layout: &Layout, palette: &Palette, surface: &mut S, rng: &mut R)
    where
        S: Surface + ?Sized,
        R: RandomSource + ?Sized,
    {
        let width = f64::from(layout.width);
        let height = f64::from(layout.height);
        let max_size = width.min(height) / 10.0;
        let total = layout.cells() * 2;

        for _ in 0..total {
            let shape = ChaosShape::from_index(rng.below(3));
            let size = rng.next_unit() * max_size;
            let x = rng.next_unit() * width;
            let y = rng.next_unit() * height;
            let Some(color) = palette.pick(rng) else {
                return;
            };
            let paint = Paint::opaque(color);

            match shape {
                ChaosShape::Circle => surface.fill_ellipse(x, y, size / 2.0, size / 2.0, paint),
                ChaosShape::Square => surface.fill_rect(x, y, size, size, paint),
                ChaosShape::Triangle => surface.fill_polygon(
                    &[[x, y], [x + size, y], [x + size / 2.0, y - size]],
                    paint,
                ),
            }
        }
    }
}

impl PatternStrategy for DotMatrix {
    const NAME: &'static str = "dotmatrix";

    fn draw<S, R>(&self, layout: &Layout, palette: &Palette, surface: &mut S, rng: &mut R)
    where
        S: Surface + ?Sized,
        R: RandomSource + ?Sized,
    {
        let incr_x = layout.increment_x();
        let incr_y = layout.increment_y();
        let side = incr_x.min(incr_y) / 2.0;
        let offset = side / 2.0;

        for i in 0..layout.columns {
            for j in 0..layout.rows {
                let cx = f64::from(i) * incr_x + incr_x / 2.0;
                let cy = f64::from(j) * incr_y + incr_y / 2.0;
                let Some(color) = palette.pick(rng) else {
                    return;
                };
                surface.fill_rect(cx - offset, cy - offset, side, side, Paint::opaque(color));
            }
        }
    }
}

/// Fill the background, then draw the pattern selected by `kind`.
///
/// With an empty palette only the background is painted.
pub fn paint<S, R>(
    kind: PatternKind,
    layout: &Layout,
    palette: &Palette,
    background: Rgb,
    surface: &mut S,
    rng: &mut R,
) where
    S: Surface + ?Sized,
    R: RandomSource + ?Sized,
{
    surface.fill_rect(
        0.0,
        0.0,
        f64::from(layout.width),
        f64::from(layout.height),
        Paint::opaque(background),
    );
    if palette.is_empty() {
        tracing::debug!("empty palette, painting background only");
        return;
    }
    match kind {
        PatternKind::Mosaic => run(&Mosaic, layout, palette, surface, rng),
        PatternKind::Chaos => run(&Chaos, layout, palette, surface, rng),
        PatternKind::DotMatrix => run(&DotMatrix, layout, palette, surface, rng),
    }
}

fn run<P, S, R>(pattern: &P, layout: &Layout, palette: &Palette, surface: &mut S, rng: &mut R)
where
    P: PatternStrategy,
    S: Surface + ?Sized,
    R: RandomSource + ?Sized,
{
    let _span = tracing::info_span!("pattern", kind = P::NAME).entered();
    pattern.draw(layout, palette, surface, rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AspectRatio, Axis};
    use crate::test_utils::{DrawCall, RecordingSurface, SequenceSource};

    fn rgb_palette() -> Palette {
        Palette::from_bases(&[
            Rgb::new(255, 0, 0),
            Rgb::new(0, 255, 0),
            Rgb::new(0, 0, 255),
        ])
    }

    fn record(kind: PatternKind, layout: &Layout, rng: &mut SequenceSource) -> RecordingSurface {
        let mut surface = RecordingSurface::new(layout.width, layout.height);
        paint(kind, layout, &rgb_palette(), Rgb::WHITE, &mut surface, rng);
        surface
    }

    #[test]
    fn test_background_is_painted_first() {
        let layout = Layout::new(AspectRatio::Square, Axis::Width, 120).unwrap();
        for &kind in PatternKind::all() {
            let surface = record(kind, &layout, &mut SequenceSource::new(vec![0.3]));
            assert_eq!(
                surface.calls[0],
                DrawCall::FillRect {
                    rect: [0.0, 0.0, 120.0, 120.0],
                    paint: Paint::opaque(Rgb::WHITE),
                }
            );
        }
    }

    #[test]
    fn test_mosaic_call_counts() {
        for (aspect, triangles, circles) in [
            (AspectRatio::Square, 8 * 6 * 6, 216),
            (AspectRatio::FourThree, 8 * 8 * 6, 288),
            (AspectRatio::SixteenNine, 8 * 10 * 6, 360),
        ] {
            let layout = Layout::new(aspect, Axis::Width, 640).unwrap();
            let surface = record(PatternKind::Mosaic, &layout, &mut SequenceSource::new(vec![0.4]));
            assert_eq!(surface.triangle_count(), triangles, "{aspect}");
            assert_eq!(surface.ellipse_count(), circles, "{aspect}");
            assert_eq!(surface.rect_count(), 1);
        }
    }

    #[test]
    fn test_mosaic_odd_grid_overhangs() {
        let layout = Layout {
            width: 300,
            height: 300,
            columns: 3,
            rows: 3,
        };
        let surface = record(PatternKind::Mosaic, &layout, &mut SequenceSource::new(vec![0.1]));
        assert_eq!(surface.triangle_count(), 8 * 2 * 2);
        let max_x = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::FillPolygon { points, .. } => {
                    points.iter().map(|p| p[0]).reduce(f64::max)
                }
                _ => None,
            })
            .fold(0.0, f64::max);
        assert!((max_x - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_mosaic_first_block_vertices() {
        let layout = Layout::new(AspectRatio::Square, Axis::Width, 600).unwrap();
        let surface = record(PatternKind::Mosaic, &layout, &mut SequenceSource::new(vec![0.0]));
        let DrawCall::FillPolygon { points, paint } = &surface.calls[1] else {
            panic!("expected a triangle, got {:?}", surface.calls[1]);
        };
        assert_eq!(points, &vec![[0.0, 0.0], [50.0, 0.0], [50.0, 50.0]]);
        assert_eq!(paint.color, rgb_palette().colors()[0]);
        let DrawCall::FillPolygon { points, .. } = &surface.calls[8] else {
            panic!("expected a triangle");
        };
        assert_eq!(points, &vec![[50.0, 50.0], [50.0, 100.0], [100.0, 100.0]]);
    }

    #[test]
    fn test_mosaic_circle_from_fixed_samples() {
        let layout = Layout::new(AspectRatio::Square, Axis::Width, 600).unwrap();
        let surface = record(PatternKind::Mosaic, &layout, &mut SequenceSource::new(vec![0.5]));
        let Some(DrawCall::FillEllipse { center, radii, paint }) = surface.calls.last() else {
            panic!("expected circles last");
        };
        // diameter = 0.5 * (50 - 5) + 5 = 27.5
        assert_eq!(*center, [300.0, 300.0]);
        assert_eq!(*radii, [13.75, 13.75]);
        assert_eq!(paint.color, rgb_palette().colors()[7]);
        assert_eq!(paint.alpha, MOSAIC_ALPHA);
    }

    #[test]
    fn test_chaos_shape_from_fixed_samples() {
        let layout = Layout::new(AspectRatio::Square, Axis::Width, 600).unwrap();
        // type 0 -> circle, size 0.5 * 60, x 150, y 450, color index 14
        let mut rng = SequenceSource::new(vec![0.0, 0.5, 0.25, 0.75, 0.99]);
        let surface = record(PatternKind::Chaos, &layout, &mut rng);
        assert_eq!(surface.calls.len(), 1 + 12 * 12 * 2);
        assert_eq!(
            surface.calls[1],
            DrawCall::FillEllipse {
                center: [150.0, 450.0],
                radii: [15.0, 15.0],
                paint: Paint::opaque(rgb_palette().colors()[14]),
            }
        );
        assert_eq!(rng.drawn(), 5 * 12 * 12 * 2);
    }

    #[test]
    fn test_chaos_triangle_points_up() {
        let layout = Layout::new(AspectRatio::Square, Axis::Width, 100).unwrap();
        let mut rng = SequenceSource::new(vec![0.9, 0.5, 0.5, 0.5, 0.0]);
        let surface = record(PatternKind::Chaos, &layout, &mut rng);
        assert_eq!(
            surface.calls[1],
            DrawCall::FillPolygon {
                points: vec![[50.0, 50.0], [55.0, 50.0], [52.5, 45.0]],
                paint: Paint::opaque(rgb_palette().colors()[0]),
            }
        );
    }

    #[test]
    fn test_dot_matrix_centers_squares() {
        let layout = Layout::new(AspectRatio::FourThree, Axis::Width, 800).unwrap();
        let surface = record(PatternKind::DotMatrix, &layout, &mut SequenceSource::new(vec![0.2]));
        assert_eq!(surface.rect_count(), 1 + 16 * 12);
        // Column-major: the second square is column 0, row 1.
        assert_eq!(
            surface.calls[2],
            DrawCall::FillRect {
                rect: [12.5, 62.5, 25.0, 25.0],
                paint: Paint::opaque(rgb_palette().colors()[3]),
            }
        );
    }

    #[test]
    fn test_empty_palette_paints_background_only() {
        let layout = Layout::new(AspectRatio::Square, Axis::Width, 60).unwrap();
        let mut surface = RecordingSurface::new(60, 60);
        let mut rng = SequenceSource::new(vec![0.5]);
        paint(
            PatternKind::Mosaic,
            &layout,
            &Palette::from_colors(Vec::new()),
            Rgb::BLACK,
            &mut surface,
            &mut rng,
        );
        assert_eq!(surface.calls.len(), 1);
        assert_eq!(rng.drawn(), 0);
    }
}
