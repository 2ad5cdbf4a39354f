//! Drawing surface abstraction and the RGBA rasterizer behind it.
//!
//! Patterns and borders only talk to the [`Surface`] trait. [`Canvas`] is the
//! concrete implementation: it covers a pixel when the pixel center lies inside
//! the shape and blends with source-over compositing. No anti-aliasing is
//! applied, so shapes that abut along an edge never leave seams.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::similar_names)]

use crate::color::Rgb;
use image::{Rgba, RgbaImage};
use std::ops::Range;

/// Alpha applied to the translucent mosaic circles.
pub const MOSAIC_ALPHA: u8 = 0xD2;

/// A fill or stroke style: a color plus straight (non-premultiplied) alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Paint {
    /// Color channels.
    pub color: Rgb,
    /// Coverage, 255 is opaque.
    pub alpha: u8,
}

impl Paint {
    /// Fully opaque paint.
    #[must_use]
    pub const fn opaque(color: Rgb) -> Self {
        Self { color, alpha: 255 }
    }

    /// Paint with the given alpha.
    #[must_use]
    pub const fn with_alpha(color: Rgb, alpha: u8) -> Self {
        Self { color, alpha }
    }
}

impl From<Rgb> for Paint {
    fn from(color: Rgb) -> Self {
        Self::opaque(color)
    }
}

/// The drawing capabilities the pattern strategies need.
///
/// Coordinates are in pixels with the origin at the top-left corner; shapes
/// may extend past the surface and are clipped.
pub trait Surface {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Fill the axis-aligned rectangle with top-left `(x, y)`.
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint);

    /// Stroke the outline of a rectangle. The stroke is centered on the
    /// outline and `line_width` thick.
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, line_width: f64, paint: Paint);

    /// Fill a closed polygon given by its vertices.
    fn fill_polygon(&mut self, points: &[[f64; 2]], paint: Paint);

    /// Fill an axis-aligned ellipse.
    fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, paint: Paint);
}

/// An RGBA8 raster that implements [`Surface`].
///
/// A new canvas is fully transparent.
#[derive(Clone, Debug)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Allocate a transparent canvas.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Borrow the pixels.
    #[must_use]
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Take the pixels.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Pixel indices whose centers fall in `[a, b)`, clipped to `0..limit`.
    fn span(a: f64, b: f64, limit: u32) -> Range<u32> {
        let lim = f64::from(limit);
        let start = (a - 0.5).ceil().clamp(0.0, lim) as u32;
        let end = (b - 0.5).ceil().clamp(0.0, lim) as u32;
        start..end.max(start)
    }

    fn blend(&mut self, x: u32, y: u32, paint: Paint) {
        let Paint { color, alpha } = paint;
        if alpha == 0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x, y);
        if alpha == 255 {
            *dst = Rgba([color.r, color.g, color.b, 255]);
            return;
        }

        let sa = f64::from(alpha) / 255.0;
        let da = f64::from(dst[3]) / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: u8, d: u8| -> u8 {
            let v = (f64::from(s) * sa + f64::from(d) * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        *dst = Rgba([
            mix(color.r, dst[0]),
            mix(color.g, dst[1]),
            mix(color.b, dst[2]),
            (out_a * 255.0).round() as u8,
        ]);
    }

    fn fill_span(&mut self, y: u32, xs: Range<u32>, paint: Paint) {
        for x in xs {
            self.blend(x, y, paint);
        }
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint) {
        let xs = Self::span(x.min(x + w), x.max(x + w), self.width());
        let ys = Self::span(y.min(y + h), y.max(y + h), self.height());
        for py in ys {
            self.fill_span(py, xs.clone(), paint);
        }
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, line_width: f64, paint: Paint) {
        if line_width <= 0.0 {
            return;
        }
        let half = line_width / 2.0;
        let (x0, x1) = (x.min(x + w), x.max(x + w));
        let (y0, y1) = (y.min(y + h), y.max(y + h));

        let outer_x = Self::span(x0 - half, x1 + half, self.width());
        let outer_y = Self::span(y0 - half, y1 + half, self.height());
        let inner_x = Self::span(x0 + half, x1 - half, self.width());
        let inner_y = Self::span(y0 + half, y1 - half, self.height());

        // Each pixel of the band is painted once, so translucent strokes do
        // not darken at the corners.
        for py in outer_y {
            if inner_y.contains(&py) && !inner_x.is_empty() {
                self.fill_span(py, outer_x.start..inner_x.start, paint);
                self.fill_span(py, inner_x.end..outer_x.end, paint);
            } else {
                self.fill_span(py, outer_x.clone(), paint);
            }
        }
    }

    fn fill_polygon(&mut self, points: &[[f64; 2]], paint: Paint) {
        if points.len() < 3 {
            return;
        }
        let (min_y, max_y) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[1]), hi.max(p[1]))
            });

        let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
        for py in Self::span(min_y, max_y, self.height()) {
            let sy = f64::from(py) + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                let crosses = (a[1] <= sy && sy < b[1]) || (b[1] <= sy && sy < a[1]);
                if crosses {
                    crossings.push(a[0] + (sy - a[1]) * (b[0] - a[0]) / (b[1] - a[1]));
                }
            }
            crossings.sort_by(f64::total_cmp);
            // Even-odd rule.
            for pair in crossings.chunks_exact(2) {
                let xs = Self::span(pair[0], pair[1], self.width());
                self.fill_span(py, xs, paint);
            }
        }
    }

    fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, paint: Paint) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        for py in Self::span(cy - ry, cy + ry, self.height()) {
            let dy = (f64::from(py) + 0.5 - cy) / ry;
            let t = 1.0 - dy * dy;
            if t < 0.0 {
                continue;
            }
            let half = rx * t.sqrt();
            let xs = Self::span(cx - half, cx + half, self.width());
            self.fill_span(py, xs, paint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);

    fn is_red(canvas: &Canvas, x: u32, y: u32) -> bool {
        *canvas.as_image().get_pixel(x, y) == Rgba([255, 0, 0, 255])
    }

    #[test]
    fn test_new_canvas_is_transparent() {
        let canvas = Canvas::new(4, 3);
        assert_eq!((canvas.width(), canvas.height()), (4, 3));
        assert!(canvas.as_image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_fill_rect_samples_pixel_centers() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_rect(2.5, 2.0, 3.0, 1.0, RED.into());
        // Centers 2.5, 3.5, 4.5 lie in [2.5, 5.5)
        for x in 0..10 {
            assert_eq!(is_red(&canvas, x, 2), (2..=4).contains(&x), "x={x}");
        }
        assert!(!is_red(&canvas, 3, 1));
        assert!(!is_red(&canvas, 3, 3));
    }

    #[test]
    fn test_fill_rect_clips_to_surface() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(-10.0, -10.0, 100.0, 100.0, RED.into());
        assert!(canvas.as_image().pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn test_adjacent_triangles_tile_a_square() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill_polygon(&[[0.0, 0.0], [8.0, 0.0], [8.0, 8.0]], RED.into());
        canvas.fill_polygon(&[[0.0, 0.0], [0.0, 8.0], [8.0, 8.0]], RED.into());
        assert!(canvas.as_image().pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn test_fill_ellipse_is_round() {
        let mut canvas = Canvas::new(21, 21);
        canvas.fill_ellipse(10.5, 10.5, 5.0, 5.0, RED.into());
        assert!(is_red(&canvas, 10, 10));
        assert!(is_red(&canvas, 6, 10));
        assert!(!is_red(&canvas, 4, 10));
        // Outside the circle near the bounding-box corner.
        assert!(!is_red(&canvas, 6, 6));
    }

    #[test]
    fn test_stroke_rect_leaves_interior() {
        let mut canvas = Canvas::new(20, 20);
        canvas.stroke_rect(2.0, 2.0, 16.0, 16.0, 4.0, RED.into());
        assert!(is_red(&canvas, 0, 0));
        assert!(is_red(&canvas, 3, 10));
        assert!(!is_red(&canvas, 4, 10));
        assert!(!is_red(&canvas, 10, 10));
        assert!(is_red(&canvas, 19, 19));
    }

    #[test]
    fn test_translucent_blend_over_opaque() {
        let mut canvas = Canvas::new(1, 1);
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Rgb::WHITE.into());
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Paint::with_alpha(Rgb::BLACK, MOSAIC_ALPHA));
        let px = canvas.as_image().get_pixel(0, 0);
        // 255 * (1 - 210/255) = 45
        assert_eq!(*px, Rgba([45, 45, 45, 255]));
    }

    #[test]
    fn test_translucent_stroke_paints_corners_once() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_rect(0.0, 0.0, 10.0, 10.0, Rgb::WHITE.into());
        canvas.stroke_rect(1.0, 1.0, 8.0, 8.0, 2.0, Paint::with_alpha(Rgb::BLACK, 128));
        let corner = canvas.as_image().get_pixel(0, 0);
        let edge = canvas.as_image().get_pixel(5, 0);
        assert_eq!(corner, edge);
    }
}
