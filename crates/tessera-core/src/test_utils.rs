//! Deterministic helpers for tests and benchmarks.

use crate::color::Rgb;
use crate::random::RandomSource;
use crate::surface::{Paint, Surface};
use image::{Rgba, RgbaImage};

/// A [`RandomSource`] that replays a fixed sequence of samples, cycling when
/// it runs out.
#[derive(Clone, Debug)]
pub struct SequenceSource {
    samples: Vec<f64>,
    next: usize,
}

impl SequenceSource {
    /// Replay `samples`. An empty sequence yields 0.0 forever.
    #[must_use]
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples, next: 0 }
    }

    /// Number of samples drawn so far.
    #[must_use]
    pub fn drawn(&self) -> usize {
        self.next
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&mut self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let v = self.samples[self.next % self.samples.len()];
        self.next += 1;
        v
    }
}

/// One recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    /// `fill_rect(x, y, w, h)`.
    FillRect {
        /// Rectangle `[x, y, w, h]`.
        rect: [f64; 4],
        /// Fill style.
        paint: Paint,
    },
    /// `stroke_rect(x, y, w, h, line_width)`.
    StrokeRect {
        /// Rectangle `[x, y, w, h]`.
        rect: [f64; 4],
        /// Stroke thickness.
        line_width: f64,
        /// Stroke style.
        paint: Paint,
    },
    /// `fill_polygon(points)`.
    FillPolygon {
        /// Vertices in drawing order.
        points: Vec<[f64; 2]>,
        /// Fill style.
        paint: Paint,
    },
    /// `fill_ellipse(cx, cy, rx, ry)`.
    FillEllipse {
        /// Center.
        center: [f64; 2],
        /// Radii along x and y.
        radii: [f64; 2],
        /// Fill style.
        paint: Paint,
    },
}

/// A [`Surface`] that records calls instead of rasterizing.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    /// Calls in the order they were made.
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    /// Create an empty recorder with the given extent.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    /// Number of `fill_rect` calls.
    #[must_use]
    pub fn rect_count(&self) -> usize {
        self.count(|c| matches!(c, DrawCall::FillRect { .. }))
    }

    /// Number of `fill_polygon` calls with exactly three vertices.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.count(|c| matches!(c, DrawCall::FillPolygon { points, .. } if points.len() == 3))
    }

    /// Number of `fill_ellipse` calls.
    #[must_use]
    pub fn ellipse_count(&self) -> usize {
        self.count(|c| matches!(c, DrawCall::FillEllipse { .. }))
    }

    /// Number of `stroke_rect` calls.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.count(|c| matches!(c, DrawCall::StrokeRect { .. }))
    }

    fn count(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint) {
        self.calls.push(DrawCall::FillRect {
            rect: [x, y, w, h],
            paint,
        });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, line_width: f64, paint: Paint) {
        self.calls.push(DrawCall::StrokeRect {
            rect: [x, y, w, h],
            line_width,
            paint,
        });
    }

    fn fill_polygon(&mut self, points: &[[f64; 2]], paint: Paint) {
        self.calls.push(DrawCall::FillPolygon {
            points: points.to_vec(),
            paint,
        });
    }

    fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, paint: Paint) {
        self.calls.push(DrawCall::FillEllipse {
            center: [cx, cy],
            radii: [rx, ry],
            paint,
        });
    }
}

/// An opaque single-color image.
#[must_use]
pub fn solid_image(width: u32, height: u32, color: Rgb) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([color.r, color.g, color.b, 255]))
}

/// Bright squares of side `side` on a dark background, laid out on a regular
/// grid with pitch `2 * side` and a margin of `margin` pixels.
#[must_use]
pub fn squares_on_dark(width: u32, height: u32, side: u32, margin: u32) -> RgbaImage {
    let side = side.max(1);
    let pitch = side * 2;
    RgbaImage::from_fn(width, height, |x, y| {
        let inside = x >= margin
            && y >= margin
            && x < width.saturating_sub(margin)
            && y < height.saturating_sub(margin)
            && (x - margin) % pitch < side
            && (y - margin) % pitch < side;
        if inside {
            Rgba([230, 230, 230, 255])
        } else {
            Rgba([20, 20, 20, 255])
        }
    })
}
