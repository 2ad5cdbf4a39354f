//! Optional framing border.

use crate::config::Border;
use crate::surface::{Paint, Surface};

/// Border thickness as a fraction of the shorter canvas side.
pub const BORDER_FRACTION: f64 = 0.07;

/// Stroke width for a `width` x `height` canvas.
#[must_use]
pub fn border_width(width: u32, height: u32) -> f64 {
    f64::from(width.min(height)) * BORDER_FRACTION
}

/// Stroke the border onto `surface`. [`Border::None`] leaves it untouched.
///
/// The stroke outline is inset by half the line width so the whole band lies
/// inside the canvas.
pub fn apply_border<S: Surface + ?Sized>(surface: &mut S, border: Border) {
    let Some(color) = border.color() else {
        return;
    };
    let (w, h) = (surface.width(), surface.height());
    let lw = border_width(w, h);
    tracing::debug!(?border, line_width = lw, "drawing border");
    surface.stroke_rect(
        lw / 2.0,
        lw / 2.0,
        f64::from(w) - lw,
        f64::from(h) - lw,
        lw,
        Paint::opaque(color),
    );
}
