//! Sobel gradients and the Harris corner measure used to rank keypoints.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::image::GrayView;

/// Sobel gradient `(gx, gy)` at `(x, y)`. The 3x3 neighborhood must lie
/// inside the image.
#[inline]
#[must_use]
pub fn sobel_at(img: &GrayView, x: usize, y: usize) -> (i32, i32) {
    // Sobel kernels:
    // Gx: [-1 0 1; -2 0 2; -1 0 1]
    // Gy: [-1 -2 -1; 0 0 0; 1 2 1]
    let p = |dx: i32, dy: i32| i32::from(img.offset(x, y, dx, dy));

    let p00 = p(-1, -1);
    let p10 = p(0, -1);
    let p20 = p(1, -1);
    let p01 = p(-1, 0);
    let p21 = p(1, 0);
    let p02 = p(-1, 1);
    let p12 = p(0, 1);
    let p22 = p(1, 1);

    let gx = -p00 + p20 - 2 * p01 + 2 * p21 - p02 + p22;
    let gy = -p00 - 2 * p10 - p20 + p02 + 2 * p12 + p22;
    (gx, gy)
}

/// Harris corner response over a `block` x `block` window centered on `(x, y)`.
///
/// The structure tensor sums are normalized by `4 * block * 255` per gradient
/// so responses are comparable across images. The window plus one pixel of
/// Sobel support must lie inside the image.
#[must_use]
pub fn harris_response(img: &GrayView, x: usize, y: usize, block: usize, k: f32) -> f32 {
    let r = (block / 2) as i32;
    let (mut a, mut b, mut c) = (0i64, 0i64, 0i64);
    for dy in -r..=r {
        for dx in -r..=r {
            let px = (x as i32 + dx) as usize;
            let py = (y as i32 + dy) as usize;
            let (gx, gy) = sobel_at(img, px, py);
            let (gx, gy) = (i64::from(gx), i64::from(gy));
            a += gx * gx;
            b += gy * gy;
            c += gx * gy;
        }
    }

    let scale = 1.0 / (4.0 * block as f64 * 255.0);
    let scale4 = scale * scale * scale * scale;
    let (a, b, c) = (a as f64, b as f64, c as f64);
    let det = a * b - c * c;
    let trace = a + b;
    ((det - f64::from(k) * trace * trace) * scale4) as f32
}
