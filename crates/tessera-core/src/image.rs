//! Stride-aware grayscale view and pyramid resampling.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]

use crate::error::ScoreError;

/// A view into an 8-bit grayscale buffer with explicit stride support.
/// This allows handling rows with padding, such as NumPy slices.
#[derive(Clone, Copy, Debug)]
pub struct GrayView<'a> {
    /// Pixel rows, `stride` bytes apart.
    pub data: &'a [u8],
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Distance between row starts in bytes.
    pub stride: usize,
}

impl<'a> GrayView<'a> {
    /// Create a view after validating that the buffer covers the dimensions and stride.
    ///
    /// # Errors
    /// Returns [`ScoreError::InvalidImage`] if `stride < width` or the buffer is too small.
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        stride: usize,
    ) -> Result<Self, ScoreError> {
        let required = if height > 0 {
            (height - 1) * stride + width
        } else {
            0
        };
        if stride < width || data.len() < required {
            return Err(ScoreError::InvalidImage {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Row `y`, without padding.
    #[inline(always)]
    #[must_use]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Pixel at `(x, y)`.
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// Pixel at a signed offset from `(x, y)`. The caller keeps the offset in bounds.
    #[inline(always)]
    #[must_use]
    pub fn offset(&self, x: usize, y: usize, dx: i32, dy: i32) -> u8 {
        let xi = (x as isize + dx as isize) as usize;
        let yi = (y as isize + dy as isize) as usize;
        self.pixel(xi, yi)
    }
}

/// Bilinear resize of `src` into a tightly packed `dst_w` x `dst_h` buffer.
///
/// Sample positions are pixel-center aligned: destination pixel `d` reads
/// source coordinate `(d + 0.5) * src / dst - 0.5`, clamped to the image.
///
/// # Panics
/// Panics if `dst` is shorter than `dst_w * dst_h`.
pub fn resize_bilinear(src: &GrayView, dst: &mut [u8], dst_w: usize, dst_h: usize) {
    assert!(dst.len() >= dst_w * dst_h, "destination buffer too small");
    if src.width == 0 || src.height == 0 || dst_w == 0 || dst_h == 0 {
        return;
    }
    let sx_scale = src.width as f32 / dst_w as f32;
    let sy_scale = src.height as f32 / dst_h as f32;
    let max_x = (src.width - 1) as f32;
    let max_y = (src.height - 1) as f32;

    // Horizontal taps are the same for every row.
    let taps: Vec<(usize, usize, f32)> = (0..dst_w)
        .map(|dx| {
            let sx = ((dx as f32 + 0.5) * sx_scale - 0.5).clamp(0.0, max_x);
            let x0 = sx.floor() as usize;
            let x1 = (x0 + 1).min(src.width - 1);
            (x0, x1, sx - x0 as f32)
        })
        .collect();

    for (dy, out_row) in dst.chunks_exact_mut(dst_w).take(dst_h).enumerate() {
        let sy = ((dy as f32 + 0.5) * sy_scale - 0.5).clamp(0.0, max_y);
        let y0 = sy.floor() as usize;
        let y1 = (y0 + 1).min(src.height - 1);
        let fy = sy - y0 as f32;
        let r0 = src.row(y0);
        let r1 = src.row(y1);
        for (out, &(x0, x1, fx)) in out_row.iter_mut().zip(&taps) {
            let top = f32::from(r0[x0]) * (1.0 - fx) + f32::from(r0[x1]) * fx;
            let bottom = f32::from(r1[x0]) * (1.0 - fx) + f32::from(r1[x1]) * fx;
            *out = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_view_stride() {
        let data = vec![
            1, 2, 3, 0, // row 0 + padding
            4, 5, 6, 0, // row 1 + padding
        ];
        let view = GrayView::new(&data, 3, 2, 4).unwrap();
        assert_eq!(view.row(0), &[1, 2, 3]);
        assert_eq!(view.row(1), &[4, 5, 6]);
        assert_eq!(view.pixel(1, 1), 5);
        assert_eq!(view.offset(1, 1, -1, -1), 1);
    }

    #[test]
    fn test_invalid_buffer_size() {
        let data = vec![1, 2, 3];
        assert!(GrayView::new(&data, 2, 2, 2).is_err());
        assert!(GrayView::new(&data, 3, 1, 2).is_err());
    }

    #[test]
    fn test_resize_flat_stays_flat() {
        let data = vec![77u8; 40 * 30];
        let view = GrayView::new(&data, 40, 30, 40).unwrap();
        let mut out = vec![0u8; 33 * 25];
        resize_bilinear(&view, &mut out, 33, 25);
        assert!(out.iter().all(|&v| v == 77));
    }

    #[test]
    fn test_resize_halves_two_by_two_blocks() {
        let data = vec![
            0, 0, 200, 200, //
            0, 0, 200, 200, //
            100, 100, 50, 50, //
            100, 100, 50, 50,
        ];
        let view = GrayView::new(&data, 4, 4, 4).unwrap();
        let mut out = vec![0u8; 4];
        resize_bilinear(&view, &mut out, 2, 2);
        // Centers land between source pixels of the same block.
        assert_eq!(out, vec![0, 200, 100, 50]);
    }
}
