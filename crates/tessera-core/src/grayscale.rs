//! RGBA to grayscale conversion.
//!
//! Uses the BT.601 luma weights (0.299, 0.587, 0.114) in 14-bit fixed point
//! with round-half-up, matching the conversion used by common vision
//! libraries. Alpha is ignored.

#![allow(clippy::cast_possible_truncation)]

use multiversion::multiversion;
use rayon::prelude::*;

const SHIFT: u32 = 14;
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const ROUND: u32 = 1 << (SHIFT - 1);

/// Luma of one pixel.
#[inline(always)]
#[must_use]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = (u32::from(r) * R_WEIGHT + u32::from(g) * G_WEIGHT + u32::from(b) * B_WEIGHT + ROUND)
        >> SHIFT;
    // Weights sum to 1 << SHIFT, so y <= 255.
    y.min(255) as u8
}

/// Convert tightly packed RGBA rows into a grayscale buffer.
///
/// `rgba` holds `width * 4` bytes per row, `gray` holds `width` bytes per row.
/// Rows are converted in parallel.
#[multiversion(targets(
    "x86_64+avx2+bmi1+bmi2+popcnt+lzcnt",
    "x86_64+avx512f+avx512bw+avx512dq+avx512vl",
    "aarch64+neon"
))]
pub fn rgba_to_gray(rgba: &[u8], width: usize, gray: &mut [u8]) {
    if width == 0 {
        return;
    }
    gray.par_chunks_mut(width)
        .zip(rgba.par_chunks(width * 4))
        .for_each(|(dst, src)| {
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(4)) {
                *out = luma(px[0], px[1], px[2]);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_primaries() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_alpha_is_ignored() {
        let rgba = [10, 20, 30, 0, 10, 20, 30, 255];
        let mut gray = [0u8; 2];
        rgba_to_gray(&rgba, 2, &mut gray);
        assert_eq!(gray[0], gray[1]);
    }

    #[test]
    fn test_rows_are_independent() {
        let width = 3;
        let rgba: Vec<u8> = (0..width * 2)
            .flat_map(|i| if i < width { [255, 255, 255, 255] } else { [0, 0, 0, 255] })
            .collect();
        let mut gray = vec![7u8; width * 2];
        rgba_to_gray(&rgba, width, &mut gray);
        assert_eq!(gray, vec![255, 255, 255, 0, 0, 0]);
    }

    proptest! {
        #[test]
        fn prop_gray_is_identity_on_gray(v in any::<u8>()) {
            prop_assert_eq!(luma(v, v, v), v);
        }
    }
}
