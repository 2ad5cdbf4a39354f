//! ORB-style keypoint detection.
//!
//! Pipeline per call:
//! 1. Build an image pyramid by repeated bilinear downscaling.
//! 2. Score FAST-9 corners on every level and keep 3x3 local maxima.
//! 3. Keep the strongest `2 * budget` by FAST score, re-rank by Harris
//!    response and keep `budget`.
//! 4. Orient each survivor by its intensity centroid.
//!
//! Levels are processed in parallel; pyramid buffers live in the caller's arena.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]

use crate::gradient::harris_response;
use crate::image::{resize_bilinear, GrayView};
use crate::runtime::{DetectorRuntime, FAST_ARC, FAST_RING};
use bumpalo::Bump;
use multiversion::multiversion;
use rayon::prelude::*;

/// A detected keypoint, in input-image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyPoint {
    /// Column of the keypoint.
    pub x: f32,
    /// Row of the keypoint.
    pub y: f32,
    /// Diameter of the described region.
    pub size: f32,
    /// Orientation in degrees, `[0, 360)`.
    pub angle: f32,
    /// Harris response; larger is stronger.
    pub response: f32,
    /// Pyramid level the keypoint was found on.
    pub octave: usize,
}

/// Margin FAST needs around a pixel.
const RING_RADIUS: usize = 3;

/// Detect keypoints on `img` using the tables in `runtime`.
///
/// The result holds at most `max_features` keypoints.
#[must_use]
pub fn detect(arena: &Bump, runtime: &DetectorRuntime, img: &GrayView) -> Vec<KeyPoint> {
    let _span = tracing::info_span!("orb_detect", width = img.width, height = img.height).entered();
    let config = runtime.config();
    let levels = build_pyramid(arena, runtime, img);

    let per_level: Vec<Vec<KeyPoint>> = levels
        .par_iter()
        .enumerate()
        .map(|(level, view)| detect_level(runtime, view, level))
        .collect();

    let mut keypoints: Vec<KeyPoint> = per_level.into_iter().flatten().collect();
    retain_best(&mut keypoints, config.max_features);
    tracing::debug!(
        levels = levels.len(),
        keypoints = keypoints.len(),
        "keypoint detection finished"
    );
    keypoints
}

/// Pyramid levels that are large enough to hold a keypoint, level 0 first.
fn build_pyramid<'a>(
    arena: &'a Bump,
    runtime: &DetectorRuntime,
    img: &GrayView<'a>,
) -> Vec<GrayView<'a>> {
    let _span = tracing::info_span!("pyramid").entered();
    let min_side = 2 * runtime.config().edge_threshold + 1;
    let mut levels: Vec<GrayView<'a>> = Vec::with_capacity(runtime.scales().len());
    if img.width < min_side || img.height < min_side {
        return levels;
    }
    levels.push(*img);

    for &scale in runtime.scales().iter().skip(1) {
        let w = (img.width as f64 / scale).round() as usize;
        let h = (img.height as f64 / scale).round() as usize;
        if w < min_side || h < min_side {
            break;
        }
        let Some(prev) = levels.last() else {
            break;
        };
        let buf = arena.alloc_slice_fill_copy(w * h, 0u8);
        resize_bilinear(prev, buf, w, h);
        levels.push(GrayView {
            data: buf,
            width: w,
            height: h,
            stride: w,
        });
    }
    levels
}

fn detect_level(runtime: &DetectorRuntime, img: &GrayView, level: usize) -> Vec<KeyPoint> {
    let config = runtime.config();
    let budget = runtime.budgets().get(level).copied().unwrap_or(0);
    if budget == 0 {
        return Vec::new();
    }

    let mut scores = vec![0u16; img.width * img.height];
    fast_scores(img, config.fast_threshold, &mut scores);
    let mut candidates = local_maxima(img, &scores, config.edge_threshold);

    retain_best(&mut candidates, 2 * budget);
    for kp in &mut candidates {
        kp.response = harris_response(
            img,
            kp.x as usize,
            kp.y as usize,
            config.harris_block_size,
            config.harris_k,
        );
    }
    retain_best(&mut candidates, budget);

    let scale = runtime.scales()[level] as f32;
    let size = config.patch_size as f32 * scale;
    for kp in &mut candidates {
        kp.angle = intensity_centroid_angle(img, kp.x as usize, kp.y as usize, runtime.umax());
        kp.x *= scale;
        kp.y *= scale;
        kp.size = size;
        kp.octave = level;
    }
    candidates
}

/// Fill `scores` with `FAST score + 1` for corner pixels and 0 elsewhere.
///
/// Rows are scored in parallel. Pixels closer than the ring radius to the
/// border are left at 0.
#[multiversion(targets(
    "x86_64+avx2+bmi1+bmi2+popcnt+lzcnt",
    "x86_64+avx512f+avx512bw+avx512dq+avx512vl",
    "aarch64+neon"
))]
pub fn fast_scores(img: &GrayView, threshold: u8, scores: &mut [u16]) {
    let (w, h) = (img.width, img.height);
    if w <= 2 * RING_RADIUS || h <= 2 * RING_RADIUS {
        return;
    }
    scores
        .par_chunks_mut(w)
        .enumerate()
        .skip(RING_RADIUS)
        .take(h - 2 * RING_RADIUS)
        .for_each(|(y, row)| {
            for x in RING_RADIUS..w - RING_RADIUS {
                row[x] = fast_score(img, x, y, threshold).map_or(0, |s| s + 1);
            }
        });
}

/// FAST-9 score at `(x, y)`, or `None` if the pixel is not a corner.
///
/// The score is the largest threshold at which the pixel still has nine
/// contiguous ring pixels all brighter or all darker than the center.
#[inline]
#[must_use]
pub fn fast_score(img: &GrayView, x: usize, y: usize, threshold: u8) -> Option<u16> {
    let center = i16::from(img.pixel(x, y));
    let t = i16::from(threshold);
    let mut diff = [0i16; 16];
    for (d, &(dx, dy)) in diff.iter_mut().zip(FAST_RING.iter()) {
        *d = i16::from(img.offset(x, y, dx, dy)) - center;
    }

    // Any 9-arc covers at least two of the four compass pixels.
    let compass = [diff[0], diff[4], diff[8], diff[12]];
    let bright = compass.iter().filter(|&&d| d > t).count();
    let dark = compass.iter().filter(|&&d| d < -t).count();
    if bright < 2 && dark < 2 {
        return None;
    }

    let mut best = 0i16;
    for start in 0..FAST_RING.len() {
        let (mut lo, mut hi) = (i16::MAX, i16::MIN);
        for i in 0..FAST_ARC {
            let d = diff[(start + i) % FAST_RING.len()];
            lo = lo.min(d);
            hi = hi.max(d);
        }
        best = best.max(lo).max(-hi);
    }
    (best > t).then(|| (best - 1) as u16)
}

/// Non-maximum suppression over a 3x3 window, restricted to pixels at least
/// `border` away from the image edge. Ties go to the pixel that comes first in
/// raster order.
fn local_maxima(img: &GrayView, scores: &[u16], border: usize) -> Vec<KeyPoint> {
    let (w, h) = (img.width, img.height);
    let mut out = Vec::new();
    if w <= 2 * border || h <= 2 * border {
        return out;
    }
    for y in border..h - border {
        for x in border..w - border {
            let s = scores[y * w + x];
            if s == 0 {
                continue;
            }
            let at = |dx: isize, dy: isize| {
                scores[(y as isize + dy) as usize * w + (x as isize + dx) as usize]
            };
            let beats_earlier = s > at(-1, -1) && s > at(0, -1) && s > at(1, -1) && s > at(-1, 0);
            let holds_later = s >= at(1, 0) && s >= at(-1, 1) && s >= at(0, 1) && s >= at(1, 1);
            if beats_earlier && holds_later {
                out.push(KeyPoint {
                    x: x as f32,
                    y: y as f32,
                    size: 0.0,
                    angle: 0.0,
                    response: f32::from(s - 1),
                    octave: 0,
                });
            }
        }
    }
    out
}

/// Keep the `n` keypoints with the largest response. Equal responses keep
/// their current order.
pub fn retain_best(keypoints: &mut Vec<KeyPoint>, n: usize) {
    if keypoints.len() <= n {
        return;
    }
    keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));
    keypoints.truncate(n);
}

/// Orientation of the intensity centroid of the disc described by `umax`,
/// in degrees `[0, 360)`.
///
/// The disc must lie inside the image.
#[must_use]
pub fn intensity_centroid_angle(img: &GrayView, x: usize, y: usize, umax: &[i32]) -> f32 {
    let half = umax.len().saturating_sub(2) as i32;
    let px = |dx: i32, dy: i32| i64::from(img.offset(x, y, dx, dy));

    let mut m10 = 0i64;
    let mut m01 = 0i64;
    for u in -half..=half {
        m10 += i64::from(u) * px(u, 0);
    }
    for v in 1..=half {
        let d = umax[v as usize];
        let mut v_sum = 0i64;
        for u in -d..=d {
            let below = px(u, v);
            let above = px(u, -v);
            v_sum += below - above;
            m10 += i64::from(u) * (below + above);
        }
        m01 += i64::from(v) * v_sum;
    }

    let angle = (m01 as f64).atan2(m10 as f64).to_degrees();
    let angle = if angle < 0.0 { angle + 360.0 } else { angle };
    (angle as f32).min(359.999)
}
