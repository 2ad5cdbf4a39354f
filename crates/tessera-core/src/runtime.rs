//! Detector runtime and its readiness signal.
//!
//! The runtime holds the tables the keypoint detector needs (FAST sampling
//! ring, orientation patch bounds, pyramid scales and per-level budgets). It
//! is built exactly once into a [`Readiness`] cell, either inline or on a
//! background thread, and shared read-only afterwards.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::config::DetectorConfig;
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use std::time::Duration;

/// Offsets of the 16-pixel Bresenham circle of radius 3, clockwise from the top.
pub const FAST_RING: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

/// Contiguous ring pixels required for a FAST corner.
pub const FAST_ARC: usize = 9;

/// Immutable tables shared by every scoring call.
#[derive(Debug)]
pub struct DetectorRuntime {
    config: DetectorConfig,
    umax: Vec<i32>,
    scales: Vec<f64>,
    budgets: Vec<usize>,
}

impl DetectorRuntime {
    /// Build the tables for `config`.
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        let _span = tracing::info_span!("detector_runtime_init").entered();
        let umax = orientation_bounds(config.patch_size / 2);
        let scales = (0..config.n_levels)
            .map(|level| config.scale_factor.powi(level as i32))
            .collect();
        let budgets = level_budgets(config.max_features, config.scale_factor, config.n_levels);
        tracing::debug!(levels = config.n_levels, ?budgets, "detector runtime ready");
        Self {
            config,
            umax,
            scales,
            budgets,
        }
    }

    /// The configuration the runtime was built from.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Half-widths of the circular orientation patch, indexed by row offset.
    #[must_use]
    pub fn umax(&self) -> &[i32] {
        &self.umax
    }

    /// Scale of each pyramid level relative to the input.
    #[must_use]
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Keypoint budget of each pyramid level. Sums to `max_features`.
    #[must_use]
    pub fn budgets(&self) -> &[usize] {
        &self.budgets
    }
}

/// Row half-widths of a discrete disc of radius `half_patch`, made exactly
/// symmetric under transposition.
#[must_use]
pub fn orientation_bounds(half_patch: usize) -> Vec<i32> {
    let hp = half_patch as f64;
    let mut umax = vec![0i32; half_patch + 2];
    let diag = hp * std::f64::consts::SQRT_2 / 2.0;
    let vmax = ((diag + 1.0).floor() as usize).min(half_patch + 1);
    let vmin = diag.ceil() as usize;

    for (v, slot) in umax.iter_mut().enumerate().take(vmax + 1) {
        let vf = v as f64;
        *slot = (hp * hp - vf * vf).max(0.0).sqrt().round() as i32;
    }

    // Mirror the lower octant so the disc is symmetric.
    let mut v0 = 0usize;
    let mut v = half_patch;
    while v >= vmin && v > 0 {
        while umax[v0] == umax[v0 + 1] {
            v0 += 1;
        }
        umax[v] = v0 as i32;
        v0 += 1;
        v -= 1;
    }
    umax
}

/// Split `max_features` across `n_levels` in geometric proportion to level
/// area. The last level takes the remainder.
#[must_use]
pub fn level_budgets(max_features: usize, scale_factor: f64, n_levels: usize) -> Vec<usize> {
    if n_levels == 0 {
        return Vec::new();
    }
    let factor = 1.0 / scale_factor;
    let mut per_level = max_features as f64 * (1.0 - factor)
        / (1.0 - factor.powi(n_levels as i32));
    let mut budgets = Vec::with_capacity(n_levels);
    let mut assigned = 0usize;
    for _ in 0..n_levels - 1 {
        let n = (per_level.round() as usize).min(max_features - assigned);
        budgets.push(n);
        assigned += n;
        per_level *= factor;
    }
    budgets.push(max_features - assigned);
    budgets
}

/// Write-once readiness signal for the detector runtime.
///
/// Clones share the same cell. Scorers hold a clone and check it on every
/// call instead of consulting global state.
#[derive(Clone, Debug, Default)]
pub struct Readiness {
    cell: Arc<OnceLock<Arc<DetectorRuntime>>>,
}

impl Readiness {
    /// A signal with no runtime yet.
    #[must_use]
    pub fn pending() -> Self {
        Self::default()
    }

    /// A signal whose runtime is built inline.
    #[must_use]
    pub fn ready(config: DetectorConfig) -> Self {
        let readiness = Self::pending();
        readiness.initialize(config);
        readiness
    }

    /// Build the runtime on a background thread.
    ///
    /// The returned handle is already shared with the thread; join the
    /// thread handle or poll [`Readiness::is_ready`] to observe completion.
    #[must_use]
    pub fn spawn(config: DetectorConfig) -> (Self, JoinHandle<()>) {
        let readiness = Self::pending();
        let worker = readiness.clone();
        let handle = std::thread::spawn(move || {
            worker.initialize(config);
        });
        (readiness, handle)
    }

    /// Build the runtime unless one exists. Returns `true` if this call built it.
    pub fn initialize(&self, config: DetectorConfig) -> bool {
        let mut built = false;
        self.cell.get_or_init(|| {
            built = true;
            Arc::new(DetectorRuntime::new(config))
        });
        built
    }

    /// Whether the runtime is available.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The runtime, if initialized.
    #[must_use]
    pub fn runtime(&self) -> Option<Arc<DetectorRuntime>> {
        self.cell.get().cloned()
    }

    /// Poll every `interval`, up to `max_attempts` times, until the runtime
    /// is available.
    #[must_use]
    pub fn wait(&self, interval: Duration, max_attempts: u32) -> Option<Arc<DetectorRuntime>> {
        for attempt in 0..max_attempts {
            if let Some(runtime) = self.runtime() {
                return Some(runtime);
            }
            tracing::debug!(attempt, "detector runtime not ready, waiting");
            std::thread::sleep(interval);
        }
        self.runtime()
    }
}
