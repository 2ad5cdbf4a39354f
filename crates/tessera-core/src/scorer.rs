//! Feature-richness scoring of generated markers.
//!
//! The score is the number of ORB-style keypoints found in the raster. It
//! saturates at the detector's feature cap and is displayed as `"{cap}+"`
//! once the cap is reached.

use crate::error::ScoreError;
use crate::grayscale::rgba_to_gray;
use crate::image::GrayView;
use crate::orb::{detect, KeyPoint};
use crate::runtime::{DetectorRuntime, Readiness};
use bumpalo::Bump;
use image::RgbaImage;
use std::fmt;
use std::ops::Deref;
use std::time::Duration;

/// Default interval between readiness checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default number of readiness checks before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 200;

/// A keypoint count together with the cap it saturates at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureCount {
    /// Keypoints found, never more than `cap`.
    pub count: usize,
    /// The detector's feature cap.
    pub cap: usize,
}

impl FeatureCount {
    /// Whether the count reached the cap.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.count >= self.cap
    }
}

impl fmt::Display for FeatureCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_saturated() {
            write!(f, "{}+", self.cap)
        } else {
            write!(f, "{}", self.count)
        }
    }
}

/// Arena borrow that resets the arena when dropped, on every exit path.
struct ArenaScope<'a>(&'a mut Bump);

impl<'a> ArenaScope<'a> {
    fn new(arena: &'a mut Bump) -> Self {
        arena.reset();
        Self(arena)
    }
}

impl Deref for ArenaScope<'_> {
    type Target = Bump;

    fn deref(&self) -> &Bump {
        self.0
    }
}

impl Drop for ArenaScope<'_> {
    fn drop(&mut self) {
        self.0.reset();
    }
}

/// Counts keypoints in RGBA rasters.
///
/// The scorer owns its scratch arena, so one scorer serves one caller at a
/// time; create one per thread. Scorers share the detector runtime through
/// their [`Readiness`] handle.
///
/// # Example
/// ```
/// use tessera_core::config::DetectorConfig;
/// use tessera_core::runtime::Readiness;
/// use tessera_core::scorer::FeatureScorer;
///
/// let mut scorer = FeatureScorer::new(Readiness::ready(DetectorConfig::default()));
/// let flat = image::RgbaImage::from_pixel(128, 128, image::Rgba([200, 10, 10, 255]));
/// let count = scorer.score(&flat).unwrap();
/// assert_eq!(count.count, 0);
/// ```
pub struct FeatureScorer {
    readiness: Readiness,
    arena: Bump,
    poll_interval: Duration,
    max_attempts: u32,
}

impl FeatureScorer {
    /// Create a scorer bound to `readiness`.
    #[must_use]
    pub fn new(readiness: Readiness) -> Self {
        Self {
            readiness,
            arena: Bump::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Change how [`FeatureScorer::score_when_ready`] polls.
    #[must_use]
    pub fn with_polling(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = interval;
        self.max_attempts = max_attempts;
        self
    }

    /// The readiness handle this scorer checks.
    #[must_use]
    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    /// Score a raster.
    ///
    /// # Errors
    /// Returns [`ScoreError::DetectorNotReady`] if the runtime is still
    /// initializing, or [`ScoreError::InvalidImage`] for an empty raster.
    pub fn score(&mut self, image: &RgbaImage) -> Result<FeatureCount, ScoreError> {
        let (w, h) = image.dimensions();
        self.score_rgba(image.as_raw(), w as usize, h as usize)
    }

    /// Score tightly packed RGBA bytes.
    ///
    /// # Errors
    /// See [`FeatureScorer::score`].
    pub fn score_rgba(
        &mut self,
        rgba: &[u8],
        width: usize,
        height: usize,
    ) -> Result<FeatureCount, ScoreError> {
        let runtime = self.readiness.runtime().ok_or(ScoreError::DetectorNotReady)?;
        self.count_with(&runtime, rgba, width, height)
    }

    /// Score once the runtime is ready, polling at the configured interval.
    ///
    /// # Errors
    /// Returns [`ScoreError::DetectorNotReady`] if the runtime is still not
    /// ready after the configured number of attempts.
    pub fn score_when_ready(&mut self, image: &RgbaImage) -> Result<FeatureCount, ScoreError> {
        let runtime = self
            .readiness
            .wait(self.poll_interval, self.max_attempts)
            .ok_or(ScoreError::DetectorNotReady)?;
        let (w, h) = image.dimensions();
        self.count_with(&runtime, image.as_raw(), w as usize, h as usize)
    }

    /// The keypoints behind the score.
    ///
    /// # Errors
    /// See [`FeatureScorer::score`].
    pub fn detect_keypoints(&mut self, image: &RgbaImage) -> Result<Vec<KeyPoint>, ScoreError> {
        let runtime = self.readiness.runtime().ok_or(ScoreError::DetectorNotReady)?;
        let (w, h) = image.dimensions();
        self.keypoints_with(&runtime, image.as_raw(), w as usize, h as usize)
    }

    fn count_with(
        &mut self,
        runtime: &DetectorRuntime,
        rgba: &[u8],
        width: usize,
        height: usize,
    ) -> Result<FeatureCount, ScoreError> {
        let _span = tracing::info_span!("score", width, height).entered();
        let keypoints = self.keypoints_with(runtime, rgba, width, height)?;
        let cap = runtime.config().max_features;
        let count = FeatureCount {
            count: keypoints.len().min(cap),
            cap,
        };
        tracing::debug!(%count, "scored raster");
        Ok(count)
    }

    fn keypoints_with(
        &mut self,
        runtime: &DetectorRuntime,
        rgba: &[u8],
        width: usize,
        height: usize,
    ) -> Result<Vec<KeyPoint>, ScoreError> {
        if width == 0 || height == 0 || rgba.len() != width * height * 4 {
            return Err(ScoreError::InvalidImage {
                width,
                height,
                len: rgba.len(),
            });
        }

        let arena = ArenaScope::new(&mut self.arena);
        let gray = arena.alloc_slice_fill_copy(width * height, 0u8);
        {
            let _span = tracing::info_span!("grayscale").entered();
            rgba_to_gray(rgba, width, gray);
        }
        let view = GrayView::new(gray, width, height, width)?;
        Ok(detect(&arena, runtime, &view))
    }
}
