//! Core generation and scoring logic for the Tessera marker library.
//!
//! Tessera generates printable image markers for augmented-reality tracking:
//! randomized geometric patterns composited from a small palette of derived
//! colors, then rated by how many visual keypoints a tracker could lock onto.
//!
//! # Architecture Overview
//!
//! 1. **Color derivation**:
//!    - Hex parsing, RGB/HSL conversion.
//!    - Each base color expands into a five-step shade ramp; three bases give
//!      a 15-color [`palette::Palette`].
//!
//! 2. **Layout**:
//!    - Aspect ratio and target dimension give the canvas size and the
//!      column/row grid the patterns are built on.
//!
//! 3. **Pattern synthesis**:
//!    - Mosaic, chaos and dot-matrix strategies paint onto any
//!      [`surface::Surface`]; [`surface::Canvas`] rasterizes to RGBA.
//!    - All randomness comes from an injected [`random::RandomSource`].
//!
//! 4. **Scoring**:
//!    - Grayscale conversion, image pyramid, FAST-9 corners ranked by Harris
//!      response, intensity-centroid orientation.
//!    - The detector runtime is built once behind a [`runtime::Readiness`]
//!      signal; [`scorer::FeatureScorer`] refuses to run before it is ready.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use tessera_core::config::{AspectRatio, DetectorConfig, MarkerParams, PatternKind};
//! use tessera_core::runtime::Readiness;
//! use tessera_core::scorer::FeatureScorer;
//!
//! let params = MarkerParams::builder()
//!     .aspect_ratio(AspectRatio::Square)
//!     .dimension(256)
//!     .pattern(PatternKind::DotMatrix)
//!     .build();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let marker = tessera_core::generate(&params, &mut rng).unwrap();
//! assert_eq!((marker.width(), marker.height()), (256, 256));
//!
//! let mut scorer = FeatureScorer::new(Readiness::ready(DetectorConfig::default()));
//! let count = scorer.score(marker.image()).unwrap();
//! println!("{count} keypoints");
//! ```

/// Optional framing border.
pub mod border;
/// Hex colors, HSL conversion and shade ramps.
pub mod color;
/// Configuration types for generation and detection.
pub mod config;
/// Error types.
pub mod error;
/// Sobel gradients and Harris response.
pub mod gradient;
/// RGBA to grayscale conversion.
pub mod grayscale;
/// Grayscale buffer views and resampling.
pub mod image;
/// Canvas size and pattern grid.
pub mod layout;
/// ORB-style keypoint detection.
pub mod orb;
/// Marker palettes.
pub mod palette;
/// Pattern drawing strategies.
pub mod pattern;
/// Injectable random source.
pub mod random;
/// Detector runtime and readiness signal.
pub mod runtime;
/// Keypoint-count scoring.
pub mod scorer;
/// Drawing surface abstraction and rasterizer.
pub mod surface;
/// Utilities for testing and synthetic data generation.
pub mod test_utils;

pub use crate::color::{derive_shades, Rgb};
pub use crate::config::{
    AspectRatio, Axis, Border, DetectorConfig, MarkerParams, MarkerRequest, PatternKind,
};
pub use crate::error::{ColorError, MarkerError, ScoreError};
pub use crate::runtime::Readiness;
pub use crate::scorer::{FeatureCount, FeatureScorer};

use crate::layout::Layout;
use crate::palette::Palette;
use crate::random::RandomSource;
use crate::surface::{Canvas, Surface};
use ::image::{ImageFormat, ImageResult, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// File name the exported marker is saved under by default.
pub const DEFAULT_EXPORT_NAME: &str = "ar_image_target.png";

/// A generated marker raster.
#[derive(Clone, Debug)]
pub struct Marker {
    image: RgbaImage,
    palette: Palette,
}

impl Marker {
    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The RGBA pixels.
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// The palette the marker was painted with.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Take the RGBA pixels.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Encode as PNG.
    ///
    /// # Errors
    /// Returns the encoder error, if any.
    pub fn encode_png(&self) -> ImageResult<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        self.image.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Write a PNG file.
    ///
    /// # Errors
    /// Returns the encoder or I/O error, if any.
    pub fn write_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.image
            .save_with_format(path.as_ref(), ImageFormat::Png)
    }
}

/// Generate a marker.
///
/// Validation happens before the canvas is allocated, so an error never
/// leaves a partially painted raster behind.
///
/// # Errors
/// Returns [`MarkerError::InvalidDimension`] for a zero dimension and
/// [`MarkerError::DimensionTooLarge`] for a canvas over
/// [`layout::MAX_CANVAS_PIXELS`].
pub fn generate<R>(params: &MarkerParams, rng: &mut R) -> Result<Marker, MarkerError>
where
    R: RandomSource + ?Sized,
{
    let _span = tracing::info_span!(
        "generate",
        aspect = %params.aspect_ratio,
        pattern = %params.pattern,
        dimension = params.dimension
    )
    .entered();

    let layout = Layout::new(params.aspect_ratio, params.axis, params.dimension)?;
    let palette = Palette::from_bases(&params.colors);
    let mut canvas = Canvas::new(layout.width, layout.height);
    paint_marker(params, &layout, &palette, &mut canvas, rng);
    tracing::debug!(
        width = layout.width,
        height = layout.height,
        colors = palette.len(),
        "marker painted"
    );

    Ok(Marker {
        image: canvas.into_image(),
        palette,
    })
}

/// Paint background, pattern and border onto any surface.
pub fn paint_marker<S, R>(
    params: &MarkerParams,
    layout: &Layout,
    palette: &Palette,
    surface: &mut S,
    rng: &mut R,
) where
    S: Surface + ?Sized,
    R: RandomSource + ?Sized,
{
    pattern::paint(
        params.pattern,
        layout,
        palette,
        params.background,
        surface,
        rng,
    );
    border::apply_border(surface, params.border);
}

/// Returns version and build information for the core library.
#[must_use]
pub fn core_info() -> String {
    format!("Tessera Core v{}", env!("CARGO_PKG_VERSION"))
}
