//! Error types for marker generation and feature scoring.
//!
//! Every generation failure is detected while validating parameters, before a
//! canvas is allocated, so an error never leaves a partially painted raster.

use thiserror::Error;

/// Failure to parse a hex color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// The input is not `#rgb` or `#rrggbb`.
    #[error("invalid color format {0:?}: expected #rgb or #rrggbb")]
    InvalidColorFormat(String),
}

/// Failure to turn user selections into generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerError {
    /// One of the colors is malformed.
    #[error(transparent)]
    InvalidColor(#[from] ColorError),
    /// The aspect ratio tag is not one of `4:3`, `16:9`, `1:1`.
    #[error("unsupported aspect ratio {0:?}")]
    UnsupportedAspectRatio(String),
    /// The pattern name is not one of `mosaic`, `chaos`, `dotmatrix`.
    #[error("unsupported pattern kind {0:?}")]
    UnsupportedPatternKind(String),
    /// The border choice is not one of `none`, `white`, `black`.
    #[error("unsupported border {0:?}")]
    UnsupportedBorder(String),
    /// The constrained axis is not `width` or `height`.
    #[error("unsupported dimension axis {0:?}")]
    UnsupportedAxis(String),
    /// The target dimension must be a positive pixel count.
    #[error("target dimension must be positive, got {0}")]
    InvalidDimension(u32),
    /// The canvas would exceed [`crate::layout::MAX_CANVAS_PIXELS`].
    #[error("a {width}x{height} canvas exceeds the pixel limit")]
    DimensionTooLarge {
        /// Requested canvas width in pixels.
        width: u64,
        /// Requested canvas height in pixels.
        height: u64,
    },
}

/// Failure to score a raster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// The detector runtime has not finished initializing.
    #[error("feature detector runtime is not initialized yet")]
    DetectorNotReady,
    /// The raster has no pixels or its buffer does not match its dimensions.
    #[error("cannot score a {width}x{height} image backed by {len} bytes")]
    InvalidImage {
        /// Declared width in pixels.
        width: usize,
        /// Declared height in pixels.
        height: usize,
        /// Length of the pixel buffer in bytes.
        len: usize,
    },
}
