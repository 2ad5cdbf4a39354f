//! Configuration types for marker generation and feature scoring.
//!
//! This module provides:
//! - [`MarkerParams`]: validated generation parameters (typed selections and colors)
//! - [`MarkerRequest`]: raw string selections as a form or command line supplies them
//! - [`DetectorConfig`]: keypoint detector settings (immutable once the runtime is built)

use crate::color::Rgb;
use crate::error::MarkerError;
use crate::layout::Layout;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Enumerated selections
// ============================================================================

/// Supported marker aspect ratios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AspectRatio {
    /// `4:3`, 16 x 12 grid.
    FourThree,
    /// `16:9`, 20 x 12 grid.
    SixteenNine,
    /// `1:1`, 12 x 12 grid.
    Square,
}

impl AspectRatio {
    /// Returns all supported aspect ratios.
    #[must_use]
    pub const fn all() -> &'static [AspectRatio] {
        &[
            AspectRatio::FourThree,
            AspectRatio::SixteenNine,
            AspectRatio::Square,
        ]
    }

    /// The `(width, height)` ratio terms.
    #[must_use]
    pub const fn ratio(self) -> (u32, u32) {
        match self {
            AspectRatio::FourThree => (4, 3),
            AspectRatio::SixteenNine => (16, 9),
            AspectRatio::Square => (1, 1),
        }
    }

    /// The `(columns, rows)` pattern grid.
    #[must_use]
    pub const fn grid(self) -> (u32, u32) {
        match self {
            AspectRatio::FourThree => (16, 12),
            AspectRatio::SixteenNine => (20, 12),
            AspectRatio::Square => (12, 12),
        }
    }

    /// The tag as written in selections, e.g. `"16:9"`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            AspectRatio::FourThree => "4:3",
            AspectRatio::SixteenNine => "16:9",
            AspectRatio::Square => "1:1",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::all()
            .iter()
            .copied()
            .find(|a| a.tag() == s.trim())
            .ok_or_else(|| MarkerError::UnsupportedAspectRatio(s.to_string()))
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which canvas side the target dimension fixes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// The dimension is the width; height follows the ratio.
    #[default]
    Width,
    /// The dimension is the height; width follows the ratio.
    Height,
}

impl FromStr for Axis {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "width" => Ok(Axis::Width),
            "height" => Ok(Axis::Height),
            _ => Err(MarkerError::UnsupportedAxis(s.to_string())),
        }
    }
}

/// Pattern drawing strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatternKind {
    /// Triangle mosaic with translucent circles on top.
    #[default]
    Mosaic,
    /// Randomly placed circles, squares and triangles.
    Chaos,
    /// One square per grid cell.
    DotMatrix,
}

impl PatternKind {
    /// Returns all pattern kinds.
    #[must_use]
    pub const fn all() -> &'static [PatternKind] {
        &[PatternKind::Mosaic, PatternKind::Chaos, PatternKind::DotMatrix]
    }

    /// Resolve an optional selection. An absent selection means
    /// [`PatternKind::Mosaic`]; an unknown name is an error.
    ///
    /// # Errors
    /// Returns [`MarkerError::UnsupportedPatternKind`] for unknown names.
    pub fn from_selection(selection: Option<&str>) -> Result<Self, MarkerError> {
        selection.map_or(Ok(PatternKind::Mosaic), str::parse)
    }

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PatternKind::Mosaic => "mosaic",
            PatternKind::Chaos => "chaos",
            PatternKind::DotMatrix => "dotmatrix",
        }
    }
}

impl FromStr for PatternKind {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mosaic" | "mazzanti" => Ok(PatternKind::Mosaic),
            "chaos" => Ok(PatternKind::Chaos),
            "dotmatrix" => Ok(PatternKind::DotMatrix),
            _ => Err(MarkerError::UnsupportedPatternKind(s.to_string())),
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional framing border.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Border {
    /// No border.
    #[default]
    None,
    /// White frame.
    White,
    /// Black frame.
    Black,
}

impl Border {
    /// Stroke color, or `None` when no border is drawn.
    #[must_use]
    pub const fn color(self) -> Option<Rgb> {
        match self {
            Border::None => None,
            Border::White => Some(Rgb::WHITE),
            Border::Black => Some(Rgb::BLACK),
        }
    }
}

impl FromStr for Border {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Border::None),
            "white" => Ok(Border::White),
            "black" => Ok(Border::Black),
            _ => Err(MarkerError::UnsupportedBorder(s.to_string())),
        }
    }
}

// ============================================================================
// MarkerParams: validated generation parameters
// ============================================================================

/// Base colors used when none are supplied.
pub const DEFAULT_BASE_COLORS: [Rgb; 3] = [
    Rgb::new(0xff, 0x00, 0x00),
    Rgb::new(0x00, 0xff, 0x00),
    Rgb::new(0x00, 0x00, 0xff),
];

/// Validated parameters for one generation request.
///
/// # Example
/// ```
/// use tessera_core::config::{AspectRatio, MarkerParams, PatternKind};
///
/// let params = MarkerParams::builder()
///     .aspect_ratio(AspectRatio::Square)
///     .dimension(600)
///     .pattern(PatternKind::DotMatrix)
///     .build();
/// assert_eq!(params.dimension, 600);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerParams {
    /// Aspect ratio and grid.
    pub aspect_ratio: AspectRatio,
    /// Side fixed by `dimension`.
    pub axis: Axis,
    /// Target size of the fixed side in pixels.
    pub dimension: u32,
    /// Pattern strategy.
    pub pattern: PatternKind,
    /// Canvas fill painted before the pattern.
    pub background: Rgb,
    /// Optional framing border.
    pub border: Border,
    /// The three base colors the palette is derived from.
    pub colors: [Rgb; 3],
}

impl Default for MarkerParams {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::FourThree,
            axis: Axis::Width,
            dimension: 1024,
            pattern: PatternKind::Mosaic,
            background: Rgb::WHITE,
            border: Border::None,
            colors: DEFAULT_BASE_COLORS,
        }
    }
}

impl MarkerParams {
    /// Create a new builder for `MarkerParams`.
    #[must_use]
    pub fn builder() -> MarkerParamsBuilder {
        MarkerParamsBuilder::default()
    }
}

/// Builder for [`MarkerParams`].
#[derive(Default)]
pub struct MarkerParamsBuilder {
    aspect_ratio: Option<AspectRatio>,
    axis: Option<Axis>,
    dimension: Option<u32>,
    pattern: Option<PatternKind>,
    background: Option<Rgb>,
    border: Option<Border>,
    colors: Option<[Rgb; 3]>,
}

impl MarkerParamsBuilder {
    /// Set the aspect ratio.
    #[must_use]
    pub fn aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    /// Set which side the dimension fixes.
    #[must_use]
    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }

    /// Set the target dimension in pixels.
    #[must_use]
    pub fn dimension(mut self, dimension: u32) -> Self {
        self.dimension = Some(dimension);
        self
    }

    /// Set the pattern strategy.
    #[must_use]
    pub fn pattern(mut self, pattern: PatternKind) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn background(mut self, background: Rgb) -> Self {
        self.background = Some(background);
        self
    }

    /// Set the border.
    #[must_use]
    pub fn border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    /// Set the three base colors.
    #[must_use]
    pub fn colors(mut self, colors: [Rgb; 3]) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Build the parameters, using defaults for unset fields.
    #[must_use]
    pub fn build(self) -> MarkerParams {
        let d = MarkerParams::default();
        MarkerParams {
            aspect_ratio: self.aspect_ratio.unwrap_or(d.aspect_ratio),
            axis: self.axis.unwrap_or(d.axis),
            dimension: self.dimension.unwrap_or(d.dimension),
            pattern: self.pattern.unwrap_or(d.pattern),
            background: self.background.unwrap_or(d.background),
            border: self.border.unwrap_or(d.border),
            colors: self.colors.unwrap_or(d.colors),
        }
    }
}

// ============================================================================
// MarkerRequest: raw selections
// ============================================================================

/// Raw selections, as supplied by a form or a command line.
///
/// [`MarkerRequest::validate`] turns them into [`MarkerParams`], failing fast
/// on the first malformed entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerRequest<'a> {
    /// Aspect ratio tag (`4:3`, `16:9`, `1:1`).
    pub aspect_ratio: &'a str,
    /// `width` or `height`.
    pub axis: &'a str,
    /// Target dimension in pixels.
    pub dimension: u32,
    /// Pattern name; `None` selects the mosaic.
    pub pattern: Option<&'a str>,
    /// Background color (`#rgb` or `#rrggbb`).
    pub background: &'a str,
    /// `none`, `white` or `black`.
    pub border: &'a str,
    /// Base colors, each exactly `#rrggbb`.
    pub colors: [&'a str; 3],
}

impl Default for MarkerRequest<'_> {
    fn default() -> Self {
        Self {
            aspect_ratio: "4:3",
            axis: "width",
            dimension: 1024,
            pattern: None,
            background: "#ffffff",
            border: "none",
            colors: ["#ff0000", "#00ff00", "#0000ff"],
        }
    }
}

impl MarkerRequest<'_> {
    /// Validate every selection.
    ///
    /// # Errors
    /// Returns the [`MarkerError`] for the first invalid selection.
    pub fn validate(&self) -> Result<MarkerParams, MarkerError> {
        let mut colors = [Rgb::BLACK; 3];
        for (slot, hex) in colors.iter_mut().zip(self.colors) {
            *slot = Rgb::parse_strict(hex)?;
        }
        if self.dimension == 0 {
            return Err(MarkerError::InvalidDimension(self.dimension));
        }
        let params = MarkerParams {
            aspect_ratio: self.aspect_ratio.parse()?,
            axis: self.axis.parse()?,
            dimension: self.dimension,
            pattern: PatternKind::from_selection(self.pattern)?,
            background: self.background.parse()?,
            border: self.border.parse()?,
            colors,
        };
        Layout::new(params.aspect_ratio, params.axis, params.dimension)?;
        Ok(params)
    }
}

// ============================================================================
// DetectorConfig: keypoint detector settings
// ============================================================================

/// Settings of the ORB-style keypoint detector.
///
/// Defaults match a stock ORB detector created with a 5000-feature cap.
///
/// # Example
/// ```
/// use tessera_core::config::DetectorConfig;
///
/// let config = DetectorConfig::builder()
///     .max_features(500)
///     .fast_threshold(12)
///     .build();
/// assert_eq!(config.n_levels, 8);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectorConfig {
    /// Maximum number of keypoints retained (default: 5000).
    /// The reported count saturates here.
    pub max_features: usize,
    /// Downscale factor between pyramid levels (default: 1.2).
    pub scale_factor: f64,
    /// Number of pyramid levels (default: 8).
    pub n_levels: usize,
    /// Border in pixels where no keypoints are reported (default: 31).
    pub edge_threshold: usize,
    /// FAST intensity threshold (default: 20).
    pub fast_threshold: u8,
    /// Orientation patch diameter in pixels (default: 31).
    pub patch_size: usize,
    /// Harris window side in pixels (default: 7).
    pub harris_block_size: usize,
    /// Harris detector free parameter (default: 0.04).
    pub harris_k: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            scale_factor: 1.2,
            n_levels: 8,
            edge_threshold: 31,
            fast_threshold: 20,
            patch_size: 31,
            harris_block_size: 7,
            harris_k: 0.04,
        }
    }
}

impl DetectorConfig {
    /// Create a new builder for `DetectorConfig`.
    #[must_use]
    pub fn builder() -> DetectorConfigBuilder {
        DetectorConfigBuilder::default()
    }
}

/// Builder for [`DetectorConfig`].
#[derive(Default)]
pub struct DetectorConfigBuilder {
    max_features: Option<usize>,
    scale_factor: Option<f64>,
    n_levels: Option<usize>,
    edge_threshold: Option<usize>,
    fast_threshold: Option<u8>,
    patch_size: Option<usize>,
    harris_block_size: Option<usize>,
    harris_k: Option<f32>,
}

impl DetectorConfigBuilder {
    /// Set the keypoint cap.
    #[must_use]
    pub fn max_features(mut self, n: usize) -> Self {
        self.max_features = Some(n);
        self
    }

    /// Set the pyramid scale factor.
    #[must_use]
    pub fn scale_factor(mut self, factor: f64) -> Self {
        self.scale_factor = Some(factor);
        self
    }

    /// Set the number of pyramid levels.
    #[must_use]
    pub fn n_levels(mut self, levels: usize) -> Self {
        self.n_levels = Some(levels);
        self
    }

    /// Set the keypoint-free border.
    #[must_use]
    pub fn edge_threshold(mut self, border: usize) -> Self {
        self.edge_threshold = Some(border);
        self
    }

    /// Set the FAST intensity threshold.
    #[must_use]
    pub fn fast_threshold(mut self, threshold: u8) -> Self {
        self.fast_threshold = Some(threshold);
        self
    }

    /// Set the orientation patch diameter.
    #[must_use]
    pub fn patch_size(mut self, size: usize) -> Self {
        self.patch_size = Some(size);
        self
    }

    /// Set the Harris window side.
    #[must_use]
    pub fn harris_block_size(mut self, size: usize) -> Self {
        self.harris_block_size = Some(size);
        self
    }

    /// Set the Harris free parameter.
    #[must_use]
    pub fn harris_k(mut self, k: f32) -> Self {
        self.harris_k = Some(k);
        self
    }

    /// Build the configuration, using defaults for unset fields.
    ///
    /// Degenerate values are clamped: at least one level, a scale factor
    /// above 1, and a border wide enough for the FAST ring, the Harris window
    /// and the orientation patch.
    #[must_use]
    pub fn build(self) -> DetectorConfig {
        let d = DetectorConfig::default();
        let patch_size = self.patch_size.unwrap_or(d.patch_size).max(3);
        let harris_block_size = self.harris_block_size.unwrap_or(d.harris_block_size).max(3);
        let min_border = (patch_size / 2 + 1).max(harris_block_size / 2 + 2).max(4);
        DetectorConfig {
            max_features: self.max_features.unwrap_or(d.max_features),
            scale_factor: self.scale_factor.unwrap_or(d.scale_factor).max(1.01),
            n_levels: self.n_levels.unwrap_or(d.n_levels).max(1),
            edge_threshold: self
                .edge_threshold
                .unwrap_or(d.edge_threshold)
                .max(min_border),
            fast_threshold: self.fast_threshold.unwrap_or(d.fast_threshold),
            patch_size,
            harris_block_size,
            harris_k: self.harris_k.unwrap_or(d.harris_k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_tags() {
        for aspect in AspectRatio::all() {
            assert_eq!(aspect.tag().parse::<AspectRatio>().unwrap(), *aspect);
        }
        assert_eq!(
            "3:2".parse::<AspectRatio>(),
            Err(MarkerError::UnsupportedAspectRatio("3:2".to_string()))
        );
    }

    #[test]
    fn test_pattern_selection_defaults_to_mosaic() {
        assert_eq!(PatternKind::from_selection(None).unwrap(), PatternKind::Mosaic);
        assert_eq!(
            PatternKind::from_selection(Some("dotmatrix")).unwrap(),
            PatternKind::DotMatrix
        );
        assert_eq!(
            PatternKind::from_selection(Some("mazzanti")).unwrap(),
            PatternKind::Mosaic
        );
        assert!(matches!(
            PatternKind::from_selection(Some("plaid")),
            Err(MarkerError::UnsupportedPatternKind(_))
        ));
    }

    #[test]
    fn test_border_colors() {
        assert_eq!(Border::None.color(), None);
        assert_eq!("white".parse::<Border>().unwrap().color(), Some(Rgb::WHITE));
        assert_eq!("black".parse::<Border>().unwrap().color(), Some(Rgb::BLACK));
        assert!("red".parse::<Border>().is_err());
    }

    #[test]
    fn test_request_validation() {
        let request = MarkerRequest {
            aspect_ratio: "1:1",
            dimension: 600,
            pattern: Some("dotmatrix"),
            ..MarkerRequest::default()
        };
        let params = request.validate().unwrap();
        assert_eq!(params.aspect_ratio, AspectRatio::Square);
        assert_eq!(params.pattern, PatternKind::DotMatrix);
        assert_eq!(params.colors, DEFAULT_BASE_COLORS);
    }

    #[test]
    fn test_request_rejects_shorthand_base_color() {
        let request = MarkerRequest {
            colors: ["#f00", "#00ff00", "#0000ff"],
            ..MarkerRequest::default()
        };
        assert!(matches!(request.validate(), Err(MarkerError::InvalidColor(_))));
    }

    #[test]
    fn test_request_rejects_zero_dimension() {
        let request = MarkerRequest {
            dimension: 0,
            ..MarkerRequest::default()
        };
        assert_eq!(request.validate(), Err(MarkerError::InvalidDimension(0)));
    }

    #[test]
    fn test_request_rejects_oversized_canvas() {
        let at_limit = MarkerRequest {
            aspect_ratio: "1:1",
            dimension: 16_384,
            ..MarkerRequest::default()
        };
        assert!(at_limit.validate().is_ok());

        let over = MarkerRequest {
            dimension: u32::MAX,
            ..MarkerRequest::default()
        };
        assert!(matches!(
            over.validate(),
            Err(MarkerError::DimensionTooLarge { .. })
        ));

        let tall = MarkerRequest {
            aspect_ratio: "16:9",
            axis: "height",
            dimension: 20_000,
            ..MarkerRequest::default()
        };
        assert_eq!(
            tall.validate(),
            Err(MarkerError::DimensionTooLarge {
                width: 35_556,
                height: 20_000
            })
        );
    }

    #[test]
    fn test_marker_params_builder() {
        let params = MarkerParams::builder()
            .dimension(300)
            .border(Border::Black)
            .build();
        assert_eq!(params.dimension, 300);
        assert_eq!(params.border, Border::Black);
        // Check defaults
        assert_eq!(params.pattern, PatternKind::Mosaic);
        assert_eq!(params.colors, DEFAULT_BASE_COLORS);
    }

    #[test]
    fn test_detector_config_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.max_features, 5000);
        assert_eq!(config.n_levels, 8);
        assert_eq!(config.fast_threshold, 20);
    }

    #[test]
    fn test_detector_config_builder_clamps() {
        let config = DetectorConfig::builder()
            .n_levels(0)
            .scale_factor(0.5)
            .edge_threshold(0)
            .build();
        assert_eq!(config.n_levels, 1);
        assert!(config.scale_factor > 1.0);
        assert!(config.edge_threshold >= config.patch_size / 2 + 1);
        // Check defaults
        assert_eq!(config.max_features, 5000);
    }
}
