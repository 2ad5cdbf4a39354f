//! Python bindings for the Tessera marker library.

use numpy::{PyArray1, PyArrayMethods, PyReadonlyArray3, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::borrow::Cow;
use tessera_core::config::{DetectorConfig, MarkerRequest};
use tessera_core::{MarkerError, ScoreError};

// ============================================================================
// Error conversion
// ============================================================================

fn marker_err(e: MarkerError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn score_err(e: ScoreError) -> PyErr {
    match e {
        ScoreError::DetectorNotReady => PyRuntimeError::new_err(e.to_string()),
        ScoreError::InvalidImage { .. } => PyValueError::new_err(e.to_string()),
    }
}

// ============================================================================
// FeatureScorer class with persistent scratch
// ============================================================================

/// Keypoint counter. Holds reusable scratch memory.
///
/// Use this for scoring many markers in a row.
///
/// Example:
///     scorer = tessera.FeatureScorer(max_features=5000)
///     count, label = scorer.score(image)
#[pyclass(unsendable)]
pub struct FeatureScorer {
    inner: tessera_core::FeatureScorer,
}

#[pymethods]
impl FeatureScorer {
    /// Create a scorer.
    ///
    /// Args:
    ///     max_features: Keypoint cap the count saturates at (default: 5000)
    ///     fast_threshold: FAST intensity threshold (default: 20)
    ///     n_levels: Pyramid levels (default: 8)
    #[new]
    #[pyo3(signature = (max_features = 5000, fast_threshold = 20, n_levels = 8))]
    fn new(max_features: usize, fast_threshold: u8, n_levels: usize) -> Self {
        let config = DetectorConfig::builder()
            .max_features(max_features)
            .fast_threshold(fast_threshold)
            .n_levels(n_levels)
            .build();
        Self {
            inner: tessera_core::FeatureScorer::new(tessera_core::Readiness::ready(config)),
        }
    }

    /// Count keypoints in an RGBA image of shape (h, w, 4).
    #[allow(clippy::needless_pass_by_value)]
    fn score(&mut self, img: PyReadonlyArray3<u8>) -> PyResult<(usize, String)> {
        score_with(&mut self.inner, &img)
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Borrow the pixels of an (h, w, 4) array, copying only when it is strided.
fn rgba_pixels<'a>(img: &'a PyReadonlyArray3<'_, u8>) -> PyResult<(Cow<'a, [u8]>, usize, usize)> {
    let shape = img.shape();
    let (height, width, channels) = (shape[0], shape[1], shape[2]);
    if channels != 4 {
        return Err(PyValueError::new_err(format!(
            "Image must have 4 channels (RGBA), got {channels}"
        )));
    }
    let data = match img.as_slice() {
        Ok(slice) => Cow::Borrowed(slice),
        Err(_) => Cow::Owned(img.as_array().iter().copied().collect()),
    };
    Ok((data, width, height))
}

fn score_with(
    scorer: &mut tessera_core::FeatureScorer,
    img: &PyReadonlyArray3<u8>,
) -> PyResult<(usize, String)> {
    let (data, width, height) = rgba_pixels(img)?;
    let count = scorer
        .score_rgba(&data, width, height)
        .map_err(score_err)?;
    Ok((count.count, count.to_string()))
}

// ============================================================================
// Function-based API
// ============================================================================

/// Version string of the core library.
#[pyfunction]
fn version_info() -> String {
    tessera_core::core_info()
}

/// Generate a marker and return it as an (h, w, 4) uint8 array.
#[pyfunction]
#[pyo3(signature = (
    aspect_ratio = "4:3",
    dimension = 1024,
    axis = "width",
    pattern = None,
    background = "#ffffff",
    border = "none",
    color1 = "#ff0000",
    color2 = "#00ff00",
    color3 = "#0000ff",
    seed = None
))]
#[allow(clippy::too_many_arguments, clippy::cast_possible_truncation)]
fn generate_marker(
    py: Python<'_>,
    aspect_ratio: &str,
    dimension: u32,
    axis: &str,
    pattern: Option<&str>,
    background: &str,
    border: &str,
    color1: &str,
    color2: &str,
    color3: &str,
    seed: Option<u64>,
) -> PyResult<PyObject> {
    let request = MarkerRequest {
        aspect_ratio,
        axis,
        dimension,
        pattern,
        background,
        border,
        colors: [color1, color2, color3],
    };
    let params = request.validate().map_err(marker_err)?;
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let marker = py
        .allow_threads(|| tessera_core::generate(&params, &mut rng))
        .map_err(marker_err)?;
    let (width, height) = (marker.width() as usize, marker.height() as usize);

    let array = PyArray1::from_vec(py, marker.into_image().into_raw());
    let array3d = array
        .reshape([height, width, 4])
        .map_err(|_| PyRuntimeError::new_err("Failed to reshape NumPy array"))?;
    Ok(array3d.into_any().unbind())
}

/// Count keypoints in an RGBA image of shape (h, w, 4).
///
/// Returns the count and its label, e.g. (5000, "5000+") once saturated.
#[pyfunction]
#[allow(clippy::needless_pass_by_value)]
fn score_image(img: PyReadonlyArray3<u8>) -> PyResult<(usize, String)> {
    let mut scorer =
        tessera_core::FeatureScorer::new(tessera_core::Readiness::ready(DetectorConfig::default()));
    score_with(&mut scorer, &img)
}

/// Five-step shade ramp of a `#rrggbb` color, darkest first:
/// lightness `[-20, -10, base, +10, +20]`.
#[pyfunction]
fn derive_shades(hex: &str) -> PyResult<Vec<String>> {
    let ramp = tessera_core::derive_shades(hex).map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(ramp.iter().map(|c| c.to_hex()).collect())
}

// ============================================================================
// Module registration
// ============================================================================

/// The tessera Python module.
#[pymodule]
fn tessera(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<FeatureScorer>()?;

    m.add_function(wrap_pyfunction!(version_info, m)?)?;
    m.add_function(wrap_pyfunction!(generate_marker, m)?)?;
    m.add_function(wrap_pyfunction!(score_image, m)?)?;
    m.add_function(wrap_pyfunction!(derive_shades, m)?)?;
    Ok(())
}
