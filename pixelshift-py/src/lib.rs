//! Python bindings for the pixelshift frame registration library.
//!
//! Frames are passed as 2D `float64` numpy arrays indexed `[row, column]`.

use numpy::{
    PyArray1, PyArray2, PyArrayMethods, PyReadonlyArray1, PyReadonlyArray2,
    PyUntypedArrayMethods,
};
use pyo3::exceptions::{PyMemoryError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use pixelshift::{
    Image, PixelShiftError, Region, ShiftConfig as RustShiftConfig, ShiftEstimator,
};

/// Convert a PixelShiftError to a Python exception.
fn to_py_err(err: PixelShiftError) -> PyErr {
    match err {
        PixelShiftError::AllocationFailure { .. } => PyMemoryError::new_err(err.to_string()),
        PixelShiftError::SingularMatrix { .. } | PixelShiftError::ImageIo { .. } => {
            PyRuntimeError::new_err(err.to_string())
        }
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn image_from_array(
    pixels: &PyReadonlyArray2<'_, f64>,
    region: Option<(usize, usize, usize, usize)>,
) -> PyResult<Image> {
    let shape = pixels.shape();
    let height = shape[0];
    let width = shape[1];
    let data: Vec<f64> = pixels.as_slice()?.to_vec();
    let image = Image::new(data, width, height).map_err(to_py_err)?;
    match region {
        Some((x, y, w, h)) => image
            .with_region(Region::new(x, y, w, h))
            .map_err(to_py_err),
        None => Ok(image),
    }
}

/// Shift measurement settings.
#[pyclass]
#[derive(Clone)]
pub struct ShiftConfig {
    inner: RustShiftConfig,
}

#[pymethods]
impl ShiftConfig {
    /// Create a new ShiftConfig.
    ///
    /// Args:
    ///     min_tile_size: Minimum background tile size in pixels (default: 64)
    ///     clip_sigma: Profile baseline clip in standard deviations (default: 1.0)
    #[new]
    #[pyo3(signature = (min_tile_size = 64, clip_sigma = 1.0))]
    fn new(min_tile_size: usize, clip_sigma: f64) -> PyResult<Self> {
        let inner = RustShiftConfig {
            min_tile_size,
            clip_sigma,
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    #[getter]
    fn min_tile_size(&self) -> usize {
        self.inner.min_tile_size
    }

    #[getter]
    fn clip_sigma(&self) -> f64 {
        self.inner.clip_sigma
    }

    fn __repr__(&self) -> String {
        format!(
            "ShiftConfig(min_tile_size={}, clip_sigma={})",
            self.inner.min_tile_size, self.inner.clip_sigma
        )
    }
}

/// Subtract the smooth sky background from a frame.
///
/// Args:
///     image: 2D float64 array
///     min_tile_size: Minimum background tile size in pixels
///     region: Optional valid region as (x, y, width, height); pixels
///         outside it are zeroed
///
/// Returns:
///     New background-subtracted array of the same shape
#[pyfunction]
#[pyo3(signature = (image, min_tile_size, region = None))]
fn subtract_background<'py>(
    py: Python<'py>,
    image: PyReadonlyArray2<'py, f64>,
    min_tile_size: usize,
    region: Option<(usize, usize, usize, usize)>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let mut frame = image_from_array(&image, region)?;
    pixelshift::subtract_background(&mut frame, min_tile_size).map_err(to_py_err)?;
    let (width, height) = (frame.width(), frame.height());
    PyArray1::from_vec(py, frame.into_data()).reshape([height, width])
}

/// Sum a frame along both axes and remove each profile's baseline.
///
/// Returns:
///     Tuple (profile_x, profile_y) of 1D float64 arrays
#[pyfunction]
fn project_axes<'py>(
    py: Python<'py>,
    image: PyReadonlyArray2<'py, f64>,
) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>)> {
    let frame = image_from_array(&image, None)?;
    let profiles = pixelshift::project_axes(&frame);
    Ok((
        PyArray1::from_vec(py, profiles.x),
        PyArray1::from_vec(py, profiles.y),
    ))
}

/// Estimate the sub-pixel lag at which profile `b` best matches `a`.
#[pyfunction]
fn estimate_shift(a: PyReadonlyArray1<'_, f64>, b: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    pixelshift::estimate_shift(a.as_slice()?, b.as_slice()?).map_err(to_py_err)
}

/// Least-squares polynomial fit, coefficients lowest order first.
///
/// Args:
///     x, y: Sample coordinates and values
///     degree: Polynomial degree
///     sigma: Optional per-sample standard deviations used as weights
#[pyfunction]
#[pyo3(signature = (x, y, degree, sigma = None))]
fn fit_polynomial<'py>(
    py: Python<'py>,
    x: PyReadonlyArray1<'py, f64>,
    y: PyReadonlyArray1<'py, f64>,
    degree: usize,
    sigma: Option<PyReadonlyArray1<'py, f64>>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let sigma = match sigma.as_ref() {
        Some(s) => Some(s.as_slice()?),
        None => None,
    };
    let coeffs = pixelshift::fit_polynomial(x.as_slice()?, y.as_slice()?, sigma, degree)
        .map_err(to_py_err)?;
    Ok(PyArray1::from_vec(py, coeffs))
}

/// Measure the (x, y) shift of `frame` relative to `reference`.
///
/// Args:
///     frame, reference: 2D float64 arrays of equal shape
///     config: Optional ShiftConfig
///     region: Optional valid region (x, y, width, height) for both frames
#[pyfunction]
#[pyo3(signature = (frame, reference, config = None, region = None))]
fn measure_shift(
    frame: PyReadonlyArray2<'_, f64>,
    reference: PyReadonlyArray2<'_, f64>,
    config: Option<ShiftConfig>,
    region: Option<(usize, usize, usize, usize)>,
) -> PyResult<(f64, f64)> {
    let frame = image_from_array(&frame, region)?;
    let reference = image_from_array(&reference, region)?;
    let cfg = config.map(|c| c.inner).unwrap_or_default();
    let shift = ShiftEstimator::new(cfg)
        .measure(&frame, &reference)
        .map_err(to_py_err)?;
    Ok((shift.x, shift.y))
}

/// Measure the shift between two image files.
#[pyfunction]
#[pyo3(signature = (frame_path, reference_path, config = None))]
fn measure_shift_files(
    frame_path: &str,
    reference_path: &str,
    config: Option<ShiftConfig>,
) -> PyResult<(f64, f64)> {
    let frame = pixelshift::io::load_gray_image(frame_path).map_err(to_py_err)?;
    let reference = pixelshift::io::load_gray_image(reference_path).map_err(to_py_err)?;
    let cfg = config.map(|c| c.inner).unwrap_or_default();
    let shift = ShiftEstimator::new(cfg)
        .measure(&frame, &reference)
        .map_err(to_py_err)?;
    Ok((shift.x, shift.y))
}

/// Python module for pixelshift.
#[pymodule]
fn _pixelshift(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ShiftConfig>()?;
    m.add_function(wrap_pyfunction!(subtract_background, m)?)?;
    m.add_function(wrap_pyfunction!(project_axes, m)?)?;
    m.add_function(wrap_pyfunction!(estimate_shift, m)?)?;
    m.add_function(wrap_pyfunction!(fit_polynomial, m)?)?;
    m.add_function(wrap_pyfunction!(measure_shift, m)?)?;
    m.add_function(wrap_pyfunction!(measure_shift_files, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
