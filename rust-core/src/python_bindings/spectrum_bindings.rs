//! Python bindings for the whole-signal spectrum

use super::to_py_err;
use crate::audio::Signal;
use crate::spectrum::analysis::spectrum as whole_signal_spectrum;
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::PyDict;

/// Magnitude spectrum of the whole signal up to a frequency ceiling
///
/// Args:
///     samples: Mono signal as numpy array
///     sample_rate: Sample rate in Hz
///     freq_ceiling: Highest frequency kept, in Hz
///
/// Returns:
///     Dictionary with 'frequencies' and 'magnitudes' arrays
#[pyfunction]
pub fn spectrum<'py>(
    py: Python<'py>,
    samples: PyReadonlyArray1<f64>,
    sample_rate: u32,
    freq_ceiling: f64,
) -> PyResult<&'py PyDict> {
    let signal = Signal::new(samples.as_array().to_vec(), sample_rate).map_err(to_py_err)?;
    let result = py
        .allow_threads(|| whole_signal_spectrum(&signal, freq_ceiling))
        .map_err(to_py_err)?;

    let dict = PyDict::new(py);
    dict.set_item("frequencies", PyArray1::from_vec(py, result.frequencies))?;
    dict.set_item("magnitudes", PyArray1::from_vec(py, result.magnitudes))?;
    Ok(dict)
}
