//! PyO3 bindings for Python integration
//!
//! Results cross the boundary as dictionaries of numpy arrays; an external
//! Python renderer draws them.

use crate::error::AnalysisError;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

mod analysis_bindings;
mod spectrum_bindings;

/// Python module definition
#[pymodule]
fn audio_atlas(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(analysis_bindings::analyze, m)?)?;
    m.add_function(wrap_pyfunction!(analysis_bindings::decode_and_analyze, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::spectrum, m)?)?;
    m.add("PITCH_CLASSES", crate::filters::PITCH_CLASSES.to_vec())?;
    Ok(())
}

/// Parameter problems are the caller's fault; everything else is a runtime error
pub(crate) fn to_py_err(err: AnalysisError) -> PyErr {
    match err {
        AnalysisError::InvalidParameter { .. } | AnalysisError::EmptySignal => {
            PyValueError::new_err(err.to_string())
        }
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}
