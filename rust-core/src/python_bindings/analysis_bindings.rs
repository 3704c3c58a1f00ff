//! Python bindings for single-signal and batch analysis

use super::to_py_err;
use crate::analysis::{analyze_batch, AnalysisOrchestrator, AnalysisOutput, AnalysisReport, BatchOutcome};
use crate::audio::{Signal, SymphoniaDecoder, UploadedFile};
use crate::config::AnalysisConfig;
use crate::filters::PITCH_CLASSES;
use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict, PyList};

fn parse_config(config_json: Option<&str>) -> PyResult<AnalysisConfig> {
    match config_json {
        Some(json) => AnalysisConfig::from_json(json).map_err(to_py_err),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Run every configured analysis on one signal
///
/// Args:
///     samples: Mono signal as numpy array
///     sample_rate: Sample rate in Hz
///     config_json: Optional JSON analysis configuration
///
/// Returns:
///     Dictionary with 'results' (name -> dict of arrays) and
///     'failures' (name -> error message)
#[pyfunction]
#[pyo3(signature = (samples, sample_rate, config_json=None))]
pub fn analyze<'py>(
    py: Python<'py>,
    samples: PyReadonlyArray1<f64>,
    sample_rate: u32,
    config_json: Option<&str>,
) -> PyResult<&'py PyDict> {
    let config = parse_config(config_json)?;
    let orchestrator = AnalysisOrchestrator::new(config).map_err(to_py_err)?;
    let signal = Signal::new(samples.as_array().to_vec(), sample_rate).map_err(to_py_err)?;

    let report = py.allow_threads(|| orchestrator.analyze_configured(&signal));
    report_to_dict(py, report)
}

/// Decode and analyse uploaded files
///
/// Args:
///     files: List of (name, bytes) pairs
///     config_json: Optional JSON analysis configuration
///
/// Returns:
///     None when no files were given, otherwise a list of dictionaries with
///     'name' and either 'report' or 'error', in input order
#[pyfunction]
#[pyo3(signature = (files, config_json=None))]
pub fn decode_and_analyze(
    py: Python<'_>,
    files: Vec<(String, &PyBytes)>,
    config_json: Option<&str>,
) -> PyResult<PyObject> {
    let config = parse_config(config_json)?;
    let orchestrator = AnalysisOrchestrator::new(config).map_err(to_py_err)?;
    let uploads: Vec<UploadedFile> = files
        .into_iter()
        .map(|(name, bytes)| UploadedFile::new(name, bytes.as_bytes().to_vec()))
        .collect();

    let outcome = py.allow_threads(|| analyze_batch(&uploads, &SymphoniaDecoder, &orchestrator));

    let reports = match outcome {
        BatchOutcome::NothingToAnalyze => return Ok(py.None()),
        BatchOutcome::Analyzed(reports) => reports,
    };

    let list = PyList::empty(py);
    for file in reports {
        let entry = PyDict::new(py);
        entry.set_item("name", file.name)?;
        match file.outcome {
            Ok(report) => entry.set_item("report", report_to_dict(py, report)?)?,
            Err(err) => entry.set_item("error", err.to_string())?,
        }
        list.append(entry)?;
    }
    Ok(list.into())
}

fn report_to_dict<'py>(py: Python<'py>, report: AnalysisReport) -> PyResult<&'py PyDict> {
    let results = PyDict::new(py);
    for (kind, output) in report.results {
        results.set_item(kind.name(), output_to_dict(py, output)?)?;
    }

    let failures = PyDict::new(py);
    for (kind, err) in report.failures {
        failures.set_item(kind.name(), err.to_string())?;
    }

    let dict = PyDict::new(py);
    dict.set_item("results", results)?;
    dict.set_item("failures", failures)?;
    Ok(dict)
}

fn output_to_dict<'py>(py: Python<'py>, output: AnalysisOutput) -> PyResult<&'py PyDict> {
    let dict = PyDict::new(py);
    if let Some(times) = output.frame_times() {
        dict.set_item("times", PyArray1::from_vec(py, times))?;
    }
    if let Some(frequencies) = output.bin_frequencies() {
        dict.set_item("frequencies", PyArray1::from_vec(py, frequencies))?;
    }

    match output {
        AnalysisOutput::Waveform {
            samples,
            sample_rate,
        } => {
            dict.set_item("samples", PyArray1::from_vec(py, samples))?;
            dict.set_item("sample_rate", sample_rate)?;
        }
        AnalysisOutput::Spectrogram {
            values,
            sample_rate,
            hop_size,
            fft_size,
        } => {
            dict.set_item("values", values.into_pyarray(py))?;
            dict.set_item("sample_rate", sample_rate)?;
            dict.set_item("hop_size", hop_size)?;
            dict.set_item("fft_size", fft_size)?;
        }
        AnalysisOutput::Chroma {
            values,
            sample_rate,
            hop_size,
        } => {
            if values.nrows() == PITCH_CLASSES.len() {
                dict.set_item("labels", PITCH_CLASSES.to_vec())?;
            }
            dict.set_item("values", values.into_pyarray(py))?;
            dict.set_item("sample_rate", sample_rate)?;
            dict.set_item("hop_size", hop_size)?;
        }
        AnalysisOutput::Mfcc { values, n_coeff } => {
            dict.set_item("values", values.into_pyarray(py))?;
            dict.set_item("n_coeff", n_coeff)?;
        }
        AnalysisOutput::Spectrum(spectrum) => {
            dict.set_item("frequencies", PyArray1::from_vec(py, spectrum.frequencies))?;
            dict.set_item("magnitudes", PyArray1::from_vec(py, spectrum.magnitudes))?;
        }
    }
    Ok(dict)
}
