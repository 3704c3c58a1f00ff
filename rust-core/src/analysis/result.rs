//! Structured analysis results
//!
//! Matrices are `(rows, frames)`: frequency bins, pitch classes or
//! coefficients down, frames across.

use crate::config::AnalysisKind;
use crate::error::AnalysisError;
use crate::spectrum::fft::bin_frequencies;
use crate::spectrum::FrequencySpectrum;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One derived representation of a signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnalysisOutput {
    Waveform {
        samples: Vec<f64>,
        sample_rate: u32,
    },
    Spectrogram {
        /// Magnitude in dB, loudest bin at 0 dB
        values: Array2<f64>,
        sample_rate: u32,
        hop_size: usize,
        fft_size: usize,
    },
    Chroma {
        /// Per-frame max-normalised pitch-class energy, row 0 is C
        values: Array2<f64>,
        sample_rate: u32,
        hop_size: usize,
    },
    Mfcc {
        values: Array2<f64>,
        n_coeff: usize,
    },
    Spectrum(FrequencySpectrum),
}

impl AnalysisOutput {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisOutput::Waveform { .. } => AnalysisKind::Waveform,
            AnalysisOutput::Spectrogram { .. } => AnalysisKind::Spectrogram,
            AnalysisOutput::Chroma { .. } => AnalysisKind::Chroma,
            AnalysisOutput::Mfcc { .. } => AnalysisKind::Mfcc,
            AnalysisOutput::Spectrum(_) => AnalysisKind::Spectrum,
        }
    }

    /// Matrix payload, if the result is time-frequency shaped
    pub fn matrix(&self) -> Option<&Array2<f64>> {
        match self {
            AnalysisOutput::Spectrogram { values, .. }
            | AnalysisOutput::Chroma { values, .. }
            | AnalysisOutput::Mfcc { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Start time in seconds of every column (spectrogram and chroma)
    pub fn frame_times(&self) -> Option<Vec<f64>> {
        match self {
            AnalysisOutput::Spectrogram {
                values,
                sample_rate,
                hop_size,
                ..
            }
            | AnalysisOutput::Chroma {
                values,
                sample_rate,
                hop_size,
            } => {
                let step = *hop_size as f64 / *sample_rate as f64;
                Some((0..values.ncols()).map(|t| t as f64 * step).collect())
            }
            _ => None,
        }
    }

    /// Centre frequency in Hz of every spectrogram row
    pub fn bin_frequencies(&self) -> Option<Vec<f64>> {
        match self {
            AnalysisOutput::Spectrogram {
                sample_rate,
                fft_size,
                ..
            } => Some(bin_frequencies(*fft_size, *sample_rate)),
            _ => None,
        }
    }

    /// Length of a waveform in seconds
    pub fn duration(&self) -> Option<f64> {
        match self {
            AnalysisOutput::Waveform {
                samples,
                sample_rate,
            } => Some(samples.len() as f64 / *sample_rate as f64),
            _ => None,
        }
    }
}

/// Everything computed for one signal
///
/// A kind is in at most one of `results` and `failures`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisReport {
    pub results: BTreeMap<AnalysisKind, AnalysisOutput>,
    pub failures: BTreeMap<AnalysisKind, AnalysisError>,
}

impl AnalysisReport {
    pub fn get(&self, kind: AnalysisKind) -> Option<&AnalysisOutput> {
        self.results.get(&kind)
    }

    pub fn failure(&self, kind: AnalysisKind) -> Option<&AnalysisError> {
        self.failures.get(&kind)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn record(&mut self, kind: AnalysisKind, outcome: Result<AnalysisOutput, AnalysisError>) {
        match outcome {
            Ok(output) => {
                self.results.insert(kind, output);
            }
            Err(err) => {
                self.failures.insert(kind, err);
            }
        }
    }
}
