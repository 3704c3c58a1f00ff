//! Whole-signal magnitude spectrum
//!
//! One FFT over every sample (no framing, no window), folded to the
//! non-redundant half and cut at a frequency ceiling. This is a separate
//! path from the STFT: it gives one aggregate spectral view per file.

use super::fft::full_fft;
use crate::audio::Signal;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Frequency axis and magnitudes of equal length, frequencies ascending
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrequencySpectrum {
    pub frequencies: Vec<f64>,
    pub magnitudes: Vec<f64>,
}

impl FrequencySpectrum {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequency and magnitude of the strongest bin
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.magnitudes
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, &mag)| (self.frequencies[i], mag))
    }
}

/// Compute the magnitude spectrum of the whole signal up to `freq_ceiling` Hz
///
/// `freqs[k] = k * sample_rate / N` for `k in [0, N/2)`, magnitude `|X[k]|`.
/// A ceiling below one bin of resolution (`sample_rate / N`) yields an empty
/// spectrum; a ceiling at or above Nyquist yields all `N/2` points.
pub fn spectrum(signal: &Signal, freq_ceiling: f64) -> Result<FrequencySpectrum> {
    if !freq_ceiling.is_finite() || freq_ceiling < 0.0 {
        return Err(AnalysisError::invalid(
            "freq_ceiling",
            format!("must be a non-negative frequency, got {}", freq_ceiling),
        ));
    }

    let n = signal.len();
    let sample_rate = signal.sample_rate() as f64;
    let resolution = sample_rate / n as f64;

    if freq_ceiling < resolution {
        log::debug!(
            "Frequency ceiling {} Hz is below the {:.4} Hz bin resolution",
            freq_ceiling,
            resolution
        );
        return Ok(FrequencySpectrum::default());
    }

    let half = n / 2;
    let kept = (0..half)
        .take_while(|&k| k as f64 * resolution <= freq_ceiling)
        .count();

    let fft = full_fft(signal.samples());

    let frequencies = (0..kept).map(|k| k as f64 * resolution).collect();
    let magnitudes = fft[..kept].iter().map(|c| c.norm()).collect();

    log::debug!(
        "Full spectrum: {} of {} bins kept below {} Hz",
        kept,
        half,
        freq_ceiling
    );

    Ok(FrequencySpectrum {
        frequencies,
        magnitudes,
    })
}
