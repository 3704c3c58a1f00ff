//! Mel filterbank
//!
//! Triangular filters on the Slaney mel scale: linear below 1 kHz
//! (200/3 Hz per mel), logarithmic above. Filter edges are the mel
//! points `n_mels + 2` evenly spaced between 0 Hz and Nyquist; weights are
//! evaluated at the exact FFT bin frequencies.

use crate::error::{AnalysisError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Row normalisation of the mel filterbank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MelNorm {
    /// Constant area: each triangle is scaled by `2 / bandwidth_hz`
    #[default]
    Slaney,

    /// Each non-empty row sums to 1.0
    Unit,

    /// Raw triangles with a peak of (at most) 1.0
    None,
}

/// Convert Hz to mel (Slaney)
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Convert mel to Hz (Slaney)
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// `n` frequencies evenly spaced on the mel scale between `fmin` and `fmax`
pub fn mel_frequencies(n: usize, fmin: f64, fmax: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![fmin];
    }

    let mel_min = hz_to_mel(fmin);
    let mel_max = hz_to_mel(fmax);
    let step = (mel_max - mel_min) / (n - 1) as f64;

    (0..n).map(|i| mel_to_hz(mel_min + step * i as f64)).collect()
}

/// Build a mel filterbank, shape `(n_mels, fft_size/2 + 1)`
///
/// Bands narrower than one FFT bin can end up empty (all-zero row); that
/// is logged and left in place.
pub fn mel_filterbank(
    sample_rate: u32,
    fft_size: usize,
    n_mels: usize,
    norm: MelNorm,
) -> Result<Array2<f64>> {
    if sample_rate == 0 {
        return Err(AnalysisError::invalid("sample_rate", "must be positive"));
    }
    if fft_size == 0 {
        return Err(AnalysisError::invalid("fft_size", "must be positive"));
    }
    if n_mels == 0 {
        return Err(AnalysisError::invalid("n_mels", "must be positive"));
    }

    let n_bins = fft_size / 2 + 1;
    let bin_hz = sample_rate as f64 / fft_size as f64;
    let nyquist = sample_rate as f64 / 2.0;

    let edges = mel_frequencies(n_mels + 2, 0.0, nyquist);
    let mut weights = Array2::<f64>::zeros((n_mels, n_bins));

    for (band, mut row) in weights.rows_mut().into_iter().enumerate() {
        let (left, center, right) = (edges[band], edges[band + 1], edges[band + 2]);
        let rise = center - left;
        let fall = right - center;

        for (bin, w) in row.iter_mut().enumerate() {
            let freq = bin as f64 * bin_hz;
            let lower = (freq - left) / rise;
            let upper = (right - freq) / fall;
            *w = lower.min(upper).max(0.0);
        }

        match norm {
            MelNorm::Slaney => {
                let enorm = 2.0 / (right - left);
                row.mapv_inplace(|w| w * enorm);
            }
            MelNorm::Unit => {
                let sum = row.sum();
                if sum > 0.0 {
                    row.mapv_inplace(|w| w / sum);
                }
            }
            MelNorm::None => {}
        }
    }

    let empty = weights
        .rows()
        .into_iter()
        .filter(|row| row.iter().all(|&w| w == 0.0))
        .count();
    if empty > 0 {
        log::warn!(
            "Mel filterbank has {} empty band(s) of {}: n_mels={} is too high for fft_size={}",
            empty,
            n_mels,
            n_mels,
            fft_size
        );
    }

    log::debug!(
        "Built mel filterbank: {} bands x {} bins at {} Hz ({:?})",
        n_mels,
        n_bins,
        sample_rate,
        norm
    );

    Ok(weights)
}
