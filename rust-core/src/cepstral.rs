//! Mel-frequency cepstral coefficients
//!
//! Log-compressed mel power goes through an orthonormal DCT-II along the
//! band axis; the first `n_coeff` rows are the MFCCs.

use crate::error::{AnalysisError, Result};
use crate::spectrum::stft::{power_to_db, DbOptions, DEFAULT_POWER_AMIN};
use ndarray::Array2;
use std::f64::consts::PI;

/// `10*log10(max(mel, 1e-10))`, clamped `top_db` below the loudest value
pub fn log_mel_energies(mel_power: &Array2<f64>, top_db: Option<f64>) -> Array2<f64> {
    power_to_db(
        mel_power,
        1.0,
        DbOptions {
            amin: DEFAULT_POWER_AMIN,
            top_db,
        },
    )
}

/// Orthonormal DCT-II basis, shape `(n_coeff, n_bands)`
///
/// `D[k, n] = s_k * cos(pi * k * (2n + 1) / (2N))` with
/// `s_0 = sqrt(1/N)` and `s_k = sqrt(2/N)` otherwise.
pub fn dct_matrix(n_coeff: usize, n_bands: usize) -> Array2<f64> {
    let n = n_bands as f64;
    let first = (1.0 / n).sqrt();
    let rest = (2.0 / n).sqrt();

    Array2::from_shape_fn((n_coeff, n_bands), |(k, band)| {
        let scale = if k == 0 { first } else { rest };
        scale * (PI * k as f64 * (2 * band + 1) as f64 / (2.0 * n)).cos()
    })
}

/// Cepstral coefficients from log-mel energies `(n_bands, n_frames)`
///
/// Returns `(n_coeff, n_frames)`.
pub fn mfcc(log_mel_energies: &Array2<f64>, n_coeff: usize) -> Result<Array2<f64>> {
    let n_bands = log_mel_energies.nrows();
    if n_coeff == 0 {
        return Err(AnalysisError::invalid("n_mfcc", "must be positive"));
    }
    if n_coeff > n_bands {
        return Err(AnalysisError::invalid(
            "n_mfcc",
            format!("{} coefficients requested from {} mel bands", n_coeff, n_bands),
        ));
    }

    Ok(dct_matrix(n_coeff, n_bands).dot(log_mel_energies))
}
