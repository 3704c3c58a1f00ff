//! Short-time Fourier transform and decibel scaling
//!
//! Columns of the STFT are independent, so they are computed on the rayon
//! pool with one FFT engine (sharing the same plan) per worker.

use super::fft::FftEngine;
use super::framing::WindowedFramer;
use crate::error::{AnalysisError, Result};
use ndarray::Array2;
use num_complex::Complex;
use rayon::prelude::*;

/// Magnitude floor for amplitude dB conversion
pub const DEFAULT_AMIN: f64 = 1e-5;

/// Power floor for power dB conversion
pub const DEFAULT_POWER_AMIN: f64 = 1e-10;

/// Dynamic range kept below the loudest bin
pub const DEFAULT_TOP_DB: f64 = 80.0;

/// Complex STFT, shape `(fft_size/2 + 1, n_frames)`
#[derive(Debug, Clone, PartialEq)]
pub struct StftMatrix {
    values: Array2<Complex<f64>>,
    fft_size: usize,
    hop_size: usize,
}

impl StftMatrix {
    pub fn values(&self) -> &Array2<Complex<f64>> {
        &self.values
    }

    pub fn n_bins(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_frames(&self) -> usize {
        self.values.ncols()
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// |X|
    pub fn magnitude(&self) -> Array2<f64> {
        self.values.mapv(|c| c.norm())
    }

    /// |X|^2
    pub fn power(&self) -> Array2<f64> {
        self.values.mapv(|c| c.norm_sqr())
    }
}

/// Compute the STFT of every frame produced by `framer`
///
/// Frames are zero-padded to `fft_size`, which must be at least the frame
/// size.
pub fn stft(framer: &WindowedFramer<'_>, fft_size: usize) -> Result<StftMatrix> {
    if fft_size < framer.frame_size() {
        return Err(AnalysisError::invalid(
            "fft_size",
            format!(
                "{} is smaller than frame size {}",
                fft_size,
                framer.frame_size()
            ),
        ));
    }

    let template = FftEngine::new(fft_size)?;
    let n_bins = template.num_bins();
    let n_frames = framer.len();
    let frame_size = framer.frame_size();

    log::debug!(
        "STFT: {} frames of {} samples, fft_size {}, hop {}",
        n_frames,
        frame_size,
        fft_size,
        framer.hop_size()
    );

    let columns = (0..n_frames)
        .into_par_iter()
        .map_init(
            || (template.clone(), vec![0.0; frame_size]),
            |(engine, frame), index| {
                framer.fill_frame(index, frame);
                engine.process(frame)
            },
        )
        .collect::<Result<Vec<_>>>()?;

    let values = Array2::from_shape_fn((n_bins, n_frames), |(bin, frame)| columns[frame][bin]);

    Ok(StftMatrix {
        values,
        fft_size,
        hop_size: framer.hop_size(),
    })
}

/// Options for decibel conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DbOptions {
    /// Values below `amin` are raised to it before the logarithm
    pub amin: f64,

    /// Clamp to `max_db - top_db`; `None` keeps the full range
    pub top_db: Option<f64>,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            amin: DEFAULT_AMIN,
            top_db: Some(DEFAULT_TOP_DB),
        }
    }
}

/// Largest value in the matrix (0.0 for an empty or all-zero matrix)
pub fn max_value(values: &Array2<f64>) -> f64 {
    values.fold(0.0, |acc: f64, &v| acc.max(v))
}

/// `20*log10(max(|x|, amin) / max(reference, amin))`, clamped by `top_db`
pub fn amplitude_to_db(magnitude: &Array2<f64>, reference: f64, options: DbOptions) -> Array2<f64> {
    to_db(magnitude, reference, 20.0, options)
}

/// `10*log10(max(p, amin) / max(reference, amin))`, clamped by `top_db`
pub fn power_to_db(power: &Array2<f64>, reference: f64, options: DbOptions) -> Array2<f64> {
    to_db(power, reference, 10.0, options)
}

fn to_db(values: &Array2<f64>, reference: f64, scale: f64, options: DbOptions) -> Array2<f64> {
    let amin = options.amin.max(f64::MIN_POSITIVE);
    let ref_db = scale * reference.abs().max(amin).log10();

    let mut db = values.mapv(|v| scale * v.abs().max(amin).log10() - ref_db);

    if let Some(top_db) = options.top_db {
        let peak = db.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        if peak.is_finite() {
            let floor = peak - top_db.abs();
            db.mapv_inplace(|v| v.max(floor));
        }
    }

    db
}

/// Magnitude spectrogram in dB relative to the loudest bin of the matrix
///
/// The loudest bin maps to exactly 0 dB. A silent input maps to all 0 dB.
pub fn to_db_spectrogram(stft: &StftMatrix, options: DbOptions) -> Array2<f64> {
    let magnitude = stft.magnitude();
    let reference = max_value(&magnitude);
    if reference <= options.amin {
        log::warn!("Spectrogram of a silent signal; every bin sits at the reference level");
    }
    amplitude_to_db(&magnitude, reference, options)
}
