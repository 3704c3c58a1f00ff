//! FFT engines
//!
//! `FftEngine` wraps a planned real-to-complex transform for fixed-size
//! frames (STFT columns). `full_fft` runs one complex FFT of arbitrary
//! length over a whole signal.

use crate::error::{AnalysisError, Result};
use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::FftPlanner;
use std::sync::Arc;

/// FFT engine for real-valued frames
///
/// Cloning shares the FFT plan and duplicates the work buffers.
#[derive(Clone)]
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer
    input_buffer: Vec<f64>,

    /// Reusable scratch for the transform
    scratch: Vec<Complex<f64>>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples, any positive length)
    pub fn new(fft_size: usize) -> Result<Self> {
        if fft_size == 0 {
            return Err(AnalysisError::invalid("fft_size", "must be positive"));
        }

        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);
        let scratch = r2c.make_scratch_vec();

        Ok(Self {
            fft_size,
            r2c,
            input_buffer: vec![0.0; fft_size],
            scratch,
        })
    }

    /// Compute the non-negative-frequency spectrum of one frame
    ///
    /// # Arguments
    /// * `frame` - Input samples (zero-padded if shorter than fft_size,
    ///   truncated if longer)
    /// * `output` - Destination for `fft_size/2 + 1` complex bins
    pub fn process_into(&mut self, frame: &[f64], output: &mut [Complex<f64>]) -> Result<()> {
        if output.len() != self.num_bins() {
            return Err(AnalysisError::invalid(
                "output",
                format!("expected {} bins, got {}", self.num_bins(), output.len()),
            ));
        }

        let copy_len = frame.len().min(self.fft_size);
        self.input_buffer[..copy_len].copy_from_slice(&frame[..copy_len]);
        self.input_buffer[copy_len..].fill(0.0);

        self.r2c
            .process_with_scratch(&mut self.input_buffer, output, &mut self.scratch)
            .map_err(|e| AnalysisError::Fft(e.to_string()))
    }

    /// Compute the spectrum of one frame into a new vector
    pub fn process(&mut self, frame: &[f64]) -> Result<Vec<Complex<f64>>> {
        let mut output = vec![Complex::new(0.0, 0.0); self.num_bins()];
        self.process_into(frame, &mut output)?;
        Ok(output)
    }

    /// Compute magnitude spectrum |X[k]| of one frame
    pub fn compute_magnitude(&mut self, frame: &[f64]) -> Result<Vec<f64>> {
        Ok(self.process(frame)?.iter().map(|c| c.norm()).collect())
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get number of frequency bins (fft_size/2 + 1 for real FFT)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Centre frequency of every bin in Hz
    pub fn bin_frequencies(&self, sample_rate: u32) -> Vec<f64> {
        bin_frequencies(self.fft_size, sample_rate)
    }
}

/// Frequencies `k * sample_rate / fft_size` for `k = 0..=fft_size/2`
pub fn bin_frequencies(fft_size: usize, sample_rate: u32) -> Vec<f64> {
    let bin_hz = sample_rate as f64 / fft_size as f64;
    (0..=fft_size / 2).map(|k| k as f64 * bin_hz).collect()
}

/// Full complex FFT of a real signal, every one of the `N` bins
pub fn full_fft(samples: &[f64]) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    if buffer.is_empty() {
        return buffer;
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);

    buffer
}
