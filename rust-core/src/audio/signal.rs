//! Mono sample buffer handed to the analysis stages

use crate::error::{AnalysisError, Result};

/// Immutable mono signal with its sample rate
///
/// Always holds at least one finite sample and a positive sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl Signal {
    /// Create a signal from mono samples
    ///
    /// # Errors
    /// * `EmptySignal` if `samples` is empty
    /// * `InvalidParameter` if `sample_rate` is zero or a sample is NaN/Inf
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AnalysisError::invalid("sample_rate", "must be positive"));
        }
        if samples.is_empty() {
            return Err(AnalysisError::EmptySignal);
        }
        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(AnalysisError::invalid(
                "samples",
                format!("non-finite value at index {}", pos),
            ));
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Create a mono signal from interleaved multichannel samples
    ///
    /// Channels are averaged; a trailing incomplete frame is dropped.
    pub fn from_interleaved(interleaved: &[f64], channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(AnalysisError::invalid("channels", "must be positive"));
        }
        if channels == 1 {
            return Self::new(interleaved.to_vec(), sample_rate);
        }

        let scale = 1.0 / channels as f64;
        let mono = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f64>() * scale)
            .collect();

        Self::new(mono, sample_rate)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Peak absolute amplitude
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0, |acc: f64, &s| acc.max(s.abs()))
    }
}
