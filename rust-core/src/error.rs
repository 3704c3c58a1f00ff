//! Error types for the analysis pipeline
//!
//! Errors are scoped to one file or one analysis: the orchestrator records
//! them per key and keeps going.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    #[error("Signal contains no samples")]
    EmptySignal,

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Signal of {len} samples is shorter than one {frame_size}-sample frame")]
    SignalTooShort { len: usize, frame_size: usize },

    #[error("FFT processing failed: {0}")]
    Fft(String),

    #[error("Resampling failed: {0}")]
    Resample(String),
}

impl AnalysisError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Whether the error prevents every analysis of the file
    pub fn is_fatal_for_file(&self) -> bool {
        matches!(self, AnalysisError::Decode(_) | AnalysisError::EmptySignal)
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
