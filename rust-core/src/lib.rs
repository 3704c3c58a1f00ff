//! Audio Atlas - offline audio analysis core
//!
//! Turns decoded audio into waveform, dB spectrogram, chromagram, MFCC and
//! whole-signal spectrum results, with optional Python bindings.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod analysis;
pub mod audio;
pub mod cepstral;
pub mod config;
pub mod error;
pub mod filters;
pub mod spectrum;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use analysis::{analyze_batch, AnalysisOrchestrator, AnalysisOutput, AnalysisReport, BatchOutcome, FileReport};
pub use audio::{AudioDecoder, Signal, SymphoniaDecoder, UploadedFile};
pub use config::{AnalysisConfig, AnalysisKind};
pub use error::{AnalysisError, Result};
pub use filters::{FilterbankCache, MelNorm, WindowType};
pub use spectrum::{FrequencySpectrum, PadPolicy};
