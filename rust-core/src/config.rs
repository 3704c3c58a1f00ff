//! Analysis configuration
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a
//! valid configuration.

use crate::error::{AnalysisError, Result};
use crate::filters::{MelNorm, WindowType};
use crate::spectrum::stft::DEFAULT_TOP_DB;
use crate::spectrum::PadPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const MIN_FREQ_CEILING_HZ: f64 = 1000.0;
pub const MAX_FREQ_CEILING_HZ: f64 = 20000.0;
pub const DEFAULT_FREQ_CEILING_HZ: f64 = 10000.0;

/// The representations that can be requested for a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Waveform,
    Spectrogram,
    Chroma,
    Mfcc,
    Spectrum,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::Waveform,
        AnalysisKind::Spectrogram,
        AnalysisKind::Chroma,
        AnalysisKind::Mfcc,
        AnalysisKind::Spectrum,
    ];

    /// Stable result key
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisKind::Waveform => "waveform",
            AnalysisKind::Spectrogram => "spectrogram",
            AnalysisKind::Chroma => "chroma",
            AnalysisKind::Mfcc => "mfcc",
            AnalysisKind::Spectrum => "spectrum",
        }
    }

    /// Whether the analysis runs on framed STFT data
    pub fn is_framed(&self) -> bool {
        matches!(
            self,
            AnalysisKind::Spectrogram | AnalysisKind::Chroma | AnalysisKind::Mfcc
        )
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalysisKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| {
                AnalysisError::invalid("enabled_analyses", format!("unknown analysis '{}'", s))
            })
    }
}

/// Parameters shared by every analysis of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Samples per STFT frame
    pub frame_size: usize,

    /// Samples between frame starts
    pub hop_size: usize,

    /// FFT length; `None` uses `frame_size`
    pub fft_size: Option<usize>,

    pub window: WindowType,

    /// Pad `frame_size / 2` zeros on both ends before framing
    ///
    /// Gives `1 + len / hop_size` frames; `pad_policy` is not applied.
    pub center: bool,

    pub pad_policy: PadPolicy,

    /// Dynamic range kept below the loudest value, in dB
    pub top_db: f64,

    pub n_mels: usize,
    pub mel_norm: MelNorm,

    pub n_chroma: usize,

    /// Deviation from A440 in fractions of a chroma bin
    ///
    /// Used as given; tuning is never estimated from the signal.
    pub tuning: f64,

    pub n_mfcc: usize,

    /// Upper bound of the whole-signal spectrum in Hz
    pub freq_ceiling_hz: f64,

    pub enabled_analyses: BTreeSet<AnalysisKind>,

    /// Resample every file to this rate before analysis
    pub target_sample_rate: Option<u32>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            fft_size: None,
            window: WindowType::Hann,
            center: false,
            pad_policy: PadPolicy::ZeroPad,
            top_db: DEFAULT_TOP_DB,
            n_mels: 128,
            mel_norm: MelNorm::Slaney,
            n_chroma: 12,
            tuning: 0.0,
            n_mfcc: 13,
            freq_ceiling_hz: DEFAULT_FREQ_CEILING_HZ,
            enabled_analyses: AnalysisKind::ALL.into_iter().collect(),
            target_sample_rate: None,
        }
    }
}

impl AnalysisConfig {
    /// Parse a (possibly partial) JSON configuration and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)
            .map_err(|e| AnalysisError::invalid("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn effective_fft_size(&self) -> usize {
        self.fft_size.unwrap_or(self.frame_size)
    }

    /// Same configuration with a different set of analyses
    pub fn with_analyses(mut self, kinds: impl IntoIterator<Item = AnalysisKind>) -> Self {
        self.enabled_analyses = kinds.into_iter().collect();
        self
    }

    pub fn is_enabled(&self, kind: AnalysisKind) -> bool {
        self.enabled_analyses.contains(&kind)
    }

    /// Check every constraint, reporting the first violation
    pub fn validate(&self) -> Result<()> {
        if self.frame_size == 0 {
            return Err(AnalysisError::invalid("frame_size", "must be positive"));
        }
        if self.hop_size == 0 {
            return Err(AnalysisError::invalid("hop_size", "must be positive"));
        }
        let fft_size = self.effective_fft_size();
        if fft_size < self.frame_size {
            return Err(AnalysisError::invalid(
                "fft_size",
                format!("{} is smaller than frame size {}", fft_size, self.frame_size),
            ));
        }
        if !self.top_db.is_finite() || self.top_db <= 0.0 {
            return Err(AnalysisError::invalid("top_db", "must be a positive number of dB"));
        }
        if self.n_mels == 0 {
            return Err(AnalysisError::invalid("n_mels", "must be positive"));
        }
        if self.n_chroma == 0 {
            return Err(AnalysisError::invalid("n_chroma", "must be positive"));
        }
        if !self.tuning.is_finite() {
            return Err(AnalysisError::invalid("tuning", "must be finite"));
        }
        if self.n_mfcc == 0 {
            return Err(AnalysisError::invalid("n_mfcc", "must be positive"));
        }
        if self.n_mfcc > self.n_mels {
            return Err(AnalysisError::invalid(
                "n_mfcc",
                format!("{} exceeds n_mels {}", self.n_mfcc, self.n_mels),
            ));
        }
        if !(MIN_FREQ_CEILING_HZ..=MAX_FREQ_CEILING_HZ).contains(&self.freq_ceiling_hz) {
            return Err(AnalysisError::invalid(
                "freq_ceiling_hz",
                format!(
                    "{} Hz is outside [{}, {}]",
                    self.freq_ceiling_hz, MIN_FREQ_CEILING_HZ, MAX_FREQ_CEILING_HZ
                ),
            ));
        }
        if self.target_sample_rate == Some(0) {
            return Err(AnalysisError::invalid("target_sample_rate", "must be positive"));
        }
        Ok(())
    }
}
