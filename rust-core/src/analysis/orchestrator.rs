//! Per-signal analysis fan-out
//!
//! The STFT is computed once and shared by the spectrogram, chroma and MFCC
//! stages; each enabled kind then runs as its own rayon task. A failing
//! kind lands in `AnalysisReport::failures` and the rest still complete.

use super::result::{AnalysisOutput, AnalysisReport};
use crate::audio::Signal;
use crate::cepstral::{log_mel_energies, mfcc};
use crate::config::{AnalysisConfig, AnalysisKind};
use crate::error::{AnalysisError, Result};
use crate::filters::{normalize_frames_max, project, FilterbankCache};
use crate::spectrum::framing::center_pad;
use crate::spectrum::stft::DEFAULT_AMIN;
use crate::spectrum::{
    spectrum, stft, to_db_spectrogram, DbOptions, PadPolicy, StftMatrix, WindowedFramer,
};
use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Runs the enabled analyses for one signal
#[derive(Debug, Clone)]
pub struct AnalysisOrchestrator {
    config: AnalysisConfig,
    cache: Arc<FilterbankCache>,
}

impl AnalysisOrchestrator {
    /// Validate `config` and share the process-wide filterbank cache
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        Self::with_cache(config, FilterbankCache::global())
    }

    /// Validate `config` and use a private filterbank cache
    pub fn with_cache(config: AnalysisConfig, cache: Arc<FilterbankCache>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, cache })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<FilterbankCache> {
        &self.cache
    }

    /// Analyse with the configured kinds and frequency ceiling
    pub fn analyze_configured(&self, signal: &Signal) -> AnalysisReport {
        self.analyze(signal, &self.config.enabled_analyses, self.config.freq_ceiling_hz)
    }

    /// Compute every kind in `enabled` for `signal`
    ///
    /// `freq_ceiling` bounds the whole-signal spectrum only.
    pub fn analyze(
        &self,
        signal: &Signal,
        enabled: &BTreeSet<AnalysisKind>,
        freq_ceiling: f64,
    ) -> AnalysisReport {
        log::debug!(
            "Analysing {} samples at {} Hz: {:?}",
            signal.len(),
            signal.sample_rate(),
            enabled
        );

        let shared_stft = if enabled.iter().any(AnalysisKind::is_framed) {
            Some(self.stft(signal))
        } else {
            None
        };

        let outcomes: Vec<(AnalysisKind, Result<AnalysisOutput>)> = enabled
            .par_iter()
            .map(|&kind| {
                let outcome = match (&shared_stft, kind.is_framed()) {
                    (Some(Err(err)), true) => Err(err.clone()),
                    (Some(Ok(matrix)), true) => self.run_framed(kind, signal, matrix),
                    _ => self.run_direct(kind, signal, freq_ceiling),
                };
                (kind, outcome)
            })
            .collect();

        let mut report = AnalysisReport::default();
        for (kind, outcome) in outcomes {
            if let Err(err) = &outcome {
                log::warn!("{} analysis failed: {}", kind, err);
            }
            report.record(kind, outcome);
        }
        report
    }

    /// Run a single analysis kind
    pub fn run(&self, kind: AnalysisKind, signal: &Signal, freq_ceiling: f64) -> Result<AnalysisOutput> {
        if kind.is_framed() {
            let matrix = self.stft(signal)?;
            self.run_framed(kind, signal, &matrix)
        } else {
            self.run_direct(kind, signal, freq_ceiling)
        }
    }

    /// Framed STFT of the signal under the configured framing parameters
    ///
    /// Centred framing yields `1 + len / hop_size` frames: the padding
    /// already covers the tail, so partial frames are dropped.
    pub fn stft(&self, signal: &Signal) -> Result<StftMatrix> {
        let config = &self.config;
        let (samples, pad_policy): (Cow<'_, [f64]>, _) = if config.center {
            (
                Cow::Owned(center_pad(signal.samples(), config.frame_size)),
                PadPolicy::Drop,
            )
        } else {
            (Cow::Borrowed(signal.samples()), config.pad_policy)
        };

        let framer = WindowedFramer::new(&samples, config.frame_size, config.hop_size, config.window)?
            .with_pad_policy(pad_policy);

        if framer.is_empty() {
            return Err(AnalysisError::SignalTooShort {
                len: signal.len(),
                frame_size: config.frame_size,
            });
        }

        stft(&framer, config.effective_fft_size())
    }

    fn run_direct(&self, kind: AnalysisKind, signal: &Signal, freq_ceiling: f64) -> Result<AnalysisOutput> {
        match kind {
            AnalysisKind::Waveform => Ok(AnalysisOutput::Waveform {
                samples: signal.samples().to_vec(),
                sample_rate: signal.sample_rate(),
            }),
            AnalysisKind::Spectrum => spectrum(signal, freq_ceiling).map(AnalysisOutput::Spectrum),
            framed => Err(AnalysisError::invalid(
                "analysis",
                format!("{} needs STFT input", framed),
            )),
        }
    }

    fn run_framed(&self, kind: AnalysisKind, signal: &Signal, matrix: &StftMatrix) -> Result<AnalysisOutput> {
        let config = &self.config;
        let sample_rate = signal.sample_rate();

        match kind {
            AnalysisKind::Spectrogram => {
                let options = DbOptions {
                    amin: DEFAULT_AMIN,
                    top_db: Some(config.top_db),
                };
                Ok(AnalysisOutput::Spectrogram {
                    values: to_db_spectrogram(matrix, options),
                    sample_rate,
                    hop_size: matrix.hop_size(),
                    fft_size: matrix.fft_size(),
                })
            }
            AnalysisKind::Chroma => {
                let filterbank =
                    self.cache
                        .chroma(sample_rate, matrix.fft_size(), config.n_chroma, config.tuning)?;
                let mut values = project(&matrix.power(), &filterbank)?;
                normalize_frames_max(&mut values);
                Ok(AnalysisOutput::Chroma {
                    values,
                    sample_rate,
                    hop_size: matrix.hop_size(),
                })
            }
            AnalysisKind::Mfcc => {
                let filterbank =
                    self.cache
                        .mel(sample_rate, matrix.fft_size(), config.n_mels, config.mel_norm)?;
                let mel_power = project(&matrix.power(), &filterbank)?;
                let log_mel = log_mel_energies(&mel_power, Some(config.top_db));
                Ok(AnalysisOutput::Mfcc {
                    values: mfcc(&log_mel, config.n_mfcc)?,
                    n_coeff: config.n_mfcc,
                })
            }
            direct => self.run_direct(direct, signal, config.freq_ceiling_hz),
        }
    }
}
