//! Multi-file batch analysis
//!
//! Every uploaded file is decoded, optionally resampled and analysed on the
//! rayon pool. A file that cannot be decoded gets an error entry; the other
//! files are unaffected. Reports keep the upload order.

use super::orchestrator::AnalysisOrchestrator;
use super::result::AnalysisReport;
use crate::audio::{resample_to, AudioDecoder, Signal, UploadedFile};
use crate::error::Result;
use rayon::prelude::*;

/// Outcome of analysing one uploaded file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub name: String,
    pub outcome: Result<AnalysisReport>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// No files were supplied
    NothingToAnalyze,

    /// One report per file, in input order
    Analyzed(Vec<FileReport>),
}

impl BatchOutcome {
    pub fn reports(&self) -> &[FileReport] {
        match self {
            BatchOutcome::NothingToAnalyze => &[],
            BatchOutcome::Analyzed(reports) => reports,
        }
    }
}

/// Decode and analyse every file
pub fn analyze_batch(
    files: &[UploadedFile],
    decoder: &dyn AudioDecoder,
    orchestrator: &AnalysisOrchestrator,
) -> BatchOutcome {
    if files.is_empty() {
        log::info!("No audio files supplied");
        return BatchOutcome::NothingToAnalyze;
    }

    log::info!("Analysing {} file(s)", files.len());

    let reports = files
        .par_iter()
        .map(|file| FileReport {
            name: file.name.clone(),
            outcome: analyze_file(file, decoder, orchestrator),
        })
        .collect::<Vec<_>>();

    for report in &reports {
        match &report.outcome {
            Ok(analysis) => log::info!(
                "{}: {} result(s), {} failure(s)",
                report.name,
                analysis.results.len(),
                analysis.failures.len()
            ),
            Err(err) => log::info!("{}: skipped ({})", report.name, err),
        }
    }

    BatchOutcome::Analyzed(reports)
}

fn analyze_file(
    file: &UploadedFile,
    decoder: &dyn AudioDecoder,
    orchestrator: &AnalysisOrchestrator,
) -> Result<AnalysisReport> {
    let signal = prepare(decoder.decode(file)?, orchestrator.config().target_sample_rate)?;
    Ok(orchestrator.analyze_configured(&signal))
}

fn prepare(signal: Signal, target_sample_rate: Option<u32>) -> Result<Signal> {
    match target_sample_rate {
        Some(rate) if rate != signal.sample_rate() => resample_to(&signal, rate),
        _ => Ok(signal),
    }
}
