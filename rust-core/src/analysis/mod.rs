//! Analysis orchestration: per-signal fan-out, result types, batches

pub mod batch;
pub mod orchestrator;
pub mod result;

pub use batch::{analyze_batch, BatchOutcome, FileReport};
pub use orchestrator::AnalysisOrchestrator;
pub use result::{AnalysisOutput, AnalysisReport};
