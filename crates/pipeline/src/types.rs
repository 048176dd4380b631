use serde::Serialize;
use thiserror::Error;

/// Counters describing one pipeline run over a raw record list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub records_seen: usize,
    pub records_dropped: usize,
    pub dates_unrecognized: usize,
    pub amounts_defaulted: usize,
    pub issues: Vec<PipelineIssue>,
}

/// Non-fatal defects encountered while normalizing a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineIssue {
    pub record_index: usize,
    pub message: String,
}

/// The only fatal condition: the top-level input is not a record list.
/// Everything per-record is skipped or defaulted instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("expected a JSON array of visit records, got {0}")]
    NotAnArray(&'static str),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
