//! Output module for writing harvest results
//!
//! This module handles:
//! - The per-source JSON document of job records
//! - The JSON-lines checkpoint that lets an interrupted run resume
//! - CSV tables and raw JSON files for company filings
//! - The run summary printed at the end

mod aggregate;
mod checkpoint;
mod json;
pub mod stats;
mod table;

pub use aggregate::RecordAggregator;
pub use checkpoint::{checkpoint_path, Checkpoint, CheckpointHeader};
pub use json::{
    format_job_document, job_document_path, read_job_document, write_job_document,
    write_text_file,
};
pub use stats::{print_summary, FilingsReport, RunSummary, SourceReport};
pub use table::write_compensation_csv;

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
