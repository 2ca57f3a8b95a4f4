//! Output module for serializing harvest results
//!
//! This module handles:
//! - Encoding records as the JSON output document
//! - Writing the document to disk
//! - Recording and printing harvest statistics

mod encoder;
mod json;
pub mod stats;

pub use encoder::{encode_records, escape_json};
pub use json::write_json_document;
pub use stats::{print_statistics, CrawlStatistics, SkipKind, SkippedItem};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

impl From<OutputError> for crate::HarvestError {
    fn from(error: OutputError) -> Self {
        match error {
            OutputError::Write { path, source } => {
                crate::HarvestError::OutputWriteFailed { path, source }
            }
        }
    }
}
