//! Error types for the ingestion pipeline
//!
//! Every variant is fatal to the run that raised it. The run controller
//! records the error verbatim as the run's failure reason.

use crate::handoff::StageId;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Which copy of a snapshot a persistence failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Local,
    Remote,
}

impl std::fmt::Display for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sink::Local => f.write_str("local"),
            Sink::Remote => f.write_str("remote"),
        }
    }
}

#[derive(Error, Debug)]
pub enum IngestError {
    /// Transport, HTTP status, or body parsing failure while paging the provider
    #[error("An error occurred during the extraction at offset {offset}: {reason}")]
    Retrieval { offset: usize, reason: String },

    /// Either snapshot sink failed; nothing already written is rolled back
    #[error("Failed to write {sink} snapshot to '{target}': {reason}")]
    Persistence {
        sink: Sink,
        target: String,
        reason: String,
    },

    /// A stage ran without the output of the stage it depends on
    #[error("Stage '{consumer}' has no input: upstream stage '{producer}' produced nothing")]
    MissingInput { producer: StageId, consumer: StageId },

    /// The downstream load collaborator rejected the enriched collection
    #[error("Load failed: {0}")]
    Load(String),

    #[error("Configuration error: {0}. Check your environment variables or secret file.")]
    Config(String),
}

impl IngestError {
    pub fn retrieval(offset: usize, reason: impl std::fmt::Display) -> Self {
        Self::Retrieval {
            offset,
            reason: reason.to_string(),
        }
    }

    pub fn persistence(
        sink: Sink,
        target: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::Persistence {
            sink,
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
