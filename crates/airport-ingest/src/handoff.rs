//! Typed hand-off between pipeline stages
//!
//! A stage publishes its output into a [`Handoff`] owned by the run. The
//! consuming stage asks for it with [`Handoff::require`], which fails with
//! [`IngestError::MissingInput`] when the producer never published.

use crate::error::{IngestError, Result};
use serde::Serialize;

/// Identifiers of the pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Fetch every page and persist the snapshot
    FetchDataAndSave,
    /// Add provenance keys to every record
    AddKeys,
    /// Hand the enriched records to the warehouse loader
    LoadData,
}

impl StageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::FetchDataAndSave => "fetch_data_and_save",
            StageId::AddKeys => "add_keys",
            StageId::LoadData => "load_data",
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output slot of one stage, scoped to a single run
#[derive(Debug)]
pub struct Handoff<T> {
    producer: StageId,
    payload: Option<T>,
}

impl<T> Handoff<T> {
    /// Empty slot waiting for `producer`
    pub fn pending(producer: StageId) -> Self {
        Self {
            producer,
            payload: None,
        }
    }

    /// Slot already holding the producer's output
    pub fn ready(producer: StageId, payload: T) -> Self {
        Self {
            producer,
            payload: Some(payload),
        }
    }

    pub fn producer(&self) -> StageId {
        self.producer
    }

    pub fn is_ready(&self) -> bool {
        self.payload.is_some()
    }

    /// Publish the producer's output, replacing anything published before.
    pub fn publish(&mut self, payload: T) {
        self.payload = Some(payload);
    }

    pub fn require(&self, consumer: StageId) -> Result<&T> {
        self.payload.as_ref().ok_or(IngestError::MissingInput {
            producer: self.producer,
            consumer,
        })
    }
}
