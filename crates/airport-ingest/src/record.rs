//! Records and the collections that flow between stages

use serde::{Deserialize, Serialize};

/// One provider entity (an airport) as a flat field mapping.
///
/// Field contents are opaque; the pipeline only ever adds keys.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Every record returned by the provider for one run, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchedCollection(Vec<Record>);

impl FetchedCollection {
    pub fn new(records: Vec<Record>) -> Self {
        Self(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.0
    }
}

impl From<Vec<Record>> for FetchedCollection {
    fn from(records: Vec<Record>) -> Self {
        Self(records)
    }
}

/// Fetched records with provenance keys added, same order and cardinality
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrichedCollection(Vec<Record>);

impl EnrichedCollection {
    pub(crate) fn new(records: Vec<Record>) -> Self {
        Self(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.0
    }
}
