//! Provenance enrichment
//!
//! Adds two keys to each fetched record: when it was transformed (wall-clock)
//! and which run produced it (the logical date).

use crate::error::Result;
use crate::handoff::{Handoff, StageId};
use crate::record::{EnrichedCollection, FetchedCollection};
use airport_common::LogicalDate;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

pub const TRANSFORMATION_TIMESTAMP_KEY: &str = "transformation_timestamp";
pub const DATA_INTERVAL_START_KEY: &str = "data_interval_start";

/// Source of the wall-clock time written into each record
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct Enricher {
    clock: Clock,
}

impl Default for Enricher {
    fn default() -> Self {
        Self {
            clock: Arc::new(Utc::now),
        }
    }
}

impl Enricher {
    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Enrich the fetch stage's output.
    ///
    /// Fails with `MissingInput` when the fetch stage never published.
    #[instrument(skip(self, input), fields(producer = %input.producer()))]
    pub fn enrich(
        &self,
        input: &Handoff<FetchedCollection>,
        logical_date: LogicalDate,
    ) -> Result<EnrichedCollection> {
        let fetched = input.require(StageId::AddKeys)?;
        let enriched = self.enrich_collection(fetched, logical_date);

        info!(records = enriched.len(), %logical_date, "Added provenance keys");

        Ok(enriched)
    }

    /// Copy every record and stamp it, preserving order and cardinality.
    ///
    /// Each output record normally has two more keys than its input. A
    /// provider record that already carries `transformation_timestamp` or
    /// `data_interval_start` has that value overwritten, so it gains fewer.
    pub fn enrich_collection(
        &self,
        fetched: &FetchedCollection,
        logical_date: LogicalDate,
    ) -> EnrichedCollection {
        let interval_start = Value::String(logical_date.to_string());

        let records = fetched
            .records()
            .iter()
            .map(|record| {
                let mut record = record.clone();
                let stamped_at = (self.clock)().to_rfc3339_opts(SecondsFormat::Micros, true);
                record.insert(TRANSFORMATION_TIMESTAMP_KEY.to_string(), Value::String(stamped_at));
                record.insert(DATA_INTERVAL_START_KEY.to_string(), interval_start.clone());
                record
            })
            .collect();

        EnrichedCollection::new(records)
    }
}
