//! Downstream warehouse load
//!
//! The warehouse itself lives outside this crate. The run controller only
//! guarantees that [`Loader::load`] is called once, after enrichment
//! succeeded, with the enriched collection.

use crate::record::EnrichedCollection;
use airport_common::LogicalDate;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(
        &self,
        logical_date: LogicalDate,
        records: &EnrichedCollection,
    ) -> anyhow::Result<()>;
}

/// Logs the hand-off and accepts it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyLoader;

#[async_trait]
impl Loader for LogOnlyLoader {
    async fn load(
        &self,
        logical_date: LogicalDate,
        records: &EnrichedCollection,
    ) -> anyhow::Result<()> {
        info!(%logical_date, records = records.len(), "Enriched records ready for warehouse load");
        Ok(())
    }
}
