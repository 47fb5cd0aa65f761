//! Run controller
//!
//! Sequences one run for one logical date:
//!
//! ```text
//! PENDING -> FETCHED -> PERSISTED -> ENRICHED -> LOADED -> DONE
//!     \__________\___________\___________\________\--> FAILED
//! ```
//!
//! Stages run strictly in order and are never retried. The first failure
//! moves the run to `FAILED`, keeps the original error as the failure
//! reason, and skips every remaining stage.

use crate::config::IngestConfig;
use crate::credentials::ApiCredentials;
use crate::enricher::Enricher;
use crate::error::{IngestError, Result};
use crate::fetcher::{FilterParams, PaginatedFetcher};
use crate::handoff::{Handoff, StageId};
use crate::loader::Loader;
use crate::snapshot::{SnapshotLocation, SnapshotWriter};
use crate::storage::ObjectStore;
use airport_common::LogicalDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Pending,
    Fetched,
    Persisted,
    Enriched,
    Loaded,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }

    /// Forward transitions of the happy path; `FAILED` is reachable from any
    /// non-terminal state.
    fn can_advance_to(self, next: RunState) -> bool {
        use RunState::*;

        match (self, next) {
            (Pending, Fetched)
            | (Fetched, Persisted)
            | (Persisted, Enriched)
            | (Enriched, Loaded)
            | (Loaded, Done) => true,
            (current, Failed) => !current.is_terminal(),
            _ => false,
        }
    }
}

/// Why a run ended in `FAILED`
#[derive(Debug)]
pub struct RunFailure {
    pub stage: StageId,
    pub error: IngestError,
}

impl RunFailure {
    fn at(stage: StageId) -> impl FnOnce(IngestError) -> Self {
        move |error| Self { stage, error }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub logical_date: LogicalDate,
    /// Every state the run visited, starting with `PENDING`
    pub states: Vec<RunState>,
    pub fetched_records: Option<usize>,
    pub enriched_records: Option<usize>,
    pub snapshot: Option<SnapshotLocation>,
    pub failure: Option<RunFailure>,
}

impl RunReport {
    fn new(logical_date: LogicalDate) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            logical_date,
            states: vec![RunState::Pending],
            fetched_records: None,
            enriched_records: None,
            snapshot: None,
            failure: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::Pending)
    }

    pub fn is_success(&self) -> bool {
        self.state() == RunState::Done
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state().can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.state(),
            next
        );
        self.states.push(next);
    }

    fn fail(&mut self, failure: RunFailure) {
        self.advance(RunState::Failed);
        self.failure = Some(failure);
    }

    /// Serializable view for the CLI and logs
    pub fn summary(&self) -> RunSummary<'_> {
        RunSummary {
            run_id: self.run_id,
            logical_date: self.logical_date,
            state: self.state(),
            states: &self.states,
            fetched_records: self.fetched_records,
            enriched_records: self.enriched_records,
            snapshot: self.snapshot.as_ref(),
            failed_stage: self.failure.as_ref().map(|f| f.stage),
            failure_reason: self.failure.as_ref().map(|f| f.error.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub run_id: Uuid,
    pub logical_date: LogicalDate,
    pub state: RunState,
    pub states: &'a [RunState],
    pub fetched_records: Option<usize>,
    pub enriched_records: Option<usize>,
    pub snapshot: Option<&'a SnapshotLocation>,
    pub failed_stage: Option<StageId>,
    pub failure_reason: Option<String>,
}

pub struct RunController {
    fetcher: PaginatedFetcher,
    filter: FilterParams,
    writer: SnapshotWriter,
    enricher: Enricher,
    loader: Arc<dyn Loader>,
}

impl RunController {
    pub fn new(
        config: IngestConfig,
        credentials: ApiCredentials,
        store: Arc<dyn ObjectStore>,
        loader: Arc<dyn Loader>,
    ) -> Result<Self> {
        config.validate()?;

        let fetcher = PaginatedFetcher::new(&config.api, credentials)?;
        let filter = FilterParams::country(config.api.country.clone());
        let writer = SnapshotWriter::new(config.snapshot, store);

        Ok(Self {
            fetcher,
            filter,
            writer,
            enricher: Enricher::default(),
            loader,
        })
    }

    pub fn with_enricher(mut self, enricher: Enricher) -> Self {
        self.enricher = enricher;
        self
    }

    /// Execute one run. Failures are reported in the returned [`RunReport`].
    pub async fn run(&self, logical_date: LogicalDate) -> RunReport {
        let mut report = RunReport::new(logical_date);
        let span = info_span!("run", run_id = %report.run_id, %logical_date);

        async move {
            info!("Starting run");

            match self.execute(logical_date, &mut report).await {
                Ok(()) => info!(
                    records = report.enriched_records.unwrap_or(0),
                    "Run completed"
                ),
                Err(failure) => {
                    error!(stage = %failure.stage, error = %failure.error, "Run failed");
                    report.fail(failure);
                },
            }

            report
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        logical_date: LogicalDate,
        report: &mut RunReport,
    ) -> std::result::Result<(), RunFailure> {
        let mut fetched = Handoff::pending(StageId::FetchDataAndSave);

        let collection = self
            .fetcher
            .fetch(&self.filter)
            .await
            .map_err(RunFailure::at(StageId::FetchDataAndSave))?;
        report.fetched_records = Some(collection.len());
        report.advance(RunState::Fetched);

        let location = self
            .writer
            .write(&collection, logical_date)
            .await
            .map_err(RunFailure::at(StageId::FetchDataAndSave))?;
        report.snapshot = Some(location);
        report.advance(RunState::Persisted);

        // Published only once the snapshot is written, so nothing is
        // enriched for a run whose persistence failed.
        fetched.publish(collection);

        let enriched = self
            .enricher
            .enrich(&fetched, logical_date)
            .map_err(RunFailure::at(StageId::AddKeys))?;
        report.enriched_records = Some(enriched.len());
        report.advance(RunState::Enriched);

        self.loader
            .load(logical_date, &enriched)
            .await
            .map_err(|e| IngestError::Load(format!("{:#}", e)))
            .map_err(RunFailure::at(StageId::LoadData))?;
        report.advance(RunState::Loaded);
        report.advance(RunState::Done);

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        use RunState::*;

        let path = [Pending, Fetched, Persisted, Enriched, Loaded, Done];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_failed_reachable_from_non_terminal_states_only() {
        use RunState::*;

        for state in [Pending, Fetched, Persisted, Enriched, Loaded] {
            assert!(state.can_advance_to(Failed));
        }
        assert!(!Done.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Failed));
    }

    #[test]
    fn test_no_skipping_stages() {
        use RunState::*;

        assert!(!Pending.can_advance_to(Persisted));
        assert!(!Fetched.can_advance_to(Enriched));
        assert!(!Persisted.can_advance_to(Done));
        assert!(!Done.can_advance_to(Pending));
    }

    #[test]
    fn test_new_report_is_pending() {
        let report = RunReport::new("2024-03-06".parse().expect("valid date"));
        assert_eq!(report.state(), RunState::Pending);
        assert!(!report.is_success());
        assert_eq!(report.summary().failure_reason, None);
    }
}
