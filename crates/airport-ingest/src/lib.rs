//! Airport Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Pulls the provider's airport collection for one logical date, persists it
//! as a dated snapshot (local disk and object storage), stamps every record
//! with provenance keys, and hands the result to the warehouse loader.
//!
//! # Pipeline
//!
//! - [`fetcher`]: exhaustive paginated retrieval
//! - [`snapshot`]: deterministic naming and write-once persistence
//! - [`enricher`]: provenance keys, run only after persistence succeeded
//! - [`loader`]: downstream collaborator, invoked last
//! - [`controller`]: sequences the stages and tracks the run state
//!
//! # Example
//!
//! ```no_run
//! use airport_ingest::{
//!     ApiCredentials, IngestConfig, LogOnlyLoader, RunController, S3ObjectStore,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::from_env()?;
//!     let store = Arc::new(S3ObjectStore::new(config.storage.clone()));
//!     let controller = RunController::new(
//!         config,
//!         ApiCredentials::from_env()?,
//!         store,
//!         Arc::new(LogOnlyLoader),
//!     )?;
//!
//!     let report = controller.run("2024-03-06".parse()?).await;
//!     assert!(report.is_success());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod credentials;
pub mod enricher;
pub mod error;
pub mod fetcher;
pub mod handoff;
pub mod loader;
pub mod record;
pub mod snapshot;
pub mod storage;

pub use config::IngestConfig;
pub use controller::{RunController, RunFailure, RunReport, RunState};
pub use credentials::ApiCredentials;
pub use enricher::Enricher;
pub use error::{IngestError, Result};
pub use fetcher::{FilterParams, PaginatedFetcher};
pub use handoff::{Handoff, StageId};
pub use loader::{LogOnlyLoader, Loader};
pub use record::{EnrichedCollection, FetchedCollection, Record};
pub use snapshot::{SnapshotLocation, SnapshotName, SnapshotWriter};
pub use storage::{MemoryObjectStore, ObjectStore, S3ObjectStore, StorageConfig};

pub use airport_common::LogicalDate;
