//! Airport Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared building blocks for the airport ingestion workspace.
//!
//! - **Error Handling**: [`CommonError`] and the [`Result`] alias
//! - **Logging**: tracing subscriber bootstrap driven by [`logging::LogConfig`]
//! - **Checksums**: SHA-256 helpers used to fingerprint snapshots
//! - **Types**: [`LogicalDate`], the date that identifies a scheduled run
//!
//! # Example
//!
//! ```no_run
//! use airport_common::{LogicalDate, Result};
//!
//! fn parse(raw: &str) -> Result<LogicalDate> {
//!     raw.parse()
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;
pub mod types;

pub use error::{CommonError, Result};
pub use types::LogicalDate;
