//! Tracing bootstrap shared by every binary in the workspace
//!
//! Logs go to the console, to a daily rolling file, or both, as plain text or
//! JSON lines. Binaries start from [`LogConfig::for_binary`], adjust it, and
//! let `LOG_*` environment variables override the result:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `LOG_LEVEL` | `trace`, `debug`, `info`, `warn`, `error` |
//! | `LOG_OUTPUT` | `console`, `file`, `both` |
//! | `LOG_FORMAT` | `text`, `json` |
//! | `LOG_DIR` / `LOG_FILE_PREFIX` | rolling file location |
//! | `LOG_FILTER` | extra comma-separated filter directives |
//! | `LOG_INCLUDE_LOCATION` / `LOG_INCLUDE_THREAD_IDS` | `true` / `false` |
//!
//! Library code never prints; it logs with structured fields:
//!
//! ```rust,ignore
//! info!(logical_date = %date, records = records.len(), "Snapshot written");
//! ```
//!
//! # Example
//!
//! ```no_run
//! use airport_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::for_binary("airport-ingest").merge_env()?;
//!     let _guard = init_logging(&config)?;
//!
//!     tracing::info!("Application started");
//!     Ok(())
//! }
//! ```

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::Directive,
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    registry::Registry,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

impl LogOutput {
    fn console(self) -> bool {
        self != LogOutput::File
    }

    fn file(self) -> bool {
        self != LogOutput::Console
    }
}

impl FromStr for LogOutput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "console" | "stdout" => LogOutput::Console,
            "file" => LogOutput::File,
            "both" | "all" => LogOutput::Both,
            other => bail!("Unknown log output '{}'", other),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => bail!("Unknown log format '{}'", other),
        })
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub output: LogOutput,
    pub format: LogFormat,
    /// Directory of the rolling log file
    pub dir: PathBuf,
    /// File name prefix; the appender adds the date
    pub file_prefix: String,
    /// Extra `target=level` directives layered over `level`
    pub directives: Vec<String>,
    pub include_location: bool,
    pub include_thread_ids: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::for_binary("airport")
    }
}

impl LogConfig {
    /// Console text logging at `info`, files named after `name`
    pub fn for_binary(name: impl Into<String>) -> Self {
        Self {
            level: Level::INFO,
            output: LogOutput::Console,
            format: LogFormat::Text,
            dir: PathBuf::from("logs"),
            file_prefix: name.into(),
            directives: Vec::new(),
            include_location: false,
            include_thread_ids: false,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Add comma-separated filter directives such as `aws_config=warn`
    pub fn with_directives(mut self, directives: &str) -> Self {
        self.directives.extend(
            directives
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
        );
        self
    }

    /// `LOG_*` environment variables win over the current values
    pub fn merge_env(mut self) -> Result<Self> {
        if let Some(level) = env_value("LOG_LEVEL") {
            self.level = level
                .parse()
                .with_context(|| format!("LOG_LEVEL has an invalid value: '{}'", level))?;
        }
        if let Some(output) = env_value("LOG_OUTPUT") {
            self.output = output.parse()?;
        }
        if let Some(format) = env_value("LOG_FORMAT") {
            self.format = format.parse()?;
        }
        if let Some(dir) = env_value("LOG_DIR") {
            self.dir = PathBuf::from(dir);
        }
        if let Some(prefix) = env_value("LOG_FILE_PREFIX") {
            self.file_prefix = prefix;
        }
        if let Some(filter) = env_value("LOG_FILTER") {
            self = self.with_directives(&filter);
        }
        if let Some(flag) = env_flag("LOG_INCLUDE_LOCATION") {
            self.include_location = flag;
        }
        if let Some(flag) = env_flag("LOG_INCLUDE_THREAD_IDS") {
            self.include_thread_ids = flag;
        }

        Ok(self)
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        self.directives.iter().try_fold(
            EnvFilter::from_default_env().add_directive(self.level.into()),
            |filter, directive| {
                let directive: Directive = directive
                    .parse()
                    .with_context(|| format!("Invalid log filter directive '{}'", directive))?;
                Ok(filter.add_directive(directive))
            },
        )
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(name: &str) -> Option<bool> {
    env_value(name).map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Keeps the non-blocking file writer alive.
///
/// Dropping it flushes buffered lines, so binaries hold it until exit.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuard> {
    let filter = config.env_filter()?;
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    let mut file_guard = None;

    if config.output.console() {
        layers.push(fmt_layer(config, std::io::stdout, true));
    }

    if config.output.file() {
        std::fs::create_dir_all(&config.dir)
            .with_context(|| format!("Failed to create log directory {}", config.dir.display()))?;

        let appender = tracing_appender::rolling::daily(&config.dir, &config.file_prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        file_guard = Some(guard);
        layers.push(fmt_layer(config, writer, false));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingGuard { _file: file_guard })
}

fn fmt_layer<W>(config: &LogConfig, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_thread_ids(config.include_thread_ids)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(FmtSpan::CLOSE);

    match config.format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_output_parsing() {
        let both: LogOutput = "ALL".parse().unwrap();
        assert!(both.console() && both.file());

        let file: LogOutput = " file ".parse().unwrap();
        assert!(!file.console() && file.file());

        assert!("syslog".parse::<LogOutput>().is_err());
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
    }

    #[test]
    fn test_binary_defaults_and_directives() {
        let config = LogConfig::for_binary("airport-ingest")
            .with_level(Level::DEBUG)
            .with_directives("aws_config=warn, ,hyper=info");

        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.output, LogOutput::Console);
        assert_eq!(config.file_prefix, "airport-ingest");
        assert_eq!(config.directives, vec!["aws_config=warn", "hyper=info"]);
        assert!(config.env_filter().is_ok());
    }

    #[test]
    fn test_invalid_filter_directive_is_rejected() {
        let config = LogConfig::default().with_directives("airport_ingest=debug,aws_config=loud");
        assert!(config.env_filter().is_err());
    }
}
