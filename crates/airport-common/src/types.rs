//! Common types used across the workspace

use crate::error::{CommonError, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Format used by schedulers for the `ds` template value.
pub const LOGICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// The date identifying a scheduled run.
///
/// Distinct from wall-clock time: a run for `2024-03-06` may execute on any
/// day and still produces artifacts named after `2024-03-06`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogicalDate(NaiveDate);

impl LogicalDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today's date in UTC, used when no scheduler supplied one.
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for LogicalDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(LOGICAL_DATE_FORMAT))
    }
}

impl std::str::FromStr for LogicalDate {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), LOGICAL_DATE_FORMAT)
            .map(Self)
            .map_err(|_| CommonError::InvalidLogicalDate {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for LogicalDate {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LogicalDate> for String {
    fn from(date: LogicalDate) -> Self {
        date.to_string()
    }
}

impl From<NaiveDate> for LogicalDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let date: LogicalDate = "2024-03-06".parse().unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert_eq!(date.to_string(), "2024-03-06");
    }

    #[test]
    fn test_display_is_zero_padded() {
        let date = LogicalDate::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(date.to_string(), "2024-01-02");
    }

    #[test]
    fn test_rejects_other_formats() {
        assert!("06.03.2024".parse::<LogicalDate>().is_err());
        assert!("2024-13-01".parse::<LogicalDate>().is_err());
        assert!("".parse::<LogicalDate>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let date: LogicalDate = "2024-03-06".parse().unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2024-03-06\"");

        let back: LogicalDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }
}
