//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Invalid logical date '{value}': expected YYYY-MM-DD")]
    InvalidLogicalDate { value: String },
}
