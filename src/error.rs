//! Error types for the validation harness

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validation harness error types
///
/// Classification outcomes (PASSED/FAILED) are never errors; they are
/// returned as data in a `ValidationReport`. Only malformed input and
/// infrastructure failures surface here.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid time mark '{0}': expected MM:SS")]
    InvalidTimeMark(String),

    #[error("Invalid area: expected [x1, y1, x2, y2], got {0} values")]
    InvalidArea(usize),

    #[error("Invalid expected status '{0}': must be Approve or Reject")]
    InvalidStatus(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
