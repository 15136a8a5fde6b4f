//! Breach lookup error types.

use thiserror::Error;

/// Result type for breach lookups.
pub type BreachResult<T> = Result<T, BreachError>;

/// Errors from the breach range service.
///
/// Every variant means "advisory unavailable": callers must treat a failed
/// check as unknown — never as proof of a clean password — and must not
/// block their primary save/submit action on it.
#[derive(Debug, Error)]
pub enum BreachError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("range service returned status {status}")]
    Service { status: u16 },
}
