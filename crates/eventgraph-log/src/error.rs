//! Errors raised by an [`crate::EventLog`] backend.

/// Errors an event log backend can raise.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The backend does not implement this optional operation.
    #[error("operation {0:?} is not supported by this log backend")]
    Unsupported(&'static str),
    /// The log was closed and every operation but a repeat `close` now
    /// fails.
    #[error("event log is closed")]
    Closed,
    /// The backend failed for a reason specific to its storage medium.
    #[error("event log backend error: {0}")]
    Backend(String),
}
