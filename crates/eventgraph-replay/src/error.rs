//! Errors raised while replaying a log onto a raw root.

use eventgraph_events::EventsError;
use eventgraph_log::LogError;

/// Errors raised by [`crate::replay`].
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// An event was recorded at the root path itself, so it has no
    /// parent/key to navigate to and apply against — every event kind
    /// targets a named field, index, or collection below the root.
    #[error("event has no parent path to navigate to")]
    RootEvent,
    /// Navigating to or past a path segment found a value that is neither a
    /// record nor a sequence, so no intermediate container could be created
    /// or descended into there.
    #[error("cannot navigate through segment {segment:?}: not a record or sequence")]
    NotNavigable {
        /// The offending path segment.
        segment: String,
    },
    /// Reading events from the log failed.
    #[error(transparent)]
    Log(#[from] LogError),
    /// Applying an event's handler failed.
    #[error(transparent)]
    Events(#[from] EventsError),
}
