//! Errors raised while committing or navigating a transaction's delta.

use eventgraph_events::EventsError;
use eventgraph_proxy::ProxyError;

/// Errors raised by [`crate::Transaction::save`] and the handles it dispatches
/// through.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    /// A delta entry was recorded at the root path itself, so it has no
    /// parent to navigate to and commit against.
    #[error("delta entry has no parent path to navigate to")]
    RootEntry,
    /// Navigating to a delta entry's parent in the base graph found a value
    /// that is neither a record, a sequence, nor a keyed map, so the entry
    /// cannot be committed there.
    #[error("cannot navigate through segment {segment:?}: not a record, sequence, or map")]
    NotNavigable {
        /// The offending path segment.
        segment: String,
    },
    /// A delta entry addresses a keyed-map key whose original [`eventgraph_types::Value`]
    /// was not recorded in the transaction's key table — should not happen
    /// for any key written through [`crate::TxMapHandle`].
    #[error("no original key recorded for map entry segment {segment:?}")]
    UnknownMapKey {
        /// The path segment the key could not be recovered from.
        segment: String,
    },
    /// Recording the committed mutation's event failed.
    #[error(transparent)]
    Proxy(#[from] ProxyError),
    /// Applying a mutation to the base graph failed.
    #[error(transparent)]
    Events(#[from] EventsError),
}
