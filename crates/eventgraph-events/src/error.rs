//! Configuration-class errors for event emission/application.

use eventgraph_codec::CodecError;

/// Errors raised while emitting or applying an event.
#[derive(Debug, thiserror::Error)]
pub enum EventsError {
    /// No handler is registered for this kind.
    #[error("unknown event kind {0:?}")]
    UnknownKind(String),
    /// The mutation passed to `emit` did not match the kind the caller
    /// asked for (e.g. calling the sequence-push handler with a
    /// `Mutation::MapSet`).
    #[error("handler for {expected:?} received a {actual:?} mutation")]
    MutationMismatch {
        /// The handler's own kind.
        expected: &'static str,
        /// The mutation's actual kind.
        actual: &'static str,
    },
    /// `apply` was asked to mutate a parent that is not the collection type
    /// its kind expects (e.g. a sequence event applied to a record).
    #[error("cannot apply {kind} to a {parent_kind} at the target path")]
    WrongParentType {
        /// The event's kind.
        kind: &'static str,
        /// What the parent actually is.
        parent_kind: &'static str,
    },
    /// An index, key, or range in the event payload does not exist on the
    /// target during apply.
    #[error("{0}")]
    OutOfRange(String),
    /// Serializing or deserializing the event's payload value failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}
