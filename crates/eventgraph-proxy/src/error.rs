//! Errors raised by the interception layer.

use eventgraph_events::EventsError;
use eventgraph_log::LogError;

/// Errors raised by a handle's trapped read/write/mutating-method calls.
///
/// Class-registry consultation happens during
/// deserialization, not here: a handle's write path installs a `Value` the
/// caller already constructed, never raw wire JSON, so there is nothing for
/// this layer to reattach a prototype to. `eventgraph-codec`'s deserializer
/// owns that seam; see its `CodecError::Class` variant.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The target addressed by a key/index does not exist or is the wrong
    /// shape for the requested operation.
    #[error("{0}")]
    InvalidTarget(String),
    /// Emitting the corresponding event failed.
    #[error(transparent)]
    Events(#[from] EventsError),
    /// Appending the emitted event to the log failed.
    #[error(transparent)]
    Log(#[from] LogError),
}
