//! Top-level error type wrapping every crate's own error enum.

/// Any failure surfaced through [`crate::MemoryImage`] or [`crate::MemoryImageConfig`].
#[derive(Debug, thiserror::Error)]
pub enum EventGraphError {
    /// Serializing or deserializing a value failed.
    #[error(transparent)]
    Codec(#[from] eventgraph_codec::CodecError),
    /// Emitting or applying an event failed.
    #[error(transparent)]
    Events(#[from] eventgraph_events::EventsError),
    /// A trapped wrapper call failed.
    #[error(transparent)]
    Proxy(#[from] eventgraph_proxy::ProxyError),
    /// The event log rejected an operation.
    #[error(transparent)]
    Log(#[from] eventgraph_log::LogError),
    /// Replaying a log onto a raw root failed.
    #[error(transparent)]
    Replay(#[from] eventgraph_replay::ReplayError),
    /// Committing a transaction's delta failed.
    #[error(transparent)]
    Tx(#[from] eventgraph_tx::TxError),
    /// Registering or instantiating a class failed.
    #[error(transparent)]
    Registry(#[from] eventgraph_registry::RegistryError),
}
