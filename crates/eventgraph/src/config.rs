//! Ambient runtime configuration for a [`crate::MemoryImage`]: a small,
//! `Default`-able settings struct that sizes the in-memory log's
//! live-update broadcast buffer.

/// Configuration for a fresh [`crate::MemoryImage`]. Nothing here is
/// storage-backend-specific — durable backends are external collaborators
/// out of scope — it only sizes the live-update broadcast
/// channel the in-memory log exposes.
#[derive(Debug, Clone)]
pub struct MemoryImageConfig {
    /// Buffer size for [`eventgraph_log::MemoryLog`]'s live-update broadcast
    /// channel. A slow subscriber that falls behind this many events loses
    /// the oldest ones rather than blocking appenders.
    pub broadcast_capacity: usize,
}

impl Default for MemoryImageConfig {
    fn default() -> Self {
        Self { broadcast_capacity: 1024 }
    }
}
