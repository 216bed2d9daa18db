//! In-memory reference [`EventLog`] backend: a `Vec`-backed store plus a
//! broadcast channel for live updates.

use async_trait::async_trait;
use eventgraph_events::Event;
use futures::stream::{self, BoxStream};
use tokio::sync::{broadcast, RwLock};

use crate::error::LogError;
use crate::log::EventLog;

/// Default buffer size for the live event broadcast channel.
const DEFAULT_BUFFER: usize = 1024;

/// An in-memory, non-persistent event log. The only backend this crate
/// ships; useful directly for tests and for any host embedding
/// eventgraph without durable storage.
pub struct MemoryLog {
    events: RwLock<Vec<Event>>,
    closed: RwLock<bool>,
    broadcast_tx: broadcast::Sender<Event>,
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLog {
    /// An empty log with the default broadcast buffer size.
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER)
    }

    /// An empty log with a custom live-update broadcast buffer size
    /// (`MemoryImageConfig::broadcast_capacity`).
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(buffer_size);
        Self { events: RwLock::new(Vec::new()), closed: RwLock::new(false), broadcast_tx }
    }

    /// Subscribe to the live stream of appended events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.broadcast_tx.subscribe()
    }

    async fn ensure_open(&self) -> Result<(), LogError> {
        if *self.closed.read().await {
            Err(LogError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EventLog for MemoryLog {
    async fn append(&self, event: Event) -> Result<(), LogError> {
        self.ensure_open().await?;
        self.events.write().await.push(event.clone());
        // Ignore errors: no subscribers is not a failure.
        let _ = self.broadcast_tx.send(event);
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Event>, LogError> {
        self.ensure_open().await?;
        Ok(self.events.read().await.clone())
    }

    async fn stream(&self) -> Result<BoxStream<'static, Result<Event, LogError>>, LogError> {
        let events = self.read_all().await?;
        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }

    async fn clear(&self) -> Result<(), LogError> {
        self.ensure_open().await?;
        self.events.write().await.clear();
        Ok(())
    }

    async fn close(&self) -> Result<(), LogError> {
        *self.closed.write().await = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eventgraph_types::Path;

    fn sample_event(name: &str) -> Event {
        Event::PropertyWrite {
            path: Path::from_dotted(name),
            value: serde_json::json!(name),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_preserves_order() {
        let log = MemoryLog::new();
        log.append(sample_event("a")).await.unwrap();
        log.append(sample_event("b")).await.unwrap();

        let all = log.read_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].path().to_dotted(), "a");
        assert_eq!(all[1].path().to_dotted(), "b");
    }

    #[tokio::test]
    async fn clear_empties_the_log() {
        let log = MemoryLog::new();
        log.append(sample_event("a")).await.unwrap();
        log.clear().await.unwrap();
        assert!(log.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn closed_log_rejects_further_operations() {
        let log = MemoryLog::new();
        log.append(sample_event("a")).await.unwrap();
        log.close().await.unwrap();

        assert!(matches!(log.append(sample_event("b")).await, Err(LogError::Closed)));
        assert!(matches!(log.read_all().await, Err(LogError::Closed)));
    }

    #[tokio::test]
    async fn stream_yields_every_event() {
        use futures::StreamExt;

        let log = MemoryLog::new();
        log.append(sample_event("a")).await.unwrap();
        log.append(sample_event("b")).await.unwrap();

        let collected: Vec<_> = log.stream().await.unwrap().collect().await;
        assert_eq!(collected.len(), 2);
    }
}
