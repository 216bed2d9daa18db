//! The event log contract: minimal enough that a file, a
//! key-value store, or a browser-local database can all implement it, with
//! `read_all` plus append as the only operations every backend must support.

use async_trait::async_trait;
use eventgraph_events::Event;
use futures::stream::{self, BoxStream};

use crate::error::LogError;

/// An append-only log of [`Event`]s. Order across `append` and a subsequent
/// `read_all`/`stream` must be preserved.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Durably record `event` as the next entry in the log.
    async fn append(&self, event: Event) -> Result<(), LogError>;

    /// Return every event recorded so far, in append order.
    async fn read_all(&self) -> Result<Vec<Event>, LogError>;

    /// A lazy sequence over the log's events, for memory-bounded replay of
    /// large logs. The default implementation eagerly loads everything via
    /// [`read_all`](EventLog::read_all) and turns it into a stream — a real
    /// backend with a cursor-based read path should override this.
    async fn stream(&self) -> Result<BoxStream<'static, Result<Event, LogError>>, LogError> {
        let events = self.read_all().await?;
        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }

    /// Erase every recorded event. Optional; a backend that cannot support
    /// this (e.g. an append-only file) should leave the default.
    async fn clear(&self) -> Result<(), LogError> {
        Err(LogError::Unsupported("clear"))
    }

    /// Idempotently release backend resources. After a successful close,
    /// every other operation must fail with [`LogError::Closed`]. The
    /// default is a no-op for backends with nothing to release.
    async fn close(&self) -> Result<(), LogError> {
        Ok(())
    }
}
