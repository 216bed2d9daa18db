//! Global name→handler registry, a process-wide `Lazy<RwLock<HashMap<...>>>`
//! mapping an event kind to the function that applies it during replay.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use eventgraph_codec::ExternalPathLookup;
use eventgraph_registry::ClassRegistry;
use eventgraph_types::{Path, Value};
use once_cell::sync::Lazy;

use crate::error::EventsError;
use crate::event::Event;
use crate::mutation::Mutation;

/// A single event kind's emit/apply pair.
pub trait EventHandler: Send + Sync {
    /// The kind tag this handler owns, e.g. `"property-write"`.
    fn kind(&self) -> &'static str;

    /// Serialize `mutation`'s arguments (via the event-value serializer,
    /// `currentPath = path`) and assemble the event.
    fn emit(
        &self,
        path: &Path,
        mutation: Mutation,
        external: &dyn ExternalPathLookup,
        timestamp: DateTime<Utc>,
    ) -> Result<Event, EventsError>;

    /// Deserialize the event's payload (with `root` as external scope,
    /// reattaching any class-marked record via `registry`) and mutate
    /// `parent[key]` accordingly.
    fn apply(
        &self,
        event: &Event,
        parent: &Value,
        key: &str,
        root: &Value,
        registry: &ClassRegistry,
    ) -> Result<(), EventsError>;
}

static REGISTRY: Lazy<RwLock<HashMap<&'static str, Arc<dyn EventHandler>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a handler, keyed by its own [`EventHandler::kind`]. Called once
/// at startup by [`crate::install_builtin_handlers`]; re-registering the
/// same kind replaces the previous handler.
pub fn register_handler(handler: Arc<dyn EventHandler>) {
    REGISTRY.write().expect("handler registry lock poisoned").insert(handler.kind(), handler);
}

fn lookup(kind: &str) -> Result<Arc<dyn EventHandler>, EventsError> {
    REGISTRY
        .read()
        .expect("handler registry lock poisoned")
        .get(kind)
        .cloned()
        .ok_or_else(|| EventsError::UnknownKind(kind.to_string()))
}

/// Emit an event for `mutation` at `path`, dispatching to the handler
/// registered for `mutation.kind()`.
pub fn emit(
    path: &Path,
    mutation: Mutation,
    external: &dyn ExternalPathLookup,
    timestamp: DateTime<Utc>,
) -> Result<Event, EventsError> {
    let handler = lookup(mutation.kind())?;
    handler.emit(path, mutation, external, timestamp)
}

/// Apply a previously-recorded event, dispatching to the handler registered
/// for `event.kind()`.
pub fn apply(
    event: &Event,
    parent: &Value,
    key: &str,
    root: &Value,
    registry: &ClassRegistry,
) -> Result<(), EventsError> {
    let handler = lookup(event.kind())?;
    handler.apply(event, parent, key, root, registry)
}
