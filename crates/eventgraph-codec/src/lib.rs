#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! **eventgraph-codec** – Serializer and deserializer between the in-memory
//! [`eventgraph_types::Value`] tree and its JSON wire encoding.
//!
//! Two serialization modes exist:
//!
//! - **Snapshot mode** ([`ser::serialize_snapshot`]/[`de::deserialize_snapshot`]):
//!   a single global visited table, every reference an absolute path from
//!   the snapshot's own root.
//! - **Event-value mode** ([`ser::serialize_event_value`]/[`de::deserialize_event_value`]):
//!   used when writing a single value into an event payload. Objects already
//!   reachable elsewhere in the graph ("external") are always written as an
//!   absolute `{type:"ref", path}` pointing at their canonical location.
//!   Objects newly introduced by the value being written ("local") are
//!   materialized inline on first encounter and referenced by a path
//!   relative to the value's own root thereafter.
//!
//! This crate does not own canonical paths or identity tables — those are
//! `eventgraph-proxy`'s concern. It depends on the [`ExternalPathLookup`]
//! trait as a seam so it does not need to depend on `eventgraph-proxy`
//! (which would create a cycle, since proxy needs the codec to emit events).

mod de;
mod error;
mod ser;

pub use de::{deserialize_event_value, deserialize_snapshot, EventValueResolver, SnapshotResolver};
pub use error::CodecError;
pub use ser::{serialize_event_value, serialize_snapshot};

use eventgraph_types::{ObjectRef, Path};

/// A seam into the proxy layer's canonical-path bookkeeping, so the codec
/// can decide whether an object encountered during an event-value write is
/// "local" (newly introduced by this value) or "external" (already
/// reachable elsewhere) without depending on `eventgraph-proxy` directly.
pub trait ExternalPathLookup {
    /// The object's canonical path in the memory image, if it has already
    /// been assigned one (i.e. it is reachable from the root independent of
    /// the value currently being written).
    fn canonical_path(&self, target: &ObjectRef) -> Option<Path>;
}
