#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! **eventgraph-proxy** – The interception layer:
//! transparent wrappers over the raw object graph that trap reads, writes,
//! deletes, and mutating collection methods, turning them into durable
//! [`eventgraph_events::Event`]s.
//!
//! Rust has no native proxy trap mechanism, so every trap is realized as an
//! explicit, ordinary async method on one of four handle types —
//! [`RecordHandle`], [`SequenceHandle`], [`MapHandle`], [`SetHandle`] —
//! returned from [`wrap`]/[`attach_root`]. Each holds the [`ObjectRef`] it
//! wraps plus a shared [`GraphInfra`] (canonical-path table, replay flag,
//! log handle).

mod error;
mod handle;
mod infra;
mod map;
mod record;
mod sequence;
mod set;

pub use error::ProxyError;
pub use handle::{attach_root, wrap, Handle};
pub use infra::GraphInfra;
pub use map::MapHandle;
pub use record::RecordHandle;
pub use sequence::SequenceHandle;
pub use set::SetHandle;

pub use eventgraph_types::ObjectRef;
