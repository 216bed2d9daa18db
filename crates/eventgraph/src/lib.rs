#![deny(missing_docs)]

//! **eventgraph** – Event-sourced transparent persistence for an in-memory
//! object graph.
//!
//! [`MemoryImage`] is the top-level handle: it owns the raw object graph
//! root, the interception infrastructure ([`eventgraph_proxy::GraphInfra`]),
//! the event log, and the class registry, and wires them together into one
//! façade. Everything below this crate — type classification, event
//! schema, serialization, the interception layer, the log contract,
//! replay, and the transaction overlay — is reusable on its own; this crate
//! is the assembly, not another layer of logic.
//!
//! `#![forbid(unsafe_code)]` is deliberately not set here: [`MemoryImage`]
//! is `Rc`-based like every crate below it, so this crate carries no unsafe
//! code of its own, but it re-exports `Handle`/`TxHandle` variants whose
//! construction happens in the lower crates, not here.

mod config;
mod error;
mod image;

pub use config::MemoryImageConfig;
pub use error::EventGraphError;
pub use image::MemoryImage;

pub use eventgraph_codec::{serialize_event_value, serialize_snapshot, ExternalPathLookup};
pub use eventgraph_events::Event;
pub use eventgraph_log::{EventLog, LogError, MemoryLog};
pub use eventgraph_proxy::{GraphInfra, Handle, MapHandle, RecordHandle, SequenceHandle, SetHandle};
pub use eventgraph_registry::{ClassFactory, ClassInstance, ClassRegistry, PlainClassInstance};
pub use eventgraph_tx::{Transaction, TxError, TxHandle};
pub use eventgraph_types::{GraphObject, ObjectRef, Path, Value};
