#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! **eventgraph-events** – The 18 mutation event kinds and
//! their emit/apply handlers.
//!
//! A trapped mutation on the in-memory object graph becomes a [`Mutation`];
//! [`emit`] turns it into a durable [`Event`] by running its arguments
//! through `eventgraph-codec`'s event-value serializer. [`apply`] is the
//! replay-side mirror: given a previously-recorded `Event` and the
//! `(parent, key)` pair the replay engine resolved for it, it deserializes
//! the payload and mutates `parent[key]` the same way the original call did.

mod container;
mod error;
mod event;
mod handler;
mod handlers;
mod mutation;

pub use container::{default_cmp, get_child, remove_child, resolve_index, set_child};
pub use error::EventsError;
pub use event::Event;
pub use handler::{apply, emit, register_handler, EventHandler};
pub use handlers::install_builtin_handlers;
pub use mutation::Mutation;
