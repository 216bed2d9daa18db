#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! **eventgraph-log** – The event log contract plus
//! [`MemoryLog`], the in-memory reference backend. Durable backends (file,
//! key-value store, browser-local database) are external collaborators out
//! of this crate's scope; they need only implement [`EventLog`].

mod error;
mod log;
mod memory;

pub use error::LogError;
pub use log::EventLog;
pub use memory::MemoryLog;
