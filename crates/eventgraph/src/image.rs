//! The memory-image façade: wires the interception layer, event log,
//! replay engine, transaction overlay, and class registry into one handle
//! that owns each piece and offers a small surface over them.

use std::rc::Rc;
use std::sync::Arc;

use eventgraph_codec::{deserialize_snapshot, serialize_snapshot};
use eventgraph_log::{EventLog, MemoryLog};
use eventgraph_proxy::{attach_root, wrap, GraphInfra, Handle};
use eventgraph_registry::ClassRegistry;
use eventgraph_tx::Transaction;
use eventgraph_types::{Path, Value};

use crate::config::MemoryImageConfig;
use crate::error::EventGraphError;

/// An event-sourced, in-memory object graph: the raw root plus the
/// infrastructure (canonical-path table, replay flag) every wrapper needs,
/// the event log writes land in, and the class registry deserialization
/// consults.
pub struct MemoryImage {
    root: Value,
    infra: Rc<GraphInfra>,
    log: Arc<dyn EventLog>,
    registry: ClassRegistry,
}

impl MemoryImage {
    /// Wrap `value` as a fresh image with an empty event log.
    pub fn from_value(value: Value, registry: ClassRegistry, config: MemoryImageConfig) -> Self {
        let log: Arc<dyn EventLog> = Arc::new(MemoryLog::with_buffer_size(config.broadcast_capacity));
        let infra = Rc::new(GraphInfra::new(log.clone()));
        infra.assign_paths(&value, &Path::root());
        tracing::debug!("opened memory image over a fresh value");
        Self { root: value, infra, log, registry }
    }

    /// Construct an image by replaying every event already recorded in
    /// `log` onto a fresh root.
    pub async fn from_log(log: Arc<dyn EventLog>, registry: ClassRegistry) -> Result<Self, EventGraphError> {
        let root = Value::new_record();
        let infra = Rc::new(GraphInfra::new(log.clone()));
        eventgraph_replay::replay(log.as_ref(), &root, &registry, &infra).await?;
        tracing::debug!("replayed existing log onto a fresh root");
        Ok(Self { root, infra, log, registry })
    }

    /// The wrapped root: every read/write/mutating method
    /// traps through to the event log unless a replay is in progress.
    pub fn root(&self) -> Handle {
        wrap(self.root.clone(), &self.infra)
    }

    /// The raw infrastructure, for advanced use.
    pub fn infra(&self) -> &Rc<GraphInfra> {
        &self.infra
    }

    /// The event log this image's wrappers append to.
    pub fn log(&self) -> &Arc<dyn EventLog> {
        &self.log
    }

    /// The class registry consulted when deserializing into this image.
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Mutable access to the class registry, for registering classes before
    /// deserializing data that depends on them.
    pub fn registry_mut(&mut self) -> &mut ClassRegistry {
        &mut self.registry
    }

    /// Serialize the raw root in snapshot mode.
    pub fn snapshot(&self) -> serde_json::Value {
        serialize_snapshot(&self.root)
    }

    /// Reconstruct a raw root from a snapshot. A static helper, since the result is a
    /// detached `Value` the caller then hands to [`Self::from_value`] —
    /// deserializing does not by itself open an image.
    pub fn deserialize_into(json: &serde_json::Value, registry: &ClassRegistry) -> Result<Value, EventGraphError> {
        Ok(deserialize_snapshot(json, registry)?)
    }

    /// Replay every event in `log` onto this image's existing root, e.g. to catch up after reopening a
    /// durable backend that outlived this process.
    pub async fn replay_from_log(&self, log: &dyn EventLog) -> Result<(), EventGraphError> {
        eventgraph_replay::replay(log, &self.root, &self.registry, &self.infra).await?;
        Ok(())
    }

    /// Re-attach `value` as this image's canonical root, as though it had
    /// just been deserialized into a fresh image.
    pub fn attach(&self, value: Value) -> Handle {
        attach_root(value, &self.infra)
    }

    /// Open a transaction over this image's current root.
    /// The transaction's delta is independent until [`Self::save`] commits
    /// it through this image's infrastructure and log.
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.root.clone())
    }

    /// Commit `tx`'s delta through this image's infrastructure, appending
    /// the same events a live wrapper's writes would have produced.
    pub async fn save(&self, tx: &Transaction) -> Result<(), EventGraphError> {
        tx.save(&self.infra).await?;
        Ok(())
    }
}
