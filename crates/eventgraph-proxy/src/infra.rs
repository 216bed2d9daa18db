//! Shared infrastructure a wrapper needs to trap reads/writes.
//!
//! Rust has no weak hash maps in std and `RecordHandle`/`SequenceHandle`/
//! `MapHandle`/`SetHandle` carry no state of their own beyond the target
//! they wrap — any two handles constructed from the same [`ObjectRef`]
//! observe and mutate the same underlying cell and compare equal via
//! `Rc::ptr_eq`. Reusing the same wrapper for repeated reads of the same
//! target is therefore satisfied without a literal wrapper↔wrapper cache; the only
//! bookkeeping table actually load-bearing in this realization is the
//! target→canonical-path table, since `eventgraph-codec`'s event-value
//! serializer needs it to tell "already reachable elsewhere" (external)
//! apart from "newly introduced by this write" (local). See DESIGN.md.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use chrono::Utc;
use eventgraph_codec::ExternalPathLookup;
use eventgraph_events::Mutation;
use eventgraph_log::EventLog;
use eventgraph_types::{GraphObject, ObjectRef, Path, Value};

use crate::error::ProxyError;

fn identity(target: &ObjectRef) -> usize {
    Rc::as_ptr(target) as usize
}

/// Per-memory-image state shared by every wrapper: the
/// target→canonical-path table and the process-wide replay flag, plus a
/// handle to the event log wrappers append to.
pub struct GraphInfra {
    log: Arc<dyn EventLog>,
    paths: std::cell::RefCell<HashMap<usize, Path>>,
    replaying: Cell<bool>,
}

impl GraphInfra {
    /// A fresh infra backed by `log`, with no paths assigned yet.
    pub fn new(log: Arc<dyn EventLog>) -> Self {
        Self { log, paths: std::cell::RefCell::new(HashMap::new()), replaying: Cell::new(false) }
    }

    /// The event log wrappers append emitted events to.
    pub fn log(&self) -> &Arc<dyn EventLog> {
        &self.log
    }

    /// True while the replay engine is applying recorded events, during
    /// which traps must not re-emit.
    pub fn is_replaying(&self) -> bool {
        self.replaying.get()
    }

    /// Set the replay flag. Only the replay engine should call this
    ///.
    pub fn set_replaying(&self, value: bool) {
        self.replaying.set(value);
    }

    /// Assign `target`'s canonical path if it does not already have one.
    /// Write-once: a later call for the same target is a no-op, even if
    /// the object has since moved or been aliased elsewhere.
    pub fn assign_path(&self, target: &ObjectRef, path: Path) {
        self.paths.borrow_mut().entry(identity(target)).or_insert(path);
    }

    /// Recursively assign canonical paths to `value` and every object
    /// reachable from it, rooted at `at`. Stops descending into any subtree whose root is
    /// already assigned — it is by definition already reachable, and in a
    /// cyclic graph this is also what keeps the walk finite. Path shapes
    /// mirror `eventgraph-codec::ser`'s own recursion exactly, since the
    /// codec's "does this canonical path fall under the value being
    /// written" check depends on the two agreeing.
    pub fn assign_paths(&self, value: &Value, at: &Path) {
        let Value::Object(obj) = value else { return };
        let id = identity(obj);
        if self.paths.borrow().contains_key(&id) {
            return;
        }
        self.paths.borrow_mut().insert(id, at.clone());
        match &*obj.borrow() {
            GraphObject::Record(record) => {
                for (key, child) in record.iter() {
                    self.assign_paths(child, &at.child(key));
                }
            }
            GraphObject::Sequence(items) => {
                for (i, child) in items.iter().enumerate() {
                    self.assign_paths(child, &at.child_index(i));
                }
            }
            GraphObject::KeyedMap(map) => {
                for (i, (k, v)) in map.iter().enumerate() {
                    self.assign_paths(k, &at.child_index(i).child("k"));
                    self.assign_paths(v, &at.child_index(i).child("v"));
                }
            }
            GraphObject::UniqueSet(items) => {
                for (i, child) in items.iter().enumerate() {
                    self.assign_paths(child, &at.child_index(i));
                }
            }
        }
    }
    /// Emit the event for `mutation` at `path` and append it to the log,
    /// unless the replay flag is set.
    pub async fn record(&self, path: &Path, mutation: Mutation) -> Result<(), ProxyError> {
        if self.is_replaying() {
            tracing::trace!(%path, kind = mutation.kind(), "suppressing emission during replay");
            return Ok(());
        }
        let event = eventgraph_events::emit(path, mutation, self, Utc::now())?;
        self.log.append(event).await?;
        Ok(())
    }
}

impl ExternalPathLookup for GraphInfra {
    fn canonical_path(&self, target: &ObjectRef) -> Option<Path> {
        self.paths.borrow().get(&identity(target)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventgraph_log::MemoryLog;

    fn infra() -> GraphInfra {
        GraphInfra::new(Arc::new(MemoryLog::new()))
    }

    #[test]
    fn assigns_path_once() {
        let infra = infra();
        let root = Value::new_record();
        let Value::Object(obj) = &root else { unreachable!() };
        infra.assign_path(obj, Path::root());
        infra.assign_path(obj, Path::from_dotted("elsewhere"));
        assert_eq!(infra.canonical_path(obj), Some(Path::root()));
    }

    #[test]
    fn recursive_assignment_covers_nested_objects() {
        let infra = infra();
        let root = Value::new_record();
        let child = Value::new_record();
        if let (Value::Object(r), Value::Object(_)) = (&root, &child) {
            if let GraphObject::Record(rec) = &mut *r.borrow_mut() {
                rec.set("dept", child.clone());
            }
        }
        infra.assign_paths(&root, &Path::root());
        let Value::Object(child_obj) = &child else { unreachable!() };
        assert_eq!(infra.canonical_path(child_obj), Some(Path::from_dotted("dept")));
    }

    #[test]
    fn stops_at_a_cycle() {
        let infra = infra();
        let root = Value::new_record();
        if let Value::Object(r) = &root {
            if let GraphObject::Record(rec) = &mut *r.borrow_mut() {
                rec.set("self", root.clone());
            }
        }
        infra.assign_paths(&root, &Path::root());
        let Value::Object(obj) = &root else { unreachable!() };
        assert_eq!(infra.canonical_path(obj), Some(Path::root()));
    }
}
