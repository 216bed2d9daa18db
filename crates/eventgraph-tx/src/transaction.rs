//! Transaction-mode overlay entry point: a base root plus a
//! shared [`TxContext`], handed out as a [`TxHandle`] and committed or
//! discarded as a unit.

use eventgraph_events::Mutation;
use eventgraph_proxy::GraphInfra;
use eventgraph_types::{value_eq, GraphObject, Path, Value};

use crate::context::TxContext;
use crate::delta::{Checkpoint, DeltaValue};
use crate::error::TxError;
use crate::handle::{wrap, TxHandle};

/// A transaction over a base object graph: reads fall through to `root`,
/// writes land in a delta that only the base graph sees once [`Self::save`]
/// commits it.
pub struct Transaction {
    root: Value,
    ctx: std::rc::Rc<TxContext>,
}

impl Transaction {
    /// Open a transaction over `root`.
    pub fn new(root: Value) -> Self {
        Self { root, ctx: TxContext::new() }
    }

    /// The transaction-scoped view of the root.
    pub fn root(&self) -> TxHandle {
        wrap(self.root.clone(), Path::root(), self.ctx.clone())
    }

    /// True if any write has been made since the last save or discard.
    pub fn is_dirty(&self) -> bool {
        self.ctx.delta.borrow().size() > 0
    }

    /// Snapshot the current delta for later [`Self::restore`].
    pub fn checkpoint(&self) -> Checkpoint {
        self.ctx.delta.borrow().checkpoint()
    }

    /// Roll the delta back to a previously taken [`Checkpoint`].
    pub fn restore(&self, checkpoint: Checkpoint) {
        self.ctx.delta.borrow_mut().restore(checkpoint);
    }

    /// Drop every pending write; the base graph is left untouched.
    pub fn discard(&self) {
        self.ctx.delta.borrow_mut().clear();
        self.ctx.map_keys.borrow_mut().clear();
    }

    /// Commit every delta entry to the base graph, in ascending path-depth
    /// order so a parent write lands before any child write depending on it
    ///, emitting
    /// the matching event for each through `infra` exactly as a live
    /// wrapper's trapped write would. Clears the delta on success.
    pub async fn save(&self, infra: &GraphInfra) -> Result<(), TxError> {
        for (path, value) in self.ctx.delta.borrow().entries() {
            let (parent_path, key_segment) = path.split_last().ok_or(TxError::RootEntry)?;
            let parent = navigate(&self.root, &parent_path, &self.ctx)?;
            let Value::Object(parent_obj) = &parent else {
                return Err(TxError::NotNavigable { segment: key_segment.to_string() });
            };
            let parent_is_map = matches!(&*parent_obj.borrow(), GraphObject::KeyedMap(_));
            if parent_is_map {
                let key = self
                    .ctx
                    .recall_key(key_segment)
                    .ok_or_else(|| TxError::UnknownMapKey { segment: key_segment.to_string() })?;
                match value {
                    DeltaValue::Deleted => {
                        if let GraphObject::KeyedMap(m) = &mut *parent_obj.borrow_mut() {
                            m.remove(&key);
                        }
                        infra.record(&parent_path, Mutation::MapDelete(key)).await?;
                    }
                    DeltaValue::Value(value) => {
                        if let GraphObject::KeyedMap(m) = &mut *parent_obj.borrow_mut() {
                            m.set(key.clone(), value.clone());
                        }
                        let idx = match &*parent_obj.borrow() {
                            GraphObject::KeyedMap(m) => m.iter().position(|(k, _)| value_eq(k, &key)),
                            _ => None,
                        };
                        if let Some(idx) = idx {
                            infra.assign_paths(&key, &parent_path.child_index(idx).child("k"));
                            infra.assign_paths(&value, &parent_path.child_index(idx).child("v"));
                        }
                        infra.record(&parent_path, Mutation::MapSet { key, value }).await?;
                    }
                }
            } else {
                match value {
                    DeltaValue::Deleted => {
                        eventgraph_events::remove_child(&parent, key_segment)?;
                        infra.record(&path, Mutation::PropertyDelete).await?;
                    }
                    DeltaValue::Value(value) => {
                        eventgraph_events::set_child(&parent, key_segment, value.clone())?;
                        infra.assign_paths(&value, &path);
                        infra.record(&path, Mutation::PropertyWrite(value)).await?;
                    }
                }
            }
        }
        self.discard();
        Ok(())
    }
}

/// Walk `path`'s segments from `root`, descending through records and
/// sequences via [`eventgraph_events::get_child`] and through keyed maps by
/// recovering the original key from `ctx`'s key table. A unique set never
/// appears as an intermediate parent here: its delta entry always lives at
/// the set's own path (whole-value copy-on-write), so committing it is just
/// a property write at that path, the same as a sequence.
fn navigate(root: &Value, path: &Path, ctx: &TxContext) -> Result<Value, TxError> {
    let mut current = root.clone();
    for segment in path.segments() {
        let Value::Object(obj) = &current else {
            return Err(TxError::NotNavigable { segment: segment.clone() });
        };
        let is_map = matches!(&*obj.borrow(), GraphObject::KeyedMap(_));
        current = if is_map {
            let key = ctx
                .recall_key(segment)
                .ok_or_else(|| TxError::UnknownMapKey { segment: segment.clone() })?;
            match &*obj.borrow() {
                GraphObject::KeyedMap(m) => {
                    m.get(&key).cloned().ok_or_else(|| TxError::NotNavigable { segment: segment.clone() })?
                }
                _ => unreachable!(),
            }
        } else {
            eventgraph_events::get_child(&current, segment)
                .ok_or_else(|| TxError::NotNavigable { segment: segment.clone() })?
        };
    }
    Ok(current)
}
