//! Transactional view over a record.

use std::rc::Rc;

use eventgraph_events::get_child;
use eventgraph_types::{GraphObject, ObjectRef, Path, Value};

use crate::context::TxContext;
use crate::delta::DeltaValue;
use crate::handle::{wrap, TxHandle};

/// A transaction-scoped view over a record: reads check the delta first and
/// fall through to the base object; writes land only in the delta.
#[derive(Clone)]
pub struct TxRecordHandle {
    pub(crate) path: Path,
    pub(crate) obj: ObjectRef,
    pub(crate) ctx: Rc<TxContext>,
}

impl TxRecordHandle {
    pub(crate) fn new(path: Path, obj: Option<ObjectRef>, ctx: Rc<TxContext>) -> Self {
        Self { path, obj: obj.expect("TxRecordHandle always wraps a resolved record"), ctx }
    }

    /// The path this view addresses within the transaction's address space.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current value this handle denotes (its underlying object).
    pub fn current_value(&self) -> Value {
        Value::Object(self.obj.clone())
    }

    /// Look up `key`, consulting the delta before the base record.
    pub fn get(&self, key: &str) -> Option<TxHandle> {
        let child_path = self.path.child(key);
        if let Some(dv) = self.ctx.delta.borrow().get(&child_path) {
            return match dv {
                DeltaValue::Deleted => None,
                DeltaValue::Value(v) => Some(wrap(v.clone(), child_path, self.ctx.clone())),
            };
        }
        let base_value = get_child(&Value::Object(self.obj.clone()), key)?;
        Some(wrap(base_value, child_path, self.ctx.clone()))
    }

    /// True if `key` is present (base or delta-added, and not delta-deleted).
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Write `key` into the delta only — the base record is never touched.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.ctx.delta.borrow_mut().set(&self.path.child(key.into()), value);
    }

    /// Write a deletion marker for `key` into the delta.
    pub fn delete(&self, key: &str) {
        self.ctx.delta.borrow_mut().delete(&self.path.child(key));
    }

    /// Own keys: base fields merged with delta additions, minus delta
    /// deletions.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = match &*self.obj.borrow() {
            GraphObject::Record(record) => record.iter().map(|(k, _)| k.to_string()).collect(),
            _ => unreachable!("TxRecordHandle always wraps a Record"),
        };
        for (segment, dv) in self.ctx.delta.borrow().direct_children(&self.path) {
            match dv {
                DeltaValue::Deleted => keys.retain(|k| k != &segment),
                DeltaValue::Value(_) => {
                    if !keys.contains(&segment) {
                        keys.push(segment);
                    }
                }
            }
        }
        keys
    }
}

impl PartialEq for TxRecordHandle {
    fn eq(&self, other: &Self) -> bool {
        std::rc::Rc::ptr_eq(&self.obj, &other.obj) && self.path == other.path
    }
}
