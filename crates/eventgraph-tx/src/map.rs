//! Transactional view over a keyed map: per-key delta
//! tracking rather than a whole-map copy.

use std::rc::Rc;

use eventgraph_types::{value_eq, GraphObject, ObjectRef, Path, Value};

use crate::context::{map_key_segment, TxContext};
use crate::delta::DeltaValue;
use crate::handle::{wrap, TxHandle};

/// A transaction-scoped view over a keyed map.
#[derive(Clone)]
pub struct TxMapHandle {
    pub(crate) path: Path,
    pub(crate) obj: ObjectRef,
    pub(crate) ctx: Rc<TxContext>,
}

impl TxMapHandle {
    pub(crate) fn new(path: Path, obj: Option<ObjectRef>, ctx: Rc<TxContext>) -> Self {
        Self { path, obj: obj.expect("TxMapHandle always wraps a resolved map"), ctx }
    }

    /// The path this view addresses.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current value this handle denotes.
    pub fn current_value(&self) -> Value {
        Value::Object(self.obj.clone())
    }

    fn key_path(&self, key: &Value) -> Path {
        self.path.child(map_key_segment(key))
    }

    /// Look up `key`, consulting the delta before the base map.
    pub fn get(&self, key: &Value) -> Option<TxHandle> {
        let kp = self.key_path(key);
        if let Some(dv) = self.ctx.delta.borrow().get(&kp) {
            return match dv {
                DeltaValue::Deleted => None,
                DeltaValue::Value(v) => Some(wrap(v.clone(), kp, self.ctx.clone())),
            };
        }
        let base_value = match &*self.obj.borrow() {
            GraphObject::KeyedMap(m) => m.get(key).cloned(),
            _ => unreachable!("TxMapHandle always wraps a KeyedMap"),
        }?;
        Some(wrap(base_value, kp, self.ctx.clone()))
    }

    /// True if `key` is present.
    pub fn has(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// `map.set(key, value)`: records the delta at `<map-path>.<key>`.
    pub fn set(&self, key: Value, value: Value) {
        let kp = self.key_path(&key);
        self.ctx.remember_key(kp.last().unwrap(), &key);
        self.ctx.delta.borrow_mut().set(&kp, value);
    }

    /// `map.delete(key)`.
    pub fn delete(&self, key: &Value) {
        let kp = self.key_path(key);
        self.ctx.remember_key(kp.last().unwrap(), key);
        self.ctx.delta.borrow_mut().delete(&kp);
    }

    /// `map.clear()`: writes the deletion marker for every currently-visible
    /// key, the union of base keys and delta-only keys.
    pub fn clear(&self) {
        for key in self.visible_keys() {
            self.delete(&key);
        }
    }

    /// Keys visible in the merged base ∪ delta view.
    pub fn visible_keys(&self) -> Vec<Value> {
        let mut keys: Vec<Value> = match &*self.obj.borrow() {
            GraphObject::KeyedMap(m) => m.iter().map(|(k, _)| k.clone()).collect(),
            _ => unreachable!("TxMapHandle always wraps a KeyedMap"),
        };
        for (segment, dv) in self.ctx.delta.borrow().direct_children(&self.path) {
            let Some(key) = self.ctx.recall_key(&segment) else { continue };
            match dv {
                DeltaValue::Deleted => keys.retain(|existing| !value_eq(existing, &key)),
                DeltaValue::Value(_) => {
                    if !keys.iter().any(|existing| value_eq(existing, &key)) {
                        keys.push(key);
                    }
                }
            }
        }
        keys
    }

    /// Entries in the merged base ∪ delta view, both sides wrapped.
    pub fn entries(&self) -> Vec<(TxHandle, TxHandle)> {
        self.visible_keys()
            .into_iter()
            .filter_map(|key| {
                let value = self.get(&key)?;
                let key_path = self.key_path(&key);
                Some((wrap(key.clone(), key_path, self.ctx.clone()), value))
            })
            .collect()
    }

    /// Number of entries in the merged view.
    pub fn len(&self) -> usize {
        self.visible_keys().len()
    }

    /// True when the merged view has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for TxMapHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.obj, &other.obj) && self.path == other.path
    }
}
