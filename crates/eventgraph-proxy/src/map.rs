//! Wrapper over a [`GraphObject::KeyedMap`].

use std::rc::Rc;

use eventgraph_codec::ExternalPathLookup;
use eventgraph_events::Mutation;
use eventgraph_types::{value_eq, GraphObject, ObjectRef, OrderedAssoc, Path, Value};

use crate::error::ProxyError;
use crate::handle::{wrap, Handle};
use crate::infra::GraphInfra;

/// A transparent view over an insertion-ordered keyed map.
#[derive(Clone)]
pub struct MapHandle {
    pub(crate) obj: ObjectRef,
    pub(crate) infra: Rc<GraphInfra>,
}

impl MapHandle {
    pub(crate) fn new(obj: ObjectRef, infra: Rc<GraphInfra>) -> Self {
        Self { obj, infra }
    }

    fn path(&self) -> Path {
        self.infra
            .canonical_path(&self.obj)
            .expect("MapHandle target was never attached to the graph")
    }

    fn with_map<R>(&self, f: impl FnOnce(&OrderedAssoc) -> R) -> R {
        match &*self.obj.borrow() {
            GraphObject::KeyedMap(m) => f(m),
            _ => unreachable!("MapHandle always wraps a KeyedMap"),
        }
    }

    fn with_map_mut<R>(&self, f: impl FnOnce(&mut OrderedAssoc) -> R) -> R {
        match &mut *self.obj.borrow_mut() {
            GraphObject::KeyedMap(m) => f(m),
            _ => unreachable!("MapHandle always wraps a KeyedMap"),
        }
    }

    /// The raw object this handle wraps.
    pub fn target(&self) -> &ObjectRef {
        &self.obj
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.with_map(OrderedAssoc::len)
    }

    /// True when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `key` is present.
    pub fn has(&self, key: &Value) -> bool {
        self.with_map(|m| m.has(key))
    }

    /// Look up `key`, wrapping an object value.
    pub fn get(&self, key: &Value) -> Option<Handle> {
        let value = self.with_map(|m| m.get(key).cloned())?;
        Some(wrap(value, &self.infra))
    }

    /// Entries in insertion order, keys and values both wrapped.
    pub fn entries(&self) -> Vec<(Handle, Handle)> {
        self.with_map(|m| m.iter().cloned().collect::<Vec<_>>())
            .into_iter()
            .map(|(k, v)| (wrap(k, &self.infra), wrap(v, &self.infra)))
            .collect()
    }

    /// `map.set(key, value)`.
    pub async fn set(&self, key: Value, value: Value) -> Result<(), ProxyError> {
        let base = self.path();
        self.with_map_mut(|m| m.set(key.clone(), value.clone()));
        if let Some(idx) = self.with_map(|m| m.iter().position(|(k, _)| value_eq(k, &key))) {
            self.infra.assign_paths(&key, &base.child_index(idx).child("k"));
            self.infra.assign_paths(&value, &base.child_index(idx).child("v"));
        }
        self.infra.record(&base, Mutation::MapSet { key, value }).await
    }

    /// `map.delete(key)`, returning whether the key was present.
    pub async fn delete(&self, key: Value) -> Result<bool, ProxyError> {
        let existed = self.with_map_mut(|m| m.remove(&key).is_some());
        self.infra.record(&self.path(), Mutation::MapDelete(key)).await?;
        Ok(existed)
    }

    /// `map.clear()`.
    pub async fn clear(&self) -> Result<(), ProxyError> {
        self.with_map_mut(OrderedAssoc::clear);
        self.infra.record(&self.path(), Mutation::MapClear).await
    }
}

impl PartialEq for MapHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.obj, &other.obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::attach_root;
    use eventgraph_events::install_builtin_handlers;
    use eventgraph_log::MemoryLog;
    use std::sync::Arc;

    fn map() -> MapHandle {
        install_builtin_handlers();
        let infra = Rc::new(GraphInfra::new(Arc::new(MemoryLog::new())));
        let Handle::Map(m) = attach_root(Value::new_map(), &infra) else { panic!() };
        m
    }

    #[tokio::test]
    async fn set_get_delete_round_trip() {
        let m = map();
        m.set(Value::Str("a".into()), Value::Number(1.0)).await.unwrap();
        assert!(m.has(&Value::Str("a".into())));
        assert!(matches!(m.get(&Value::Str("a".into())), Some(Handle::Leaf(Value::Number(n))) if n == 1.0));
        let existed = m.delete(Value::Str("a".into())).await.unwrap();
        assert!(existed);
        assert!(!m.has(&Value::Str("a".into())));
    }

    #[tokio::test]
    async fn clear_empties_and_emits() {
        let m = map();
        m.set(Value::Str("a".into()), Value::Number(1.0)).await.unwrap();
        m.clear().await.unwrap();
        assert_eq!(m.len(), 0);
        let events = m.infra.log().read_all().await.unwrap();
        assert_eq!(events.last().unwrap().kind(), "map-clear");
    }
}
