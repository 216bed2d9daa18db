//! Wrapper over a [`GraphObject::UniqueSet`].

use std::rc::Rc;

use eventgraph_codec::ExternalPathLookup;
use eventgraph_events::Mutation;
use eventgraph_types::{value_eq, GraphObject, ObjectRef, Path, Value};

use crate::error::ProxyError;
use crate::handle::{wrap, Handle};
use crate::infra::GraphInfra;

/// A transparent view over an insertion-ordered unique set.
#[derive(Clone)]
pub struct SetHandle {
    pub(crate) obj: ObjectRef,
    pub(crate) infra: Rc<GraphInfra>,
}

impl SetHandle {
    pub(crate) fn new(obj: ObjectRef, infra: Rc<GraphInfra>) -> Self {
        Self { obj, infra }
    }

    fn path(&self) -> Path {
        self.infra
            .canonical_path(&self.obj)
            .expect("SetHandle target was never attached to the graph")
    }

    fn with_items<R>(&self, f: impl FnOnce(&Vec<Value>) -> R) -> R {
        match &*self.obj.borrow() {
            GraphObject::UniqueSet(items) => f(items),
            _ => unreachable!("SetHandle always wraps a UniqueSet"),
        }
    }

    fn with_items_mut<R>(&self, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
        match &mut *self.obj.borrow_mut() {
            GraphObject::UniqueSet(items) => f(items),
            _ => unreachable!("SetHandle always wraps a UniqueSet"),
        }
    }

    /// The raw object this handle wraps.
    pub fn target(&self) -> &ObjectRef {
        &self.obj
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.with_items(Vec::len)
    }

    /// True when the set has no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `value` is a member.
    pub fn has(&self, value: &Value) -> bool {
        self.with_items(|items| items.iter().any(|item| value_eq(item, value)))
    }

    /// Members in insertion order, each wrapped.
    pub fn values(&self) -> Vec<Handle> {
        self.with_items(|items| items.clone()).into_iter().map(|v| wrap(v, &self.infra)).collect()
    }

    /// `set.add(value)`, returning whether it was newly added.
    pub async fn add(&self, value: Value) -> Result<bool, ProxyError> {
        let base = self.path();
        let added = self.with_items_mut(|items| {
            if items.iter().any(|item| value_eq(item, &value)) {
                false
            } else {
                items.push(value.clone());
                true
            }
        });
        if added {
            if let Some(idx) = self.with_items(|items| items.iter().position(|item| value_eq(item, &value))) {
                self.infra.assign_paths(&value, &base.child_index(idx));
            }
        }
        self.infra.record(&base, Mutation::SetAdd(value)).await?;
        Ok(added)
    }

    /// `set.delete(value)`, returning whether it was present.
    pub async fn delete(&self, value: Value) -> Result<bool, ProxyError> {
        let existed = self.with_items_mut(|items| {
            let before = items.len();
            items.retain(|item| !value_eq(item, &value));
            items.len() != before
        });
        self.infra.record(&self.path(), Mutation::SetDelete(value)).await?;
        Ok(existed)
    }

    /// `set.clear()`.
    pub async fn clear(&self) -> Result<(), ProxyError> {
        self.with_items_mut(Vec::clear);
        self.infra.record(&self.path(), Mutation::SetClear).await
    }
}

impl PartialEq for SetHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.obj, &other.obj)
    }
}
