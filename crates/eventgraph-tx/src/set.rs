//! Transactional view over a unique set: copy-on-first-write,
//! the same strategy as [`crate::sequence::TxSequenceHandle`].

use std::cell::RefCell;
use std::rc::Rc;

use eventgraph_types::{value_eq, GraphObject, ObjectRef, Path, Value};

use crate::context::TxContext;
use crate::delta::DeltaValue;
use crate::handle::{wrap, TxHandle};

/// A transaction-scoped view over a unique set.
#[derive(Clone)]
pub struct TxSetHandle {
    pub(crate) path: Path,
    pub(crate) obj: ObjectRef,
    pub(crate) ctx: Rc<TxContext>,
}

impl TxSetHandle {
    pub(crate) fn new(path: Path, obj: Option<ObjectRef>, ctx: Rc<TxContext>) -> Self {
        Self { path, obj: obj.expect("TxSetHandle always wraps a resolved set"), ctx }
    }

    /// The path this view addresses.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current value this handle denotes.
    pub fn current_value(&self) -> Value {
        Value::Object(self.obj.clone())
    }

    fn current_items(&self) -> Vec<Value> {
        if let Some(DeltaValue::Value(Value::Object(obj))) = self.ctx.delta.borrow().get(&self.path) {
            if let GraphObject::UniqueSet(items) = &*obj.borrow() {
                return items.clone();
            }
        }
        match &*self.obj.borrow() {
            GraphObject::UniqueSet(items) => items.clone(),
            _ => unreachable!("TxSetHandle always wraps a UniqueSet"),
        }
    }

    fn working_copy(&self) -> ObjectRef {
        if let Some(DeltaValue::Value(Value::Object(obj))) = self.ctx.delta.borrow().get(&self.path) {
            return obj.clone();
        }
        let items = match &*self.obj.borrow() {
            GraphObject::UniqueSet(items) => items.clone(),
            _ => unreachable!("TxSetHandle always wraps a UniqueSet"),
        };
        let copy: ObjectRef = Rc::new(RefCell::new(GraphObject::UniqueSet(items)));
        self.ctx.delta.borrow_mut().set(&self.path, Value::Object(copy.clone()));
        copy
    }

    /// Number of members in the current view.
    pub fn len(&self) -> usize {
        self.current_items().len()
    }

    /// True when the set has no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `value` is a member.
    pub fn has(&self, value: &Value) -> bool {
        self.current_items().iter().any(|item| value_eq(item, value))
    }

    /// Members in insertion order, each wrapped.
    pub fn values(&self) -> Vec<TxHandle> {
        self.current_items()
            .into_iter()
            .enumerate()
            .map(|(i, v)| wrap(v, self.path.child_index(i), self.ctx.clone()))
            .collect()
    }

    /// `set.add(value)`, returning whether it was newly added.
    pub fn add(&self, value: Value) -> bool {
        let copy = self.working_copy();
        let mut borrowed = copy.borrow_mut();
        let GraphObject::UniqueSet(items) = &mut *borrowed else { unreachable!() };
        if items.iter().any(|item| value_eq(item, &value)) {
            false
        } else {
            items.push(value);
            true
        }
    }

    /// `set.delete(value)`, returning whether it was present.
    pub fn delete(&self, value: &Value) -> bool {
        let copy = self.working_copy();
        let mut borrowed = copy.borrow_mut();
        let GraphObject::UniqueSet(items) = &mut *borrowed else { unreachable!() };
        let before = items.len();
        items.retain(|item| !value_eq(item, value));
        items.len() != before
    }

    /// `set.clear()`.
    pub fn clear(&self) {
        let copy = self.working_copy();
        if let GraphObject::UniqueSet(items) = &mut *copy.borrow_mut() {
            items.clear();
        };
    }
}

impl PartialEq for TxSetHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.obj, &other.obj) && self.path == other.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: Vec<Value>) -> TxSetHandle {
        let base = Value::new_set();
        if let Value::Object(obj) = &base {
            if let GraphObject::UniqueSet(v) = &mut *obj.borrow_mut() {
                *v = items;
            }
        }
        let Value::Object(obj) = base else { unreachable!() };
        TxSetHandle::new(Path::root(), Some(obj), TxContext::new())
    }

    #[test]
    fn add_copies_on_first_write_leaving_base_untouched() {
        let s = set(vec![Value::Number(1.0)]);
        assert!(s.add(Value::Number(2.0)));
        assert_eq!(s.len(), 2);
        let GraphObject::UniqueSet(base) = &*s.obj.borrow() else { panic!() };
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn add_is_idempotent_against_base_and_delta() {
        let s = set(vec![Value::Number(1.0)]);
        assert!(!s.add(Value::Number(1.0)));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn delete_reports_presence() {
        let s = set(vec![Value::Number(1.0)]);
        assert!(s.delete(&Value::Number(1.0)));
        assert!(!s.delete(&Value::Number(1.0)));
    }
}
