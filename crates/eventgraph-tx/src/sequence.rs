//! Transactional view over a sequence: copy-on-first-write.

use std::cell::RefCell;
use std::rc::Rc;

use eventgraph_events::{default_cmp, resolve_index};
use eventgraph_types::{GraphObject, ObjectRef, Path, Value};

use crate::context::TxContext;
use crate::delta::DeltaValue;
use crate::handle::{wrap, TxHandle};

/// A transaction-scoped view over a sequence. The first mutating call
/// shallow-copies the base sequence into the delta at this handle's path;
/// later calls within the same transaction reuse that copy.
#[derive(Clone)]
pub struct TxSequenceHandle {
    pub(crate) path: Path,
    pub(crate) obj: ObjectRef,
    pub(crate) ctx: Rc<TxContext>,
}

impl TxSequenceHandle {
    pub(crate) fn new(path: Path, obj: Option<ObjectRef>, ctx: Rc<TxContext>) -> Self {
        Self { path, obj: obj.expect("TxSequenceHandle always wraps a resolved sequence"), ctx }
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
            if let GraphObject::Sequence(items) = &*obj.borrow() {
                return items.clone();
            }
        }
        match &*self.obj.borrow() {
            GraphObject::Sequence(items) => items.clone(),
            _ => unreachable!("TxSequenceHandle always wraps a Sequence"),
        }
    }

    /// The copy-on-write working set: the existing delta copy if one has
    /// already been made, otherwise a fresh shallow copy of the base
    /// sequence installed into the delta now.
    fn working_copy(&self) -> ObjectRef {
        if let Some(DeltaValue::Value(Value::Object(obj))) = self.ctx.delta.borrow().get(&self.path) {
            return obj.clone();
        }
        let items = match &*self.obj.borrow() {
            GraphObject::Sequence(items) => items.clone(),
            _ => unreachable!("TxSequenceHandle always wraps a Sequence"),
        };
        let copy: ObjectRef = Rc::new(RefCell::new(GraphObject::Sequence(items)));
        self.ctx.delta.borrow_mut().set(&self.path, Value::Object(copy.clone()));
        copy
    }

    /// Number of elements, in the current (delta-aware) view.
    pub fn len(&self) -> usize {
        self.current_items().len()
    }

    /// True when the sequence has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, wrapped.
    pub fn get(&self, index: usize) -> Option<TxHandle> {
        let value = self.current_items().into_iter().nth(index)?;
        Some(wrap(value, self.path.child_index(index), self.ctx.clone()))
    }

    /// All elements, each wrapped.
    pub fn values(&self) -> Vec<TxHandle> {
        self.current_items()
            .into_iter()
            .enumerate()
            .map(|(i, v)| wrap(v, self.path.child_index(i), self.ctx.clone()))
            .collect()
    }

    /// `sequence.push(...items)`.
    pub fn push(&self, items: Vec<Value>) {
        let copy = self.working_copy();
        if let GraphObject::Sequence(v) = &mut *copy.borrow_mut() {
            v.extend(items);
        };
    }

    /// `sequence.pop()`.
    pub fn pop(&self) -> Option<Value> {
        let copy = self.working_copy();
        let mut borrowed = copy.borrow_mut();
        let GraphObject::Sequence(v) = &mut *borrowed else { unreachable!() };
        v.pop()
    }

    /// `sequence.shift()`.
    pub fn shift(&self) -> Option<Value> {
        let copy = self.working_copy();
        let mut borrowed = copy.borrow_mut();
        let GraphObject::Sequence(v) = &mut *borrowed else { unreachable!() };
        if v.is_empty() {
            None
        } else {
            Some(v.remove(0))
        }
    }

    /// `sequence.unshift(...items)`.
    pub fn unshift(&self, items: Vec<Value>) {
        let copy = self.working_copy();
        if let GraphObject::Sequence(v) = &mut *copy.borrow_mut() {
            for (i, item) in items.into_iter().enumerate() {
                v.insert(i, item);
            }
        };
    }

    /// `sequence.splice(start, delete_count, ...items)`, returning the
    /// removed elements.
    pub fn splice(&self, start: i64, delete_count: usize, items: Vec<Value>) -> Vec<Value> {
        let copy = self.working_copy();
        let mut borrowed = copy.borrow_mut();
        let GraphObject::Sequence(v) = &mut *borrowed else { unreachable!() };
        let start = resolve_index(start, v.len());
        let end = (start + delete_count).min(v.len());
        let removed: Vec<Value> = v.splice(start..end, items).collect();
        removed
    }

    /// `sequence.sort()`.
    pub fn sort(&self) {
        let copy = self.working_copy();
        if let GraphObject::Sequence(v) = &mut *copy.borrow_mut() {
            v.sort_by(default_cmp);
        };
    }

    /// `sequence.reverse()`.
    pub fn reverse(&self) {
        let copy = self.working_copy();
        if let GraphObject::Sequence(v) = &mut *copy.borrow_mut() {
            v.reverse();
        };
    }

    /// `sequence.fill(value, start, end)`.
    pub fn fill(&self, value: Value, start: i64, end: i64) {
        let copy = self.working_copy();
        let mut borrowed = copy.borrow_mut();
        let GraphObject::Sequence(v) = &mut *borrowed else { unreachable!() };
        let start = resolve_index(start, v.len());
        let end = resolve_index(end, v.len());
        for slot in v.iter_mut().take(end).skip(start) {
            *slot = value.clone();
        }
    }

    /// `sequence.copyWithin(target, start, end)`.
    pub fn copy_within(&self, target: i64, start: i64, end: i64) {
        let copy = self.working_copy();
        let mut borrowed = copy.borrow_mut();
        let GraphObject::Sequence(v) = &mut *borrowed else { unreachable!() };
        let len = v.len();
        let target = resolve_index(target, len);
        let start = resolve_index(start, len);
        let end = resolve_index(end, len);
        let slice: Vec<Value> = v[start..end].to_vec();
        for (i, value) in slice.into_iter().enumerate() {
            if target + i >= len {
                break;
            }
            v[target + i] = value;
        }
    }
}

impl PartialEq for TxSequenceHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.obj, &other.obj) && self.path == other.path
    }
}
