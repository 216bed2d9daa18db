//! Dispatch point for reading a transactional value back out.

use std::rc::Rc;

use eventgraph_types::{GraphObject, Path, Value};

use crate::context::TxContext;
use crate::map::TxMapHandle;
use crate::record::TxRecordHandle;
use crate::sequence::TxSequenceHandle;
use crate::set::TxSetHandle;

/// A value read back through the transaction-mode overlay.
#[derive(Clone)]
pub enum TxHandle {
    /// A transactional record view.
    Record(TxRecordHandle),
    /// A transactional sequence view.
    Sequence(TxSequenceHandle),
    /// A transactional keyed-map view.
    Map(TxMapHandle),
    /// A transactional unique-set view.
    Set(TxSetHandle),
    /// A primitive, passed through untouched.
    Leaf(Value),
}

impl TxHandle {
    /// The current (delta-aware) value this handle denotes.
    pub fn unwrap(&self) -> Value {
        match self {
            TxHandle::Record(r) => r.current_value(),
            TxHandle::Sequence(s) => s.current_value(),
            TxHandle::Map(m) => m.current_value(),
            TxHandle::Set(s) => s.current_value(),
            TxHandle::Leaf(v) => v.clone(),
        }
    }
}

pub(crate) fn wrap(value: Value, path: Path, ctx: Rc<TxContext>) -> TxHandle {
    let Value::Object(obj) = &value else { return TxHandle::Leaf(value) };
    match &*obj.borrow() {
        GraphObject::Record(_) => TxHandle::Record(TxRecordHandle::new(path, Some(obj.clone()), ctx)),
        GraphObject::Sequence(_) => TxHandle::Sequence(TxSequenceHandle::new(path, Some(obj.clone()), ctx)),
        GraphObject::KeyedMap(_) => TxHandle::Map(TxMapHandle::new(path, Some(obj.clone()), ctx)),
        GraphObject::UniqueSet(_) => TxHandle::Set(TxSetHandle::new(path, Some(obj.clone()), ctx)),
    }
}
