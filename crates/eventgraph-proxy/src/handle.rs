//! The wrapper dispatch point: any [`Value`] read back out of the graph is
//! re-wrapped through [`wrap`] so that identity is preserved across reads
//! without a literal cache — see [`crate::infra`]'s module doc.

use std::rc::Rc;

use eventgraph_types::{GraphObject, Path, Value};

use crate::infra::GraphInfra;
use crate::map::MapHandle;
use crate::record::RecordHandle;
use crate::sequence::SequenceHandle;
use crate::set::SetHandle;

/// A value as read back through the interception layer: an object value
/// becomes the matching wrapper, a primitive/leaf value passes through
/// untouched.
#[derive(Clone)]
pub enum Handle {
    /// A record field or the wrapped root.
    Record(RecordHandle),
    /// An indexed sequence.
    Sequence(SequenceHandle),
    /// A keyed map.
    Map(MapHandle),
    /// A unique set.
    Set(SetHandle),
    /// Anything that is not an object: passes through untouched.
    Leaf(Value),
}

impl Handle {
    /// The raw value this handle wraps, unwrapping back to the underlying
    /// representation.
    pub fn unwrap(&self) -> Value {
        match self {
            Handle::Record(r) => Value::Object(r.target().clone()),
            Handle::Sequence(s) => Value::Object(s.target().clone()),
            Handle::Map(m) => Value::Object(m.target().clone()),
            Handle::Set(s) => Value::Object(s.target().clone()),
            Handle::Leaf(v) => v.clone(),
        }
    }
}

/// Wrap `value` for handing back to a caller, dispatching on its shape.
pub fn wrap(value: Value, infra: &Rc<GraphInfra>) -> Handle {
    let Value::Object(obj) = &value else { return Handle::Leaf(value) };
    match &*obj.borrow() {
        GraphObject::Record(_) => Handle::Record(RecordHandle::new(obj.clone(), infra.clone())),
        GraphObject::Sequence(_) => Handle::Sequence(SequenceHandle::new(obj.clone(), infra.clone())),
        GraphObject::KeyedMap(_) => Handle::Map(MapHandle::new(obj.clone(), infra.clone())),
        GraphObject::UniqueSet(_) => Handle::Set(SetHandle::new(obj.clone(), infra.clone())),
    }
}

/// Attach `value` as the memory image's root: assigns it (and everything
/// already reachable from it) the root canonical path before wrapping it,
/// so that later writes can correctly tell local objects from objects
/// already reachable elsewhere.
pub fn attach_root(value: Value, infra: &Rc<GraphInfra>) -> Handle {
    infra.assign_paths(&value, &Path::root());
    wrap(value, infra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventgraph_log::MemoryLog;
    use std::sync::Arc;

    #[test]
    fn two_reads_of_the_same_object_compare_equal() {
        let infra = Rc::new(GraphInfra::new(Arc::new(MemoryLog::new())));
        let root = Value::new_record();
        if let Value::Object(obj) = &root {
            if let GraphObject::Record(r) = &mut *obj.borrow_mut() {
                r.set("dept", Value::new_record());
            }
        }
        let Handle::Record(root) = attach_root(root, &infra) else { panic!("expected record") };
        let Some(Handle::Record(a)) = root.get("dept") else { panic!("expected record") };
        let Some(Handle::Record(b)) = root.get("dept") else { panic!("expected record") };
        assert!(a == b);
    }
}
