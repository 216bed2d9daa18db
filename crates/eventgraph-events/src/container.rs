//! Shared helpers for reading/writing a named child of whatever kind of
//! container a path segment lands on.

use eventgraph_types::{GraphObject, Value};

use crate::error::EventsError;

/// Read `parent[key]`. Record fields and sequence indices both support
/// this; keyed maps and sets are addressed by value, not by a path
/// segment, and never hold a directly-named child.
pub fn get_child(parent: &Value, key: &str) -> Option<Value> {
    let Value::Object(obj) = parent else { return None };
    match &*obj.borrow() {
        GraphObject::Record(record) => record.get(key).cloned(),
        GraphObject::Sequence(items) => items.get(key.parse::<usize>().ok()?).cloned(),
        GraphObject::KeyedMap(_) | GraphObject::UniqueSet(_) => None,
    }
}

/// Write `parent[key] = value`, growing a sequence with `Value::Undefined`
/// holes if the index is past the current end (mirrors a dynamic array's
/// out-of-bounds index assignment).
pub fn set_child(parent: &Value, key: &str, value: Value) -> Result<(), EventsError> {
    let Value::Object(obj) = parent else {
        return Err(EventsError::WrongParentType { kind: "property-write", parent_kind: "non-object" });
    };
    match &mut *obj.borrow_mut() {
        GraphObject::Record(record) => {
            record.set(key.to_string(), value);
            Ok(())
        }
        GraphObject::Sequence(items) => {
            let idx: usize = key
                .parse()
                .map_err(|_| EventsError::OutOfRange(format!("{key:?} is not a sequence index")))?;
            if idx >= items.len() {
                items.resize(idx + 1, Value::Undefined);
            }
            items[idx] = value;
            Ok(())
        }
        GraphObject::KeyedMap(_) | GraphObject::UniqueSet(_) => {
            Err(EventsError::WrongParentType { kind: "property-write", parent_kind: "map-or-set" })
        }
    }
}

/// Resolve a JS-style (possibly negative, possibly out-of-range) index into
/// a clamped `0..=len` bound, the way `Array.prototype.splice`/`fill`/
/// `copyWithin` treat their start/end arguments.
pub fn resolve_index(raw: i64, len: usize) -> usize {
    if raw < 0 {
        len.saturating_sub(raw.unsigned_abs() as usize)
    } else {
        (raw as usize).min(len)
    }
}

/// A deterministic total order over values for `sequence.sort()` with no
/// caller-supplied comparator: numeric for numbers, lexicographic for
/// strings, and a stable but otherwise unspecified fallback for anything
/// else, since there is no serializable comparator to fall back on.
pub fn default_cmp(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        _ => format!("{a:?}").cmp(&format!("{b:?}")),
    }
}

/// Remove `parent[key]`: a record field is deleted outright; a sequence
/// index becomes `Value::Undefined` (JS `delete arr[i]` leaves a hole
/// rather than shifting later elements).
pub fn remove_child(parent: &Value, key: &str) -> Result<(), EventsError> {
    let Value::Object(obj) = parent else {
        return Err(EventsError::WrongParentType { kind: "property-delete", parent_kind: "non-object" });
    };
    match &mut *obj.borrow_mut() {
        GraphObject::Record(record) => {
            record.remove(key);
            Ok(())
        }
        GraphObject::Sequence(items) => {
            if let Some(idx) = key.parse::<usize>().ok().filter(|i| *i < items.len()) {
                items[idx] = Value::Undefined;
            }
            Ok(())
        }
        GraphObject::KeyedMap(_) | GraphObject::UniqueSet(_) => {
            Err(EventsError::WrongParentType { kind: "property-delete", parent_kind: "map-or-set" })
        }
    }
}
