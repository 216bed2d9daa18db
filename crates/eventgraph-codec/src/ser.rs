//! Serialization: in-memory [`Value`] tree → wire [`serde_json::Value`]
//!.

use std::collections::HashMap;
use std::rc::Rc;

use eventgraph_types::{
    GraphObject, ObjectRef, Path, Value, ABSENT_SENTINEL, CLASS_MARKER, TYPE_BIGINT, TYPE_DATE,
    TYPE_FUNCTION, TYPE_MAP, TYPE_MARKER, TYPE_REF, TYPE_REGEXP, TYPE_SET, TYPE_SYMBOL,
    TYPE_UNDEFINED,
};
use serde_json::{json, Map as JsonMap, Value as Json};

use crate::ExternalPathLookup;

fn object_identity(obj: &ObjectRef) -> usize {
    Rc::as_ptr(obj) as usize
}

fn json_ref(path: &Path) -> Json {
    let segments: Vec<Json> = path.segments().iter().map(|s| Json::String(s.clone())).collect();
    json!({ TYPE_MARKER: TYPE_REF, "path": segments })
}

/// Serialize `root` for a full snapshot: a single global
/// visited table, every inter-object reference an absolute path measured
/// from `root` itself.
pub fn serialize_snapshot(root: &Value) -> Json {
    let mut visited: HashMap<usize, Path> = HashMap::new();
    serialize_snapshot_value(root, &Path::root(), &mut visited)
}

fn serialize_snapshot_value(value: &Value, here: &Path, visited: &mut HashMap<usize, Path>) -> Json {
    match value {
        Value::Object(obj) => {
            let id = object_identity(obj);
            if let Some(path) = visited.get(&id) {
                return json_ref(path);
            }
            visited.insert(id, here.clone());
            serialize_object_body(obj, here, visited, &mut snapshot_recurse)
        }
        other => serialize_leaf(other),
    }
}

fn snapshot_recurse(
    value: &Value,
    here: &Path,
    visited: &mut HashMap<usize, Path>,
) -> Json {
    serialize_snapshot_value(value, here, visited)
}

/// Serialize `value` as the payload of a single event. Any
/// object already reachable from the memory image root independent of this
/// write ("external") is always emitted as an absolute `{type:"ref"}`, even
/// on first encounter. Any object newly introduced by `value` itself
/// ("local") is materialized inline the first time it is reached and
/// referenced thereafter by a path relative to `current_path` — the write's
/// own root, fixed for the whole call, not any deeper recursion position.
pub fn serialize_event_value(value: &Value, current_path: &Path, external: &dyn ExternalPathLookup) -> Json {
    let mut local: HashMap<usize, Path> = HashMap::new();
    serialize_event_value_inner(value, current_path, current_path, external, &mut local)
}

fn serialize_event_value_inner(
    value: &Value,
    value_root: &Path,
    here: &Path,
    external: &dyn ExternalPathLookup,
    local: &mut HashMap<usize, Path>,
) -> Json {
    match value {
        Value::Object(obj) => {
            let id = object_identity(obj);
            if let Some(rel) = local.get(&id) {
                return json_ref(rel);
            }
            match external.canonical_path(obj) {
                Some(canonical) if canonical.starts_with(here) => {
                    let rel = canonical
                        .strip_prefix(value_root)
                        .expect("a canonical path under the write root always shares that prefix");
                    local.insert(id, rel);
                    serialize_object_body(obj, here, local, &mut |v, child_here, loc| {
                        serialize_event_value_inner(v, value_root, child_here, external, loc)
                    })
                }
                Some(canonical) => json_ref(&canonical),
                // Not yet assigned a canonical path: treat as local, rooted
                // at this value's own write location.
                None => {
                    let rel = here
                        .strip_prefix(value_root)
                        .expect("the current recursion position always shares the write root's prefix");
                    local.insert(id, rel);
                    serialize_object_body(obj, here, local, &mut |v, child_here, loc| {
                        serialize_event_value_inner(v, value_root, child_here, external, loc)
                    })
                }
            }
        }
        other => serialize_leaf(other),
    }
}

/// Build the tagged/plain wire body for an object, given a closure that
/// serializes a child value (mode-specific: snapshot vs. event-value).
fn serialize_object_body(
    obj: &ObjectRef,
    here: &Path,
    visited: &mut HashMap<usize, Path>,
    recurse: &mut dyn FnMut(&Value, &Path, &mut HashMap<usize, Path>) -> Json,
) -> Json {
    match &*obj.borrow() {
        GraphObject::Record(record) => {
            let mut map = JsonMap::new();
            if let Some(class_name) = &record.class_name {
                map.insert(CLASS_MARKER.to_string(), Json::String(class_name.clone()));
            }
            for (key, value) in record.iter() {
                let child_path = here.child(key);
                map.insert(key.to_string(), recurse(value, &child_path, visited));
            }
            Json::Object(map)
        }
        GraphObject::Sequence(items) => {
            let mut arr = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let child_path = here.child_index(i);
                arr.push(recurse(item, &child_path, visited));
            }
            Json::Array(arr)
        }
        GraphObject::KeyedMap(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (i, (k, v)) in map.iter().enumerate() {
                let key_path = here.child_index(i).child("k");
                let val_path = here.child_index(i).child("v");
                entries.push(Json::Array(vec![
                    recurse(k, &key_path, visited),
                    recurse(v, &val_path, visited),
                ]));
            }
            json!({ TYPE_MARKER: TYPE_MAP, "entries": entries })
        }
        GraphObject::UniqueSet(items) => {
            let mut values = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let child_path = here.child_index(i);
                values.push(recurse(item, &child_path, visited));
            }
            json!({ TYPE_MARKER: TYPE_SET, "values": values })
        }
    }
}

fn serialize_leaf(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Undefined => json!({ TYPE_MARKER: TYPE_UNDEFINED }),
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => json!(n),
        Value::Str(s) => Json::String(s.clone()),
        Value::BigInt(s) => json!({ TYPE_MARKER: TYPE_BIGINT, "value": s }),
        Value::Symbol(id) => json!({ TYPE_MARKER: TYPE_SYMBOL, "description": id.description }),
        Value::Timestamp(t) => {
            let mut map = JsonMap::new();
            map.insert(TYPE_MARKER.to_string(), Json::String(TYPE_DATE.to_string()));
            let date_value = match t.value {
                Some(dt) => Json::String(dt.to_rfc3339()),
                None => Json::Null,
            };
            map.insert("dateValue".to_string(), date_value);
            for (key, extra) in &t.extra {
                map.insert(key.clone(), serialize_leaf(extra));
            }
            Json::Object(map)
        }
        Value::Regex(r) => {
            let mut map = JsonMap::new();
            map.insert(TYPE_MARKER.to_string(), Json::String(TYPE_REGEXP.to_string()));
            map.insert("source".to_string(), Json::String(r.source.clone()));
            map.insert("flags".to_string(), Json::String(r.flags.clone()));
            map.insert("lastIndex".to_string(), json!(r.last_index));
            for (key, extra) in &r.extra {
                map.insert(key.clone(), serialize_leaf(extra));
            }
            Json::Object(map)
        }
        Value::Function(f) => {
            let source = f.source_code.clone().unwrap_or_else(|| ABSENT_SENTINEL.to_string());
            json!({ TYPE_MARKER: TYPE_FUNCTION, "sourceCode": source })
        }
        Value::Object(_) => unreachable!("objects are handled by the mode-specific caller"),
    }
}
