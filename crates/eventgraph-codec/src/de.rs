//! Deserialization: wire [`serde_json::Value`] → in-memory [`Value`] tree.
//!
//! Two passes, shared by both modes:
//!
//! 1. [`materialize`] walks the JSON tree depth-first, building every typed
//!    node (records, sequences, maps, sets, timestamps, …) eagerly. A
//!    `{type:"ref"}` node cannot be materialized immediately — its target
//!    may not exist yet (forward references, cycles) — so it is recorded as
//!    a [`Placeholder`] instead, with `Value::Undefined` written into its
//!    slot as a stand-in.
//! 2. [`resolve_placeholders`] walks the placeholder list and patches each
//!    slot in place, navigating the resolver's scope(s) for the target path.
//!    Snapshot mode resolves every path against the single materialized
//!    root. Event-value mode tries the value's own root first (a path
//!    relative to the write location — a "local" reference) and falls back
//!    to the memory image root (an absolute path — an "external"
//!    reference).

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use eventgraph_registry::ClassRegistry;
use eventgraph_types::{
    FunctionValue, GraphObject, ObjectRef, OrderedAssoc, Path, Record, RegexValue, TimestampValue,
    Value, ABSENT_SENTINEL, CLASS_MARKER, TYPE_BIGINT, TYPE_DATE, TYPE_FUNCTION, TYPE_MAP,
    TYPE_MARKER, TYPE_REF, TYPE_REGEXP, TYPE_SET, TYPE_SYMBOL, TYPE_UNDEFINED,
};
use serde_json::Value as Json;

use crate::error::CodecError;

enum Slot {
    RecordField(ObjectRef, String),
    SequenceIndex(ObjectRef, usize),
    MapKey(ObjectRef, usize),
    MapValue(ObjectRef, usize),
    SetIndex(ObjectRef, usize),
}

struct Placeholder {
    slot: Slot,
    target: Path,
}

enum Materialized {
    Ready(Value),
    Pending(Path),
}

/// Resolves a reference's target [`Path`] against some scope, returning the
/// [`Value`] found there (by `Rc` clone, so the resolved slot shares
/// identity with the original).
pub trait PathResolver {
    /// Look up `path`. `None` if nothing lives there.
    fn resolve(&self, path: &Path) -> Option<Value>;
}

/// Resolves every reference against a single snapshot's own root
///.
pub struct SnapshotResolver<'a> {
    root: &'a Value,
}

impl<'a> SnapshotResolver<'a> {
    /// Resolve against `root`.
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }
}

impl PathResolver for SnapshotResolver<'_> {
    fn resolve(&self, path: &Path) -> Option<Value> {
        navigate(self.root, path.segments())
    }
}

/// Resolves a reference first against the written value's own root (a
/// "local" reference, relative path), then against the memory image's root
/// (an "external" reference, absolute path).
pub struct EventValueResolver<'a> {
    value_root: &'a Value,
    external_root: &'a Value,
}

impl<'a> EventValueResolver<'a> {
    /// Resolve against `value_root` first, then `external_root`.
    pub fn new(value_root: &'a Value, external_root: &'a Value) -> Self {
        Self { value_root, external_root }
    }
}

impl PathResolver for EventValueResolver<'_> {
    fn resolve(&self, path: &Path) -> Option<Value> {
        navigate(self.value_root, path.segments())
            .or_else(|| navigate(self.external_root, path.segments()))
    }
}

fn navigate(root: &Value, segments: &[String]) -> Option<Value> {
    if segments.is_empty() {
        return Some(root.clone());
    }
    match root {
        Value::Object(obj) => match &*obj.borrow() {
            GraphObject::Record(record) => {
                let child = record.get(&segments[0])?.clone();
                navigate(&child, &segments[1..])
            }
            GraphObject::Sequence(items) => {
                let idx: usize = segments[0].parse().ok()?;
                let child = items.get(idx)?.clone();
                navigate(&child, &segments[1..])
            }
            GraphObject::KeyedMap(map) => {
                let idx: usize = segments[0].parse().ok()?;
                let (key, value) = map.iter().nth(idx)?;
                let selector = segments.get(1)?;
                let child = match selector.as_str() {
                    "k" => key.clone(),
                    "v" => value.clone(),
                    _ => return None,
                };
                navigate(&child, &segments[2..])
            }
            GraphObject::UniqueSet(items) => {
                let idx: usize = segments[0].parse().ok()?;
                let child = items.get(idx)?.clone();
                navigate(&child, &segments[1..])
            }
        },
        _ => None,
    }
}

/// Deserialize a full snapshot: every
/// reference is an absolute path from the snapshot's own root. `registry` is
/// consulted for every class-marked record encountered;
/// pass an empty [`ClassRegistry`] if the snapshot is known to carry none.
pub fn deserialize_snapshot(json: &Json, registry: &ClassRegistry) -> Result<Value, CodecError> {
    let mut placeholders = Vec::new();
    let root = match materialize(json, &mut placeholders, registry)? {
        Materialized::Ready(v) => v,
        Materialized::Pending(path) => {
            return Err(CodecError::Malformed {
                node: "snapshot root",
                detail: format!("root itself is a dangling reference to {path}"),
            })
        }
    };
    let resolver = SnapshotResolver::new(&root);
    resolve_placeholders(&placeholders, &resolver)?;
    Ok(root)
}

/// Deserialize a single event's payload value. `external_root` is the memory image's current root, used to
/// resolve references to objects that already existed before this event.
/// `registry` is consulted for every class-marked record the payload
/// introduces.
pub fn deserialize_event_value(
    json: &Json,
    external_root: &Value,
    registry: &ClassRegistry,
) -> Result<Value, CodecError> {
    let mut placeholders = Vec::new();
    match materialize(json, &mut placeholders, registry)? {
        Materialized::Ready(root) => {
            let resolver = EventValueResolver::new(&root, external_root);
            resolve_placeholders(&placeholders, &resolver)?;
            Ok(root)
        }
        // The written value is itself nothing but a reference (e.g. a
        // PropertyWrite whose new value is an existing object) — there is
        // no local scope to try, so resolve directly against the image.
        Materialized::Pending(path) => navigate(external_root, path.segments())
            .ok_or(CodecError::UnresolvedReference(path)),
    }
}

fn materialize(
    json: &Json,
    placeholders: &mut Vec<Placeholder>,
    registry: &ClassRegistry,
) -> Result<Materialized, CodecError> {
    match json {
        Json::Null => Ok(Materialized::Ready(Value::Null)),
        Json::Bool(b) => Ok(Materialized::Ready(Value::Bool(*b))),
        Json::Number(n) => Ok(Materialized::Ready(Value::Number(n.as_f64().unwrap_or(f64::NAN)))),
        Json::String(s) => Ok(Materialized::Ready(Value::Str(s.clone()))),
        Json::Array(items) => materialize_sequence(items, placeholders, registry),
        Json::Object(map) => match map.get(TYPE_MARKER).and_then(Json::as_str) {
            Some(TYPE_REF) => {
                let segments = map
                    .get("path")
                    .and_then(Json::as_array)
                    .ok_or(CodecError::MissingField { type_name: TYPE_REF.into(), field: "path" })?;
                let segments: Vec<String> = segments
                    .iter()
                    .map(|s| {
                        s.as_str().map(str::to_string).ok_or_else(|| CodecError::Malformed {
                            node: "ref path",
                            detail: "every path segment must be a string".into(),
                        })
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Materialized::Pending(Path::from_segments(segments)))
            }
            Some(TYPE_UNDEFINED) => Ok(Materialized::Ready(Value::Undefined)),
            Some(TYPE_BIGINT) => {
                let value = map
                    .get("value")
                    .and_then(Json::as_str)
                    .ok_or(CodecError::MissingField { type_name: TYPE_BIGINT.into(), field: "value" })?;
                Ok(Materialized::Ready(Value::BigInt(value.to_string())))
            }
            Some(TYPE_SYMBOL) => {
                let description = map.get("description").and_then(Json::as_str).map(str::to_string);
                Ok(Materialized::Ready(Value::new_symbol(description)))
            }
            Some(TYPE_DATE) => materialize_timestamp(map),
            Some(TYPE_REGEXP) => materialize_regex(map),
            Some(TYPE_FUNCTION) => {
                let source = map
                    .get("sourceCode")
                    .and_then(Json::as_str)
                    .ok_or(CodecError::MissingField { type_name: TYPE_FUNCTION.into(), field: "sourceCode" })?;
                let source_code = if source == ABSENT_SENTINEL { None } else { Some(source.to_string()) };
                Ok(Materialized::Ready(Value::Function(FunctionValue { source_code })))
            }
            Some(TYPE_MAP) => materialize_map(map, placeholders, registry),
            Some(TYPE_SET) => materialize_set(map, placeholders, registry),
            Some(other) => Err(CodecError::UnknownTag(other.to_string())),
            None => materialize_record(map, placeholders, registry),
        },
    }
}

fn materialize_sequence(
    items: &[Json],
    placeholders: &mut Vec<Placeholder>,
    registry: &ClassRegistry,
) -> Result<Materialized, CodecError> {
    let mut values = Vec::with_capacity(items.len());
    let mut pending = Vec::new();
    for (i, item) in items.iter().enumerate() {
        match materialize(item, placeholders, registry)? {
            Materialized::Ready(v) => values.push(v),
            Materialized::Pending(path) => {
                values.push(Value::Undefined);
                pending.push((i, path));
            }
        }
    }
    let obj: ObjectRef = Rc::new(RefCell::new(GraphObject::Sequence(values)));
    for (i, path) in pending {
        placeholders.push(Placeholder { slot: Slot::SequenceIndex(obj.clone(), i), target: path });
    }
    Ok(Materialized::Ready(Value::Object(obj)))
}

fn materialize_record(
    map: &serde_json::Map<String, Json>,
    placeholders: &mut Vec<Placeholder>,
    registry: &ClassRegistry,
) -> Result<Materialized, CodecError> {
    let class_name = map.get(CLASS_MARKER).and_then(Json::as_str).map(str::to_string);
    let mut fields = Vec::new();
    let mut pending = Vec::new();
    for (key, value) in map {
        if key == CLASS_MARKER {
            continue;
        }
        match materialize(value, placeholders, registry)? {
            Materialized::Ready(v) => fields.push((key.clone(), v)),
            Materialized::Pending(path) => {
                fields.push((key.clone(), Value::Undefined));
                pending.push((key.clone(), path));
            }
        }
    }

    // A class-marked record has its prototype reattached by consulting the
    // class registry — a bare instance is instantiated via
    // the registered factory (bypassing the real constructor) and the
    // deserialized fields are copied onto it, rather than building a plain
    // record directly. A marker with no matching factory is fatal.
    let obj: ObjectRef = match &class_name {
        Some(name) => {
            let bare = registry.instantiate(name)?;
            let Value::Object(bare_obj) = bare else {
                return Err(CodecError::Malformed {
                    node: "class instance",
                    detail: format!("factory for {name:?} did not produce a record"),
                });
            };
            {
                let mut borrowed = bare_obj.borrow_mut();
                let GraphObject::Record(record) = &mut *borrowed else {
                    return Err(CodecError::Malformed {
                        node: "class instance",
                        detail: format!("factory for {name:?} did not produce a record"),
                    });
                };
                for (key, value) in fields {
                    record.set(key, value);
                }
                record.class_name = class_name.clone();
            }
            bare_obj
        }
        None => {
            let mut record = Record::new();
            for (key, value) in fields {
                record.set(key, value);
            }
            Rc::new(RefCell::new(GraphObject::Record(record)))
        }
    };
    for (key, path) in pending {
        placeholders.push(Placeholder { slot: Slot::RecordField(obj.clone(), key), target: path });
    }
    Ok(Materialized::Ready(Value::Object(obj)))
}

fn materialize_map(
    map: &serde_json::Map<String, Json>,
    placeholders: &mut Vec<Placeholder>,
    registry: &ClassRegistry,
) -> Result<Materialized, CodecError> {
    let entries = map
        .get("entries")
        .and_then(Json::as_array)
        .ok_or(CodecError::MissingField { type_name: TYPE_MAP.into(), field: "entries" })?;
    let mut assoc = OrderedAssoc::new();
    // (entry index, pending path) pairs, tagged by which side was pending.
    let mut pending_keys = Vec::new();
    let mut pending_values = Vec::new();
    for entry in entries {
        let pair = entry.as_array().filter(|p| p.len() == 2).ok_or_else(|| CodecError::Malformed {
            node: "map entry",
            detail: "expected a two-element [key, value] array".into(),
        })?;
        let key_result = materialize(&pair[0], placeholders, registry)?;
        let value_result = materialize(&pair[1], placeholders, registry)?;
        let key = match &key_result {
            Materialized::Ready(v) => v.clone(),
            Materialized::Pending(_) => Value::Undefined,
        };
        let value = match &value_result {
            Materialized::Ready(v) => v.clone(),
            Materialized::Pending(_) => Value::Undefined,
        };
        let idx = assoc.push_raw(key, value);
        if let Materialized::Pending(path) = key_result {
            pending_keys.push((idx, path));
        }
        if let Materialized::Pending(path) = value_result {
            pending_values.push((idx, path));
        }
    }
    let obj: ObjectRef = Rc::new(RefCell::new(GraphObject::KeyedMap(assoc)));
    for (idx, path) in pending_keys {
        placeholders.push(Placeholder { slot: Slot::MapKey(obj.clone(), idx), target: path });
    }
    for (idx, path) in pending_values {
        placeholders.push(Placeholder { slot: Slot::MapValue(obj.clone(), idx), target: path });
    }
    Ok(Materialized::Ready(Value::Object(obj)))
}

fn materialize_set(
    map: &serde_json::Map<String, Json>,
    placeholders: &mut Vec<Placeholder>,
    registry: &ClassRegistry,
) -> Result<Materialized, CodecError> {
    let values = map
        .get("values")
        .and_then(Json::as_array)
        .ok_or(CodecError::MissingField { type_name: TYPE_SET.into(), field: "values" })?;
    let mut items = Vec::with_capacity(values.len());
    let mut pending = Vec::new();
    for (i, item) in values.iter().enumerate() {
        match materialize(item, placeholders, registry)? {
            Materialized::Ready(v) => items.push(v),
            Materialized::Pending(path) => {
                items.push(Value::Undefined);
                pending.push((i, path));
            }
        }
    }
    let obj: ObjectRef = Rc::new(RefCell::new(GraphObject::UniqueSet(items)));
    for (i, path) in pending {
        placeholders.push(Placeholder { slot: Slot::SetIndex(obj.clone(), i), target: path });
    }
    Ok(Materialized::Ready(Value::Object(obj)))
}

fn materialize_timestamp(map: &serde_json::Map<String, Json>) -> Result<Materialized, CodecError> {
    let date_value = map
        .get("dateValue")
        .ok_or(CodecError::MissingField { type_name: TYPE_DATE.into(), field: "dateValue" })?;
    let value = match date_value {
        Json::Null => None,
        Json::String(s) => Some(
            DateTime::parse_from_rfc3339(s)
                .map_err(|e| CodecError::Malformed { node: "date", detail: e.to_string() })?
                .with_timezone(&Utc),
        ),
        _ => return Err(CodecError::Malformed { node: "date", detail: "dateValue must be a string or null".into() }),
    };
    let mut extra = std::collections::HashMap::new();
    for (key, v) in map {
        if key == TYPE_MARKER || key == "dateValue" {
            continue;
        }
        extra.insert(key.clone(), materialize_primitive_only(v)?);
    }
    Ok(Materialized::Ready(Value::Timestamp(TimestampValue { value, extra })))
}

fn materialize_regex(map: &serde_json::Map<String, Json>) -> Result<Materialized, CodecError> {
    let source = map
        .get("source")
        .and_then(Json::as_str)
        .ok_or(CodecError::MissingField { type_name: TYPE_REGEXP.into(), field: "source" })?
        .to_string();
    let flags = map
        .get("flags")
        .and_then(Json::as_str)
        .ok_or(CodecError::MissingField { type_name: TYPE_REGEXP.into(), field: "flags" })?
        .to_string();
    let last_index = map.get("lastIndex").and_then(Json::as_u64).unwrap_or(0);
    let mut extra = std::collections::HashMap::new();
    for (key, v) in map {
        if matches!(key.as_str(), "type" | "source" | "flags" | "lastIndex") {
            continue;
        }
        extra.insert(key.clone(), materialize_primitive_only(v)?);
    }
    Ok(Materialized::Ready(Value::Regex(RegexValue { source, flags, last_index, extra })))
}

/// Enumerable properties attached to a timestamp or regex after
/// construction are restricted to primitives and the atomic special types —
/// never references or containers, since those values live outside any
/// `ObjectRef` and so have no slot a later pass could patch into.
fn materialize_primitive_only(json: &Json) -> Result<Value, CodecError> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => Ok(Value::Number(n.as_f64().unwrap_or(f64::NAN))),
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Object(map) => match map.get(TYPE_MARKER).and_then(Json::as_str) {
            Some(TYPE_BIGINT) => Ok(Value::BigInt(
                map.get("value").and_then(Json::as_str).unwrap_or_default().to_string(),
            )),
            Some(TYPE_SYMBOL) => {
                Ok(Value::new_symbol(map.get("description").and_then(Json::as_str).map(str::to_string)))
            }
            Some(TYPE_UNDEFINED) => Ok(Value::Undefined),
            _ => Err(CodecError::Malformed {
                node: "timestamp/regex extra property",
                detail: "only primitives, bigint, symbol, and undefined are supported here".into(),
            }),
        },
        Json::Array(_) => Err(CodecError::Malformed {
            node: "timestamp/regex extra property",
            detail: "containers are not supported here".into(),
        }),
    }
}

fn resolve_placeholders(placeholders: &[Placeholder], resolver: &dyn PathResolver) -> Result<(), CodecError> {
    for placeholder in placeholders {
        let resolved = resolver
            .resolve(&placeholder.target)
            .ok_or_else(|| CodecError::UnresolvedReference(placeholder.target.clone()))?;
        match &placeholder.slot {
            Slot::RecordField(obj, key) => {
                if let GraphObject::Record(record) = &mut *obj.borrow_mut() {
                    record.set(key.clone(), resolved);
                }
            }
            Slot::SequenceIndex(obj, idx) => {
                if let GraphObject::Sequence(items) = &mut *obj.borrow_mut() {
                    items[*idx] = resolved;
                }
            }
            Slot::MapKey(obj, idx) => {
                if let GraphObject::KeyedMap(map) = &mut *obj.borrow_mut() {
                    let current_value = map.iter().nth(*idx).expect("index recorded at materialize time").1.clone();
                    map.patch_at(*idx, resolved, current_value);
                }
            }
            Slot::MapValue(obj, idx) => {
                if let GraphObject::KeyedMap(map) = &mut *obj.borrow_mut() {
                    let current_key = map.iter().nth(*idx).expect("index recorded at materialize time").0.clone();
                    map.patch_at(*idx, current_key, resolved);
                }
            }
            Slot::SetIndex(obj, idx) => {
                if let GraphObject::UniqueSet(items) = &mut *obj.borrow_mut() {
                    items[*idx] = resolved;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::{serialize_event_value, serialize_snapshot};
    use eventgraph_types::ObjectRef as ObjRef;
    use std::collections::HashMap as StdHashMap;

    fn no_classes() -> ClassRegistry {
        ClassRegistry::new()
    }

    struct FakeExternal(StdHashMap<usize, Path>);

    impl crate::ExternalPathLookup for FakeExternal {
        fn canonical_path(&self, target: &ObjRef) -> Option<Path> {
            self.0.get(&(Rc::as_ptr(target) as usize)).cloned()
        }
    }

    #[test]
    fn snapshot_round_trips_plain_record() {
        let root = Value::new_record();
        if let Value::Object(obj) = &root {
            if let GraphObject::Record(r) = &mut *obj.borrow_mut() {
                r.set("name", Value::Str("ada".into()));
                r.set("age", Value::Number(30.0));
            }
        }
        let json = serialize_snapshot(&root);
        let back = deserialize_snapshot(&json, &no_classes()).unwrap();
        if let Value::Object(obj) = &back {
            if let GraphObject::Record(r) = &*obj.borrow() {
                assert!(matches!(r.get("name"), Some(Value::Str(s)) if s == "ada"));
                assert!(matches!(r.get("age"), Some(Value::Number(n)) if *n == 30.0));
            } else {
                panic!("expected record");
            }
        } else {
            panic!("expected object");
        }
    }

    #[test]
    fn snapshot_preserves_shared_identity() {
        let shared = Value::new_record();
        let root = Value::new_sequence();
        if let Value::Object(obj) = &root {
            if let GraphObject::Sequence(items) = &mut *obj.borrow_mut() {
                items.push(shared.clone());
                items.push(shared.clone());
            }
        }
        let json = serialize_snapshot(&root);
        let back = deserialize_snapshot(&json, &no_classes()).unwrap();
        if let Value::Object(obj) = &back {
            if let GraphObject::Sequence(items) = &*obj.borrow() {
                let (a, b) = (items[0].as_object().unwrap(), items[1].as_object().unwrap());
                assert!(Rc::ptr_eq(a, b));
            }
        }
    }

    #[test]
    fn event_value_resolves_external_reference() {
        let external_target = Value::new_record();
        let external_root = Value::new_record();
        if let Value::Object(obj) = &external_root {
            if let GraphObject::Record(r) = &mut *obj.borrow_mut() {
                r.set("existing", external_target.clone());
            }
        }
        let mut lookup = StdHashMap::new();
        if let Some(obj) = external_target.as_object() {
            lookup.insert(Rc::as_ptr(obj) as usize, Path::from_dotted("existing"));
        }
        let external = FakeExternal(lookup);

        let written = Value::new_record();
        if let Value::Object(obj) = &written {
            if let GraphObject::Record(r) = &mut *obj.borrow_mut() {
                r.set("ref_field", external_target.clone());
            }
        }
        let write_path = Path::from_dotted("somewhere");
        let json = serialize_event_value(&written, &write_path, &external);
        let back = deserialize_event_value(&json, &external_root, &no_classes()).unwrap();
        if let Value::Object(obj) = &back {
            if let GraphObject::Record(r) = &*obj.borrow() {
                let resolved = r.get("ref_field").unwrap().as_object().unwrap();
                assert!(Rc::ptr_eq(resolved, external_target.as_object().unwrap()));
            }
        }
    }

    #[test]
    fn class_marked_record_is_reattached_via_registry() {
        use eventgraph_registry::PlainClassInstance;
        use std::sync::Arc;

        let root = Value::new_record();
        if let Value::Object(obj) = &root {
            if let GraphObject::Record(r) = &mut *obj.borrow_mut() {
                r.class_name = Some("Employee".to_string());
                r.set("name", Value::Str("grace".into()));
            }
        }
        let json = serialize_snapshot(&root);

        let mut registry = ClassRegistry::new();
        registry.register("Employee", Arc::new(|| Box::new(PlainClassInstance::new("Employee")))).unwrap();

        let back = deserialize_snapshot(&json, &registry).unwrap();
        if let Value::Object(obj) = &back {
            if let GraphObject::Record(r) = &*obj.borrow() {
                assert_eq!(r.class_name.as_deref(), Some("Employee"));
                assert!(matches!(r.get("name"), Some(Value::Str(s)) if s == "grace"));
            } else {
                panic!("expected record");
            }
        } else {
            panic!("expected object");
        }
    }

    #[test]
    fn class_marked_record_with_no_factory_is_fatal() {
        let root = Value::new_record();
        if let Value::Object(obj) = &root {
            if let GraphObject::Record(r) = &mut *obj.borrow_mut() {
                r.class_name = Some("Ghost".to_string());
            }
        }
        let json = serialize_snapshot(&root);
        let err = deserialize_snapshot(&json, &no_classes());
        assert!(matches!(err, Err(CodecError::Class(_))));
    }
}
