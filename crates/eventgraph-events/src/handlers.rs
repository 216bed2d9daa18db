//! One [`EventHandler`] per kind. Each pairs the recording
//! side (`emit`, run from the interception layer) with the reconstruction
//! side (`apply`, run by the replay engine).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use eventgraph_codec::{deserialize_event_value, serialize_event_value, ExternalPathLookup};
use eventgraph_registry::ClassRegistry;
use eventgraph_types::{GraphObject, Path, Value};

use crate::container::{default_cmp, get_child, remove_child, resolve_index, set_child};
use crate::error::EventsError;
use crate::event::Event;
use crate::handler::{register_handler, EventHandler};
use crate::mutation::Mutation;

fn mismatch(expected: &'static str, mutation: &Mutation) -> EventsError {
    EventsError::MutationMismatch { expected, actual: mutation.kind() }
}

fn expect_event<'a>(expected: &'static str, event: &'a Event) -> Result<&'a Event, EventsError> {
    if event.kind() == expected {
        Ok(event)
    } else {
        Err(EventsError::MutationMismatch { expected, actual: event.kind() })
    }
}

fn sequence_of(parent: &Value, key: &str, kind: &'static str) -> Result<Value, EventsError> {
    let child = get_child(parent, key)
        .ok_or_else(|| EventsError::OutOfRange(format!("no child at key {key:?}")))?;
    match &child {
        Value::Object(obj) if matches!(&*obj.borrow(), GraphObject::Sequence(_)) => Ok(child),
        _ => Err(EventsError::WrongParentType { kind, parent_kind: "not-a-sequence" }),
    }
}

fn map_of(parent: &Value, key: &str, kind: &'static str) -> Result<Value, EventsError> {
    let child = get_child(parent, key)
        .ok_or_else(|| EventsError::OutOfRange(format!("no child at key {key:?}")))?;
    match &child {
        Value::Object(obj) if matches!(&*obj.borrow(), GraphObject::KeyedMap(_)) => Ok(child),
        _ => Err(EventsError::WrongParentType { kind, parent_kind: "not-a-map" }),
    }
}

fn set_of(parent: &Value, key: &str, kind: &'static str) -> Result<Value, EventsError> {
    let child = get_child(parent, key)
        .ok_or_else(|| EventsError::OutOfRange(format!("no child at key {key:?}")))?;
    match &child {
        Value::Object(obj) if matches!(&*obj.borrow(), GraphObject::UniqueSet(_)) => Ok(child),
        _ => Err(EventsError::WrongParentType { kind, parent_kind: "not-a-set" }),
    }
}

/// Register every built-in handler. Idempotent; safe to call more than once
/// (e.g. once per test and once from [`eventgraph::MemoryImage::new`]).
pub fn install_builtin_handlers() {
    register_handler(Arc::new(PropertyWriteHandler));
    register_handler(Arc::new(PropertyDeleteHandler));
    register_handler(Arc::new(SequencePushHandler));
    register_handler(Arc::new(SequencePopHandler));
    register_handler(Arc::new(SequenceShiftHandler));
    register_handler(Arc::new(SequenceUnshiftHandler));
    register_handler(Arc::new(SequenceSpliceHandler));
    register_handler(Arc::new(SequenceSortHandler));
    register_handler(Arc::new(SequenceReverseHandler));
    register_handler(Arc::new(SequenceFillHandler));
    register_handler(Arc::new(SequenceCopyWithinHandler));
    register_handler(Arc::new(MapSetHandler));
    register_handler(Arc::new(MapDeleteHandler));
    register_handler(Arc::new(MapClearHandler));
    register_handler(Arc::new(SetAddHandler));
    register_handler(Arc::new(SetDeleteHandler));
    register_handler(Arc::new(SetClearHandler));
    register_handler(Arc::new(ScriptHandler));
}

struct PropertyWriteHandler;
impl EventHandler for PropertyWriteHandler {
    fn kind(&self) -> &'static str {
        "property-write"
    }
    fn emit(&self, path: &Path, mutation: Mutation, external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::PropertyWrite(value) = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        let value = serialize_event_value(&value, path, external);
        Ok(Event::PropertyWrite { path: path.clone(), value, timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, root: &Value, registry: &ClassRegistry) -> Result<(), EventsError> {
        let Event::PropertyWrite { value, .. } = expect_event(self.kind(), event)? else { unreachable!() };
        let value = deserialize_event_value(value, root, registry)?;
        set_child(parent, key, value)
    }
}

struct PropertyDeleteHandler;
impl EventHandler for PropertyDeleteHandler {
    fn kind(&self) -> &'static str {
        "property-delete"
    }
    fn emit(&self, path: &Path, mutation: Mutation, _external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::PropertyDelete = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        Ok(Event::PropertyDelete { path: path.clone(), timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, _root: &Value, _registry: &ClassRegistry) -> Result<(), EventsError> {
        expect_event(self.kind(), event)?;
        remove_child(parent, key)
    }
}

struct SequencePushHandler;
impl EventHandler for SequencePushHandler {
    fn kind(&self) -> &'static str {
        "sequence-push"
    }
    fn emit(&self, path: &Path, mutation: Mutation, external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::SequencePush(items) = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        let items = items.iter().map(|v| serialize_event_value(v, path, external)).collect();
        Ok(Event::SequencePush { path: path.clone(), items, timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, root: &Value, registry: &ClassRegistry) -> Result<(), EventsError> {
        let Event::SequencePush { items, .. } = expect_event(self.kind(), event)? else { unreachable!() };
        let seq = sequence_of(parent, key, self.kind())?;
        let Value::Object(obj) = &seq else { unreachable!() };
        let GraphObject::Sequence(vec) = &mut *obj.borrow_mut() else { unreachable!() };
        for item in items {
            vec.push(deserialize_event_value(item, root, registry)?);
        }
        Ok(())
    }
}

struct SequencePopHandler;
impl EventHandler for SequencePopHandler {
    fn kind(&self) -> &'static str {
        "sequence-pop"
    }
    fn emit(&self, path: &Path, mutation: Mutation, _external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::SequencePop = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        Ok(Event::SequencePop { path: path.clone(), timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, _root: &Value, _registry: &ClassRegistry) -> Result<(), EventsError> {
        expect_event(self.kind(), event)?;
        let seq = sequence_of(parent, key, self.kind())?;
        let Value::Object(obj) = &seq else { unreachable!() };
        let GraphObject::Sequence(vec) = &mut *obj.borrow_mut() else { unreachable!() };
        vec.pop();
        Ok(())
    }
}

struct SequenceShiftHandler;
impl EventHandler for SequenceShiftHandler {
    fn kind(&self) -> &'static str {
        "sequence-shift"
    }
    fn emit(&self, path: &Path, mutation: Mutation, _external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::SequenceShift = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        Ok(Event::SequenceShift { path: path.clone(), timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, _root: &Value, _registry: &ClassRegistry) -> Result<(), EventsError> {
        expect_event(self.kind(), event)?;
        let seq = sequence_of(parent, key, self.kind())?;
        let Value::Object(obj) = &seq else { unreachable!() };
        let GraphObject::Sequence(vec) = &mut *obj.borrow_mut() else { unreachable!() };
        if !vec.is_empty() {
            vec.remove(0);
        }
        Ok(())
    }
}

struct SequenceUnshiftHandler;
impl EventHandler for SequenceUnshiftHandler {
    fn kind(&self) -> &'static str {
        "sequence-unshift"
    }
    fn emit(&self, path: &Path, mutation: Mutation, external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::SequenceUnshift(items) = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        let items = items.iter().map(|v| serialize_event_value(v, path, external)).collect();
        Ok(Event::SequenceUnshift { path: path.clone(), items, timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, root: &Value, registry: &ClassRegistry) -> Result<(), EventsError> {
        let Event::SequenceUnshift { items, .. } = expect_event(self.kind(), event)? else { unreachable!() };
        let seq = sequence_of(parent, key, self.kind())?;
        let Value::Object(obj) = &seq else { unreachable!() };
        let GraphObject::Sequence(vec) = &mut *obj.borrow_mut() else { unreachable!() };
        let mut prepended = Vec::with_capacity(items.len());
        for item in items {
            prepended.push(deserialize_event_value(item, root, registry)?);
        }
        prepended.extend(vec.drain(..));
        *vec = prepended;
        Ok(())
    }
}

struct SequenceSpliceHandler;
impl EventHandler for SequenceSpliceHandler {
    fn kind(&self) -> &'static str {
        "sequence-splice"
    }
    fn emit(&self, path: &Path, mutation: Mutation, external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::SequenceSplice { start, delete_count, items } = mutation else {
            return Err(mismatch(self.kind(), &mutation));
        };
        let items = items.iter().map(|v| serialize_event_value(v, path, external)).collect();
        Ok(Event::SequenceSplice { path: path.clone(), start, delete_count, items, timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, root: &Value, registry: &ClassRegistry) -> Result<(), EventsError> {
        let Event::SequenceSplice { start, delete_count, items, .. } = expect_event(self.kind(), event)? else {
            unreachable!()
        };
        let seq = sequence_of(parent, key, self.kind())?;
        let Value::Object(obj) = &seq else { unreachable!() };
        let GraphObject::Sequence(vec) = &mut *obj.borrow_mut() else { unreachable!() };
        let start_idx = resolve_index(*start, vec.len());
        let end_idx = (start_idx + delete_count).min(vec.len());
        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            inserted.push(deserialize_event_value(item, root, registry)?);
        }
        vec.splice(start_idx..end_idx, inserted);
        Ok(())
    }
}

struct SequenceSortHandler;
impl EventHandler for SequenceSortHandler {
    fn kind(&self) -> &'static str {
        "sequence-sort"
    }
    fn emit(&self, path: &Path, mutation: Mutation, _external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::SequenceSort = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        Ok(Event::SequenceSort { path: path.clone(), timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, _root: &Value, _registry: &ClassRegistry) -> Result<(), EventsError> {
        expect_event(self.kind(), event)?;
        let seq = sequence_of(parent, key, self.kind())?;
        let Value::Object(obj) = &seq else { unreachable!() };
        let GraphObject::Sequence(vec) = &mut *obj.borrow_mut() else { unreachable!() };
        vec.sort_by(default_cmp);
        Ok(())
    }
}

struct SequenceReverseHandler;
impl EventHandler for SequenceReverseHandler {
    fn kind(&self) -> &'static str {
        "sequence-reverse"
    }
    fn emit(&self, path: &Path, mutation: Mutation, _external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::SequenceReverse = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        Ok(Event::SequenceReverse { path: path.clone(), timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, _root: &Value, _registry: &ClassRegistry) -> Result<(), EventsError> {
        expect_event(self.kind(), event)?;
        let seq = sequence_of(parent, key, self.kind())?;
        let Value::Object(obj) = &seq else { unreachable!() };
        let GraphObject::Sequence(vec) = &mut *obj.borrow_mut() else { unreachable!() };
        vec.reverse();
        Ok(())
    }
}

struct SequenceFillHandler;
impl EventHandler for SequenceFillHandler {
    fn kind(&self) -> &'static str {
        "sequence-fill"
    }
    fn emit(&self, path: &Path, mutation: Mutation, external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::SequenceFill { value, start, end } = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        let value = serialize_event_value(&value, path, external);
        Ok(Event::SequenceFill { path: path.clone(), value, start, end, timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, root: &Value, registry: &ClassRegistry) -> Result<(), EventsError> {
        let Event::SequenceFill { value, start, end, .. } = expect_event(self.kind(), event)? else { unreachable!() };
        let seq = sequence_of(parent, key, self.kind())?;
        let Value::Object(obj) = &seq else { unreachable!() };
        let GraphObject::Sequence(vec) = &mut *obj.borrow_mut() else { unreachable!() };
        let start_idx = resolve_index(*start, vec.len());
        let end_idx = resolve_index(*end, vec.len());
        let fill_value = deserialize_event_value(value, root, registry)?;
        for slot in vec.iter_mut().take(end_idx).skip(start_idx) {
            *slot = fill_value.clone();
        }
        Ok(())
    }
}

struct SequenceCopyWithinHandler;
impl EventHandler for SequenceCopyWithinHandler {
    fn kind(&self) -> &'static str {
        "sequence-copy-within"
    }
    fn emit(&self, path: &Path, mutation: Mutation, _external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::SequenceCopyWithin { target, start, end } = mutation else {
            return Err(mismatch(self.kind(), &mutation));
        };
        Ok(Event::SequenceCopyWithin { path: path.clone(), target, start, end, timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, _root: &Value, _registry: &ClassRegistry) -> Result<(), EventsError> {
        let Event::SequenceCopyWithin { target, start, end, .. } = expect_event(self.kind(), event)? else {
            unreachable!()
        };
        let seq = sequence_of(parent, key, self.kind())?;
        let Value::Object(obj) = &seq else { unreachable!() };
        let GraphObject::Sequence(vec) = &mut *obj.borrow_mut() else { unreachable!() };
        let len = vec.len();
        let target_idx = resolve_index(*target, len);
        let start_idx = resolve_index(*start, len);
        let end_idx = resolve_index(*end, len);
        let slice: Vec<Value> = vec[start_idx..end_idx].to_vec();
        for (offset, value) in slice.into_iter().enumerate() {
            let dest = target_idx + offset;
            if dest >= len {
                break;
            }
            vec[dest] = value;
        }
        Ok(())
    }
}

struct MapSetHandler;
impl EventHandler for MapSetHandler {
    fn kind(&self) -> &'static str {
        "map-set"
    }
    fn emit(&self, path: &Path, mutation: Mutation, external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::MapSet { key, value } = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        let key = serialize_event_value(&key, path, external);
        let value = serialize_event_value(&value, path, external);
        Ok(Event::MapSet { path: path.clone(), key, value, timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key_name: &str, root: &Value, registry: &ClassRegistry) -> Result<(), EventsError> {
        let Event::MapSet { key, value, .. } = expect_event(self.kind(), event)? else { unreachable!() };
        let map = map_of(parent, key_name, self.kind())?;
        let Value::Object(obj) = &map else { unreachable!() };
        let GraphObject::KeyedMap(assoc) = &mut *obj.borrow_mut() else { unreachable!() };
        let k = deserialize_event_value(key, root, registry)?;
        let v = deserialize_event_value(value, root, registry)?;
        assoc.set(k, v);
        Ok(())
    }
}

struct MapDeleteHandler;
impl EventHandler for MapDeleteHandler {
    fn kind(&self) -> &'static str {
        "map-delete"
    }
    fn emit(&self, path: &Path, mutation: Mutation, external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::MapDelete(key) = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        let key = serialize_event_value(&key, path, external);
        Ok(Event::MapDelete { path: path.clone(), key, timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key_name: &str, root: &Value, registry: &ClassRegistry) -> Result<(), EventsError> {
        let Event::MapDelete { key, .. } = expect_event(self.kind(), event)? else { unreachable!() };
        let map = map_of(parent, key_name, self.kind())?;
        let Value::Object(obj) = &map else { unreachable!() };
        let GraphObject::KeyedMap(assoc) = &mut *obj.borrow_mut() else { unreachable!() };
        let k = deserialize_event_value(key, root, registry)?;
        assoc.remove(&k);
        Ok(())
    }
}

struct MapClearHandler;
impl EventHandler for MapClearHandler {
    fn kind(&self) -> &'static str {
        "map-clear"
    }
    fn emit(&self, path: &Path, mutation: Mutation, _external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::MapClear = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        Ok(Event::MapClear { path: path.clone(), timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key_name: &str, _root: &Value, _registry: &ClassRegistry) -> Result<(), EventsError> {
        expect_event(self.kind(), event)?;
        let map = map_of(parent, key_name, self.kind())?;
        let Value::Object(obj) = &map else { unreachable!() };
        let GraphObject::KeyedMap(assoc) = &mut *obj.borrow_mut() else { unreachable!() };
        assoc.clear();
        Ok(())
    }
}

struct SetAddHandler;
impl EventHandler for SetAddHandler {
    fn kind(&self) -> &'static str {
        "set-add"
    }
    fn emit(&self, path: &Path, mutation: Mutation, external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::SetAdd(value) = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        let value = serialize_event_value(&value, path, external);
        Ok(Event::SetAdd { path: path.clone(), value, timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, root: &Value, registry: &ClassRegistry) -> Result<(), EventsError> {
        let Event::SetAdd { value, .. } = expect_event(self.kind(), event)? else { unreachable!() };
        let set = set_of(parent, key, self.kind())?;
        let Value::Object(obj) = &set else { unreachable!() };
        let GraphObject::UniqueSet(items) = &mut *obj.borrow_mut() else { unreachable!() };
        let v = deserialize_event_value(value, root, registry)?;
        if !items.iter().any(|item| eventgraph_types::value_eq(item, &v)) {
            items.push(v);
        }
        Ok(())
    }
}

struct SetDeleteHandler;
impl EventHandler for SetDeleteHandler {
    fn kind(&self) -> &'static str {
        "set-delete"
    }
    fn emit(&self, path: &Path, mutation: Mutation, external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::SetDelete(value) = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        let value = serialize_event_value(&value, path, external);
        Ok(Event::SetDelete { path: path.clone(), value, timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, root: &Value, registry: &ClassRegistry) -> Result<(), EventsError> {
        let Event::SetDelete { value, .. } = expect_event(self.kind(), event)? else { unreachable!() };
        let set = set_of(parent, key, self.kind())?;
        let Value::Object(obj) = &set else { unreachable!() };
        let GraphObject::UniqueSet(items) = &mut *obj.borrow_mut() else { unreachable!() };
        let v = deserialize_event_value(value, root, registry)?;
        items.retain(|item| !eventgraph_types::value_eq(item, &v));
        Ok(())
    }
}

struct SetClearHandler;
impl EventHandler for SetClearHandler {
    fn kind(&self) -> &'static str {
        "set-clear"
    }
    fn emit(&self, path: &Path, mutation: Mutation, _external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::SetClear = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        Ok(Event::SetClear { path: path.clone(), timestamp })
    }
    fn apply(&self, event: &Event, parent: &Value, key: &str, _root: &Value, _registry: &ClassRegistry) -> Result<(), EventsError> {
        expect_event(self.kind(), event)?;
        let set = set_of(parent, key, self.kind())?;
        let Value::Object(obj) = &set else { unreachable!() };
        let GraphObject::UniqueSet(items) = &mut *obj.borrow_mut() else { unreachable!() };
        items.clear();
        Ok(())
    }
}

struct ScriptHandler;
impl EventHandler for ScriptHandler {
    fn kind(&self) -> &'static str {
        "script"
    }
    fn emit(&self, path: &Path, mutation: Mutation, _external: &dyn ExternalPathLookup, timestamp: DateTime<Utc>) -> Result<Event, EventsError> {
        let Mutation::Script(source) = mutation else { return Err(mismatch(self.kind(), &mutation)) };
        Ok(Event::Script { path: path.clone(), source, timestamp })
    }
    fn apply(&self, event: &Event, _parent: &Value, _key: &str, _root: &Value, _registry: &ClassRegistry) -> Result<(), EventsError> {
        expect_event(self.kind(), event)?;
        // Records source text only; no graph state to mutate.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventgraph_types::ObjectRef;

    struct NoExternal;
    impl ExternalPathLookup for NoExternal {
        fn canonical_path(&self, _target: &ObjectRef) -> Option<Path> {
            None
        }
    }

    fn fresh_registry() {
        install_builtin_handlers();
    }

    fn no_classes() -> ClassRegistry {
        ClassRegistry::new()
    }

    #[test]
    fn property_write_then_delete_round_trip() {
        fresh_registry();
        let root = Value::new_record();
        let path = Path::from_dotted("name");
        let now: DateTime<Utc> = Utc::now();
        let event = crate::handler::emit(
            &path,
            Mutation::PropertyWrite(Value::Str("Ada".into())),
            &NoExternal,
            now,
        )
        .unwrap();
        crate::handler::apply(&event, &root, "name", &root, &no_classes()).unwrap();
        assert!(matches!(get_child(&root, "name"), Some(Value::Str(s)) if s == "Ada"));

        let delete = crate::handler::emit(&path, Mutation::PropertyDelete, &NoExternal, now).unwrap();
        crate::handler::apply(&delete, &root, "name", &root, &no_classes()).unwrap();
        assert!(get_child(&root, "name").is_none());
    }

    #[test]
    fn sequence_push_and_pop() {
        fresh_registry();
        let root = Value::new_record();
        if let Value::Object(obj) = &root {
            if let GraphObject::Record(r) = &mut *obj.borrow_mut() {
                r.set("items", Value::new_sequence());
            }
        }
        let path = Path::from_dotted("items");
        let now = Utc::now();
        let push = crate::handler::emit(
            &path,
            Mutation::SequencePush(vec![Value::Number(1.0), Value::Number(2.0)]),
            &NoExternal,
            now,
        )
        .unwrap();
        crate::handler::apply(&push, &root, "items", &root, &no_classes()).unwrap();
        let pop = crate::handler::emit(&path, Mutation::SequencePop, &NoExternal, now).unwrap();
        crate::handler::apply(&pop, &root, "items", &root, &no_classes()).unwrap();

        let items = get_child(&root, "items").unwrap();
        if let Value::Object(obj) = &items {
            if let GraphObject::Sequence(vec) = &*obj.borrow() {
                assert_eq!(vec.len(), 1);
                assert!(matches!(vec[0], Value::Number(n) if n == 1.0));
            }
        }
    }

    #[test]
    fn map_set_then_delete() {
        fresh_registry();
        let root = Value::new_record();
        if let Value::Object(obj) = &root {
            if let GraphObject::Record(r) = &mut *obj.borrow_mut() {
                r.set("tags", Value::new_map());
            }
        }
        let path = Path::from_dotted("tags");
        let now = Utc::now();
        let set = crate::handler::emit(
            &path,
            Mutation::MapSet { key: Value::Str("a".into()), value: Value::Number(1.0) },
            &NoExternal,
            now,
        )
        .unwrap();
        crate::handler::apply(&set, &root, "tags", &root, &no_classes()).unwrap();

        let delete = crate::handler::emit(&path, Mutation::MapDelete(Value::Str("a".into())), &NoExternal, now).unwrap();
        crate::handler::apply(&delete, &root, "tags", &root, &no_classes()).unwrap();

        let tags = get_child(&root, "tags").unwrap();
        if let Value::Object(obj) = &tags {
            if let GraphObject::KeyedMap(assoc) = &*obj.borrow() {
                assert!(assoc.is_empty());
            }
        }
    }

    #[test]
    fn wrong_mutation_for_handler_is_rejected() {
        let err = PropertyWriteHandler.emit(&Path::root(), Mutation::SetClear, &NoExternal, Utc::now());
        assert!(matches!(err, Err(EventsError::MutationMismatch { expected: "property-write", actual: "set-clear" })));
    }
}
