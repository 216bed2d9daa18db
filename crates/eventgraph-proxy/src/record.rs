//! Wrapper over a [`GraphObject::Record`].

use std::rc::Rc;

use eventgraph_codec::ExternalPathLookup;
use eventgraph_events::Mutation;
use eventgraph_types::{GraphObject, ObjectRef, Path, Value, ABSENT_SENTINEL};

use crate::error::ProxyError;
use crate::handle::{wrap, Handle};
use crate::infra::GraphInfra;

/// A transparent view over a record, trapping field reads, writes, and
/// deletes.
#[derive(Clone)]
pub struct RecordHandle {
    pub(crate) obj: ObjectRef,
    pub(crate) infra: Rc<GraphInfra>,
}

impl RecordHandle {
    pub(crate) fn new(obj: ObjectRef, infra: Rc<GraphInfra>) -> Self {
        Self { obj, infra }
    }

    fn path(&self) -> Path {
        self.infra
            .canonical_path(&self.obj)
            .expect("RecordHandle target was never attached to the graph")
    }

    /// The raw object this handle wraps, for advanced use.
    pub fn target(&self) -> &ObjectRef {
        &self.obj
    }

    /// Read a field, wrapping any object value in its own handle (rule 1);
    /// primitives and leaf values pass through unwrapped.
    pub fn get(&self, key: &str) -> Option<Handle> {
        let value = eventgraph_events::get_child(&Value::Object(self.obj.clone()), key)?;
        Some(wrap(value, &self.infra))
    }

    /// True if the field is present.
    pub fn has(&self, key: &str) -> bool {
        match &*self.obj.borrow() {
            GraphObject::Record(record) => record.has(key),
            _ => unreachable!("RecordHandle always wraps a Record"),
        }
    }

    /// Own field names in insertion order.
    pub fn keys(&self) -> Vec<String> {
        match &*self.obj.borrow() {
            GraphObject::Record(record) => record.iter().map(|(k, _)| k.to_string()).collect(),
            _ => unreachable!("RecordHandle always wraps a Record"),
        }
    }

    /// The class this record was reconstructed under, if any.
    pub fn class_name(&self) -> Option<String> {
        match &*self.obj.borrow() {
            GraphObject::Record(record) => record.class_name.clone(),
            _ => unreachable!("RecordHandle always wraps a Record"),
        }
    }

    /// Install `value` at `key`, assign canonical paths to any object it
    /// newly introduces, and (unless the replay flag is set) emit the
    /// matching event.
    ///
    /// A function value is the one exception: since a function's only
    /// durable trace is its source text and a replayed `script` event does
    /// not touch graph state, writing a function emits
    /// `script` rather than `property-write` — the field is still installed
    /// for the live session, but a restart will not resurrect it.
    pub async fn set(&self, key: impl Into<String>, value: Value) -> Result<(), ProxyError> {
        let key = key.into();
        eventgraph_events::set_child(&Value::Object(self.obj.clone()), &key, value.clone())?;
        let prop_path = self.path().child(&key);
        if let Value::Function(f) = &value {
            let source = f.source_code.clone().unwrap_or_else(|| ABSENT_SENTINEL.to_string());
            return self.infra.record(&prop_path, Mutation::Script(source)).await;
        }
        self.infra.assign_paths(&value, &prop_path);
        self.infra.record(&prop_path, Mutation::PropertyWrite(value)).await
    }

    /// Remove `key` and emit a property-delete event.
    pub async fn delete(&self, key: &str) -> Result<(), ProxyError> {
        eventgraph_events::remove_child(&Value::Object(self.obj.clone()), key)?;
        let prop_path = self.path().child(key);
        self.infra.record(&prop_path, Mutation::PropertyDelete).await
    }
}

impl PartialEq for RecordHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.obj, &other.obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::GraphInfra;
    use eventgraph_events::install_builtin_handlers;
    use eventgraph_log::MemoryLog;
    use std::sync::Arc as StdArc;

    fn handle() -> RecordHandle {
        install_builtin_handlers();
        let infra = Rc::new(GraphInfra::new(StdArc::new(MemoryLog::new())));
        let value = Value::new_record();
        infra.assign_paths(&value, &Path::root());
        let Value::Object(obj) = value else { unreachable!() };
        RecordHandle::new(obj, infra)
    }

    #[tokio::test]
    async fn set_then_get_reads_back() {
        let rh = handle();
        rh.set("name", Value::Str("Ada".into())).await.unwrap();
        let Some(Handle::Leaf(Value::Str(name))) = rh.get("name") else { panic!("expected leaf") };
        assert_eq!(name, "Ada");
        assert!(rh.has("name"));
    }

    #[tokio::test]
    async fn set_logs_one_event() {
        let rh = handle();
        rh.set("name", Value::Str("Ada".into())).await.unwrap();
        let events = rh.infra.log().read_all().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "property-write");
    }

    #[tokio::test]
    async fn nested_record_write_gets_a_wrapped_handle_back() {
        let rh = handle();
        rh.set("dept", Value::new_record()).await.unwrap();
        let Some(Handle::Record(dept)) = rh.get("dept") else { panic!("expected record handle") };
        dept.set("name", Value::Str("eng".into())).await.unwrap();
        let events = rh.infra.log().read_all().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].path().to_dotted(), "dept.name");
    }

    #[tokio::test]
    async fn delete_removes_field_and_emits() {
        let rh = handle();
        rh.set("name", Value::Str("Ada".into())).await.unwrap();
        rh.delete("name").await.unwrap();
        assert!(rh.get("name").is_none());
        let events = rh.infra.log().read_all().await.unwrap();
        assert_eq!(events[1].kind(), "property-delete");
    }

    #[tokio::test]
    async fn replay_flag_suppresses_emission() {
        let rh = handle();
        rh.infra.set_replaying(true);
        rh.set("name", Value::Str("Ada".into())).await.unwrap();
        assert!(rh.infra.log().read_all().await.unwrap().is_empty());
    }
}
