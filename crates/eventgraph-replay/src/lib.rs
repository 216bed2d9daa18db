#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! **eventgraph-replay** – Rebuilds a raw object graph by applying a
//! recorded event log in order.
//!
//! For each event, in append order: navigate from the raw root to the
//! event's parent path, creating any missing intermediate container along
//! the way (a record for a non-numeric segment, a sequence for a numeric
//! one), then dispatch to the handler registered for the event's kind.
//! [`eventgraph_proxy::GraphInfra::set_replaying`] is held true for the
//! duration so that any wrapper watching the same root does not re-emit
//! while these writes land.

mod error;

pub use error::ReplayError;

use futures::StreamExt;

use eventgraph_events::{get_child, set_child};
use eventgraph_log::EventLog;
use eventgraph_proxy::GraphInfra;
use eventgraph_registry::ClassRegistry;
use eventgraph_types::{Path, Value};

/// Replay every event in `log`, in order, onto `root`. Tolerates both an
/// eagerly-loaded log and one whose [`EventLog::stream`] is a genuinely lazy
/// cursor — both go through the same `stream()` call.
pub async fn replay(
    log: &dyn EventLog,
    root: &Value,
    registry: &ClassRegistry,
    infra: &GraphInfra,
) -> Result<(), ReplayError> {
    infra.set_replaying(true);
    let result = replay_events(log, root, registry).await;
    infra.set_replaying(false);
    result
}

async fn replay_events(
    log: &dyn EventLog,
    root: &Value,
    registry: &ClassRegistry,
) -> Result<(), ReplayError> {
    let mut events = log.stream().await?;
    while let Some(event) = events.next().await {
        let event = event?;
        let (parent_path, key) = event.path().split_last().ok_or(ReplayError::RootEvent)?;
        let parent = navigate_or_create(root, &parent_path)?;
        eventgraph_events::apply(&event, &parent, key, root, registry)?;
        tracing::trace!(path = %event.path(), kind = event.kind(), "replayed event");
    }
    Ok(())
}

/// Walk `path`'s segments from `root`, creating a record or sequence at any
/// segment that is missing or currently `Value::Undefined` (a hole left by
/// a prior delete). The new container's kind is decided by the segment
/// itself — numeric segments get a sequence, everything else a record —
/// since that segment is how the container will be addressed once created.
fn navigate_or_create(root: &Value, path: &Path) -> Result<Value, ReplayError> {
    let mut current = root.clone();
    for segment in path.segments() {
        let existing = get_child(&current, segment);
        current = match existing {
            Some(value) if !matches!(value, Value::Undefined) => value,
            _ => {
                let fresh = if segment.parse::<usize>().is_ok() { Value::new_sequence() } else { Value::new_record() };
                set_child(&current, segment, fresh.clone()).map_err(|_| ReplayError::NotNavigable {
                    segment: segment.clone(),
                })?;
                fresh
            }
        };
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventgraph_events::install_builtin_handlers;
    use eventgraph_log::MemoryLog;
    use eventgraph_types::GraphObject;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryLog>, GraphInfra, ClassRegistry) {
        install_builtin_handlers();
        let log = Arc::new(MemoryLog::new());
        let infra = GraphInfra::new(log.clone());
        (log, infra, ClassRegistry::new())
    }

    #[tokio::test]
    async fn replays_property_write_through_missing_parent() {
        let (log, _infra, registry) = setup();
        let event = eventgraph_events::emit(
            &Path::from_dotted("dept.name"),
            eventgraph_events::Mutation::PropertyWrite(Value::Str("eng".into())),
            &NoExternal,
            chrono::Utc::now(),
        )
        .unwrap();
        log.append(event).await.unwrap();

        let root = Value::new_record();
        let infra2 = GraphInfra::new(log.clone());
        replay(log.as_ref(), &root, &registry, &infra2).await.unwrap();

        let Value::Object(obj) = &root else { panic!() };
        let GraphObject::Record(rec) = &*obj.borrow() else { panic!() };
        let Value::Object(dept) = rec.get("dept").unwrap() else { panic!("dept should have been created") };
        let GraphObject::Record(dept_rec) = &*dept.borrow() else { panic!() };
        assert!(matches!(dept_rec.get("name"), Some(Value::Str(s)) if s == "eng"));
    }

    #[tokio::test]
    async fn replay_suppresses_nothing_but_sets_flag_during() {
        let (log, infra, registry) = setup();
        let root = Value::new_record();
        assert!(!infra.is_replaying());
        replay(log.as_ref(), &root, &registry, &infra).await.unwrap();
        assert!(!infra.is_replaying());
    }

    #[tokio::test]
    async fn creates_sequence_for_numeric_segment() {
        let (log, _infra, registry) = setup();
        let event = eventgraph_events::emit(
            &Path::from_dotted("items.0"),
            eventgraph_events::Mutation::PropertyWrite(Value::Number(1.0)),
            &NoExternal,
            chrono::Utc::now(),
        )
        .unwrap();
        log.append(event).await.unwrap();

        let root = Value::new_record();
        let infra2 = GraphInfra::new(log.clone());
        replay(log.as_ref(), &root, &registry, &infra2).await.unwrap();

        let Value::Object(obj) = &root else { panic!() };
        let GraphObject::Record(rec) = &*obj.borrow() else { panic!() };
        let Value::Object(items) = rec.get("items").unwrap() else { panic!("items should have been created") };
        assert!(matches!(&*items.borrow(), GraphObject::Sequence(_)), "numeric segment should create a sequence");
    }

    struct NoExternal;
    impl eventgraph_codec::ExternalPathLookup for NoExternal {
        fn canonical_path(&self, _target: &eventgraph_types::ObjectRef) -> Option<Path> {
            None
        }
    }
}
