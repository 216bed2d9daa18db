//! Property tests for the nine invariants every image implementation must
//! hold, one `proptest!` block per invariant, driving async operations from
//! inside a property test via a throwaway single-threaded runtime.

use std::sync::Arc;

use eventgraph::{ClassRegistry, EventLog, Handle, MemoryImage, MemoryImageConfig, MemoryLog, Value};
use eventgraph_types::{GraphObject, Path};
use proptest::prelude::*;

fn install() {
    eventgraph_events::install_builtin_handlers();
}

fn image() -> MemoryImage {
    install();
    MemoryImage::from_value(Value::new_record(), ClassRegistry::new(), MemoryImageConfig::default())
}

fn field_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(|n| Value::Number(n as f64)),
        "[a-zA-Z0-9]{0,8}".prop_map(|s| Value::Str(s)),
    ]
}

fn assignment() -> impl Strategy<Value = (String, Value)> {
    (field_name(), leaf_value())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Invariant 1: snapshot(deserialize(serialize(G))) == serialize(G) for
    /// an acyclic graph of nested records and leaves.
    #[test]
    fn round_trips_under_snapshot(assignments in prop::collection::vec(assignment(), 1..8)) {
        install();
        let root = Value::new_record();
        if let Value::Object(obj) = &root {
            if let GraphObject::Record(rec) = &mut *obj.borrow_mut() {
                for (k, v) in &assignments {
                    rec.set(k.clone(), v.clone());
                }
            }
        }

        let before = eventgraph_codec::serialize_snapshot(&root);
        let registry = ClassRegistry::new();
        let restored = eventgraph_codec::deserialize_snapshot(&before, &registry).unwrap();
        let after = eventgraph_codec::serialize_snapshot(&restored);
        prop_assert_eq!(before, after);
    }

    /// Invariant 2: replaying the events recorded by a series of field
    /// writes lands on the same snapshot as the mutated graph itself.
    #[test]
    fn round_trips_under_replay(assignments in prop::collection::vec(assignment(), 1..8)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let img = image();
            let Handle::Record(root) = img.root() else { panic!() };
            for (k, v) in &assignments {
                root.set(k.clone(), v.clone()).await.unwrap();
            }

            let replayed_root = Value::new_record();
            let replay_infra = eventgraph_proxy::GraphInfra::new(Arc::new(MemoryLog::new()));
            eventgraph_replay::replay(img.log().as_ref(), &replayed_root, img.registry(), &replay_infra)
                .await
                .unwrap();

            let live = img.snapshot();
            let replayed = eventgraph_codec::serialize_snapshot(&replayed_root);
            prop_assert_eq!(live, replayed);
            Ok(())
        })?;
    }

    /// Invariant 3: events for two mutations on the same root appear in the
    /// log in the same order the mutations were made.
    #[test]
    fn event_ordering_matches_mutation_order(assignments in prop::collection::vec(assignment(), 2..8)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let img = image();
            let Handle::Record(root) = img.root() else { panic!() };
            for (k, v) in &assignments {
                root.set(k.clone(), v.clone()).await.unwrap();
            }

            let events = img.log().read_all().await.unwrap();
            prop_assert_eq!(events.len(), assignments.len());
            for (event, (k, _)) in events.iter().zip(assignments.iter()) {
                prop_assert_eq!(event.path().to_dotted(), k.clone());
            }
            Ok(())
        })?;
    }

    /// Invariant 4: applying a prefix of the log then the remaining suffix
    /// yields the same graph as applying the whole log at once.
    #[test]
    fn replay_is_idempotent_under_truncation(
        assignments in prop::collection::vec(assignment(), 2..10),
        split in 0usize..10,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let img = image();
            let Handle::Record(root) = img.root() else { panic!() };
            for (k, v) in &assignments {
                root.set(k.clone(), v.clone()).await.unwrap();
            }
            let all_events = img.log().read_all().await.unwrap();
            let split = split.min(all_events.len());
            let (prefix, suffix) = all_events.split_at(split);

            let prefix_log = MemoryLog::new();
            for e in prefix {
                prefix_log.append(e.clone()).await.unwrap();
            }
            let suffix_log = MemoryLog::new();
            for e in suffix {
                suffix_log.append(e.clone()).await.unwrap();
            }

            let piecewise_root = Value::new_record();
            let infra = eventgraph_proxy::GraphInfra::new(Arc::new(MemoryLog::new()));
            eventgraph_replay::replay(&prefix_log, &piecewise_root, img.registry(), &infra).await.unwrap();
            eventgraph_replay::replay(&suffix_log, &piecewise_root, img.registry(), &infra).await.unwrap();

            let whole_log = MemoryLog::new();
            for e in &all_events {
                whole_log.append(e.clone()).await.unwrap();
            }
            let whole_root = Value::new_record();
            let infra2 = eventgraph_proxy::GraphInfra::new(Arc::new(MemoryLog::new()));
            eventgraph_replay::replay(&whole_log, &whole_root, img.registry(), &infra2).await.unwrap();

            let piecewise = eventgraph_codec::serialize_snapshot(&piecewise_root);
            let whole = eventgraph_codec::serialize_snapshot(&whole_root);
            prop_assert_eq!(piecewise, whole);
            Ok(())
        })?;
    }

    /// Invariant 5: discarding a transaction after any sequence of writes
    /// leaves the base graph and the log untouched.
    #[test]
    fn transaction_discard_reverts_fully(assignments in prop::collection::vec(assignment(), 1..8)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let img = image();
            let before = img.snapshot();
            let events_before = img.log().read_all().await.unwrap().len();

            let tx = img.transaction();
            let eventgraph::TxHandle::Record(tx_root) = tx.root() else { panic!() };
            for (k, v) in &assignments {
                tx_root.set(k.clone(), v.clone());
            }
            tx.discard();

            let after = img.snapshot();
            let events_after = img.log().read_all().await.unwrap().len();
            prop_assert_eq!(before, after);
            prop_assert_eq!(events_before, events_after);
            Ok(())
        })?;
    }

    /// Invariant 6: saving a transaction produces the same base state and
    /// the same shape of events as applying the same writes directly.
    #[test]
    fn transaction_save_matches_direct_mutation(assignments in prop::collection::vec(assignment(), 1..8)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let direct_img = image();
            let Handle::Record(direct_root) = direct_img.root() else { panic!() };
            for (k, v) in &assignments {
                direct_root.set(k.clone(), v.clone()).await.unwrap();
            }

            let tx_img = image();
            let tx = tx_img.transaction();
            let eventgraph::TxHandle::Record(tx_root) = tx.root() else { panic!() };
            for (k, v) in &assignments {
                tx_root.set(k.clone(), v.clone());
            }
            tx_img.save(&tx).await.unwrap();

            prop_assert_eq!(direct_img.snapshot(), tx_img.snapshot());

            let direct_events = direct_img.log().read_all().await.unwrap();
            let tx_events = tx_img.log().read_all().await.unwrap();
            prop_assert_eq!(direct_events.len(), tx_events.len());
            for (d, t) in direct_events.iter().zip(tx_events.iter()) {
                prop_assert_eq!(d.kind(), t.kind());
                prop_assert_eq!(d.path().to_dotted(), t.path().to_dotted());
            }
            Ok(())
        })?;
    }

    /// Invariant 8: two reads of the same record field return wrappers that
    /// compare identical.
    #[test]
    fn identity_is_preserved_across_reads(key in field_name()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let img = image();
            let Handle::Record(root) = img.root() else { panic!() };
            root.set(key.clone(), Value::new_record()).await.unwrap();

            let first = root.get(&key);
            let second = root.get(&key);
            let (Some(Handle::Record(a)), Some(Handle::Record(b))) = (first, second) else {
                panic!("expected both reads to return a record handle")
            };
            prop_assert!(a == b);
            Ok(())
        })?;
    }

    /// Invariant 9: writing a value that references an already-reachable
    /// object serializes that reference as an absolute path to where the
    /// object actually lives.
    #[test]
    fn reference_to_reachable_object_serializes_with_absolute_path(marker in field_name()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let img = image();
            let Handle::Record(root) = img.root() else { panic!() };
            root.set("holder", Value::new_record()).await.unwrap();
            let Some(Handle::Record(holder)) = root.get("holder") else { panic!() };
            let target = Value::new_record();
            if let Value::Object(obj) = &target {
                if let GraphObject::Record(rec) = &mut *obj.borrow_mut() {
                    rec.set("marker", Value::Str(marker.clone()));
                }
            }
            holder.set("target", target.clone()).await.unwrap();

            let mut wrapper = Value::new_record();
            if let Value::Object(obj) = &mut wrapper {
                if let GraphObject::Record(rec) = &mut *obj.borrow_mut() {
                    rec.set("link", target.clone());
                }
            }
            root.set("wrapper", wrapper).await.unwrap();

            let events = img.log().read_all().await.unwrap();
            let write = events
                .iter()
                .find(|e| e.path().to_dotted() == "wrapper.link")
                .expect("expected a nested write event for the link field");
            let eventgraph::Event::PropertyWrite { value: json, .. } = write else {
                panic!("expected a property-write event")
            };
            prop_assert_eq!(json["type"].as_str(), Some("ref"));
            prop_assert_eq!(
                json["path"].clone(),
                serde_json::json!(Path::from_dotted("holder.target").segments().to_vec())
            );
            Ok(())
        })?;
    }
}

/// Invariant 7: a registered class's instance keeps its class name through
/// a snapshot round trip and passes an is-instance-of check. Not generated
/// over random field data since class identity, not field contents, is
/// what's under test — field survival alongside class identity is covered
/// by the concrete scenario tests.
#[test]
fn class_is_preserved_through_snapshot_round_trip() {
    install();
    let mut registry = ClassRegistry::new();
    registry
        .register(
            "Widget",
            std::sync::Arc::new(|| Box::new(eventgraph::PlainClassInstance::new("Widget")) as Box<dyn eventgraph::ClassInstance>),
        )
        .unwrap();

    let instance = registry.instantiate("Widget").unwrap();
    let json = eventgraph_codec::serialize_snapshot(&instance);
    let result = eventgraph_codec::deserialize_snapshot(&json, &registry).unwrap();

    let Value::Object(obj) = &result else { panic!() };
    let GraphObject::Record(rec) = &*obj.borrow() else { panic!() };
    assert_eq!(rec.class_name.as_deref(), Some("Widget"));
}
