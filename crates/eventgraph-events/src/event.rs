//! The 18 event kinds. An event is a value-object: once
//! appended to the log it is never mutated.

use chrono::{DateTime, Utc};
use eventgraph_types::Path;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// A single recorded mutation. `path` names the target's parent collection
/// (for sequence/map/set kinds) or the mutated record itself (for
/// property/script kinds); `value`/`items`/`key` fields carry already
/// wire-encoded payloads (the output of `eventgraph_codec::serialize_event_value`),
/// matching the on-log JSON shape directly so `eventgraph-log` backends can
/// serialize an `Event` with no further transformation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    /// A property (record field) was written.
    PropertyWrite {
        /// Path to the property itself (parent path + field name).
        path: Path,
        /// The serialized new value.
        value: Json,
        /// When the write was observed.
        timestamp: DateTime<Utc>,
    },
    /// A property (record field) was deleted.
    PropertyDelete {
        /// Path to the deleted property.
        path: Path,
        /// When the delete was observed.
        timestamp: DateTime<Utc>,
    },
    /// `sequence.push(...items)`.
    SequencePush {
        /// Path to the sequence.
        path: Path,
        /// Serialized pushed items, in call order.
        items: Vec<Json>,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `sequence.pop()`.
    SequencePop {
        /// Path to the sequence.
        path: Path,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `sequence.shift()`.
    SequenceShift {
        /// Path to the sequence.
        path: Path,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `sequence.unshift(...items)`.
    SequenceUnshift {
        /// Path to the sequence.
        path: Path,
        /// Serialized prepended items, in call order.
        items: Vec<Json>,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `sequence.splice(start, deleteCount, ...items)`.
    SequenceSplice {
        /// Path to the sequence.
        path: Path,
        /// Splice start index.
        start: i64,
        /// Number of elements removed.
        delete_count: usize,
        /// Serialized inserted items, in call order.
        items: Vec<Json>,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `sequence.sort()` (default ordering; spec does not define a
    /// serializable comparator).
    SequenceSort {
        /// Path to the sequence.
        path: Path,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `sequence.reverse()`.
    SequenceReverse {
        /// Path to the sequence.
        path: Path,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `sequence.fill(value, start, end)`.
    SequenceFill {
        /// Path to the sequence.
        path: Path,
        /// Serialized fill value.
        value: Json,
        /// Fill start index.
        start: i64,
        /// Fill end index (exclusive).
        end: i64,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `sequence.copyWithin(target, start, end)`.
    SequenceCopyWithin {
        /// Path to the sequence.
        path: Path,
        /// Copy destination index.
        target: i64,
        /// Copy source start index.
        start: i64,
        /// Copy source end index (exclusive).
        end: i64,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `map.set(key, value)`.
    MapSet {
        /// Path to the map.
        path: Path,
        /// Serialized key.
        key: Json,
        /// Serialized value.
        value: Json,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `map.delete(key)`.
    MapDelete {
        /// Path to the map.
        path: Path,
        /// Serialized key.
        key: Json,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `map.clear()`.
    MapClear {
        /// Path to the map.
        path: Path,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `set.add(value)`.
    SetAdd {
        /// Path to the set.
        path: Path,
        /// Serialized value.
        value: Json,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `set.delete(value)`.
    SetDelete {
        /// Path to the set.
        path: Path,
        /// Serialized value.
        value: Json,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// `set.clear()`.
    SetClear {
        /// Path to the set.
        path: Path,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
    /// Records a function's source text; no graph state changes.
    Script {
        /// Path to the function slot.
        path: Path,
        /// The function's source text.
        source: String,
        /// When observed.
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    /// The stable kind tag this event was recorded under, e.g.
    /// `"property-write"`. Matches [`crate::handler::EventHandler::kind`] and
    /// the wire `type` discriminant.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::PropertyWrite { .. } => "property-write",
            Event::PropertyDelete { .. } => "property-delete",
            Event::SequencePush { .. } => "sequence-push",
            Event::SequencePop { .. } => "sequence-pop",
            Event::SequenceShift { .. } => "sequence-shift",
            Event::SequenceUnshift { .. } => "sequence-unshift",
            Event::SequenceSplice { .. } => "sequence-splice",
            Event::SequenceSort { .. } => "sequence-sort",
            Event::SequenceReverse { .. } => "sequence-reverse",
            Event::SequenceFill { .. } => "sequence-fill",
            Event::SequenceCopyWithin { .. } => "sequence-copy-within",
            Event::MapSet { .. } => "map-set",
            Event::MapDelete { .. } => "map-delete",
            Event::MapClear { .. } => "map-clear",
            Event::SetAdd { .. } => "set-add",
            Event::SetDelete { .. } => "set-delete",
            Event::SetClear { .. } => "set-clear",
            Event::Script { .. } => "script",
        }
    }

    /// Path to the target this event was recorded against.
    pub fn path(&self) -> &Path {
        match self {
            Event::PropertyWrite { path, .. }
            | Event::PropertyDelete { path, .. }
            | Event::SequencePush { path, .. }
            | Event::SequencePop { path, .. }
            | Event::SequenceShift { path, .. }
            | Event::SequenceUnshift { path, .. }
            | Event::SequenceSplice { path, .. }
            | Event::SequenceSort { path, .. }
            | Event::SequenceReverse { path, .. }
            | Event::SequenceFill { path, .. }
            | Event::SequenceCopyWithin { path, .. }
            | Event::MapSet { path, .. }
            | Event::MapDelete { path, .. }
            | Event::MapClear { path, .. }
            | Event::SetAdd { path, .. }
            | Event::SetDelete { path, .. }
            | Event::SetClear { path, .. }
            | Event::Script { path, .. } => path,
        }
    }

    /// When this event was observed.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Event::PropertyWrite { timestamp, .. }
            | Event::PropertyDelete { timestamp, .. }
            | Event::SequencePush { timestamp, .. }
            | Event::SequencePop { timestamp, .. }
            | Event::SequenceShift { timestamp, .. }
            | Event::SequenceUnshift { timestamp, .. }
            | Event::SequenceSplice { timestamp, .. }
            | Event::SequenceSort { timestamp, .. }
            | Event::SequenceReverse { timestamp, .. }
            | Event::SequenceFill { timestamp, .. }
            | Event::SequenceCopyWithin { timestamp, .. }
            | Event::MapSet { timestamp, .. }
            | Event::MapDelete { timestamp, .. }
            | Event::MapClear { timestamp, .. }
            | Event::SetAdd { timestamp, .. }
            | Event::SetDelete { timestamp, .. }
            | Event::SetClear { timestamp, .. }
            | Event::Script { timestamp, .. } => *timestamp,
        }
    }
}
