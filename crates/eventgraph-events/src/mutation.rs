//! Raw (pre-serialization) mutation arguments passed to a handler's `emit`
//!. One variant per event kind.

use eventgraph_types::Value;

/// A trapped mutation, in the caller's own value terms, before its
/// arguments are run through the event-value serializer.
pub enum Mutation {
    /// Property write: the new value.
    PropertyWrite(Value),
    /// Property delete: no payload.
    PropertyDelete,
    /// `sequence.push(...items)`.
    SequencePush(Vec<Value>),
    /// `sequence.pop()`.
    SequencePop,
    /// `sequence.shift()`.
    SequenceShift,
    /// `sequence.unshift(...items)`.
    SequenceUnshift(Vec<Value>),
    /// `sequence.splice(start, deleteCount, ...items)`.
    SequenceSplice {
        /// Index at which to start changing the sequence.
        start: i64,
        /// Number of elements to remove starting at `start`.
        delete_count: usize,
        /// Elements to insert in place of the removed ones.
        items: Vec<Value>,
    },
    /// `sequence.sort()`.
    SequenceSort,
    /// `sequence.reverse()`.
    SequenceReverse,
    /// `sequence.fill(value, start, end)`.
    SequenceFill {
        /// Value to fill the range with.
        value: Value,
        /// Start index of the range to fill.
        start: i64,
        /// End index (exclusive) of the range to fill.
        end: i64,
    },
    /// `sequence.copyWithin(target, start, end)`.
    SequenceCopyWithin {
        /// Index to copy the range to.
        target: i64,
        /// Start index of the range to copy.
        start: i64,
        /// End index (exclusive) of the range to copy.
        end: i64,
    },
    /// `map.set(key, value)`.
    MapSet {
        /// Key to set.
        key: Value,
        /// Value to associate with the key.
        value: Value,
    },
    /// `map.delete(key)`.
    MapDelete(Value),
    /// `map.clear()`.
    MapClear,
    /// `set.add(value)`.
    SetAdd(Value),
    /// `set.delete(value)`.
    SetDelete(Value),
    /// `set.clear()`.
    SetClear,
    /// A function's source text.
    Script(String),
}

impl Mutation {
    /// The kind tag this mutation will be emitted under. Must match the
    /// [`Event`](crate::Event) variant the matching handler produces.
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::PropertyWrite(_) => "property-write",
            Mutation::PropertyDelete => "property-delete",
            Mutation::SequencePush(_) => "sequence-push",
            Mutation::SequencePop => "sequence-pop",
            Mutation::SequenceShift => "sequence-shift",
            Mutation::SequenceUnshift(_) => "sequence-unshift",
            Mutation::SequenceSplice { .. } => "sequence-splice",
            Mutation::SequenceSort => "sequence-sort",
            Mutation::SequenceReverse => "sequence-reverse",
            Mutation::SequenceFill { .. } => "sequence-fill",
            Mutation::SequenceCopyWithin { .. } => "sequence-copy-within",
            Mutation::MapSet { .. } => "map-set",
            Mutation::MapDelete(_) => "map-delete",
            Mutation::MapClear => "map-clear",
            Mutation::SetAdd(_) => "set-add",
            Mutation::SetDelete(_) => "set-delete",
            Mutation::SetClear => "set-clear",
            Mutation::Script(_) => "script",
        }
    }
}
