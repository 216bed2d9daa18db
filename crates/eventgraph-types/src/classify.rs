//! Single-pass value classification — the one source of truth every other
//! component (codec, proxy, events) consults instead of re-inspecting a
//! [`Value`] on its own terms.

use crate::value::{GraphObject, Value};

/// The twelve categories a [`Value`] can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCategory {
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
    /// Boolean, number, or string.
    Primitive,
    /// Arbitrary-precision integer.
    BigInteger,
    /// An atomic, identity-only tag (symbol).
    AtomicTag,
    /// A timestamp.
    Timestamp,
    /// A regular expression.
    Regex,
    /// A function (source-bearing or not).
    Function,
    /// An indexed, ordered sequence.
    IndexedSequence,
    /// A keyed map.
    KeyValueMap,
    /// A unique set.
    UniqueSet,
    /// A plain (or class-tagged) record.
    PlainRecord,
}

impl ValueCategory {
    /// True for categories that can never have children and are passed by
    /// value rather than by reference.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            ValueCategory::Primitive | ValueCategory::BigInteger | ValueCategory::AtomicTag
        )
    }

    /// True for categories backed by an [`crate::value::ObjectRef`] and
    /// therefore participating in identity/cycle tracking.
    pub fn is_object(self) -> bool {
        matches!(
            self,
            ValueCategory::Timestamp
                | ValueCategory::Regex
                | ValueCategory::Function
                | ValueCategory::IndexedSequence
                | ValueCategory::KeyValueMap
                | ValueCategory::UniqueSet
                | ValueCategory::PlainRecord
        )
    }

    /// True for the three collection categories that support mutating
    /// methods (push/pop/…, set/delete/…, add/delete/…).
    pub fn is_collection(self) -> bool {
        matches!(
            self,
            ValueCategory::IndexedSequence | ValueCategory::KeyValueMap | ValueCategory::UniqueSet
        )
    }

    /// True for categories that are not representable as plain JSON and
    /// must be wrapped in a tagged record on the wire.
    pub fn needs_special_serialization(self) -> bool {
        matches!(
            self,
            ValueCategory::BigInteger
                | ValueCategory::AtomicTag
                | ValueCategory::Timestamp
                | ValueCategory::Regex
                | ValueCategory::Function
        )
    }
}

/// Classify a value in a single pass.
///
/// Note: this function does *not* distinguish a plain record from a class
/// instance — both classify as [`ValueCategory::PlainRecord`]. Instance
/// detection additionally requires consulting the class registry (it needs
/// to know what "the plain-record prototype" is), so it lives in
/// `eventgraph-registry` instead.
pub fn classify(value: &Value) -> ValueCategory {
    match value {
        Value::Null => ValueCategory::Null,
        Value::Undefined => ValueCategory::Undefined,
        Value::Bool(_) | Value::Number(_) | Value::Str(_) => ValueCategory::Primitive,
        Value::BigInt(_) => ValueCategory::BigInteger,
        Value::Symbol(_) => ValueCategory::AtomicTag,
        Value::Timestamp(_) => ValueCategory::Timestamp,
        Value::Regex(_) => ValueCategory::Regex,
        Value::Function(_) => ValueCategory::Function,
        Value::Object(obj) => match &*obj.borrow() {
            GraphObject::Record(_) => ValueCategory::PlainRecord,
            GraphObject::Sequence(_) => ValueCategory::IndexedSequence,
            GraphObject::KeyedMap(_) => ValueCategory::KeyValueMap,
            GraphObject::UniqueSet(_) => ValueCategory::UniqueSet,
        },
    }
}
