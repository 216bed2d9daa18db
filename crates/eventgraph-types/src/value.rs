//! The in-memory object graph's value representation.
//!
//! Rust has no native dynamic-proxy mechanism, so the graph is represented
//! explicitly: [`Value`] is a tagged union over every kind of value the
//! graph can hold, and objects are [`ObjectRef`] — a reference-counted,
//! interior-mutable cell — so that
//! two holders of the same object observe each other's writes and cycles are
//! representable. Identity (used for canonical paths and reference nodes)
//! is `Rc` pointer identity, not structural equality.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};

/// A reference-counted, interior-mutable graph object. Two [`Value::Object`]
/// instances referring to the same object are `Rc::ptr_eq`.
pub type ObjectRef = Rc<RefCell<GraphObject>>;

/// Any value reachable in the object graph.
#[derive(Clone)]
pub enum Value {
    /// JavaScript-style `null` — an explicit absence.
    Null,
    /// JavaScript-style `undefined` — an unset slot.
    Undefined,
    /// Boolean primitive.
    Bool(bool),
    /// Double-precision numeric primitive.
    Number(f64),
    /// UTF-8 string primitive.
    Str(String),
    /// Arbitrary-precision integer, stored as its canonical decimal string.
    BigInt(String),
    /// An atomic, identity-only tag with an optional human-readable
    /// description. `Rc`-shared so cloning a symbol preserves its identity
    /// rather than minting a lookalike.
    Symbol(Rc<SymbolId>),
    /// A timestamp plus any user-defined enumerable properties attached to
    /// it after construction.
    Timestamp(TimestampValue),
    /// A regular expression plus any user-defined enumerable properties.
    Regex(RegexValue),
    /// A function captured by its source text only; its closure environment
    /// does not survive the round trip.
    Function(FunctionValue),
    /// A record, sequence, keyed map, or unique set.
    Object(ObjectRef),
}

/// The shared identity cell behind a [`Value::Symbol`]. Two symbols are the
/// same symbol only if they share a `SymbolId` — never by description.
#[derive(Debug)]
pub struct SymbolId {
    /// The symbol's human-readable description, if any.
    pub description: Option<String>,
}

/// A timestamp. `value` is `None` when the timestamp is invalid — this is
/// preserved rather than rejected, and is encoded on the wire with its date
/// field set to `null`.
#[derive(Clone, Debug, Default)]
pub struct TimestampValue {
    /// The timestamp, or `None` if invalid.
    pub value: Option<DateTime<Utc>>,
    /// Enumerable properties attached to the timestamp after construction.
    pub extra: HashMap<String, Value>,
}

/// A regular expression.
#[derive(Clone, Debug)]
pub struct RegexValue {
    /// The pattern source.
    pub source: String,
    /// Flag characters (e.g. `"gi"`).
    pub flags: String,
    /// The engine's last-match cursor.
    pub last_index: u64,
    /// Enumerable properties attached to the regex after construction.
    pub extra: HashMap<String, Value>,
}

/// A function, captured by source text only. `source_code` is `None` for a
/// function the host cannot render as source (e.g. a native/built-in
/// function); serializing it in event mode yields the absence sentinel
/// rather than failing.
#[derive(Clone, Debug)]
pub struct FunctionValue {
    /// The function's source text, or `None` if non-source-bearing.
    pub source_code: Option<String>,
}

/// The four collection/record shapes an [`ObjectRef`] can point to.
pub enum GraphObject {
    /// A plain or class-tagged record (JS-style object with string keys).
    Record(Record),
    /// An indexed, ordered sequence (JS-style array).
    Sequence(Vec<Value>),
    /// An insertion-ordered keyed map (JS-style `Map`), any value as key.
    KeyedMap(OrderedAssoc),
    /// An insertion-ordered unique set (JS-style `Set`).
    UniqueSet(Vec<Value>),
}

/// A record's fields, insertion-ordered, plus an optional class-name marker
/// used to preserve instance identity across the serialization boundary
///.
#[derive(Default)]
pub struct Record {
    entries: Vec<(String, Value)>,
    /// The class this record was registered under, if it is a class
    /// instance rather than a plain record.
    pub class_name: Option<String>,
}

impl Record {
    /// A new, empty, plain record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or overwrite a field, preserving the original insertion
    /// position on overwrite.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Remove a field, returning its previous value if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// True if the field is present.
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An insertion-ordered association list used for [`GraphObject::KeyedMap`].
/// A `Vec` rather than a `HashMap` because map keys can be any [`Value`]
/// (including objects, compared by identity) and iteration order is
/// insertion order — both are awkward to express with a hashing container
/// without a canonical-key encoding.
#[derive(Default)]
pub struct OrderedAssoc {
    entries: Vec<(Value, Value)>,
}

impl OrderedAssoc {
    /// A new, empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up by key using [`value_eq`] identity/structural equality.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| value_eq(k, key)).map(|(_, v)| v)
    }

    /// Insert or overwrite, preserving insertion position on overwrite.
    pub fn set(&mut self, key: Value, value: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| value_eq(k, &key)) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Remove by key, returning the previous value if present.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| value_eq(k, key))?;
        Some(self.entries.remove(idx).1)
    }

    /// True if the key is present.
    pub fn has(&self, key: &Value) -> bool {
        self.entries.iter().any(|(k, _)| value_eq(k, key))
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }

    /// Push a raw `(key, value)` pair without deduplicating against existing
    /// keys. Used by the deserializer's first pass, which must preserve
    /// entry *position* for later reference-patching before keys are fully
    /// resolved (a placeholder key cannot yet be compared with
    /// [`value_eq`]).
    pub fn push_raw(&mut self, key: Value, value: Value) -> usize {
        self.entries.push((key, value));
        self.entries.len() - 1
    }

    /// Overwrite the key and value at a given insertion position. Used by
    /// the deserializer's second pass to patch in a resolved reference.
    pub fn patch_at(&mut self, index: usize, key: Value, value: Value) {
        self.entries[index] = (key, value);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Structural equality for primitives, identity equality for objects. This
/// is the equality JS `Map`/`Set` use for their keys/members (`SameValueZero`,
/// approximated here without the `NaN`-equals-`NaN` special case since the
/// graph never needs to dedupe on that).
pub fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => Rc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::BigInt(s) => write!(f, "{s}n"),
            Value::Symbol(id) => write!(f, "Symbol({:?})", id.description),
            Value::Timestamp(t) => write!(f, "Timestamp({:?})", t.value),
            Value::Regex(r) => write!(f, "/{}/{}", r.source, r.flags),
            Value::Function(fun) => write!(f, "Function({:?})", fun.source_code.is_some()),
            Value::Object(obj) => match &*obj.borrow() {
                GraphObject::Record(r) => write!(f, "Record(fields={})", r.len()),
                GraphObject::Sequence(s) => write!(f, "Sequence(len={})", s.len()),
                GraphObject::KeyedMap(m) => write!(f, "Map(len={})", m.len()),
                GraphObject::UniqueSet(s) => write!(f, "Set(len={})", s.len()),
            },
        }
    }
}

impl Value {
    /// Mint a fresh symbol with its own identity, distinct from every other
    /// symbol regardless of description.
    pub fn new_symbol(description: Option<String>) -> Value {
        Value::Symbol(Rc::new(SymbolId { description }))
    }

    /// Construct a new, empty record object.
    pub fn new_record() -> Value {
        Value::Object(Rc::new(RefCell::new(GraphObject::Record(Record::new()))))
    }

    /// Construct a new, empty sequence object.
    pub fn new_sequence() -> Value {
        Value::Object(Rc::new(RefCell::new(GraphObject::Sequence(Vec::new()))))
    }

    /// Construct a new, empty keyed-map object.
    pub fn new_map() -> Value {
        Value::Object(Rc::new(RefCell::new(GraphObject::KeyedMap(OrderedAssoc::new()))))
    }

    /// Construct a new, empty unique-set object.
    pub fn new_set() -> Value {
        Value::Object(Rc::new(RefCell::new(GraphObject::UniqueSet(Vec::new()))))
    }

    /// Borrow the object cell, if this value is an object.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_equals_its_own_clone_but_not_a_lookalike() {
        let sym = Value::new_symbol(Some("id".into()));
        let clone = sym.clone();
        let lookalike = Value::new_symbol(Some("id".into()));

        assert!(value_eq(&sym, &clone));
        assert!(!value_eq(&sym, &lookalike));
    }

    #[test]
    fn symbol_works_as_a_map_key_through_clones() {
        let key = Value::new_symbol(None);
        let mut map = OrderedAssoc::new();
        map.set(key.clone(), Value::Number(1.0));

        assert!(matches!(map.get(&key.clone()), Some(Value::Number(n)) if *n == 1.0));
        assert!(map.remove(&key.clone()).is_some());
        assert!(map.get(&key).is_none());
    }
}
