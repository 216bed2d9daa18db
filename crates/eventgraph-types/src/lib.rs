#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! **eventgraph-types** – Core value/path data model for eventgraph.
//!
//! This crate is the bottom of the crate graph: every other eventgraph
//! crate depends on it, and it depends on nothing eventgraph-specific. It
//! defines the object-graph representation ([`Value`], [`GraphObject`]),
//! the canonical location type ([`Path`]), and the single-pass type
//! classifier every other component consults rather than re-inspecting
//! values on its own terms.

mod classify;
mod path;
mod value;

pub use classify::{classify, ValueCategory};
pub use path::Path;
pub use value::{
    value_eq, FunctionValue, GraphObject, ObjectRef, OrderedAssoc, Record, RegexValue, SymbolId,
    TimestampValue, Value,
};

/// Reserved key marking a tagged special-type record on the wire
///. User data must not use this key.
pub const TYPE_MARKER: &str = "type";

/// Reserved key marking a class-instance record's class name on the wire
///. User data must not use this key.
pub const CLASS_MARKER: &str = "__class__";

/// Reserved `type` tag value for reference nodes.
pub const TYPE_REF: &str = "ref";
/// Reserved `type` tag value for function nodes.
pub const TYPE_FUNCTION: &str = "function";
/// Reserved `type` tag value for timestamp nodes.
pub const TYPE_DATE: &str = "date";
/// Reserved `type` tag value for regex nodes.
pub const TYPE_REGEXP: &str = "regexp";
/// Reserved `type` tag value for big-integer nodes.
pub const TYPE_BIGINT: &str = "bigint";
/// Reserved `type` tag value for symbol nodes.
pub const TYPE_SYMBOL: &str = "symbol";
/// Reserved `type` tag value for keyed-map nodes.
pub const TYPE_MAP: &str = "map";
/// Reserved `type` tag value for unique-set nodes.
pub const TYPE_SET: &str = "set";
/// Reserved `type` tag value for the explicit `undefined` sentinel (JSON has
/// no native `undefined`, so it cannot simply be omitted without changing
/// the meaning of "field present with value undefined" vs. "field absent").
pub const TYPE_UNDEFINED: &str = "undefined";

/// Sentinel emitted in place of a non-source-bearing function's `source`
/// field in event-value mode. Never produced for
/// snapshot-mode serialization, where such a function is simply omitted.
pub const ABSENT_SENTINEL: &str = "<absent>";
