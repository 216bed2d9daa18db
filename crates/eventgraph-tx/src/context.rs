//! Shared state for every transactional handle: the delta
//! overlay plus a side table recovering a keyed-map's original key value
//! from the path segment its delta entry is filed under.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use eventgraph_types::Value;

use crate::delta::Delta;

/// Encode a map key as a delta path segment: a map write stores its delta
/// entry at `<map-path>.<encoded-key>`. `Delta` addresses everything by
/// path string, and path segments are plain text, so a key that is not
/// already a string needs a canonical text form; object keys are addressed
/// by identity since that is how map-key equality treats them anyway.
pub fn map_key_segment(key: &Value) -> String {
    match key {
        Value::Null => "null".to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Bool(b) => format!("bool:{b}"),
        Value::Number(n) => format!("num:{n}"),
        Value::Str(s) => format!("str:{s}"),
        Value::BigInt(s) => format!("bigint:{s}"),
        Value::Object(obj) => format!("obj:{:x}", Rc::as_ptr(obj) as usize),
        // Symbols carry a shared identity cell (`value_eq` compares them by
        // `Rc::ptr_eq`), so the cell's address is stable across clones of
        // the same key. Timestamp/Regex/Function have no such cell — they
        // are compared nowhere by identity — so their segment is derived
        // from their own content instead, which is stable across clones.
        Value::Symbol(id) => format!("sym:{:x}", Rc::as_ptr(id) as usize),
        Value::Timestamp(t) => format!("date:{:?}", t.value),
        Value::Regex(r) => format!("regex:{}\u{0}{}", r.source, r.flags),
        Value::Function(f) => format!("fn:{:?}", f.source_code),
    }
}

/// Shared by every handle a single [`crate::Transaction`] hands out.
pub struct TxContext {
    pub(crate) delta: RefCell<Delta>,
    /// `path segment → original key`, recovering a keyed-map's real key
    /// from [`map_key_segment`]'s text form when enumerating or committing.
    pub(crate) map_keys: RefCell<HashMap<String, Value>>,
}

impl TxContext {
    /// A fresh context with an empty delta.
    pub fn new() -> Rc<Self> {
        Rc::new(Self { delta: RefCell::new(Delta::new()), map_keys: RefCell::new(HashMap::new()) })
    }

    pub(crate) fn remember_key(&self, segment: &str, key: &Value) {
        self.map_keys.borrow_mut().insert(segment.to_string(), key.clone());
    }

    pub(crate) fn recall_key(&self, segment: &str) -> Option<Value> {
        self.map_keys.borrow().get(segment).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_segment_is_stable_across_clones() {
        let sym = Value::new_symbol(Some("k".into()));
        assert_eq!(map_key_segment(&sym), map_key_segment(&sym.clone()));
    }

    #[test]
    fn distinct_symbols_get_distinct_segments() {
        let a = Value::new_symbol(Some("k".into()));
        let b = Value::new_symbol(Some("k".into()));
        assert_ne!(map_key_segment(&a), map_key_segment(&b));
    }

    #[test]
    fn timestamp_segment_is_stable_across_clones() {
        use eventgraph_types::TimestampValue;
        let ts = Value::Timestamp(TimestampValue { value: None, extra: HashMap::new() });
        assert_eq!(map_key_segment(&ts), map_key_segment(&ts.clone()));
    }
}
