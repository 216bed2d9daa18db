//! Transaction delta manager: a sparse path-string-keyed
//! overlay recorded on top of a base object graph, committed or discarded
//! as a unit.

use std::collections::HashMap;

use eventgraph_types::{Path, Value};

/// A single delta entry's value.
#[derive(Clone)]
pub enum DeltaValue {
    /// The overlay value visible at this path.
    Value(Value),
    /// The base's value at this path is deleted. A deletion sentinel is
    /// normally a unique object created at delta construction to mark
    /// absence; a dedicated enum variant plays the identical role here with
    /// no risk of a real value ever colliding with it.
    Deleted,
}

/// A snapshot of a [`Delta`]'s entries taken by [`Delta::checkpoint`],
/// restorable via [`Delta::restore`].
#[derive(Clone, Default)]
pub struct Checkpoint(HashMap<String, DeltaValue>);

/// Sparse `path-string → value-or-deletion` overlay.
#[derive(Default)]
pub struct Delta {
    entries: HashMap<String, DeltaValue>,
}

impl Delta {
    /// A fresh, empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently recorded.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// True if `path` has an overlay entry (value or deletion).
    pub fn has(&self, path: &Path) -> bool {
        self.entries.contains_key(&path.to_dotted())
    }

    /// The overlay entry at `path`, if any.
    pub fn get(&self, path: &Path) -> Option<&DeltaValue> {
        self.entries.get(&path.to_dotted())
    }

    /// Record an overlay value at `path`.
    pub fn set(&mut self, path: &Path, value: Value) {
        self.entries.insert(path.to_dotted(), DeltaValue::Value(value));
    }

    /// Record a deletion at `path`.
    pub fn delete(&mut self, path: &Path) {
        self.entries.insert(path.to_dotted(), DeltaValue::Deleted);
    }

    /// Erase every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// A shallow copy of the current entries (object values are `Rc` clones,
    /// not deep copies).
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.entries.clone())
    }

    /// Replace the current entries with a prior [`Checkpoint`].
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.entries = checkpoint.0;
    }

    /// All entries, in ascending path-depth order.
    pub fn entries(&self) -> Vec<(Path, DeltaValue)> {
        let mut items: Vec<(Path, DeltaValue)> =
            self.entries.iter().map(|(k, v)| (Path::from_dotted(k), v.clone())).collect();
        items.sort_by_key(|(path, _)| path.depth());
        items
    }

    /// Entries whose path is exactly one segment below `prefix`, as
    /// `(last segment, value)` pairs. Used for key enumeration and for per-key
    /// keyed-map tracking.
    pub fn direct_children(&self, prefix: &Path) -> Vec<(String, DeltaValue)> {
        let target_depth = prefix.depth() + 1;
        self.entries
            .iter()
            .filter_map(|(k, v)| {
                let path = Path::from_dotted(k);
                if path.depth() == target_depth && path.starts_with(prefix) {
                    Some((path.last().unwrap().to_string(), v.clone()))
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete_round_trip() {
        let mut delta = Delta::new();
        let path = Path::from_dotted("dept.name");
        delta.set(&path, Value::Str("eng".into()));
        assert!(delta.has(&path));
        assert!(matches!(delta.get(&path), Some(DeltaValue::Value(Value::Str(s))) if s == "eng"));
        delta.delete(&path);
        assert!(matches!(delta.get(&path), Some(DeltaValue::Deleted)));
    }

    #[test]
    fn checkpoint_restore_round_trip() {
        let mut delta = Delta::new();
        delta.set(&Path::from_dotted("a"), Value::Number(1.0));
        let checkpoint = delta.checkpoint();
        delta.set(&Path::from_dotted("b"), Value::Number(2.0));
        assert_eq!(delta.size(), 2);
        delta.restore(checkpoint);
        assert_eq!(delta.size(), 1);
        assert!(delta.has(&Path::from_dotted("a")));
        assert!(!delta.has(&Path::from_dotted("b")));
    }

    #[test]
    fn entries_ascend_by_depth() {
        let mut delta = Delta::new();
        delta.set(&Path::from_dotted("a.b.c"), Value::Number(1.0));
        delta.set(&Path::from_dotted("a"), Value::Number(2.0));
        delta.set(&Path::from_dotted("a.b"), Value::Number(3.0));
        let depths: Vec<usize> = delta.entries().iter().map(|(p, _)| p.depth()).collect();
        assert_eq!(depths, vec![1, 2, 3]);
    }

    #[test]
    fn direct_children_scoped_to_prefix() {
        let mut delta = Delta::new();
        delta.set(&Path::from_dotted("map.str:a"), Value::Number(1.0));
        delta.set(&Path::from_dotted("map.str:b"), Value::Number(2.0));
        delta.set(&Path::from_dotted("other.str:c"), Value::Number(3.0));
        let children = delta.direct_children(&Path::from_dotted("map"));
        assert_eq!(children.len(), 2);
    }
}
