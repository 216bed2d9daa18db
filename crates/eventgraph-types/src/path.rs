//! Canonical path type: an ordered sequence of textual segments identifying
//! a location in the object graph. The empty path denotes the root.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered sequence of textual segments identifying a location in the
/// object graph. Sequence-element segments are the decimal rendering of
/// the element's index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<String>);

impl Path {
    /// The empty path, denoting the root of the graph.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from an explicit list of segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a dot-joined path string (the delta-key encoding from spec §3).
    /// The empty string parses to the root path.
    pub fn from_dotted(s: &str) -> Self {
        if s.is_empty() {
            Self::root()
        } else {
            Self(s.split('.').map(str::to_owned).collect())
        }
    }

    /// True when this path is the root (zero segments).
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments (i.e. depth from the root).
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Borrow the segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The path to the parent of this location, and the key under the
    /// parent this path denotes. `None` if this path is the root.
    pub fn split_last(&self) -> Option<(Path, &str)> {
        let (last, rest) = self.0.split_last()?;
        Some((Path(rest.to_vec()), last.as_str()))
    }

    /// A new path with `segment` appended.
    pub fn child<S: Into<String>>(&self, segment: S) -> Path {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Path(segments)
    }

    /// A new path with the decimal rendering of `index` appended.
    pub fn child_index(&self, index: usize) -> Path {
        self.child(index.to_string())
    }

    /// Render as the dot-joined delta-key encoding used by `eventgraph-tx`.
    pub fn to_dotted(&self) -> String {
        self.0.join(".")
    }

    /// True when `self` is `other` or a descendant of `other`.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.0.len() >= other.0.len() && self.0[..other.0.len()] == other.0[..]
    }

    /// The path relative to `base`, if `self` is `base` or a descendant of
    /// it. Used by the event-value serializer to turn an absolute canonical
    /// path into one relative to the value subtree's root.
    pub fn strip_prefix(&self, base: &Path) -> Option<Path> {
        if self.starts_with(base) {
            Some(Path(self.0[base.0.len()..].to_vec()))
        } else {
            None
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dotted())
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Path(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_empty() {
        assert!(Path::root().is_root());
        assert_eq!(Path::root().to_dotted(), "");
    }

    #[test]
    fn child_and_split_last_roundtrip() {
        let p = Path::root().child("dept").child("emps").child_index(0);
        assert_eq!(p.to_dotted(), "dept.emps.0");
        let (parent, key) = p.split_last().unwrap();
        assert_eq!(parent.to_dotted(), "dept.emps");
        assert_eq!(key, "0");
    }

    #[test]
    fn strip_prefix() {
        let base = Path::from_dotted("dept.emps");
        let p = Path::from_dotted("dept.emps.0.name");
        assert_eq!(p.strip_prefix(&base).unwrap().to_dotted(), "0.name");
        assert!(p.strip_prefix(&Path::from_dotted("other")).is_none());
    }

    #[test]
    fn depth_orders_ancestors_before_descendants() {
        let mut paths = vec![
            Path::from_dotted("a.b.c"),
            Path::from_dotted("a"),
            Path::from_dotted("a.b"),
        ];
        paths.sort_by_key(Path::depth);
        assert_eq!(paths[0].to_dotted(), "a");
        assert_eq!(paths[1].to_dotted(), "a.b");
        assert_eq!(paths[2].to_dotted(), "a.b.c");
    }
}
