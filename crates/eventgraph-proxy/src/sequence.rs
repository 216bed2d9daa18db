//! Wrapper over a [`GraphObject::Sequence`].

use std::rc::Rc;

use eventgraph_codec::ExternalPathLookup;
use eventgraph_events::Mutation;
use eventgraph_types::{GraphObject, ObjectRef, Path, Value};

use crate::error::ProxyError;
use crate::handle::{wrap, Handle};
use crate::infra::GraphInfra;

/// A transparent view over an indexed sequence.
#[derive(Clone)]
pub struct SequenceHandle {
    pub(crate) obj: ObjectRef,
    pub(crate) infra: Rc<GraphInfra>,
}

impl SequenceHandle {
    pub(crate) fn new(obj: ObjectRef, infra: Rc<GraphInfra>) -> Self {
        Self { obj, infra }
    }

    fn path(&self) -> Path {
        self.infra
            .canonical_path(&self.obj)
            .expect("SequenceHandle target was never attached to the graph")
    }

    fn with_vec<R>(&self, f: impl FnOnce(&Vec<Value>) -> R) -> R {
        match &*self.obj.borrow() {
            GraphObject::Sequence(vec) => f(vec),
            _ => unreachable!("SequenceHandle always wraps a Sequence"),
        }
    }

    fn with_vec_mut<R>(&self, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
        match &mut *self.obj.borrow_mut() {
            GraphObject::Sequence(vec) => f(vec),
            _ => unreachable!("SequenceHandle always wraps a Sequence"),
        }
    }

    /// The raw object this handle wraps.
    pub fn target(&self) -> &ObjectRef {
        &self.obj
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.with_vec(Vec::len)
    }

    /// True when the sequence has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read by index, wrapping an object element.
    pub fn get(&self, index: usize) -> Option<Handle> {
        let value = self.with_vec(|vec| vec.get(index).cloned())?;
        Some(wrap(value, &self.infra))
    }

    /// All elements, each wrapped.
    pub fn values(&self) -> Vec<Handle> {
        self.with_vec(|vec| vec.clone()).into_iter().map(|v| wrap(v, &self.infra)).collect()
    }

    /// `sequence.push(...items)`.
    pub async fn push(&self, items: Vec<Value>) -> Result<(), ProxyError> {
        let base = self.path();
        let start = self.len();
        for (i, item) in items.iter().enumerate() {
            self.infra.assign_paths(item, &base.child_index(start + i));
        }
        self.with_vec_mut(|vec| vec.extend(items.iter().cloned()));
        self.infra.record(&base, Mutation::SequencePush(items)).await
    }

    /// `sequence.pop()`.
    pub async fn pop(&self) -> Result<Option<Value>, ProxyError> {
        let removed = self.with_vec_mut(Vec::pop);
        self.infra.record(&self.path(), Mutation::SequencePop).await?;
        Ok(removed)
    }

    /// `sequence.shift()`.
    pub async fn shift(&self) -> Result<Option<Value>, ProxyError> {
        let removed = self.with_vec_mut(|vec| if vec.is_empty() { None } else { Some(vec.remove(0)) });
        self.infra.record(&self.path(), Mutation::SequenceShift).await?;
        Ok(removed)
    }

    /// `sequence.unshift(...items)`.
    pub async fn unshift(&self, items: Vec<Value>) -> Result<(), ProxyError> {
        let base = self.path();
        for (i, item) in items.iter().enumerate() {
            self.infra.assign_paths(item, &base.child_index(i));
        }
        self.with_vec_mut(|vec| {
            let mut prepended = items.clone();
            prepended.extend(vec.drain(..));
            *vec = prepended;
        });
        self.infra.record(&base, Mutation::SequenceUnshift(items)).await
    }

    /// `sequence.splice(start, deleteCount, ...items)`, returning the
    /// removed elements.
    pub async fn splice(&self, start: i64, delete_count: usize, items: Vec<Value>) -> Result<Vec<Value>, ProxyError> {
        let base = self.path();
        let (start_idx, removed) = self.with_vec_mut(|vec| {
            let start_idx = eventgraph_events::resolve_index(start, vec.len());
            let end_idx = (start_idx + delete_count).min(vec.len());
            let removed: Vec<Value> = vec.splice(start_idx..end_idx, items.iter().cloned()).collect();
            (start_idx, removed)
        });
        for (i, item) in items.iter().enumerate() {
            self.infra.assign_paths(item, &base.child_index(start_idx + i));
        }
        self.infra.record(&base, Mutation::SequenceSplice { start, delete_count, items }).await?;
        Ok(removed)
    }

    /// `sequence.sort()` (default ordering; spec defines no comparator).
    pub async fn sort(&self) -> Result<(), ProxyError> {
        self.with_vec_mut(|vec| vec.sort_by(eventgraph_events::default_cmp));
        self.infra.record(&self.path(), Mutation::SequenceSort).await
    }

    /// `sequence.reverse()`.
    pub async fn reverse(&self) -> Result<(), ProxyError> {
        self.with_vec_mut(|vec| vec.reverse());
        self.infra.record(&self.path(), Mutation::SequenceReverse).await
    }

    /// `sequence.fill(value, start, end)`.
    pub async fn fill(&self, value: Value, start: i64, end: i64) -> Result<(), ProxyError> {
        let base = self.path();
        self.infra.assign_paths(&value, &base);
        self.with_vec_mut(|vec| {
            let start_idx = eventgraph_events::resolve_index(start, vec.len());
            let end_idx = eventgraph_events::resolve_index(end, vec.len());
            for slot in vec.iter_mut().take(end_idx).skip(start_idx) {
                *slot = value.clone();
            }
        });
        self.infra.record(&base, Mutation::SequenceFill { value, start, end }).await
    }

    /// `sequence.copyWithin(target, start, end)`.
    pub async fn copy_within(&self, target: i64, start: i64, end: i64) -> Result<(), ProxyError> {
        self.with_vec_mut(|vec| {
            let len = vec.len();
            let target_idx = eventgraph_events::resolve_index(target, len);
            let start_idx = eventgraph_events::resolve_index(start, len);
            let end_idx = eventgraph_events::resolve_index(end, len);
            let slice: Vec<Value> = vec[start_idx..end_idx].to_vec();
            for (offset, value) in slice.into_iter().enumerate() {
                let dest = target_idx + offset;
                if dest >= len {
                    break;
                }
                vec[dest] = value;
            }
        });
        self.infra.record(&self.path(), Mutation::SequenceCopyWithin { target, start, end }).await
    }
}

impl PartialEq for SequenceHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.obj, &other.obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::attach_root;
    use eventgraph_events::install_builtin_handlers;
    use eventgraph_log::MemoryLog;
    use std::sync::Arc;

    fn seq() -> SequenceHandle {
        install_builtin_handlers();
        let infra = Rc::new(GraphInfra::new(Arc::new(MemoryLog::new())));
        let Handle::Sequence(s) = attach_root(Value::new_sequence(), &infra) else { panic!() };
        s
    }

    #[tokio::test]
    async fn push_pop_round_trip() {
        let s = seq();
        s.push(vec![Value::Number(1.0), Value::Number(2.0)]).await.unwrap();
        assert_eq!(s.len(), 2);
        let popped = s.pop().await.unwrap();
        assert!(matches!(popped, Some(Value::Number(n)) if n == 2.0));
        assert_eq!(s.len(), 1);
        let events = s.infra.log().read_all().await.unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn splice_replaces_a_range() {
        let s = seq();
        s.push(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]).await.unwrap();
        let removed = s.splice(1, 1, vec![Value::Number(9.0)]).await.unwrap();
        assert!(matches!(removed.as_slice(), [Value::Number(n)] if *n == 2.0));
        assert_eq!(s.len(), 3);
        assert!(matches!(s.get(1), Some(Handle::Leaf(Value::Number(n))) if n == 9.0));
    }

    #[tokio::test]
    async fn unshift_prepends() {
        let s = seq();
        s.push(vec![Value::Number(2.0)]).await.unwrap();
        s.unshift(vec![Value::Number(1.0)]).await.unwrap();
        assert!(matches!(s.get(0), Some(Handle::Leaf(Value::Number(n))) if n == 1.0));
    }
}
