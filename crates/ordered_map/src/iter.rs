use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::arena::{Links, NodeId, Side};
use crate::tree::{RawTree, step};

/// Traversal state shared by every iterator: the next node from each end
/// plus how many are left between them.
#[derive(Clone, Copy)]
struct Span {
    front: NodeId,
    back: NodeId,
    remaining: usize,
}

impl Span {
    fn new<K, V>(tree: &RawTree<K, V>) -> Self {
        Self {
            front: tree.first(),
            back: tree.last(),
            remaining: tree.len(),
        }
    }

    #[inline]
    fn next_front(&mut self, links: &[Links]) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let x = self.front;
        if self.remaining > 0 {
            self.front = step(links, x, Side::Right);
        }
        Some(x)
    }

    #[inline]
    fn next_back(&mut self, links: &[Links]) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let x = self.back;
        if self.remaining > 0 {
            self.back = step(links, x, Side::Left);
        }
        Some(x)
    }
}

/// Ascending iterator over `(&K, &V)`.
pub struct Iter<'a, K, V> {
    tree: &'a RawTree<K, V>,
    span: Span,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a RawTree<K, V>) -> Self {
        Self {
            tree,
            span: Span::new(tree),
        }
    }

    fn entry(&self, x: NodeId) -> (&'a K, &'a V) {
        let (k, v) = self.tree.arena.item(x);
        (k, v)
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            span: self.span,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let x = self.span.next_front(self.tree.arena.all_links())?;
        Some(self.entry(x))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.span.remaining, Some(self.span.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let x = self.span.next_back(self.tree.arena.all_links())?;
        Some(self.entry(x))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Ascending iterator over `(&K, &mut V)`.
pub struct IterMut<'a, K, V> {
    links: &'a [Links],
    items: NonNull<Option<(K, V)>>,
    span: Span,
    _marker: PhantomData<&'a mut (K, V)>,
}

// SAFETY: `IterMut` acts as a `&'a mut` borrow of the entries, handing out
// `&K` and `&mut V`. Moving it to another thread is sound when both are `Send`.
unsafe impl<K: Send, V: Send> Send for IterMut<'_, K, V> {}

// SAFETY: a shared `&IterMut` exposes no entry access; the bounds match
// those of `&'a mut (K, V)`.
unsafe impl<K: Sync, V: Sync> Sync for IterMut<'_, K, V> {}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(tree: &'a mut RawTree<K, V>) -> Self {
        let span = Span::new(tree);
        let (links, items) = tree.arena.split_mut();
        Self {
            links,
            items: NonNull::from(items).cast(),
            span,
            _marker: PhantomData,
        }
    }

    fn entry(&mut self, x: NodeId) -> (&'a K, &'a mut V) {
        // SAFETY: `items` comes from a `&'a mut` slice that this iterator
        // holds exclusively, `x` is a live in-range slot, and `Span` yields
        // each node at most once, so no two returned borrows overlap.
        let slot = unsafe { &mut *self.items.as_ptr().add(x.idx()) };
        let (k, v) = slot.as_mut().expect("live link points at a vacant slot");
        (&*k, v)
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let x = self.span.next_front(self.links)?;
        Some(self.entry(x))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.span.remaining, Some(self.span.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let x = self.span.next_back(self.links)?;
        Some(self.entry(x))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning ascending iterator.
pub struct IntoIter<K, V> {
    links: Vec<Links>,
    items: Vec<Option<(K, V)>>,
    span: Span,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(tree: RawTree<K, V>) -> Self {
        tracing::trace!(len = tree.len(), "draining map");
        let span = Span::new(&tree);
        let (links, items) = tree.arena.into_parts();
        Self { links, items, span }
    }

    fn take(&mut self, x: NodeId) -> (K, V) {
        self.items[x.idx()]
            .take()
            .expect("live link points at a vacant slot")
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let x = self.span.next_front(&self.links)?;
        Some(self.take(x))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.span.remaining, Some(self.span.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        let x = self.span.next_back(&self.links)?;
        Some(self.take(x))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

pub struct Keys<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, K, V>(pub(crate) IterMut<'a, K, V>);

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}
