use std::sync::atomic::{AtomicU64, Ordering};

use crate::OrderedMap;
use crate::arena::{NodeId, Side};
use crate::error::{CursorFault, Error, Result};

/// Identity of one map instance, fixed for its lifetime. Copies get a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Tag(u64);

impl Tag {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Position {
    Node {
        id: NodeId,
        generation: u32,
        epoch: u32,
    },
    End,
}

/// Position in an [`OrderedMap`], detached from any borrow of it.
///
/// A cursor names either one entry or the past-the-end position. An entry
/// cursor stays valid until its entry leaves the map, by `erase`, `clear`
/// or `clone_from`. The end cursor is valid for as long as the map lives.
/// Every operation re-checks the cursor against the map it is handed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cursor {
    tag: Tag,
    pos: Position,
}

impl Cursor {
    pub fn is_end(&self) -> bool {
        matches!(self.pos, Position::End)
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    pub(crate) fn cursor_at(&self, id: NodeId) -> Cursor {
        let pos = if id.is_nil() {
            Position::End
        } else {
            Position::Node {
                id,
                generation: self.tree.arena.links(id).generation,
                epoch: self.tree.arena.epoch(),
            }
        };
        Cursor { tag: self.tag, pos }
    }

    fn reject(&self, fault: CursorFault) -> Error {
        tracing::debug!(?fault, len = self.len(), "rejected cursor");
        Error::InvalidIterator(fault)
    }

    /// Checks ownership and liveness. `None` is the end position.
    fn resolve(&self, cursor: Cursor) -> Result<Option<NodeId>> {
        if cursor.tag != self.tag {
            return Err(self.reject(CursorFault::ForeignMap));
        }
        match cursor.pos {
            Position::End => Ok(None),
            Position::Node {
                id,
                generation,
                epoch,
            } if epoch == self.tree.arena.epoch() && self.tree.arena.is_live(id, generation) => {
                Ok(Some(id))
            }
            Position::Node { .. } => Err(self.reject(CursorFault::Stale)),
        }
    }

    /// Like `resolve`, but the end position is an error.
    pub(crate) fn resolve_entry(&self, cursor: Cursor) -> Result<NodeId> {
        self.resolve(cursor)?
            .ok_or_else(|| self.reject(CursorFault::AtEnd))
    }

    /// Cursor at the smallest key, or `end()` when empty.
    pub fn begin(&self) -> Cursor {
        self.cursor_at(self.tree.first())
    }

    pub fn end(&self) -> Cursor {
        self.cursor_at(NodeId::NIL)
    }

    /// Steps to the in-order successor. The last entry steps to `end()`.
    pub fn next(&self, cursor: Cursor) -> Result<Cursor> {
        let id = self.resolve_entry(cursor)?;
        Ok(self.cursor_at(self.tree.step(id, Side::Right)))
    }

    /// Steps to the in-order predecessor. `end()` steps to the largest key.
    pub fn prev(&self, cursor: Cursor) -> Result<Cursor> {
        let prev = match self.resolve(cursor)? {
            None if self.is_empty() => return Err(self.reject(CursorFault::EmptyMap)),
            None => self.tree.last(),
            Some(id) => self.tree.step(id, Side::Left),
        };
        if prev.is_nil() {
            return Err(self.reject(CursorFault::BeforeFirst));
        }
        Ok(self.cursor_at(prev))
    }

    pub fn entry(&self, cursor: Cursor) -> Result<(&K, &V)> {
        let id = self.resolve_entry(cursor)?;
        let (k, v) = self.tree.arena.item(id);
        Ok((k, v))
    }

    pub fn value_mut(&mut self, cursor: Cursor) -> Result<&mut V> {
        let id = self.resolve_entry(cursor)?;
        Ok(&mut self.tree.arena.item_mut(id).1)
    }
}
