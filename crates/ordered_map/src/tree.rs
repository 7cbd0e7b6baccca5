use std::cmp::Ordering;

use crate::arena::{Arena, Color, Links, NodeId, Side};
use crate::compare::Compare;

/// Outcome of a key descent.
pub(crate) enum Probe {
    Found(NodeId),
    Vacant { parent: NodeId, side: Side },
}

/// Walks from `x` as far as possible toward `side`.
#[inline]
pub(crate) fn extreme(links: &[Links], mut x: NodeId, side: Side) -> NodeId {
    debug_assert!(!x.is_nil());
    loop {
        let next = links[x.idx()].child(side);
        if next.is_nil() {
            return x;
        }
        x = next;
    }
}

/// In-order neighbour of `x`: `Side::Right` is the successor, `Side::Left`
/// the predecessor. Returns `NIL` past either end.
pub(crate) fn step(links: &[Links], mut x: NodeId, side: Side) -> NodeId {
    let down = links[x.idx()].child(side);
    if !down.is_nil() {
        return extreme(links, down, side.opposite());
    }
    let mut parent = links[x.idx()].parent;
    while !parent.is_nil() && links[parent.idx()].child(side) == x {
        x = parent;
        parent = links[x.idx()].parent;
    }
    parent
}

/// Red-black tree over an arena, without the comparator.
pub(crate) struct RawTree<K, V> {
    pub(crate) arena: Arena<K, V>,
    pub(crate) root: NodeId,
}

impl<K, V> RawTree<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            root: NodeId::NIL,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.root = NodeId::NIL;
    }

    #[inline(always)]
    fn color(&self, x: NodeId) -> Color {
        if x.is_nil() {
            Color::Black
        } else {
            self.arena.links(x).color
        }
    }

    #[inline(always)]
    fn set_color(&mut self, x: NodeId, color: Color) {
        self.arena.links_mut(x).color = color;
    }

    #[inline(always)]
    fn child(&self, x: NodeId, side: Side) -> NodeId {
        self.arena.links(x).child(side)
    }

    #[inline(always)]
    fn set_child(&mut self, x: NodeId, side: Side, c: NodeId) {
        self.arena.links_mut(x).ch[side.idx()] = c;
    }

    #[inline(always)]
    fn parent(&self, x: NodeId) -> NodeId {
        self.arena.links(x).parent
    }

    #[inline(always)]
    fn set_parent(&mut self, x: NodeId, p: NodeId) {
        if !x.is_nil() {
            self.arena.links_mut(x).parent = p;
        }
    }

    /// Which side of `parent` holds `x`. `x` may be `NIL` when the other
    /// child is not.
    #[inline(always)]
    fn side_of(&self, x: NodeId, parent: NodeId) -> Side {
        if self.child(parent, Side::Left) == x {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub(crate) fn first(&self) -> NodeId {
        if self.root.is_nil() {
            NodeId::NIL
        } else {
            extreme(self.arena.all_links(), self.root, Side::Left)
        }
    }

    pub(crate) fn last(&self) -> NodeId {
        if self.root.is_nil() {
            NodeId::NIL
        } else {
            extreme(self.arena.all_links(), self.root, Side::Right)
        }
    }

    pub(crate) fn step(&self, x: NodeId, side: Side) -> NodeId {
        step(self.arena.all_links(), x, side)
    }

    /// Points whatever held `old` (its parent or the root) at `new`.
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if parent.is_nil() {
            self.root = new;
        } else {
            let side = self.side_of(old, parent);
            self.set_child(parent, side, new);
        }
    }

    /// Rotates `x` down toward `side`; its child on the opposite side takes
    /// its place.
    fn rotate(&mut self, x: NodeId, side: Side) {
        let y = self.child(x, side.opposite());
        debug_assert!(!y.is_nil(), "rotation needs a child to lift");
        let inner = self.child(y, side);
        self.set_child(x, side.opposite(), inner);
        self.set_parent(inner, x);

        let xp = self.parent(x);
        self.set_parent(y, xp);
        self.replace_child(xp, x, y);

        self.set_child(y, side, x);
        self.set_parent(x, y);
    }

    /// Replaces the subtree at `u` with the one at `v` (possibly `NIL`).
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let up = self.parent(u);
        self.replace_child(up, u, v);
        self.set_parent(v, up);
    }

    pub(crate) fn probe<C: Compare<K>>(&self, key: &K, cmp: &C) -> Probe {
        let mut parent = NodeId::NIL;
        let mut side = Side::Left;
        let mut cur = self.root;
        while !cur.is_nil() {
            parent = cur;
            side = match cmp.ordering(key, &self.arena.item(cur).0) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Probe::Found(cur),
            };
            cur = self.child(cur, side);
        }
        Probe::Vacant { parent, side }
    }

    pub(crate) fn find<C: Compare<K>>(&self, key: &K, cmp: &C) -> NodeId {
        match self.probe(key, cmp) {
            Probe::Found(x) => x,
            Probe::Vacant { .. } => NodeId::NIL,
        }
    }

    /// Links a new red leaf at a vacant position found by `probe` and
    /// rebalances.
    pub(crate) fn attach(&mut self, parent: NodeId, side: Side, key: K, value: V) -> NodeId {
        let z = self.arena.alloc(key, value, parent);
        if parent.is_nil() {
            self.root = z;
        } else {
            debug_assert!(self.child(parent, side).is_nil());
            self.set_child(parent, side, z);
        }
        self.insert_fixup(z);
        z
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        loop {
            let p = self.parent(z);
            if p.is_nil() || self.color(p) == Color::Black {
                break;
            }
            // A red parent is never the root.
            let g = self.parent(p);
            debug_assert!(!g.is_nil());
            let side = self.side_of(p, g);
            let uncle = self.child(g, side.opposite());
            match self.color(uncle) {
                Color::Red => {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                }
                Color::Black => {
                    if self.side_of(z, p) == side.opposite() {
                        z = p;
                        self.rotate(z, side);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate(g, side.opposite());
                    break;
                }
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Unlinks live node `z`, rebalances, and frees its slot.
    ///
    /// With two children the successor node itself is moved into `z`'s
    /// position, so every other node keeps its slot.
    pub(crate) fn remove(&mut self, z: NodeId) -> (K, V) {
        let left = self.child(z, Side::Left);
        let right = self.child(z, Side::Right);

        let (x, x_parent, removed) = if left.is_nil() {
            let zp = self.parent(z);
            self.transplant(z, right);
            (right, zp, self.color(z))
        } else if right.is_nil() {
            let zp = self.parent(z);
            self.transplant(z, left);
            (left, zp, self.color(z))
        } else {
            let y = extreme(self.arena.all_links(), right, Side::Left);
            let removed = self.color(y);
            let x = self.child(y, Side::Right);
            let x_parent = if self.parent(y) == z {
                y
            } else {
                let yp = self.parent(y);
                self.transplant(y, x);
                self.set_child(y, Side::Right, right);
                self.set_parent(right, y);
                yp
            };
            self.transplant(z, y);
            self.set_child(y, Side::Left, left);
            self.set_parent(left, y);
            let color = self.color(z);
            self.set_color(y, color);
            (x, x_parent, removed)
        };

        if removed == Color::Black {
            self.delete_fixup(x, x_parent);
        }
        self.arena.release(z)
    }

    /// Restores black height after a black node left the path through `x`.
    /// `parent` tracks `x`'s parent since `x` may be `NIL`.
    fn delete_fixup(&mut self, mut x: NodeId, mut parent: NodeId) {
        while x != self.root && self.color(x) == Color::Black {
            let p = parent;
            let side = self.side_of(x, p);
            let mut w = self.child(p, side.opposite());
            debug_assert!(!w.is_nil(), "sibling of a double-black is never nil");

            if self.color(w) == Color::Red {
                self.set_color(w, Color::Black);
                self.set_color(p, Color::Red);
                self.rotate(p, side);
                w = self.child(p, side.opposite());
            }

            let near = self.child(w, side);
            let far = self.child(w, side.opposite());
            match (self.color(near), self.color(far)) {
                (Color::Black, Color::Black) => {
                    self.set_color(w, Color::Red);
                    x = p;
                    parent = self.parent(p);
                }
                (near_color, far_color) => {
                    if far_color == Color::Black {
                        debug_assert_eq!(near_color, Color::Red);
                        self.set_color(near, Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate(w, side.opposite());
                        w = self.child(p, side.opposite());
                    }
                    let pc = self.color(p);
                    self.set_color(w, pc);
                    self.set_color(p, Color::Black);
                    let far = self.child(w, side.opposite());
                    self.set_color(far, Color::Black);
                    self.rotate(p, side);
                    x = self.root;
                    parent = NodeId::NIL;
                }
            }
        }
        if !x.is_nil() {
            self.set_color(x, Color::Black);
        }
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        fn go<K, V>(t: &RawTree<K, V>, x: NodeId) -> usize {
            if x.is_nil() {
                return 0;
            }
            1 + go(t, t.child(x, Side::Left)).max(go(t, t.child(x, Side::Right)))
        }
        go(self, self.root)
    }
}

impl<K: Clone, V: Clone> RawTree<K, V> {
    /// Rebuilds `self` into `dst`, preserving shape and colours.
    pub(crate) fn copy_into(&self, dst: &mut RawTree<K, V>) {
        dst.clear();
        dst.root = self.copy_subtree(self.root, NodeId::NIL, &mut dst.arena);
    }

    fn copy_subtree(&self, src: NodeId, parent: NodeId, dst: &mut Arena<K, V>) -> NodeId {
        if src.is_nil() {
            return NodeId::NIL;
        }
        let (key, value) = self.arena.item(src).clone();
        let node = dst.alloc(key, value, parent);
        let color = self.color(src);
        let left = self.copy_subtree(self.child(src, Side::Left), node, dst);
        let right = self.copy_subtree(self.child(src, Side::Right), node, dst);
        let links = dst.links_mut(node);
        links.color = color;
        links.ch = [left, right];
        node
    }
}
