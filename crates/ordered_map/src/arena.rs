/// Index of a node slot in the arena.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const NIL: Self = Self(u32::MAX);

    #[inline(always)]
    pub(crate) fn is_nil(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline(always)]
    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    fn from_index(v: usize) -> Self {
        match u32::try_from(v) {
            Ok(raw) if raw != u32::MAX => Self(raw),
            _ => panic!("arena slot index {v} exceeds the u32 id space"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left = 0,
    Right = 1,
}

impl Side {
    #[inline(always)]
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    #[inline(always)]
    pub(crate) fn idx(self) -> usize {
        self as usize
    }
}

/// Structural half of a node: colour, child and parent links.
///
/// Kept apart from the key/value storage so traversal can borrow the links
/// while values are handed out mutably.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Links {
    pub(crate) ch: [NodeId; 2],
    pub(crate) parent: NodeId,
    pub(crate) color: Color,
    /// Bumped every time the slot is released.
    pub(crate) generation: u32,
}

impl Links {
    fn leaf(parent: NodeId, generation: u32) -> Self {
        Self {
            ch: [NodeId::NIL, NodeId::NIL],
            parent,
            color: Color::Red,
            generation,
        }
    }

    #[inline(always)]
    pub(crate) fn child(&self, side: Side) -> NodeId {
        self.ch[side.idx()]
    }
}

/// Slot storage for tree nodes.
///
/// A slot is live while `items[i]` is `Some`. Released slots go on the free
/// list and are reused by later allocations with a new generation. `clear`
/// drops the slots themselves, so it bumps `epoch` instead.
pub(crate) struct Arena<K, V> {
    links: Vec<Links>,
    items: Vec<Option<(K, V)>>,
    free: Vec<NodeId>,
    epoch: u32,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            links: Vec::with_capacity(capacity),
            items: Vec::with_capacity(capacity),
            free: Vec::new(),
            epoch: 0,
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.items.len() - self.free.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub(crate) fn clear(&mut self) {
        self.links.clear();
        self.items.clear();
        self.free.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }

    pub(crate) fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Vacant slots are kept: their generations are what rejects stale
    /// cursors.
    pub(crate) fn shrink_to_fit(&mut self) {
        self.links.shrink_to_fit();
        self.items.shrink_to_fit();
        self.free.shrink_to_fit();
    }

    /// Allocates a red leaf under `parent`.
    pub(crate) fn alloc(&mut self, key: K, value: V, parent: NodeId) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                let slot = &mut self.links[id.idx()];
                *slot = Links::leaf(parent, slot.generation);
                debug_assert!(self.items[id.idx()].is_none());
                self.items[id.idx()] = Some((key, value));
                id
            }
            None => {
                let id = NodeId::from_index(self.items.len());
                self.links.push(Links::leaf(parent, 0));
                self.items.push(Some((key, value)));
                id
            }
        }
    }

    /// Frees a live slot and hands back its entry.
    pub(crate) fn release(&mut self, id: NodeId) -> (K, V) {
        let entry = self.items[id.idx()]
            .take()
            .expect("release requires a live slot");
        let slot = &mut self.links[id.idx()];
        slot.generation = slot.generation.wrapping_add(1);
        slot.ch = [NodeId::NIL, NodeId::NIL];
        slot.parent = NodeId::NIL;
        self.free.push(id);
        entry
    }

    pub(crate) fn is_live(&self, id: NodeId, generation: u32) -> bool {
        !id.is_nil()
            && id.idx() < self.items.len()
            && self.items[id.idx()].is_some()
            && self.links[id.idx()].generation == generation
    }

    #[inline(always)]
    pub(crate) fn links(&self, id: NodeId) -> &Links {
        debug_assert!(!id.is_nil());
        &self.links[id.idx()]
    }

    #[inline(always)]
    pub(crate) fn links_mut(&mut self, id: NodeId) -> &mut Links {
        debug_assert!(!id.is_nil());
        &mut self.links[id.idx()]
    }

    pub(crate) fn all_links(&self) -> &[Links] {
        &self.links
    }

    #[inline(always)]
    pub(crate) fn item(&self, id: NodeId) -> &(K, V) {
        self.items[id.idx()]
            .as_ref()
            .expect("live link points at a vacant slot")
    }

    #[inline(always)]
    pub(crate) fn item_mut(&mut self, id: NodeId) -> &mut (K, V) {
        self.items[id.idx()]
            .as_mut()
            .expect("live link points at a vacant slot")
    }

    /// Splits the arena into read-only links and writable entry storage.
    pub(crate) fn split_mut(&mut self) -> (&[Links], &mut [Option<(K, V)>]) {
        (&self.links, &mut self.items)
    }

    pub(crate) fn into_parts(self) -> (Vec<Links>, Vec<Option<(K, V)>>) {
        (self.links, self.items)
    }
}
