use crate::OrderedMap;
use crate::arena::{Color, NodeId, Side};
use crate::compare::Compare;
use crate::error::InvariantViolation;
use crate::tree::RawTree;

impl<K, V, C: Compare<K>> OrderedMap<K, V, C> {
    /// Walks the whole tree and checks every red-black and search-tree
    /// invariant, plus parent links and the entry count. O(n).
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let tree = &self.tree;
        if tree.root.is_nil() {
            return match tree.len() {
                0 => Ok(()),
                n => Err(InvariantViolation::Count {
                    recorded: n,
                    reachable: 0,
                }),
            };
        }

        let root = tree.arena.links(tree.root);
        if root.color == Color::Red {
            return Err(InvariantViolation::RedRoot);
        }
        if !root.parent.is_nil() {
            return Err(InvariantViolation::ParentLink { depth: 0 });
        }

        let mut reachable = 0;
        black_height(tree, tree.root, 0, &mut reachable)?;
        if reachable != tree.len() {
            return Err(InvariantViolation::Count {
                recorded: tree.len(),
                reachable,
            });
        }

        let mut prev: Option<&K> = None;
        for (position, (k, _)) in self.iter().enumerate() {
            if let Some(p) = prev {
                if !self.comparator().less(p, k) {
                    return Err(InvariantViolation::Order { position });
                }
            }
            prev = Some(k);
        }
        Ok(())
    }
}

/// Black height of the subtree at `x`, counting the nil leaves.
fn black_height<K, V>(
    tree: &RawTree<K, V>,
    x: NodeId,
    depth: usize,
    reachable: &mut usize,
) -> Result<usize, InvariantViolation> {
    if x.is_nil() {
        return Ok(1);
    }
    *reachable += 1;
    let links = tree.arena.links(x);

    let mut heights = [0; 2];
    for side in [Side::Left, Side::Right] {
        let c = links.child(side);
        if c.is_nil() {
            heights[side.idx()] = 1;
            continue;
        }
        let child = tree.arena.links(c);
        if child.parent != x {
            return Err(InvariantViolation::ParentLink { depth: depth + 1 });
        }
        if links.color == Color::Red && child.color == Color::Red {
            return Err(InvariantViolation::RedRed { depth });
        }
        heights[side.idx()] = black_height(tree, c, depth + 1, reachable)?;
    }

    let [left, right] = heights;
    if left != right {
        return Err(InvariantViolation::BlackHeight { left, right });
    }
    Ok(left + usize::from(links.color == Color::Black))
}
