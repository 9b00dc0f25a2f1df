//! Leaf-chain iteration.

use super::arena::NodeId;
use super::index::OrderedIndex;
use super::node::LeafNode;

/// Ascending iterator over `(key, &record)` pairs.
///
/// Starts at the leftmost leaf and follows `next_leaf` links, so each leaf is
/// visited once without revisiting internal nodes.
pub struct Iter<'a, V> {
    index: &'a OrderedIndex<V>,
    leaf: Option<&'a LeafNode<V>>,
    pos: usize,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(index: &'a OrderedIndex<V>) -> Self {
        Self {
            index,
            leaf: index.leaf(index.first_leaf()),
            pos: 0,
            remaining: index.len(),
        }
    }

    fn advance_leaf(&mut self, next: Option<NodeId>) {
        self.leaf = next.and_then(|id| self.index.leaf(id));
        self.pos = 0;
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.leaf?;
            if self.pos < leaf.keys.len() {
                let item = (leaf.keys[self.pos], &leaf.records[self.pos]);
                self.pos += 1;
                self.remaining = self.remaining.saturating_sub(1);
                return Some(item);
            }
            self.advance_leaf(leaf.next_leaf);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> std::iter::FusedIterator for Iter<'_, V> {}
