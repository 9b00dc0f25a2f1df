//! Degree-parameterized B+ tree index.

use super::arena::{NodeArena, NodeId};
use super::constants::MIN_DEGREE;
use super::iter::Iter;
use super::node::{InternalNode, LeafNode, Node};
use gridledger_common::{LedgerError, Result};
use tracing::trace;

/// Ordered map from `u64` keys to records of type `V`.
///
/// Keys are unique. The index is append-only: there is no delete, so height
/// only ever grows, by one level each time the root splits.
pub struct OrderedIndex<V> {
    /// Node storage.
    arena: NodeArena<V>,
    /// Root node id.
    root: NodeId,
    /// Tree height (1 = root is a leaf).
    height: usize,
    /// Minimum degree `t`.
    min_degree: usize,
    /// Number of records.
    len: usize,
}

impl<V> OrderedIndex<V> {
    /// Creates an empty index with minimum degree `t` (nodes hold at most
    /// `2t-1` keys).
    pub fn new(min_degree: usize) -> Result<Self> {
        if min_degree < MIN_DEGREE {
            return Err(LedgerError::InvalidDegree { degree: min_degree });
        }

        let mut arena = NodeArena::new();
        let root = arena.allocate(Node::Leaf(LeafNode::new(min_degree)));

        Ok(Self {
            arena,
            root,
            height: 1,
            min_degree,
            len: 0,
        })
    }

    /// Returns the minimum degree.
    #[inline]
    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Returns the tree height.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of allocated nodes.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    #[inline(always)]
    fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    // =========================================================================
    // Read Path
    // =========================================================================

    /// Point lookup.
    pub fn search(&self, key: u64) -> Option<&V> {
        let leaf_id = self.find_leaf(key);
        match self.arena.get(leaf_id) {
            Node::Leaf(leaf) => leaf.find(key).map(|pos| &leaf.records[pos]),
            Node::Internal(_) => None,
        }
    }

    /// Point lookup returning a mutable record.
    pub fn search_mut(&mut self, key: u64) -> Option<&mut V> {
        let leaf_id = self.find_leaf(key);
        match self.arena.get_mut(leaf_id) {
            Node::Leaf(leaf) => leaf.find(key).map(move |pos| &mut leaf.records[pos]),
            Node::Internal(_) => None,
        }
    }

    #[inline]
    pub fn contains(&self, key: u64) -> bool {
        self.search(key).is_some()
    }

    /// Descends from the root to the leaf whose range covers `key`.
    /// Routing keys equal to `key` send the descent left, where the key's
    /// record lives.
    fn find_leaf(&self, key: u64) -> NodeId {
        let mut current = self.root;
        while let Node::Internal(node) = self.arena.get(current) {
            current = node.children[node.child_index(key)];
        }
        current
    }

    /// Leftmost leaf, start of the leaf chain.
    pub(crate) fn first_leaf(&self) -> NodeId {
        let mut current = self.root;
        while let Node::Internal(node) = self.arena.get(current) {
            current = node.children[0];
        }
        current
    }

    pub(crate) fn leaf(&self, id: NodeId) -> Option<&LeafNode<V>> {
        match self.arena.get(id) {
            Node::Leaf(leaf) => Some(leaf),
            Node::Internal(_) => None,
        }
    }

    /// Ascending scan over every record via the leaf chain.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self)
    }

    /// Ascending scan over keys only.
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Ascending scan over records only.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, record)| record)
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Inserts a new key/record pair.
    ///
    /// A key that is already present is rejected with `DuplicateKey` and the
    /// index is left unchanged.
    pub fn insert(&mut self, key: u64, record: V) -> Result<()> {
        if self.contains(key) {
            return Err(LedgerError::DuplicateKey { key });
        }
        // One sibling per level plus a new root, at most.
        self.arena.ensure_room(self.height + 1)?;

        if self.arena.get(self.root).num_keys() == self.max_keys() {
            self.grow_root();
        }

        self.insert_non_full(self.root, key, record);
        self.len += 1;
        Ok(())
    }

    /// Splits a full root under a fresh root, adding one level.
    fn grow_root(&mut self) {
        let old_root = self.root;
        let new_root = self
            .arena
            .allocate(Node::Internal(InternalNode::with_child(self.min_degree, old_root)));
        self.root = new_root;
        self.split_child(new_root, 0);
        self.height += 1;
        trace!(height = self.height, "index root split");
    }

    /// Descends from a node known not to be full, splitting any full child
    /// before entering it, and inserts into the target leaf.
    fn insert_non_full(&mut self, start: NodeId, key: u64, record: V) {
        let max_keys = self.max_keys();
        let mut current = start;

        loop {
            let (mut idx, child) = match self.arena.get_mut(current) {
                Node::Leaf(leaf) => {
                    let pos = leaf.position(key);
                    leaf.insert_at(pos, key, record);
                    return;
                }
                Node::Internal(node) => {
                    let idx = node.child_index(key);
                    (idx, node.children[idx])
                }
            };

            if self.arena.get(child).num_keys() == max_keys {
                self.split_child(current, idx);
                if let Node::Internal(node) = self.arena.get(current) {
                    if key > node.keys[idx] {
                        idx += 1;
                    }
                }
            }

            current = match self.arena.get(current) {
                Node::Internal(node) => node.children[idx],
                Node::Leaf(_) => current,
            };
        }
    }

    /// Splits the full child at `index` of internal node `parent`.
    fn split_child(&mut self, parent: NodeId, index: usize) {
        let min_degree = self.min_degree;
        let child = match self.arena.get(parent) {
            Node::Internal(node) => node.children[index],
            Node::Leaf(_) => return,
        };

        let (median, sibling, is_leaf) = match self.arena.get_mut(child) {
            Node::Leaf(leaf) => {
                let (median, right) = leaf.split(min_degree);
                (median, Node::Leaf(right), true)
            }
            Node::Internal(node) => {
                let (median, right) = node.split(min_degree);
                (median, Node::Internal(right), false)
            }
        };

        let sibling_id = self.arena.allocate(sibling);

        if is_leaf {
            if let Node::Leaf(leaf) = self.arena.get_mut(child) {
                leaf.next_leaf = Some(sibling_id);
            }
        }

        if let Node::Internal(node) = self.arena.get_mut(parent) {
            node.insert_separator(index, median, sibling_id);
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Verifies the structural invariants of the tree:
    /// - every non-root node holds between `t-1` and `2t-1` keys
    /// - keys ascend strictly within nodes and respect parent separators
    /// - internal nodes have one more child than keys
    /// - all leaves sit at the same depth
    /// - the leaf chain yields exactly `len` keys in strictly ascending order
    pub fn check_invariants(&self) -> Result<()> {
        let mut leaf_depth = None;
        let mut leaves = Vec::new();
        self.check_node(self.root, 1, None, None, &mut leaf_depth, &mut leaves)?;

        if leaf_depth != Some(self.height) {
            return Err(corrupted(format!(
                "leaf depth {:?} does not match height {}",
                leaf_depth, self.height
            )));
        }

        // The chain must visit the leaves in the same left-to-right order
        // as the tree walk.
        let mut chained = Vec::with_capacity(leaves.len());
        let mut cursor = Some(self.first_leaf());
        while let Some(id) = cursor {
            let leaf = self
                .leaf(id)
                .ok_or_else(|| corrupted(format!("leaf chain reaches internal node {}", id)))?;
            chained.push(id);
            if chained.len() > leaves.len() {
                return Err(corrupted("leaf chain longer than leaf count".to_string()));
            }
            cursor = leaf.next_leaf;
        }
        if chained != leaves {
            return Err(corrupted("leaf chain does not follow key order".to_string()));
        }

        let mut count = 0usize;
        let mut previous: Option<u64> = None;
        for key in self.keys() {
            if previous.is_some_and(|p| p >= key) {
                return Err(corrupted(format!("leaf chain out of order at key {}", key)));
            }
            previous = Some(key);
            count += 1;
        }
        if count != self.len {
            return Err(corrupted(format!(
                "leaf chain holds {} keys, expected {}",
                count, self.len
            )));
        }

        Ok(())
    }

    fn check_node(
        &self,
        id: NodeId,
        depth: usize,
        lower: Option<u64>,
        upper: Option<u64>,
        leaf_depth: &mut Option<usize>,
        leaves: &mut Vec<NodeId>,
    ) -> Result<()> {
        let node = self.arena.get(id);
        let keys = node.keys();

        if keys.len() > self.max_keys() {
            return Err(corrupted(format!("node {} holds {} keys", id, keys.len())));
        }
        if id != self.root && keys.len() < self.min_degree - 1 {
            return Err(corrupted(format!("node {} underflows with {} keys", id, keys.len())));
        }
        if keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(corrupted(format!("node {} keys not ascending", id)));
        }
        // Subtree bounds: lower < key <= upper
        if let (Some(lo), Some(&first)) = (lower, keys.first()) {
            if first <= lo {
                return Err(corrupted(format!("node {} key {} below bound {}", id, first, lo)));
            }
        }
        if let (Some(hi), Some(&last)) = (upper, keys.last()) {
            if last > hi {
                return Err(corrupted(format!("node {} key {} above bound {}", id, last, hi)));
            }
        }

        match node {
            Node::Leaf(leaf) => {
                if leaf.records.len() != keys.len() {
                    return Err(corrupted(format!("leaf {} record count mismatch", id)));
                }
                match *leaf_depth {
                    None => *leaf_depth = Some(depth),
                    Some(d) if d != depth => {
                        return Err(corrupted(format!("leaf {} at depth {}, expected {}", id, depth, d)));
                    }
                    Some(_) => {}
                }
                leaves.push(id);
            }
            Node::Internal(internal) => {
                if internal.children.len() != keys.len() + 1 {
                    return Err(corrupted(format!(
                        "internal node {} has {} children for {} keys",
                        id,
                        internal.children.len(),
                        keys.len()
                    )));
                }
                for (i, &child) in internal.children.iter().enumerate() {
                    let lo = if i == 0 { lower } else { Some(keys[i - 1]) };
                    let hi = if i == keys.len() { upper } else { Some(keys[i]) };
                    self.check_node(child, depth + 1, lo, hi, leaf_depth, leaves)?;
                }
            }
        }

        Ok(())
    }
}

impl<'a, V> IntoIterator for &'a OrderedIndex<V> {
    type Item = (u64, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn corrupted(reason: String) -> LedgerError {
    LedgerError::IndexCorrupted(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(t: usize, keys: &[u64]) -> OrderedIndex<u64> {
        let mut index = OrderedIndex::new(t).unwrap();
        for &k in keys {
            index.insert(k, k * 100).unwrap();
        }
        index
    }

    #[test]
    fn test_new_rejects_small_degree() {
        assert!(matches!(
            OrderedIndex::<u32>::new(1),
            Err(LedgerError::InvalidDegree { degree: 1 })
        ));
        assert!(OrderedIndex::<u32>::new(0).is_err());
        assert!(OrderedIndex::<u32>::new(2).is_ok());
    }

    #[test]
    fn test_empty_index() {
        let index: OrderedIndex<u32> = OrderedIndex::new(3).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.height(), 1);
        assert_eq!(index.search(1), None);
        assert_eq!(index.iter().count(), 0);
        assert!(index.check_invariants().is_ok());
    }

    #[test]
    fn test_insert_and_search() {
        let index = index_with(2, &[10, 20, 5]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.height(), 1);
        assert_eq!(index.search(5), Some(&500));
        assert_eq!(index.search(10), Some(&1000));
        assert_eq!(index.search(20), Some(&2000));
        assert_eq!(index.search(7), None);
    }

    #[test]
    fn test_root_splits_on_fourth_insert() {
        let mut index = index_with(2, &[10, 20, 5]);
        assert_eq!(index.height(), 1);

        index.insert(6, 600).unwrap();
        assert_eq!(index.height(), 2);
        assert_eq!(index.keys().collect::<Vec<_>>(), vec![5, 6, 10, 20]);
        assert!(index.check_invariants().is_ok());
    }

    #[test]
    fn test_reference_sequence_scan() {
        let index = index_with(2, &[10, 20, 5, 6, 12, 30, 7, 17]);
        assert_eq!(
            index.keys().collect::<Vec<_>>(),
            vec![5, 6, 7, 10, 12, 17, 20, 30]
        );
        for k in [5, 6, 7, 10, 12, 17, 20, 30] {
            assert_eq!(index.search(k), Some(&(k * 100)));
        }
        assert!(index.check_invariants().is_ok());
    }

    #[test]
    fn test_separator_keys_resolve_to_leaf_records() {
        // 10 becomes a routing key after the first split; it must still
        // resolve to its own record.
        let mut index = index_with(2, &[10, 20, 5, 6]);
        assert_eq!(index.search(10), Some(&1000));
        *index.search_mut(10).unwrap() += 1;
        assert_eq!(index.search(10), Some(&1001));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut index = index_with(2, &[1, 2, 3, 4, 5]);
        let before = index.node_count();

        let result = index.insert(3, 0);
        assert!(matches!(result, Err(LedgerError::DuplicateKey { key: 3 })));
        assert_eq!(index.len(), 5);
        assert_eq!(index.search(3), Some(&300));
        assert_eq!(index.node_count(), before);
    }

    #[test]
    fn test_search_mut_missing() {
        let mut index = index_with(3, &[1, 2]);
        assert!(index.search_mut(9).is_none());
    }

    #[test]
    fn test_height_grows_monotonically() {
        let mut index: OrderedIndex<()> = OrderedIndex::new(2).unwrap();
        let mut last_height = index.height();
        for k in 0..500u64 {
            index.insert(k, ()).unwrap();
            assert!(index.height() == last_height || index.height() == last_height + 1);
            last_height = index.height();
        }
        assert!(index.height() > 3);
        assert!(index.check_invariants().is_ok());
    }

    #[test]
    fn test_descending_inserts() {
        let keys: Vec<u64> = (0..200).rev().collect();
        let index = index_with(3, &keys);
        assert_eq!(index.keys().collect::<Vec<_>>(), (0..200).collect::<Vec<_>>());
        assert!(index.check_invariants().is_ok());
    }

    #[test]
    fn test_extreme_keys() {
        let mut index = OrderedIndex::new(2).unwrap();
        for k in [u64::MAX, 0, u64::MAX / 2] {
            index.insert(k, k).unwrap();
        }
        assert_eq!(index.search(u64::MAX), Some(&u64::MAX));
        assert_eq!(index.search(0), Some(&0));
        assert_eq!(index.keys().collect::<Vec<_>>(), vec![0, u64::MAX / 2, u64::MAX]);
    }

    #[test]
    fn test_into_iterator_for_reference() {
        let index = index_with(2, &[3, 1, 2]);
        let mut seen = Vec::new();
        for (key, value) in &index {
            seen.push((key, *value));
        }
        assert_eq!(seen, vec![(1, 100), (2, 200), (3, 300)]);
    }
}
