//! B+ tree node types.

use super::arena::NodeId;

/// A node slot in the arena.
pub(crate) enum Node<V> {
    Internal(InternalNode),
    Leaf(LeafNode<V>),
}

impl<V> Node<V> {
    /// Keys held by this node, ascending.
    #[inline]
    pub(crate) fn keys(&self) -> &[u64] {
        match self {
            Node::Internal(node) => &node.keys,
            Node::Leaf(node) => &node.keys,
        }
    }

    #[inline]
    pub(crate) fn num_keys(&self) -> usize {
        self.keys().len()
    }
}

/// Routing node. `children.len() == keys.len() + 1`.
///
/// B+ tree semantics: child[i] has keys <= key[i], child[i+1] has keys > key[i].
pub(crate) struct InternalNode {
    pub(crate) keys: Vec<u64>,
    pub(crate) children: Vec<NodeId>,
}

impl InternalNode {
    /// Creates a routing node with a single child and no keys.
    pub(crate) fn with_child(min_degree: usize, child: NodeId) -> Self {
        let mut children = Vec::with_capacity(2 * min_degree);
        children.push(child);
        Self {
            keys: Vec::with_capacity(2 * min_degree - 1),
            children,
        }
    }

    /// Index of the child subtree that holds `key`: the position of the
    /// first key not less than `key`.
    #[inline]
    pub(crate) fn child_index(&self, key: u64) -> usize {
        self.keys.partition_point(|&k| k < key)
    }

    /// Moves the upper `t-1` keys and `t` children into a new sibling and
    /// returns the median key, which no longer belongs to either half.
    pub(crate) fn split(&mut self, min_degree: usize) -> (u64, InternalNode) {
        let median = self.keys[min_degree - 1];
        let mut right_keys = Vec::with_capacity(2 * min_degree - 1);
        right_keys.extend(self.keys.drain(min_degree..));
        self.keys.truncate(min_degree - 1);
        let mut right_children = Vec::with_capacity(2 * min_degree);
        right_children.extend(self.children.drain(min_degree..));

        (
            median,
            InternalNode {
                keys: right_keys,
                children: right_children,
            },
        )
    }

    /// Installs a separator and its right child after a child split.
    pub(crate) fn insert_separator(&mut self, index: usize, key: u64, right: NodeId) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, right);
    }
}

/// Leaf node holding records, chained to its right neighbour.
pub(crate) struct LeafNode<V> {
    pub(crate) keys: Vec<u64>,
    pub(crate) records: Vec<V>,
    pub(crate) next_leaf: Option<NodeId>,
}

impl<V> LeafNode<V> {
    /// Creates an empty leaf sized for the given minimum degree.
    pub(crate) fn new(min_degree: usize) -> Self {
        Self {
            keys: Vec::with_capacity(2 * min_degree - 1),
            records: Vec::with_capacity(2 * min_degree - 1),
            next_leaf: None,
        }
    }

    /// Position where `key` is or would be inserted.
    #[inline]
    pub(crate) fn position(&self, key: u64) -> usize {
        self.keys.partition_point(|&k| k < key)
    }

    /// Slot holding exactly `key`, if any.
    #[inline]
    pub(crate) fn find(&self, key: u64) -> Option<usize> {
        let pos = self.position(key);
        (pos < self.keys.len() && self.keys[pos] == key).then_some(pos)
    }

    pub(crate) fn insert_at(&mut self, pos: usize, key: u64, record: V) {
        self.keys.insert(pos, key);
        self.records.insert(pos, record);
    }

    /// Moves the upper `t-1` entries into a new sibling. The leaf keeps the
    /// lower `t-1` entries plus the median, whose key is returned for the
    /// parent. The caller links the sibling into the leaf chain.
    pub(crate) fn split(&mut self, min_degree: usize) -> (u64, LeafNode<V>) {
        let mut right = LeafNode::new(min_degree);
        right.keys.extend(self.keys.drain(min_degree..));
        right.records.extend(self.records.drain(min_degree..));
        right.next_leaf = self.next_leaf;

        (self.keys[min_degree - 1], right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_leaf(t: usize) -> LeafNode<u64> {
        let mut leaf = LeafNode::new(t);
        for k in 0..(2 * t - 1) as u64 {
            leaf.insert_at(k as usize, k * 10, k);
        }
        leaf
    }

    #[test]
    fn test_leaf_position_and_find() {
        let leaf = full_leaf(2);
        assert_eq!(leaf.keys, vec![0, 10, 20]);
        assert_eq!(leaf.position(15), 2);
        assert_eq!(leaf.position(25), 3);
        assert_eq!(leaf.find(10), Some(1));
        assert_eq!(leaf.find(11), None);
    }

    #[test]
    fn test_leaf_split_keeps_median_left() {
        let mut leaf = full_leaf(3);
        let (median, right) = leaf.split(3);

        assert_eq!(median, 20);
        assert_eq!(leaf.keys, vec![0, 10, 20]);
        assert_eq!(leaf.records, vec![0, 1, 2]);
        assert_eq!(right.keys, vec![30, 40]);
        assert_eq!(right.records, vec![3, 4]);
    }

    #[test]
    fn test_internal_split_promotes_median() {
        let t = 2;
        let mut node = InternalNode::with_child(t, NodeId::from_test(0));
        for (i, key) in [10, 20, 30].into_iter().enumerate() {
            node.insert_separator(i, key, NodeId::from_test(i as u32 + 1));
        }

        let (median, right) = node.split(t);

        assert_eq!(median, 20);
        assert_eq!(node.keys, vec![10]);
        assert_eq!(node.children.len(), 2);
        assert_eq!(right.keys, vec![30]);
        assert_eq!(right.children, vec![NodeId::from_test(2), NodeId::from_test(3)]);
    }

    #[test]
    fn test_child_index_routes_equal_keys_left() {
        let mut node = InternalNode::with_child(2, NodeId::from_test(0));
        node.insert_separator(0, 10, NodeId::from_test(1));

        assert_eq!(node.child_index(5), 0);
        assert_eq!(node.child_index(10), 0);
        assert_eq!(node.child_index(11), 1);
    }
}
