//! Arena allocation for B+ tree nodes.

use super::constants::ARENA_INITIAL_NODES;
use super::node::Node;
use gridledger_common::{LedgerError, Result};

/// Largest number of nodes addressable by a `NodeId`.
const MAX_NODES: u64 = u32::MAX as u64 + 1;

/// Index of a node slot within the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline(always)]
    fn slot(self) -> usize {
        self.0 as usize
    }

    #[cfg(test)]
    pub(crate) fn from_test(raw: u32) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Growable node storage. Nodes are allocated sequentially and never freed,
/// matching the append-only index built on top of it.
pub(crate) struct NodeArena<V> {
    nodes: Vec<Node<V>>,
}

impl<V> NodeArena<V> {
    /// Creates an empty arena.
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(ARENA_INITIAL_NODES),
        }
    }

    /// Fails unless `extra` more nodes can still be given an id.
    pub(crate) fn ensure_room(&self, extra: usize) -> Result<()> {
        match (self.nodes.len() as u64).checked_add(extra as u64) {
            Some(total) if total <= MAX_NODES => Ok(()),
            _ => Err(LedgerError::IndexCorrupted(format!(
                "node arena full: {} nodes allocated, {} more requested",
                self.nodes.len(),
                extra
            ))),
        }
    }

    /// Stores a node and returns its id. Callers check `ensure_room` first.
    #[inline]
    pub(crate) fn allocate(&mut self, node: Node<V>) -> NodeId {
        debug_assert!((self.nodes.len() as u64) < MAX_NODES, "node arena overflow");
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[inline(always)]
    pub(crate) fn get(&self, id: NodeId) -> &Node<V> {
        &self.nodes[id.slot()]
    }

    #[inline(always)]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<V> {
        &mut self.nodes[id.slot()]
    }

    /// Number of allocated nodes.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}
