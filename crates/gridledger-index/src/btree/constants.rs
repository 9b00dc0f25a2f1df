//! B+ tree constants.

/// Smallest minimum degree a tree accepts (max 3 keys per node).
pub const MIN_DEGREE: usize = 2;

/// Initial node slot capacity of a fresh arena.
pub(crate) const ARENA_INITIAL_NODES: usize = 4;
