//! Arena-backed B+ tree.
//!
//! Nodes live in a single `Vec` owned by the tree and refer to each other by
//! `NodeId`. Records are stored only in leaves; internal nodes hold routing
//! keys. Leaves are chained left to right for full scans.
//!
//! Internal node layout:
//! ```text
//! keys:     [k0, k1, ..., kn-1]
//! children: [c0, c1, ..., cn]      (keys in ci are <= ki < keys in ci+1)
//! ```
//!
//! Leaf node layout:
//! ```text
//! keys:      [k0, k1, ..., kn-1]
//! records:   [r0, r1, ..., rn-1]
//! next_leaf: Option<NodeId>  ──> next leaf in ascending key order
//! ```
//!
//! With minimum degree `t` every node holds at most `2t-1` keys and every
//! non-root node at least `t-1`.

pub mod arena;
pub mod constants;
pub mod index;
pub mod iter;
pub mod node;

pub use constants::MIN_DEGREE;
pub use index::OrderedIndex;
pub use iter::Iter;
