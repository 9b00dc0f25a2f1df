//! Ordered index for GridLedger.
//!
//! This crate provides:
//! - Arena storage for B+ tree nodes addressed by integer ids
//! - Degree-parameterized B+ tree with pre-emptive splitting
//! - Ascending full scans over the linked leaf chain
//! - Structural invariant checking

mod btree;

pub use btree::{Iter, OrderedIndex, MIN_DEGREE};
