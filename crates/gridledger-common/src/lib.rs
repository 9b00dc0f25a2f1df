//! GridLedger common types, errors, and configuration.
//!
//! This crate provides shared definitions used across all GridLedger components.

pub mod config;
pub mod error;
pub mod types;

pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use types::{BuyerId, PairKey, SellerId, TransactionId};
