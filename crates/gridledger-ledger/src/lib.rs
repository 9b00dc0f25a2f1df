//! Energy-trading ledger for GridLedger.
//!
//! This crate provides:
//! - Transaction, seller, buyer, and seller/buyer pair entities
//! - Entity registry over four ordered indices plus per-entity sub-indices
//! - Transaction processor maintaining tiered rates, revenue, regular buyers,
//!   and pair counts
//! - Read-only reporting views (filtered scans, materialize-and-sort)
//! - Flat transaction store file import/export
//! - Date range parsing for reports
//! - Read/write locked ledger handle for multi-threaded hosts

pub mod dates;
mod entity;
mod processor;
mod registry;
mod shared;
pub mod store;
pub mod views;

pub use entity::{Buyer, RegularBuyer, Seller, SellerBuyerPair, Transaction};
pub use processor::Ledger;
pub use registry::Registry;
pub use shared::SharedLedger;
pub use store::{ImportReport, STORE_HEADER};
