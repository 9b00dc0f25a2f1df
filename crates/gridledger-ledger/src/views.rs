//! Read-only reporting views over a `Registry`.
//!
//! Filtered views scan an index once in key order. Sorted views materialize
//! the scan into a buffer and insertion-sort it, which keeps equal elements in
//! key order.

use crate::entity::{Buyer, SellerBuyerPair, Transaction};
use crate::registry::Registry;
use gridledger_common::SellerId;
use std::cmp::Ordering;

/// Initial capacity of a materialized view buffer.
const VIEW_INITIAL_CAPACITY: usize = 10;

/// Transactions in a timestamp window with their totals.
#[derive(Debug, Clone, Default)]
pub struct RangeSummary<'a> {
    pub transactions: Vec<&'a Transaction>,
    pub total_energy_kwh: f64,
    pub total_revenue: f64,
}

impl RangeSummary<'_> {
    pub fn count(&self) -> usize {
        self.transactions.len()
    }
}

/// Revenue summary for one seller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SellerRevenue {
    pub seller_id: SellerId,
    pub transaction_count: usize,
    pub total_energy_kwh: f64,
    pub total_revenue: f64,
}

/// Every transaction in ascending id order.
pub fn all_transactions(registry: &Registry) -> impl Iterator<Item = &Transaction> + '_ {
    registry.transactions().values().map(|tx| tx.as_ref())
}

/// Transactions with `start <= timestamp <= end`, ascending by id.
pub fn transactions_in_time_range(registry: &Registry, start: i64, end: i64) -> RangeSummary<'_> {
    let mut summary = RangeSummary::default();
    for tx in all_transactions(registry) {
        if (start..=end).contains(&tx.timestamp()) {
            summary.total_energy_kwh += tx.energy_kwh();
            summary.total_revenue += tx.total_price();
            summary.transactions.push(tx);
        }
    }
    summary
}

/// Count, energy, and revenue of one seller's transactions.
///
/// Computed by seller-id equality over the transaction index, so it is
/// independent of the seller's own aggregates. An unknown seller yields zeros.
pub fn seller_revenue(registry: &Registry, seller_id: SellerId) -> SellerRevenue {
    all_transactions(registry)
        .filter(|tx| tx.seller_id() == seller_id)
        .fold(
            SellerRevenue {
                seller_id,
                transaction_count: 0,
                total_energy_kwh: 0.0,
                total_revenue: 0.0,
            },
            |mut acc, tx| {
                acc.transaction_count += 1;
                acc.total_energy_kwh += tx.energy_kwh();
                acc.total_revenue += tx.total_price();
                acc
            },
        )
}

/// Transactions with `min <= energy <= max`, sorted ascending by energy.
pub fn transactions_by_energy(registry: &Registry, min_kwh: f64, max_kwh: f64) -> Vec<&Transaction> {
    let mut view = materialize(
        all_transactions(registry)
            .filter(|tx| tx.energy_kwh() >= min_kwh && tx.energy_kwh() <= max_kwh),
    );
    insertion_sort_by(&mut view, |a, b| a.energy_kwh().total_cmp(&b.energy_kwh()));
    view
}

/// All buyers sorted ascending by total energy purchased.
pub fn buyers_by_energy(registry: &Registry) -> Vec<&Buyer> {
    let mut view = materialize(registry.buyers().values());
    insertion_sort_by(&mut view, |a, b| {
        a.total_energy_purchased()
            .total_cmp(&b.total_energy_purchased())
    });
    view
}

/// All seller/buyer pairs sorted ascending by transaction count.
pub fn pairs_by_transaction_count(registry: &Registry) -> Vec<&SellerBuyerPair> {
    let mut view = materialize(registry.pairs().values());
    insertion_sort_by(&mut view, |a, b| {
        a.transaction_count().cmp(&b.transaction_count())
    });
    view
}

/// Collects a scan into a buffer that starts small and doubles when full.
fn materialize<T>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut buf = Vec::with_capacity(VIEW_INITIAL_CAPACITY);
    for item in items {
        if buf.len() == buf.capacity() {
            buf.reserve_exact(buf.capacity().max(1));
        }
        buf.push(item);
    }
    buf
}

/// Stable ascending insertion sort.
fn insertion_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}
