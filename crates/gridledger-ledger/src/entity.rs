//! Ledger entities.

use gridledger_common::{BuyerId, PairKey, Result, SellerId, TransactionId};
use gridledger_index::OrderedIndex;
use std::sync::Arc;

/// A single energy trade. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    buyer_id: BuyerId,
    seller_id: SellerId,
    energy_kwh: f64,
    price_per_kwh: f64,
    total_price: f64,
    timestamp: i64,
}

impl Transaction {
    /// Creates a transaction; the total price is fixed at creation.
    pub fn new(
        id: TransactionId,
        buyer_id: BuyerId,
        seller_id: SellerId,
        energy_kwh: f64,
        price_per_kwh: f64,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            buyer_id,
            seller_id,
            energy_kwh,
            price_per_kwh,
            total_price: energy_kwh * price_per_kwh,
            timestamp,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn buyer_id(&self) -> BuyerId {
        self.buyer_id
    }

    pub fn seller_id(&self) -> SellerId {
        self.seller_id
    }

    /// Energy traded in kWh.
    pub fn energy_kwh(&self) -> f64 {
        self.energy_kwh
    }

    pub fn price_per_kwh(&self) -> f64 {
        self.price_per_kwh
    }

    /// `energy_kwh * price_per_kwh`.
    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    /// Unix timestamp in seconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// A buyer that traded with a seller at least the regular-buyer threshold
/// number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegularBuyer {
    pub buyer_id: BuyerId,
    pub transaction_count: u32,
}

/// Seller aggregate.
pub struct Seller {
    id: SellerId,
    rate_below_300: f64,
    rate_above_300: f64,
    total_revenue: f64,
    regular_buyers: Vec<RegularBuyer>,
    transactions: OrderedIndex<Arc<Transaction>>,
}

impl Seller {
    pub(crate) fn new(id: SellerId, sub_index_degree: usize) -> Result<Self> {
        Ok(Self {
            id,
            rate_below_300: 0.0,
            rate_above_300: 0.0,
            total_revenue: 0.0,
            regular_buyers: Vec::new(),
            transactions: OrderedIndex::new(sub_index_degree)?,
        })
    }

    pub fn id(&self) -> SellerId {
        self.id
    }

    /// Unit rate for the lower tier; zero until the first lower-tier trade.
    pub fn rate_below_300(&self) -> f64 {
        self.rate_below_300
    }

    /// Unit rate for the upper tier; zero until the first upper-tier trade.
    pub fn rate_above_300(&self) -> f64 {
        self.rate_above_300
    }

    /// Sum of total price over all of this seller's transactions.
    pub fn total_revenue(&self) -> f64 {
        self.total_revenue
    }

    pub fn regular_buyers(&self) -> &[RegularBuyer] {
        &self.regular_buyers
    }

    /// The fixed rate for the tier `energy_kwh` falls into, if already known.
    pub fn tier_rate(&self, energy_kwh: f64, tier_threshold_kwh: f64) -> Option<f64> {
        let rate = if energy_kwh < tier_threshold_kwh {
            self.rate_below_300
        } else {
            self.rate_above_300
        };
        (rate != 0.0).then_some(rate)
    }

    /// This seller's transactions in ascending id order.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> + '_ {
        self.transactions.values().map(Arc::as_ref)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Fixes the tier rate on the first trade seen in that tier.
    pub(crate) fn observe_rate(&mut self, tx: &Transaction, tier_threshold_kwh: f64) {
        if tx.energy_kwh < tier_threshold_kwh {
            if self.rate_below_300 == 0.0 {
                self.rate_below_300 = tx.price_per_kwh;
            }
        } else if self.rate_above_300 == 0.0 {
            self.rate_above_300 = tx.price_per_kwh;
        }
    }

    pub(crate) fn add_revenue(&mut self, amount: f64) {
        self.total_revenue += amount;
    }

    pub(crate) fn attach(&mut self, tx: Arc<Transaction>) -> Result<()> {
        self.transactions.insert(tx.id.as_key(), tx)
    }

    /// Counts one more trade with `buyer_id`, then drops every entry below
    /// `threshold`.
    ///
    /// `pair_count` is the true number of trades between this seller and the
    /// buyer including the current one; it seeds entries for buyers that are
    /// not (or no longer) listed.
    pub(crate) fn note_buyer(&mut self, buyer_id: BuyerId, pair_count: u32, threshold: u32) {
        match self
            .regular_buyers
            .iter_mut()
            .find(|entry| entry.buyer_id == buyer_id)
        {
            Some(entry) => entry.transaction_count += 1,
            None => self.regular_buyers.push(RegularBuyer {
                buyer_id,
                transaction_count: pair_count,
            }),
        }

        self.regular_buyers
            .retain(|entry| entry.transaction_count >= threshold);
    }
}

impl std::fmt::Debug for Seller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seller")
            .field("id", &self.id)
            .field("rate_below_300", &self.rate_below_300)
            .field("rate_above_300", &self.rate_above_300)
            .field("total_revenue", &self.total_revenue)
            .field("regular_buyers", &self.regular_buyers)
            .field("transactions", &self.transactions.len())
            .finish()
    }
}

/// Buyer aggregate.
pub struct Buyer {
    id: BuyerId,
    total_energy_purchased: f64,
    transactions: OrderedIndex<Arc<Transaction>>,
}

impl Buyer {
    pub(crate) fn new(id: BuyerId, sub_index_degree: usize) -> Result<Self> {
        Ok(Self {
            id,
            total_energy_purchased: 0.0,
            transactions: OrderedIndex::new(sub_index_degree)?,
        })
    }

    pub fn id(&self) -> BuyerId {
        self.id
    }

    /// Sum of energy over all of this buyer's transactions, in kWh.
    pub fn total_energy_purchased(&self) -> f64 {
        self.total_energy_purchased
    }

    /// This buyer's transactions in ascending id order.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> + '_ {
        self.transactions.values().map(Arc::as_ref)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub(crate) fn attach(&mut self, tx: Arc<Transaction>) -> Result<()> {
        let energy_kwh = tx.energy_kwh;
        self.transactions.insert(tx.id.as_key(), tx)?;
        self.total_energy_purchased += energy_kwh;
        Ok(())
    }
}

impl std::fmt::Debug for Buyer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buyer")
            .field("id", &self.id)
            .field("total_energy_purchased", &self.total_energy_purchased)
            .field("transactions", &self.transactions.len())
            .finish()
    }
}

/// Trade count between one seller and one buyer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerBuyerPair {
    seller_id: SellerId,
    buyer_id: BuyerId,
    transaction_count: u32,
}

impl SellerBuyerPair {
    pub(crate) fn new(seller_id: SellerId, buyer_id: BuyerId) -> Self {
        Self {
            seller_id,
            buyer_id,
            transaction_count: 0,
        }
    }

    pub fn seller_id(&self) -> SellerId {
        self.seller_id
    }

    pub fn buyer_id(&self) -> BuyerId {
        self.buyer_id
    }

    pub fn transaction_count(&self) -> u32 {
        self.transaction_count
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(self.seller_id, self.buyer_id)
    }

    pub(crate) fn increment(&mut self) {
        self.transaction_count += 1;
    }
}
