//! Transaction processing.

use crate::entity::Transaction;
use crate::registry::Registry;
use gridledger_common::{BuyerId, LedgerConfig, LedgerError, Result, SellerId};
use std::sync::Arc;
use tracing::debug;

/// A ledger session: the registry plus the pricing and regular-buyer rules.
///
/// `record` is the only mutating entry point. Every derived aggregate is
/// updated before it returns.
pub struct Ledger {
    registry: Registry,
    tier_threshold_kwh: f64,
    regular_buyer_threshold: u32,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: Registry::new(config)?,
            tier_threshold_kwh: config.tier_threshold_kwh,
            regular_buyer_threshold: config.regular_buyer_threshold,
        })
    }

    /// Read access to every entity.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of recorded transactions.
    pub fn len(&self) -> usize {
        self.registry.transactions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tier_threshold_kwh(&self) -> f64 {
        self.tier_threshold_kwh
    }

    pub fn regular_buyer_threshold(&self) -> u32 {
        self.regular_buyer_threshold
    }

    /// The seller's fixed unit rate for the tier `energy_kwh` falls into.
    /// `None` when the seller is unknown or has no trade in that tier yet.
    pub fn quote_price(&self, seller_id: SellerId, energy_kwh: f64) -> Option<f64> {
        self.registry
            .seller(seller_id)?
            .tier_rate(energy_kwh, self.tier_threshold_kwh)
    }

    /// Records a new transaction and updates every aggregate.
    ///
    /// A transaction id that was already recorded is rejected with
    /// `DuplicateTransaction` before any state changes, so replaying a
    /// transaction never double counts revenue or energy.
    pub fn record(&mut self, tx: Transaction) -> Result<Arc<Transaction>> {
        if self.registry.transaction(tx.id()).is_some() {
            return Err(LedgerError::DuplicateTransaction { id: tx.id().get() });
        }

        let tx = Arc::new(tx);
        self.registry.insert_transaction(Arc::clone(&tx))?;
        self.process(&tx)?;

        debug!(
            transaction_id = %tx.id(),
            seller_id = %tx.seller_id(),
            buyer_id = %tx.buyer_id(),
            energy_kwh = tx.energy_kwh(),
            "recorded transaction"
        );
        Ok(tx)
    }

    /// Applies one stored transaction to sellers, buyers, and pairs. The
    /// order matters: regular-buyer tracking reads the pair count before the
    /// pair itself is updated.
    fn process(&mut self, tx: &Arc<Transaction>) -> Result<()> {
        let seller_id = tx.seller_id();
        let buyer_id = tx.buyer_id();

        let seller = self.registry.get_or_create_seller(seller_id)?;
        seller.observe_rate(tx, self.tier_threshold_kwh);
        seller.add_revenue(tx.total_price());
        seller.attach(Arc::clone(tx))?;

        self.registry
            .get_or_create_buyer(buyer_id)?
            .attach(Arc::clone(tx))?;

        self.track_regular_buyer(seller_id, buyer_id)?;

        self.registry
            .get_or_create_pair(seller_id, buyer_id)?
            .increment();

        Ok(())
    }

    fn track_regular_buyer(&mut self, seller_id: SellerId, buyer_id: BuyerId) -> Result<()> {
        let pair_count = self
            .registry
            .pair(seller_id, buyer_id)
            .map_or(0, |pair| pair.transaction_count())
            + 1;
        let threshold = self.regular_buyer_threshold;

        self.registry
            .get_or_create_seller(seller_id)?
            .note_buyer(buyer_id, pair_count, threshold);
        Ok(())
    }
}
