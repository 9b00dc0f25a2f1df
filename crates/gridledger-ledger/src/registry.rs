//! Entity registry over the four top-level indices.

use crate::entity::{Buyer, Seller, SellerBuyerPair, Transaction};
use gridledger_common::{
    BuyerId, LedgerConfig, LedgerError, PairKey, Result, SellerId, TransactionId,
};
use gridledger_index::OrderedIndex;
use std::sync::Arc;
use tracing::debug;

/// Holds every entity of a ledger session.
///
/// Each entity is owned by exactly one top-level index. Seller and buyer
/// sub-indices share the transaction records through `Arc` handles.
pub struct Registry {
    /// Transactions keyed by transaction id.
    transactions: OrderedIndex<Arc<Transaction>>,
    /// Sellers keyed by seller id.
    sellers: OrderedIndex<Seller>,
    /// Buyers keyed by buyer id.
    buyers: OrderedIndex<Buyer>,
    /// Pairs keyed by packed `PairKey`.
    pairs: OrderedIndex<SellerBuyerPair>,
    /// Degree of per-seller and per-buyer sub-indices.
    sub_index_degree: usize,
}

impl Registry {
    /// Creates an empty registry using the configured index degrees.
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        Self::with_degrees(config.index_degree, config.sub_index_degree)
    }

    /// Creates an empty registry with explicit index degrees.
    pub fn with_degrees(index_degree: usize, sub_index_degree: usize) -> Result<Self> {
        if sub_index_degree < gridledger_index::MIN_DEGREE {
            return Err(LedgerError::InvalidDegree {
                degree: sub_index_degree,
            });
        }

        Ok(Self {
            transactions: OrderedIndex::new(index_degree)?,
            sellers: OrderedIndex::new(index_degree)?,
            buyers: OrderedIndex::new(index_degree)?,
            pairs: OrderedIndex::new(index_degree)?,
            sub_index_degree,
        })
    }

    // =========================================================================
    // Upsert
    // =========================================================================

    /// Stores a transaction in the transaction index.
    pub(crate) fn insert_transaction(&mut self, tx: Arc<Transaction>) -> Result<()> {
        let id = tx.id();
        self.transactions
            .insert(id.as_key(), tx)
            .map_err(|e| match e {
                LedgerError::DuplicateKey { .. } => {
                    LedgerError::DuplicateTransaction { id: id.get() }
                }
                other => other,
            })
    }

    /// Returns the seller, creating a zero-initialised one on first use.
    pub fn get_or_create_seller(&mut self, id: SellerId) -> Result<&mut Seller> {
        if !self.sellers.contains(id.as_key()) {
            let seller = Seller::new(id, self.sub_index_degree)?;
            self.sellers.insert(id.as_key(), seller)?;
            debug!(seller_id = %id, "registered seller");
        }
        self.sellers
            .search_mut(id.as_key())
            .ok_or_else(|| missing("seller", id))
    }

    /// Returns the buyer, creating a zero-initialised one on first use.
    pub fn get_or_create_buyer(&mut self, id: BuyerId) -> Result<&mut Buyer> {
        if !self.buyers.contains(id.as_key()) {
            let buyer = Buyer::new(id, self.sub_index_degree)?;
            self.buyers.insert(id.as_key(), buyer)?;
            debug!(buyer_id = %id, "registered buyer");
        }
        self.buyers
            .search_mut(id.as_key())
            .ok_or_else(|| missing("buyer", id))
    }

    /// Returns the seller/buyer pair, creating one with a zero count on
    /// first use.
    pub fn get_or_create_pair(
        &mut self,
        seller_id: SellerId,
        buyer_id: BuyerId,
    ) -> Result<&mut SellerBuyerPair> {
        let key = PairKey::new(seller_id, buyer_id);
        if !self.pairs.contains(key.as_u64()) {
            self.pairs
                .insert(key.as_u64(), SellerBuyerPair::new(seller_id, buyer_id))?;
            debug!(pair = %key, "registered seller/buyer pair");
        }
        self.pairs
            .search_mut(key.as_u64())
            .ok_or_else(|| missing("pair", key))
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.search(id.as_key()).map(Arc::as_ref)
    }

    pub fn seller(&self, id: SellerId) -> Option<&Seller> {
        self.sellers.search(id.as_key())
    }

    pub fn buyer(&self, id: BuyerId) -> Option<&Buyer> {
        self.buyers.search(id.as_key())
    }

    pub fn pair(&self, seller_id: SellerId, buyer_id: BuyerId) -> Option<&SellerBuyerPair> {
        self.pairs.search(PairKey::new(seller_id, buyer_id).as_u64())
    }

    /// Transaction index, for full scans.
    pub fn transactions(&self) -> &OrderedIndex<Arc<Transaction>> {
        &self.transactions
    }

    pub fn sellers(&self) -> &OrderedIndex<Seller> {
        &self.sellers
    }

    pub fn buyers(&self) -> &OrderedIndex<Buyer> {
        &self.buyers
    }

    pub fn pairs(&self) -> &OrderedIndex<SellerBuyerPair> {
        &self.pairs
    }
}

fn missing(kind: &str, id: impl std::fmt::Display) -> LedgerError {
    LedgerError::Internal(format!("{} {} missing after insert", kind, id))
}
