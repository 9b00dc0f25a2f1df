//! Shared ledger handle for multi-threaded hosts.

use crate::entity::Transaction;
use crate::processor::Ledger;
use gridledger_common::Result;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable handle to one ledger: many concurrent readers, one writer.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Records a transaction under the write lock.
    pub fn record(&self, tx: Transaction) -> Result<Arc<Transaction>> {
        self.inner.write().record(tx)
    }

    /// Runs `f` under the read lock.
    pub fn read<T>(&self, f: impl FnOnce(&Ledger) -> T) -> T {
        f(&self.inner.read())
    }

    /// Runs `f` under the write lock, for bulk operations such as import.
    pub fn write<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> T {
        f(&mut self.inner.write())
    }

    /// Returns the ledger if this is the last handle.
    pub fn into_inner(self) -> std::result::Result<Ledger, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridledger_common::{BuyerId, LedgerConfig, SellerId, TransactionId};
    use std::thread;

    fn tx(id: u32, seller: u32) -> Transaction {
        Transaction::new(
            TransactionId::new(id),
            BuyerId::new(id % 7),
            SellerId::new(seller),
            10.0,
            0.5,
            id as i64,
        )
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let shared = SharedLedger::new(Ledger::new(&LedgerConfig::default()).unwrap());
        let mut handles = Vec::new();

        for worker in 0..4u32 {
            let shared = shared.clone();
            handles.push(thread::spawn(move || {
                for i in 0..250 {
                    shared.record(tx(worker * 1_000 + i, worker)).unwrap();
                    let len = shared.read(|ledger| ledger.len());
                    assert!(len > 0);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.read(|ledger| ledger.len()), 1_000);
        let ledger = shared.into_inner().ok().unwrap();
        for worker in 0..4 {
            let seller = ledger.registry().seller(SellerId::new(worker)).unwrap();
            assert!((seller.total_revenue() - 1_250.0).abs() < 1e-9);
        }
        ledger.registry().transactions().check_invariants().unwrap();
    }

    #[test]
    fn test_into_inner_with_live_clone() {
        let shared = SharedLedger::new(Ledger::new(&LedgerConfig::default()).unwrap());
        let other = shared.clone();
        let shared = shared.into_inner().err().unwrap();
        drop(other);
        assert!(shared.into_inner().is_ok());
    }
}
