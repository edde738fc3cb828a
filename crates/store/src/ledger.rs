//! Append-only record of completed checkouts

use bazaar_core::{AccountId, Transaction};
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct Ledger {
    transactions: RwLock<Vec<Transaction>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, txn: Transaction) {
        self.transactions.write().push(txn);
    }

    /// A buyer's transactions, oldest first
    pub fn for_buyer(&self, buyer_id: AccountId) -> Vec<Transaction> {
        self.transactions
            .read()
            .iter()
            .filter(|txn| txn.buyer_id == buyer_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.transactions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.read().is_empty()
    }
}
