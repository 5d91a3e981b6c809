//! In-memory [TransactionStore] implementation for tests and throwaway servers.
//!
//! Transactions are kept sorted by ID behind a `std::sync::RwLock`, so readers
//! always see either the old or the new contents of a reload.

use std::sync::{Arc, RwLock, RwLockReadGuard};

use crate::Error;

use super::{
    core::{PageWindow, Transaction, TransactionFilter},
    store::TransactionStore,
};

/// Stores transactions in a vector.
///
/// Clones share the same underlying vector.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<Vec<Transaction>>>,
}

impl InMemoryTransactionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `transactions`.
    pub fn with_transactions(mut transactions: Vec<Transaction>) -> Self {
        transactions.sort_by_key(|transaction| transaction.id);

        Self {
            transactions: Arc::new(RwLock::new(transactions)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Transaction>>, Error> {
        self.transactions
            .read()
            .inspect_err(|error| tracing::error!("could not acquire store lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

fn window_of(transactions: Vec<Transaction>, window: Option<PageWindow>) -> Vec<Transaction> {
    match window {
        Some(PageWindow { offset, limit }) => transactions
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect(),
        None => transactions,
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn find(
        &self,
        filter: &TransactionFilter,
        window: Option<PageWindow>,
    ) -> Result<Vec<Transaction>, Error> {
        let transactions = self.read()?;

        let matching = transactions
            .iter()
            .filter(|transaction| filter.matches(transaction))
            .cloned()
            .collect();

        Ok(window_of(matching, window))
    }

    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error> {
        let transactions = self.read()?;

        Ok(transactions
            .iter()
            .filter(|transaction| filter.matches(transaction))
            .count() as u64)
    }

    fn find_page(
        &self,
        filter: &TransactionFilter,
        window: PageWindow,
    ) -> Result<(Vec<Transaction>, u64), Error> {
        let transactions = self.read()?;

        let matching: Vec<Transaction> = transactions
            .iter()
            .filter(|transaction| filter.matches(transaction))
            .cloned()
            .collect();
        let count = matching.len() as u64;

        Ok((window_of(matching, Some(window)), count))
    }

    fn replace_all(&self, mut transactions: Vec<Transaction>) -> Result<usize, Error> {
        // Stable sort keeps dataset order among duplicate IDs.
        transactions.sort_by_key(|transaction| transaction.id);
        let count = transactions.len();

        let mut stored = self
            .transactions
            .write()
            .inspect_err(|error| tracing::error!("could not acquire store lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;
        *stored = transactions;

        tracing::info!("Replaced all transactions with {count} new ones");

        Ok(count)
    }
}
