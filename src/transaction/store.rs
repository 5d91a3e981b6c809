//! Defines the transaction store trait.

use crate::Error;

use super::core::{PageWindow, Transaction, TransactionFilter};

/// Handles the bulk replacement and filtered retrieval of transactions.
///
/// Implementations must return matching transactions in a stable order (by
/// ID, then by the order they were stored) so that consecutive pages do not
/// overlap.
pub trait TransactionStore {
    /// Retrieve the transactions that match `filter`.
    ///
    /// If `window` is set, only that slice of the matching transactions is
    /// returned. An offset past the end yields an empty list.
    fn find(
        &self,
        filter: &TransactionFilter,
        window: Option<PageWindow>,
    ) -> Result<Vec<Transaction>, Error>;

    /// Count the transactions that match `filter`.
    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error>;

    /// Retrieve one page of matching transactions and the total number of
    /// matching transactions.
    ///
    /// Implementers should read the page and the count from the same
    /// snapshot of the store. The default implementation does not.
    fn find_page(
        &self,
        filter: &TransactionFilter,
        window: PageWindow,
    ) -> Result<(Vec<Transaction>, u64), Error> {
        let transactions = self.find(filter, Some(window))?;
        let count = self.count(filter)?;

        Ok((transactions, count))
    }

    /// Delete every transaction and then store `transactions`.
    ///
    /// Returns the number of transactions stored.
    fn replace_all(&self, transactions: Vec<Transaction>) -> Result<usize, Error>;
}
