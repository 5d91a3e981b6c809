//! Product transactions and the stores that hold them.
//!
//! This module contains:
//! - The `Transaction` model and the raw dataset record it is validated from
//! - The `TransactionStore` trait with SQLite and in-memory implementations

mod core;
mod memory;
mod sqlite;
mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use self::core::{PageWindow, RawTransaction, Transaction, TransactionFilter};
pub use memory::InMemoryTransactionStore;
pub use sqlite::{SQLiteTransactionStore, create_transaction_table};
pub use store::TransactionStore;
