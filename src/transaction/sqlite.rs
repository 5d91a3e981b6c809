//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

use crate::Error;

use super::{
    core::{PageWindow, Transaction, TransactionFilter},
    store::TransactionStore,
};

const SELECT_COLUMNS: &str = "SELECT id, title, description, price, date_of_sale, category, sold, image \
    FROM product_transaction";

/// Stores transactions in a SQLite database.
///
/// The month filter uses SQLite's `strftime` on the stored sale date, which is
/// always written as an RFC 3339 string in UTC.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// The transaction table must already exist, see [crate::initialize_db].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Query for transactions in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is a SQL error.
    fn find(
        &self,
        filter: &TransactionFilter,
        window: Option<PageWindow>,
    ) -> Result<Vec<Transaction>, Error> {
        let connection = self.lock()?;

        select_transactions(filter, window, &connection)
    }

    /// Count the transactions in the database that match `filter`.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is a SQL error.
    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error> {
        let connection = self.lock()?;

        count_transactions(filter, &connection)
    }

    /// Read a page of transactions and the total count inside one read
    /// transaction so that another process writing to the database file
    /// cannot skew the page count.
    fn find_page(
        &self,
        filter: &TransactionFilter,
        window: PageWindow,
    ) -> Result<(Vec<Transaction>, u64), Error> {
        let connection = self.lock()?;
        let tx = connection.unchecked_transaction()?;

        let transactions = select_transactions(filter, Some(window), &tx)?;
        let count = count_transactions(filter, &tx)?;

        tx.commit()?;

        Ok((transactions, count))
    }

    /// Replace the contents of the transaction table.
    ///
    /// The delete and the inserts share one SQL transaction, so a failed
    /// insert leaves the previous transactions in place.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an unexpected SQL error.
    fn replace_all(&self, transactions: Vec<Transaction>) -> Result<usize, Error> {
        let connection = self.lock()?;
        let tx = connection.unchecked_transaction()?;

        tx.execute("DELETE FROM product_transaction", ())?;

        let mut stmt = tx.prepare(
            "INSERT INTO product_transaction
                (id, title, description, price, date_of_sale, category, sold, image)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;

        for transaction in &transactions {
            stmt.execute((
                transaction.id,
                &transaction.title,
                &transaction.description,
                transaction.price,
                format_date_of_sale(transaction.date_of_sale)?,
                &transaction.category,
                transaction.sold,
                &transaction.image,
            ))?;
        }

        drop(stmt);

        tx.commit()?;

        tracing::info!("Replaced all transactions with {} new ones", transactions.len());

        Ok(transactions.len())
    }
}

/// Create the transaction table in the database.
///
/// `row_id` is the storage key. `id` comes from the dataset and may repeat.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS product_transaction (
                row_id INTEGER PRIMARY KEY AUTOINCREMENT,
                id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL CHECK (price >= 0),
                date_of_sale TEXT NOT NULL,
                category TEXT NOT NULL,
                sold INTEGER NOT NULL,
                image TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_product_transaction_id ON product_transaction(id, row_id);",
        (),
    )?;

    Ok(())
}

fn select_transactions(
    filter: &TransactionFilter,
    window: Option<PageWindow>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (where_clause, mut query_parameters) = build_where_clause(filter);

    let mut query_string_parts = vec![SELECT_COLUMNS.to_owned()];

    if let Some(where_clause) = where_clause {
        query_string_parts.push(where_clause);
    }

    query_string_parts.push("ORDER BY id ASC, row_id ASC".to_owned());

    if let Some(window) = window {
        query_string_parts.push(format!(
            "LIMIT ?{} OFFSET ?{}",
            query_parameters.len() + 1,
            query_parameters.len() + 2
        ));
        query_parameters.push(Value::Integer(clamp_to_i64(window.limit)));
        query_parameters.push(Value::Integer(clamp_to_i64(window.offset)));
    }

    let query_string = query_string_parts.join(" ");

    connection
        .prepare(&query_string)?
        .query_map(params_from_iter(query_parameters.iter()), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

fn count_transactions(filter: &TransactionFilter, connection: &Connection) -> Result<u64, Error> {
    let (where_clause, query_parameters) = build_where_clause(filter);

    let query_string = match where_clause {
        Some(where_clause) => format!("SELECT COUNT(row_id) FROM product_transaction {where_clause}"),
        None => "SELECT COUNT(row_id) FROM product_transaction".to_owned(),
    };

    let count: i64 = connection.query_row(
        &query_string,
        params_from_iter(query_parameters.iter()),
        |row| row.get(0),
    )?;

    Ok(count.max(0) as u64)
}

/// Build the `WHERE` clause and its numbered parameters for `filter`.
///
/// Returns `None` for the clause if the filter matches everything.
fn build_where_clause(filter: &TransactionFilter) -> (Option<String>, Vec<Value>) {
    let mut where_clause_parts = vec![];
    let mut query_parameters = vec![];

    if !filter.search.is_empty() {
        let param = query_parameters.len() + 1;
        where_clause_parts.push(format!(
            "(title LIKE ?{param} ESCAPE '\\' OR description LIKE ?{param} ESCAPE '\\')"
        ));
        query_parameters.push(Value::Text(format!("%{}%", escape_like(&filter.search))));
    }

    if let Some(month) = filter.month.get() {
        where_clause_parts.push(format!(
            "CAST(strftime('%m', date_of_sale) AS INTEGER) = ?{}",
            query_parameters.len() + 1
        ));
        query_parameters.push(Value::Integer(month as i64));
    }

    if where_clause_parts.is_empty() {
        (None, query_parameters)
    } else {
        (
            Some(String::from("WHERE ") + &where_clause_parts.join(" AND ")),
            query_parameters,
        )
    }
}

/// Escape the `LIKE` wildcards so that search text is matched literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn format_date_of_sale(date_of_sale: OffsetDateTime) -> Result<String, rusqlite::Error> {
    date_of_sale
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_date: String = row.get(4)?;
    let date_of_sale = OffsetDateTime::parse(&raw_date, &Rfc3339).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        date_of_sale,
        category: row.get(5)?,
        sold: row.get(6)?,
        image: row.get(7)?,
    })
}
