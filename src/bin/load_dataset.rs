use std::error::Error;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;

use sales_dashboard::{
    DEFAULT_DATASET_URL, DatasetSource, SQLiteTransactionStore, TransactionStore,
    build_http_client, initialize_db,
};

/// A utility for loading the product transaction dataset into a sales dashboard database.
///
/// Every existing transaction in the database is replaced.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database, created if it does not exist.
    #[arg(long, env = "DB_PATH", default_value = "sales.db")]
    db_path: String,

    /// A URL or a file path to a JSON array of transactions.
    #[arg(long, short, default_value = DEFAULT_DATASET_URL)]
    source: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let source = DatasetSource::from_arg(&args.source);
    println!("Loading dataset from {}", args.source);
    let transactions = source.load(&build_http_client()?).await?;

    println!("Opening database at {}", args.db_path);
    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)));
    let count = store.replace_all(transactions)?;

    println!("Success! Stored {count} transactions.");

    Ok(())
}
