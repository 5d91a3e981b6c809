//! Implements a struct that holds the state of the REST server.

use axum::extract::FromRef;
use reqwest::Client;

use crate::{pagination::PaginationConfig, query::QueryService, transaction::TransactionStore};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<T>
where
    T: TransactionStore + Send + Sync,
{
    /// Answers the read queries from the transaction store.
    pub query_service: QueryService<T>,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
    /// Where the initialize database endpoint downloads the dataset from.
    pub dataset_url: String,
    /// The client used to download the dataset.
    pub http_client: Client,
}

impl<T> AppState<T>
where
    T: TransactionStore + Send + Sync,
{
    /// Create a new [AppState] that serves the transactions in `transaction_store`.
    pub fn new(
        transaction_store: T,
        pagination_config: PaginationConfig,
        dataset_url: &str,
        http_client: Client,
    ) -> Self {
        Self {
            query_service: QueryService::new(transaction_store),
            pagination_config,
            dataset_url: dataset_url.to_owned(),
            http_client,
        }
    }
}

/// The state needed to answer the read-only queries.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    /// Answers the read queries from the transaction store.
    pub query_service: QueryService<T>,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl<T> FromRef<AppState<T>> for QueryState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<T>) -> Self {
        Self {
            query_service: state.query_service.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The state needed for displaying the dashboard page.
pub type DashboardState<T> = QueryState<T>;

/// The state needed to reload the transactions from the dataset.
#[derive(Debug, Clone)]
pub struct ReloadState<T> {
    /// The store to replace the transactions in.
    pub transaction_store: T,
    /// Where to download the dataset from.
    pub dataset_url: String,
    /// The client used to download the dataset.
    pub http_client: Client,
}

impl<T> FromRef<AppState<T>> for ReloadState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<T>) -> Self {
        Self {
            transaction_store: state.query_service.store().clone(),
            dataset_url: state.dataset_url.clone(),
            http_client: state.http_client.clone(),
        }
    }
}
