//! A dashboard for browsing product sale transactions.
//!
//! This library provides a JSON API for listing transactions and computing
//! monthly statistics and chart data, plus a server-rendered dashboard page
//! that displays the same data as a table and charts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod aggregation;
mod api;
mod app_state;
mod dashboard;
mod dataset;
mod db;
mod endpoints;
mod html;
mod logging;
mod month;
mod not_found;
mod pagination;
mod query;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use aggregation::{
    CategoryHistogram, PriceHistogram, Statistics, compute_category_histogram,
    compute_price_histogram, compute_statistics,
};
pub use api::InitializeResponse;
pub use app_state::AppState;
pub use dataset::{
    DEFAULT_DATASET_URL, DatasetSource, build_http_client, fetch_dataset, parse_dataset,
    read_dataset_file, reload,
};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use month::MonthFilter;
pub use pagination::PaginationConfig;
pub use query::{
    Combined, ListParams, ListQuery, MonthQuery, PageSummary, QueryService, TransactionList,
};
pub use routing::build_router;
pub use transaction::{
    InMemoryTransactionStore, PageWindow, RawTransaction, SQLiteTransactionStore, Transaction,
    TransactionFilter, TransactionStore,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The month query parameter was not empty, zero, a number from 1 to 12
    /// or the name of a month.
    #[error("invalid month \"{0}\", expected a number from 1 to 12 or the name of a month")]
    InvalidMonth(String),

    /// The page or page size query parameter was not a positive integer.
    #[error("invalid pagination parameter: {0}")]
    InvalidPagination(String),

    /// The query string could not be read, e.g. a parameter was repeated.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// A record in a dataset could not be stored.
    ///
    /// Datasets are validated as a whole before the store is modified, so
    /// this error leaves the existing transactions untouched.
    #[error("invalid transaction at index {index} (id {id}): {reason}")]
    InvalidTransaction {
        /// The position of the record in the dataset.
        index: usize,
        /// The ID given to the record in the dataset.
        id: i64,
        /// Why the record was rejected.
        reason: String,
    },

    /// The dataset could not be downloaded.
    #[error("could not fetch the dataset: {0}")]
    DatasetFetch(String),

    /// The dataset was downloaded or read but is not a JSON array of transactions.
    #[error("could not parse the dataset: {0}")]
    DatasetParse(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A background query task panicked or was cancelled.
    #[error("a query task failed: {0}")]
    TaskFailed(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Error::TaskFailed(value.to_string())
    }
}

/// The JSON body sent to API clients when a request fails.
#[derive(Debug, Serialize, serde::Deserialize, PartialEq)]
pub struct ErrorBody {
    /// A short description of the operation that failed.
    pub error: String,
    /// The underlying error message.
    pub details: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_api_response("Request failed")
    }
}

impl Error {
    /// Convert the error into a 500 response with a JSON [ErrorBody].
    ///
    /// `context` names the operation that failed, e.g. "Failed to fetch statistics".
    pub fn into_api_response(self, context: &str) -> Response {
        tracing::error!("{context}: {self}");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: context.to_owned(),
                details: self.to_string(),
            }),
        )
            .into_response()
    }
}
