//! The JSON endpoints for the transactions, statistics and charts.
//!
//! Every failure is reported as a 500 response with an `{error, details}`
//! body, where `error` names the operation that failed.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    aggregation::{CategoryHistogram, PriceHistogram, Statistics},
    app_state::{QueryState, ReloadState},
    dataset::reload,
    query::{Combined, ListParams, ListQuery, MonthQuery, TransactionList},
    transaction::TransactionStore,
};

/// The body of a successful reload.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct InitializeResponse {
    /// A human readable confirmation.
    pub message: String,
    /// The number of transactions now stored.
    pub count: usize,
}

fn read_query<Q>(query: Result<Query<Q>, QueryRejection>) -> Result<Q, Error> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| Error::InvalidQuery(rejection.body_text()))
}

/// Get a page of transactions matching the search text and month.
pub async fn get_transactions<T>(
    State(state): State<QueryState<T>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<TransactionList>, Response>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    read_query(query)
        .and_then(|query| ListParams::from_query(&query, &state.pagination_config))
        .and_then(|params| state.query_service.list_transactions(&params))
        .map(Json)
        .map_err(|error| error.into_api_response("Failed to fetch transactions"))
}

/// Get the sales statistics for a month.
pub async fn get_statistics<T>(
    State(state): State<QueryState<T>>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<Statistics>, Response>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    read_query(query)
        .and_then(|query| query.parse())
        .and_then(|month| state.query_service.get_statistics(month))
        .map(Json)
        .map_err(|error| error.into_api_response("Failed to fetch statistics"))
}

/// Get the number of transactions in each price range for a month.
pub async fn get_bar_chart<T>(
    State(state): State<QueryState<T>>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<PriceHistogram>, Response>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    read_query(query)
        .and_then(|query| query.parse())
        .and_then(|month| state.query_service.get_price_histogram(month))
        .map(Json)
        .map_err(|error| error.into_api_response("Failed to fetch bar chart data"))
}

/// Get the number of transactions in each category for a month.
pub async fn get_pie_chart<T>(
    State(state): State<QueryState<T>>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<CategoryHistogram>, Response>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    read_query(query)
        .and_then(|query| query.parse())
        .and_then(|month| state.query_service.get_category_histogram(month))
        .map(Json)
        .map_err(|error| error.into_api_response("Failed to fetch pie chart data"))
}

/// Get the transactions, statistics and both charts in one response.
pub async fn get_combined<T>(
    State(state): State<QueryState<T>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Combined>, Response>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    const CONTEXT: &str = "Failed to fetch combined data";

    let params = read_query(query)
        .and_then(|query| ListParams::from_query(&query, &state.pagination_config))
        .map_err(|error| error.into_api_response(CONTEXT))?;

    state
        .query_service
        .get_combined(params)
        .await
        .map(Json)
        .map_err(|error| error.into_api_response(CONTEXT))
}

/// Replace every stored transaction with the configured dataset.
pub async fn initialize_database<T>(
    State(state): State<ReloadState<T>>,
) -> Result<Json<InitializeResponse>, Response>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    reload(state.transaction_store, &state.http_client, &state.dataset_url)
        .await
        .map(|count| {
            Json(InitializeResponse {
                message: "Database initialized successfully.".to_owned(),
                count,
            })
        })
        .map_err(|error| error.into_api_response("Failed to initialize database"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use time::macros::datetime;

    use crate::{
        ErrorBody,
        api::InitializeResponse,
        dataset::test_server::{DATASET, serve_dataset},
        endpoints,
        query::TransactionList,
        test_utils::test_server_with,
        transaction::{
            InMemoryTransactionStore, TransactionFilter, TransactionStore,
            test_utils::categorised,
        },
    };

    fn march_and_april_store() -> InMemoryTransactionStore {
        let march = datetime!(2022-03-10 00:00 UTC);
        let april = datetime!(2022-04-10 00:00 UTC);

        InMemoryTransactionStore::with_transactions(vec![
            categorised(1, 50.0, march, "men's clothing", true),
            categorised(2, 150.0, march, "electronics", true),
            categorised(3, 950.0, march, "electronics", true),
            categorised(4, 20.0, april, "jewelery", false),
        ])
    }

    #[tokio::test]
    async fn transactions_returns_page_and_pagination() {
        let server = test_server_with(march_and_april_store(), "http://localhost/unused");

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("perPage", "2")
            .add_query_param("page", "2")
            .await;

        response.assert_status_ok();
        let body: TransactionList = response.json();
        assert_eq!(body.transactions.len(), 2);
        assert_eq!(body.transactions[0].id, 3);
        assert_eq!(body.pagination.total_records, 4);
        assert_eq!(body.pagination.total_pages, 2);
        assert_eq!(body.pagination.current_page, 2);
    }

    #[tokio::test]
    async fn transactions_accepts_snake_case_page_size() {
        let server = test_server_with(march_and_april_store(), "http://localhost/unused");

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("per_page", "3")
            .await;

        response.assert_status_ok();
        let body: TransactionList = response.json();
        assert_eq!(body.transactions.len(), 3);
    }

    #[tokio::test]
    async fn transactions_search_without_matches_is_empty() {
        let server = test_server_with(march_and_april_store(), "http://localhost/unused");

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("search", "shirt")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["transactions"], json!([]));
        assert_eq!(body["pagination"]["totalRecords"], 0);
    }

    #[tokio::test]
    async fn invalid_page_is_an_error_body() {
        let server = test_server_with(march_and_april_store(), "http://localhost/unused");

        let response = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("page", "0")
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "Failed to fetch transactions");
        assert!(!body.details.is_empty());
    }

    #[tokio::test]
    async fn statistics_for_month() {
        let server = test_server_with(march_and_april_store(), "http://localhost/unused");

        let response = server
            .get(endpoints::STATISTICS_API)
            .add_query_param("month", "3")
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "totalSaleAmount": 1150.0,
            "soldItemsCount": 3,
            "unsoldItemsCount": 0
        }));
    }

    #[tokio::test]
    async fn statistics_rejects_unknown_month() {
        let server = test_server_with(march_and_april_store(), "http://localhost/unused");

        let response = server
            .get(endpoints::STATISTICS_API)
            .add_query_param("month", "13")
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "Failed to fetch statistics");
        assert!(body.details.contains("13"), "got {}", body.details);
    }

    #[tokio::test]
    async fn bar_chart_has_every_bucket() {
        let server = test_server_with(march_and_april_store(), "http://localhost/unused");

        let response = server
            .get(endpoints::BAR_CHART_API)
            .add_query_param("month", "March")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let buckets = body.as_object().unwrap();
        assert_eq!(buckets.len(), 10);
        assert_eq!(body["0-100"], 1);
        assert_eq!(body["101-200"], 1);
        assert_eq!(body["901-above"], 1);
        assert_eq!(body["201-300"], 0);
    }

    #[tokio::test]
    async fn pie_chart_counts_categories() {
        let server = test_server_with(march_and_april_store(), "http://localhost/unused");

        let response = server.get(endpoints::PIE_CHART_API).await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "electronics": 2,
            "jewelery": 1,
            "men's clothing": 1
        }));
    }

    #[tokio::test]
    async fn combined_has_every_section() {
        let server = test_server_with(march_and_april_store(), "http://localhost/unused");

        let response = server
            .get(endpoints::COMBINED_API)
            .add_query_param("month", "3")
            .add_query_param("search", "product 2")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["transactions"]["pagination"]["totalRecords"], 1);
        assert_eq!(body["statistics"]["soldItemsCount"], 3);
        assert_eq!(body["barChart"]["901-above"], 1);
        assert_eq!(body["pieChart"]["electronics"], 2);
    }

    #[tokio::test]
    async fn combined_reports_bad_parameters() {
        let server = test_server_with(march_and_april_store(), "http://localhost/unused");

        let response = server
            .get(endpoints::COMBINED_API)
            .add_query_param("perPage", "lots")
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "Failed to fetch combined data");
    }

    #[tokio::test]
    async fn initialize_database_reloads_store() {
        let dataset_url = serve_dataset(StatusCode::OK, DATASET).await;
        let store = march_and_april_store();
        let server = test_server_with(store.clone(), &dataset_url);

        let response = server.get(endpoints::INITIALIZE_DATABASE_API).await;

        response.assert_status_ok();
        let body: InitializeResponse = response.json();
        assert_eq!(body.count, 3);
        assert_eq!(store.count(&TransactionFilter::default()).unwrap(), 3);
    }

    #[tokio::test]
    async fn initialize_database_reports_fetch_failure() {
        let dataset_url = serve_dataset(StatusCode::NOT_FOUND, "missing").await;
        let store = march_and_april_store();
        let server = test_server_with(store.clone(), &dataset_url);

        let response = server.get(endpoints::INITIALIZE_DATABASE_API).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "Failed to initialize database");
        assert_eq!(store.count(&TransactionFilter::default()).unwrap(), 4);
    }
}
