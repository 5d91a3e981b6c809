//! Loads the product transaction dataset and replaces the stored transactions with it.

use std::{path::Path, time::Duration};

use reqwest::Client;

use crate::{
    Error,
    transaction::{RawTransaction, Transaction, TransactionStore},
};

/// Where the dataset is downloaded from unless configured otherwise.
pub const DEFAULT_DATASET_URL: &str =
    "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// How long to wait for the dataset download before giving up.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the HTTP client used to download datasets.
///
/// # Errors
/// Returns [Error::DatasetFetch] if the TLS backend could not be initialised.
pub fn build_http_client() -> Result<Client, Error> {
    Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|error| Error::DatasetFetch(error.to_string()))
}

/// A dataset location given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// Download the dataset over HTTP(S).
    Url(String),
    /// Read the dataset from a local JSON file.
    File(std::path::PathBuf),
}

impl DatasetSource {
    /// Treat `raw` as a URL if it has an HTTP scheme, otherwise as a file path.
    pub fn from_arg(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_owned())
        } else {
            Self::File(raw.into())
        }
    }

    /// Read and validate the dataset.
    ///
    /// # Errors
    /// Returns an error if the dataset could not be fetched, parsed or validated.
    pub async fn load(&self, client: &Client) -> Result<Vec<Transaction>, Error> {
        match self {
            Self::Url(url) => fetch_dataset(client, url).await,
            Self::File(path) => read_dataset_file(path),
        }
    }
}

/// Download the dataset at `url` and validate every record.
///
/// # Errors
/// Returns [Error::DatasetFetch] if the request fails or the server responds
/// with an error status, otherwise the errors of [parse_dataset].
pub async fn fetch_dataset(client: &Client, url: &str) -> Result<Vec<Transaction>, Error> {
    tracing::info!("Fetching dataset from {url}");

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|error| Error::DatasetFetch(error.to_string()))?;

    let body = response
        .text()
        .await
        .map_err(|error| Error::DatasetFetch(error.to_string()))?;

    parse_dataset(&body)
}

/// Read the dataset from a JSON file and validate every record.
///
/// # Errors
/// Returns [Error::DatasetFetch] if the file cannot be read, otherwise the
/// errors of [parse_dataset].
pub fn read_dataset_file(path: &Path) -> Result<Vec<Transaction>, Error> {
    tracing::info!("Reading dataset from {}", path.display());

    let body = std::fs::read_to_string(path)
        .map_err(|error| Error::DatasetFetch(format!("could not read {}: {error}", path.display())))?;

    parse_dataset(&body)
}

/// Parse a JSON array of transaction records.
///
/// Every record is validated before any is returned, so one bad record
/// rejects the whole dataset.
///
/// # Errors
/// Returns [Error::DatasetParse] if `json` is not an array of transaction
/// objects, or [Error::InvalidTransaction] for the first invalid record.
pub fn parse_dataset(json: &str) -> Result<Vec<Transaction>, Error> {
    let records: Vec<RawTransaction> =
        serde_json::from_str(json).map_err(|error| Error::DatasetParse(error.to_string()))?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.validate(index))
        .collect()
}

/// Download the dataset from `url` and replace the contents of `store` with it.
///
/// The store is left untouched if the download or validation fails.
///
/// # Errors
/// Returns any error from fetching the dataset or writing to the store.
pub async fn reload<T>(store: T, client: &Client, url: &str) -> Result<usize, Error>
where
    T: TransactionStore + Send + 'static,
{
    let transactions = fetch_dataset(client, url).await?;

    let count = tokio::task::spawn_blocking(move || store.replace_all(transactions)).await??;

    tracing::info!("Reloaded {count} transactions from {url}");

    Ok(count)
}


#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use time::macros::datetime;

    use crate::{
        Error,
        dataset::{
            DatasetSource, build_http_client, parse_dataset, reload,
            test_server::{DATASET, serve_dataset},
        },
        transaction::{
            InMemoryTransactionStore, TransactionFilter, TransactionStore, test_utils::transaction,
        },
    };

    #[test]
    fn parses_upstream_records() {
        let got = parse_dataset(DATASET).unwrap();

        assert_eq!(got.len(), 3);
        assert_eq!(got[0].date_of_sale, datetime!(2021-11-27 14:59:54 UTC));
        assert!(got[1].sold);
        assert!(!got[2].sold);
        assert_eq!(got[2].price, 1168.0);
    }

    #[test]
    fn rejects_non_array() {
        let got = parse_dataset(r#"{"id": 1}"#);

        assert!(matches!(got, Err(Error::DatasetParse(_))), "got {got:?}");
    }

    #[test]
    fn one_bad_record_rejects_dataset() {
        let json = r#"[
            {"id": 1, "price": 10, "dateOfSale": "2022-03-10T08:00:00Z"},
            {"id": 2, "price": -5, "dateOfSale": "2022-03-10T08:00:00Z"}
        ]"#;

        let got = parse_dataset(json);

        assert!(
            matches!(got, Err(Error::InvalidTransaction { index: 1, id: 2, .. })),
            "got {got:?}"
        );
    }

    #[test]
    fn source_from_arg_detects_urls() {
        assert_eq!(
            DatasetSource::from_arg("https://example.com/data.json"),
            DatasetSource::Url("https://example.com/data.json".to_owned())
        );
        assert_eq!(
            DatasetSource::from_arg("data/products.json"),
            DatasetSource::File("data/products.json".into())
        );
    }

    #[tokio::test]
    async fn reload_replaces_store_contents() {
        let url = serve_dataset(StatusCode::OK, DATASET).await;
        let store = InMemoryTransactionStore::with_transactions(vec![transaction(
            99,
            1.0,
            datetime!(2020-01-01 00:00 UTC),
        )]);
        let client = build_http_client().unwrap();

        let count = reload(store.clone(), &client, &url).await.unwrap();

        assert_eq!(count, 3);
        let ids: Vec<i64> = store
            .find(&TransactionFilter::default(), None)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_store_untouched() {
        let url = serve_dataset(StatusCode::INTERNAL_SERVER_ERROR, "oops").await;
        let store = InMemoryTransactionStore::with_transactions(vec![transaction(
            99,
            1.0,
            datetime!(2020-01-01 00:00 UTC),
        )]);
        let client = build_http_client().unwrap();

        let got = reload(store.clone(), &client, &url).await;

        assert!(matches!(got, Err(Error::DatasetFetch(_))), "got {got:?}");
        assert_eq!(store.count(&TransactionFilter::default()).unwrap(), 1);
    }

    #[tokio::test]
    async fn loads_from_file() {
        let path = std::env::temp_dir().join(format!("dataset-{}.json", std::process::id()));
        std::fs::write(&path, DATASET).unwrap();
        let client = build_http_client().unwrap();

        let got = DatasetSource::File(path.clone()).load(&client).await;
        std::fs::remove_file(&path).unwrap();

        assert_eq!(got.unwrap().len(), 3);
    }
}
