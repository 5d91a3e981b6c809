//! The read operations behind the API and the dashboard.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    aggregation::{
        CategoryHistogram, PriceHistogram, Statistics, compute_category_histogram,
        compute_price_histogram, compute_statistics,
    },
    month::MonthFilter,
    pagination::{PaginationConfig, page_count},
    transaction::{PageWindow, Transaction, TransactionFilter, TransactionStore},
};

/// The raw query string parameters for listing transactions.
///
/// Fields are kept as strings so that malformed values are reported with the
/// API's error body rather than rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListQuery {
    /// Text to search for in transaction titles and descriptions.
    pub search: Option<String>,
    /// The 1-indexed page number.
    pub page: Option<String>,
    /// The number of transactions per page.
    #[serde(rename = "perPage", alias = "per_page")]
    pub per_page: Option<String>,
    /// The month filter, see [MonthFilter].
    pub month: Option<String>,
}

/// The raw query string parameter for the month scoped queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthQuery {
    /// The month filter, see [MonthFilter].
    pub month: Option<String>,
}

impl MonthQuery {
    /// Parse the month filter.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if the month is not recognised.
    pub fn parse(&self) -> Result<MonthFilter, Error> {
        MonthFilter::parse(self.month.as_deref())
    }
}

/// Validated parameters for listing transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// Text that must appear in the title or description. Empty matches all.
    pub search: String,
    /// The 1-indexed page number.
    pub page: u64,
    /// The number of transactions per page.
    pub per_page: u64,
    /// Only list transactions sold in this month.
    pub month: MonthFilter,
}

impl ListParams {
    /// Validate `query`, filling in missing values from `config`.
    ///
    /// # Errors
    /// Returns [Error::InvalidPagination] for a page or page size that is not
    /// a positive integer and [Error::InvalidMonth] for an unknown month.
    pub fn from_query(query: &ListQuery, config: &PaginationConfig) -> Result<Self, Error> {
        Ok(Self {
            search: query.search.as_deref().unwrap_or_default().to_owned(),
            page: config.page(query.page.as_deref())?,
            per_page: config.page_size(query.per_page.as_deref())?,
            month: MonthFilter::parse(query.month.as_deref())?,
        })
    }

    fn filter(&self) -> TransactionFilter {
        TransactionFilter {
            search: self.search.clone(),
            month: self.month,
        }
    }

    fn window(&self) -> PageWindow {
        PageWindow {
            offset: self.page.saturating_sub(1).saturating_mul(self.per_page),
            limit: self.per_page,
        }
    }
}

/// Where a page of transactions sits in the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    /// The number of transactions matching the filter across all pages.
    pub total_records: u64,
    /// The page that was requested.
    pub current_page: u64,
    /// The number of pages needed to show every matching transaction.
    pub total_pages: u64,
}

/// One page of transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionList {
    /// The transactions on the requested page.
    pub transactions: Vec<Transaction>,
    /// The totals for the filter.
    pub pagination: PageSummary,
}

/// The answers to every dashboard query in one response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Combined {
    /// The requested page of transactions.
    pub transactions: TransactionList,
    /// Sales figures for the month.
    pub statistics: Statistics,
    /// Transaction counts per price range for the month.
    pub bar_chart: PriceHistogram,
    /// Transaction counts per category for the month.
    pub pie_chart: CategoryHistogram,
}

/// Answers the dashboard's queries from a transaction store.
#[derive(Debug, Clone)]
pub struct QueryService<T> {
    store: T,
}

impl<T> QueryService<T>
where
    T: TransactionStore,
{
    /// Create a query service that reads from `store`.
    pub fn new(store: T) -> Self {
        Self { store }
    }

    /// The store the service reads from.
    pub fn store(&self) -> &T {
        &self.store
    }

    /// Get one page of the transactions matching the search text and month.
    ///
    /// A page past the last one is empty but still reports the totals.
    ///
    /// # Errors
    /// Returns an error if the store could not be read.
    pub fn list_transactions(&self, params: &ListParams) -> Result<TransactionList, Error> {
        let (transactions, total_records) = self
            .store
            .find_page(&params.filter(), params.window())
            .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?;

        Ok(TransactionList {
            transactions,
            pagination: PageSummary {
                total_records,
                current_page: params.page,
                total_pages: page_count(total_records, params.per_page),
            },
        })
    }

    /// Get the sales figures for `month`.
    ///
    /// # Errors
    /// Returns an error if the store could not be read.
    pub fn get_statistics(&self, month: MonthFilter) -> Result<Statistics, Error> {
        self.transactions_in(month)
            .map(|transactions| compute_statistics(&transactions))
    }

    /// Get the number of transactions per price range for `month`.
    ///
    /// # Errors
    /// Returns an error if the store could not be read.
    pub fn get_price_histogram(&self, month: MonthFilter) -> Result<PriceHistogram, Error> {
        self.transactions_in(month)
            .map(|transactions| compute_price_histogram(&transactions))
    }

    /// Get the number of transactions per category for `month`.
    ///
    /// # Errors
    /// Returns an error if the store could not be read.
    pub fn get_category_histogram(&self, month: MonthFilter) -> Result<CategoryHistogram, Error> {
        self.transactions_in(month)
            .map(|transactions| compute_category_histogram(&transactions))
    }

    fn transactions_in(&self, month: MonthFilter) -> Result<Vec<Transaction>, Error> {
        self.store
            .find(&TransactionFilter::by_month(month), None)
            .inspect_err(|error| {
                tracing::error!("could not get transactions for month {month}: {error}")
            })
    }
}

impl<T> QueryService<T>
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    /// Run the list, statistics and both histogram queries concurrently.
    ///
    /// The statistics and histograms use the month from `params` and ignore
    /// the search text.
    ///
    /// # Errors
    /// Returns the first error from any of the four queries.
    pub async fn get_combined(&self, params: ListParams) -> Result<Combined, Error> {
        let month = params.month;

        let list = {
            let service = self.clone();
            run_blocking(move || service.list_transactions(&params))
        };
        let statistics = {
            let service = self.clone();
            run_blocking(move || service.get_statistics(month))
        };
        let bar_chart = {
            let service = self.clone();
            run_blocking(move || service.get_price_histogram(month))
        };
        let pie_chart = {
            let service = self.clone();
            run_blocking(move || service.get_category_histogram(month))
        };

        let (transactions, statistics, bar_chart, pie_chart) =
            tokio::try_join!(list, statistics, bar_chart, pie_chart)?;

        Ok(Combined {
            transactions,
            statistics,
            bar_chart,
            pie_chart,
        })
    }
}

/// Run a synchronous store query on the blocking thread pool.
async fn run_blocking<F, R>(query: F) -> Result<R, Error>
where
    F: FnOnce() -> Result<R, Error> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(query).await?
}
