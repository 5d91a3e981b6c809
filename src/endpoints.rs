//! The API endpoints URIs.

/// The dashboard page.
pub const ROOT: &str = "/";
/// The route for listing a page of transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route for the monthly sales statistics.
pub const STATISTICS_API: &str = "/api/statistics";
/// The route for the price range histogram.
pub const BAR_CHART_API: &str = "/api/bar-chart";
/// The route for the category histogram.
pub const PIE_CHART_API: &str = "/api/pie-chart";
/// The route for the transactions, statistics and both charts in one response.
pub const COMBINED_API: &str = "/api/combined";
/// The route that reloads the transactions from the dataset.
pub const INITIALIZE_DATABASE_API: &str = "/api/initialize-database";
