//! Dashboard module
//!
//! Provides the page showing the transactions table, the monthly statistics
//! and the price range and category charts.

mod charts;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;
