//! Application router configuration.

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    AppState,
    api::{
        get_bar_chart, get_combined, get_pie_chart, get_statistics, get_transactions,
        initialize_database,
    },
    dashboard::get_dashboard_page,
    endpoints,
    not_found::get_404_not_found,
    transaction::TransactionStore,
};

/// Return a router with all the app's routes.
///
/// The JSON routes accept requests from any origin so that the API can back
/// a separately hosted frontend.
pub fn build_router<T>(state: AppState<T>) -> Router
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let api_routes = Router::new()
        .route(endpoints::TRANSACTIONS_API, get(get_transactions::<T>))
        .route(endpoints::STATISTICS_API, get(get_statistics::<T>))
        .route(endpoints::BAR_CHART_API, get(get_bar_chart::<T>))
        .route(endpoints::PIE_CHART_API, get(get_pie_chart::<T>))
        .route(endpoints::COMBINED_API, get(get_combined::<T>))
        .route(
            endpoints::INITIALIZE_DATABASE_API,
            get(initialize_database::<T>),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    Router::new()
        .route(endpoints::ROOT, get(get_dashboard_page::<T>))
        .merge(api_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}
