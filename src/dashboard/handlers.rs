//! Dashboard HTTP handlers and view rendering.
//!
//! The dashboard is one page. The month select and search box re-request
//! the page with htmx, which then only receives the content below the
//! controls.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;
use maud::{Markup, html};
use time::Month;

use crate::{
    Error,
    app_state::DashboardState,
    dashboard::{
        charts::{DashboardChart, category_chart, charts_script, charts_view, price_range_chart},
        tables::{pagination_view, statistics_view, transactions_table},
    },
    endpoints,
    html::{
        ECHARTS_URL, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, PAGE_CONTAINER_STYLE,
        base, link,
    },
    month::{MONTHS, MonthFilter},
    not_found::get_500_error_response,
    pagination::{PaginationConfig, create_pagination_indicators},
    query::{Combined, ListParams, ListQuery},
    transaction::TransactionStore,
};

/// The month shown when the page is first opened.
const DEFAULT_MONTH: Month = Month::March;

/// Display the dashboard for the month and search text in the query string.
///
/// htmx requests get only the dashboard content so that the controls keep
/// their focus and value.
pub async fn get_dashboard_page<T>(
    State(state): State<DashboardState<T>>,
    HxRequest(is_htmx_request): HxRequest,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let params = match query
        .map_err(|rejection| Error::InvalidQuery(rejection.body_text()))
        .and_then(|Query(query)| dashboard_params(&query, &state.pagination_config))
    {
        Ok(params) => params,
        Err(error) => {
            tracing::warn!("invalid dashboard query: {error}");
            return get_500_error_response(&error.to_string());
        }
    };

    let combined = match state.query_service.get_combined(params.clone()).await {
        Ok(combined) => combined,
        Err(error) => {
            tracing::error!("could not load dashboard data: {error}");
            return get_500_error_response(&error.to_string());
        }
    };

    let content = dashboard_content(&params, &combined, state.pagination_config.max_pages);

    if is_htmx_request {
        content.into_response()
    } else {
        dashboard_view(&params, &content).into_response()
    }
}

/// Validate the dashboard query, defaulting to [DEFAULT_MONTH] rather than
/// all months when no month is given.
fn dashboard_params(query: &ListQuery, config: &PaginationConfig) -> Result<ListParams, Error> {
    let mut params = ListParams::from_query(query, config)?;

    if query.month.is_none() {
        params.month = MonthFilter::month(DEFAULT_MONTH);
    }

    Ok(params)
}

/// The label for the selected month, e.g. "March" or "All Months".
fn month_label(month: MonthFilter) -> String {
    match month.get() {
        Some(month) => month.to_string(),
        None => "All Months".to_owned(),
    }
}

/// The URL of `page` with the other parameters unchanged.
fn page_url(params: &ListParams, page: u64) -> String {
    let query = ListQuery {
        search: (!params.search.is_empty()).then(|| params.search.clone()),
        page: Some(page.to_string()),
        per_page: Some(params.per_page.to_string()),
        month: Some(params.month.number().to_string()),
    };

    match serde_urlencoded::to_string(&query) {
        Ok(query_string) => format!("{}?{query_string}", endpoints::ROOT),
        Err(error) => {
            tracing::error!("could not encode page URL: {error}");
            endpoints::ROOT.to_owned()
        }
    }
}

fn build_dashboard_charts(combined: &Combined, month_label: &str) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "price-range-chart",
            options: price_range_chart(&combined.bar_chart, month_label).to_string(),
        },
        DashboardChart {
            id: "category-chart",
            options: category_chart(&combined.pie_chart, month_label).to_string(),
        },
    ]
}

/// Renders everything below the dashboard controls.
fn dashboard_content(params: &ListParams, combined: &Combined, max_pages: u64) -> Markup {
    let month_label = month_label(params.month);
    let pagination = &combined.transactions.pagination;
    let indicators =
        create_pagination_indicators(pagination.current_page, pagination.total_pages, max_pages);
    let charts = build_dashboard_charts(combined, &month_label);

    html!(
        (transactions_table(&combined.transactions.transactions))

        (pagination_view(
            &indicators,
            pagination.current_page,
            pagination.total_pages,
            |page| page_url(params, page),
        ))

        div class="flex flex-col lg:flex-row gap-8 w-full my-8"
        {
            @if params.month == MonthFilter::ALL {
                p id="statistics-prompt" class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Select a Specific Month to see the statistics for that month."
                }
            } @else {
                (statistics_view(&combined.statistics, &month_label))
            }
        }

        (charts_view(&charts))
        (charts_script(&charts))
    )
}

/// Renders the full dashboard page with the month and search controls.
fn dashboard_view(params: &ListParams, content: &Markup) -> Markup {
    let selected_month = params.month.number();
    let api_link = link(endpoints::COMBINED_API, "JSON API");

    let page = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-3xl font-bold mb-6" { "Transaction Dashboard" }

            form
                action=(endpoints::ROOT)
                method="get"
                hx-get=(endpoints::ROOT)
                hx-target="#dashboard-content"
                hx-push-url="true"
                hx-trigger="change, submit, keyup changed delay:300ms from:#search"
                class="flex flex-col md:flex-row gap-4 w-full max-w-screen-xl mb-6"
            {
                div class="grow"
                {
                    label for="search" class=(FORM_LABEL_STYLE) { "Search transaction" }
                    input
                        type="search"
                        id="search"
                        name="search"
                        value=(params.search)
                        placeholder="Search by title or description"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                    select id="month" name="month" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="0" selected[selected_month == 0] { "All" }

                        @for month in MONTHS {
                            option
                                value=(month as u8)
                                selected[selected_month == month as u8]
                            {
                                (month)
                            }
                        }
                    }
                }

                input type="hidden" name="perPage" value=(params.per_page);
            }

            div
                id="dashboard-content"
                class="flex flex-col items-center w-full max-w-screen-xl"
            {
                (content)
            }

            p class="text-sm text-gray-600 dark:text-gray-400 mt-8"
            {
                "The same data is available from the " (api_link) "."
            }
        }
    );

    let scripts = [HeadElement::ScriptLink(ECHARTS_URL.to_owned())];

    base("Dashboard", &scripts, &page)
}
