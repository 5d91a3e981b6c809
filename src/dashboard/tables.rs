//! Table views for dashboard data display.
//!
//! Provides the transactions table, its pagination bar and the statistics panel.

use maud::{Markup, html};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    aggregation::Statistics,
    html::{
        AVAILABLE_BADGE_STYLE, LINK_STYLE, SOLD_BADGE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, format_currency,
    },
    pagination::PaginationIndicator,
    transaction::Transaction,
};

/// The max number of graphemes to display in the description column before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 48;

/// Shorten long descriptions, returning the full text for use as a tooltip.
fn format_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();
        let truncated = truncated + "...";
        (truncated, Some(description))
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let (description, full_description) = format_description(&transaction.description);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.id) }
            td class=(TABLE_CELL_STYLE)
            {
                img
                    src=(transaction.image)
                    alt=(transaction.title)
                    loading="lazy"
                    class="w-12 h-12 object-contain";
            }
            td class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"}
            {
                (transaction.title)
            }
            td class=(TABLE_CELL_STYLE) title=[full_description] { (description) }
            td class={(TABLE_CELL_STYLE) " text-right whitespace-nowrap"}
            {
                (format_currency(transaction.price))
            }
            td class={(TABLE_CELL_STYLE) " whitespace-nowrap"}
            {
                time datetime=(transaction.date_of_sale.date()) { (transaction.date_of_sale.date()) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.category) }
            td class=(TABLE_CELL_STYLE)
            {
                @if transaction.sold {
                    span class=(SOLD_BADGE_STYLE) { "Sold" }
                } @else {
                    span class=(AVAILABLE_BADGE_STYLE) { "Available" }
                }
            }
        }
    }
}

/// Renders one page of transactions, or a placeholder row if the page is empty.
pub(super) fn transactions_table(transactions: &[Transaction]) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow w-full"
        {
            table
                id="transactions"
                class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Image" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Price" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row(transaction))
                    }

                    @if transactions.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="8" class={(TABLE_CELL_STYLE) " text-center"}
                            {
                                "No Results Found"
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the page links below the transactions table.
///
/// `page_url` maps a page number to the URL of that page.
pub(super) fn pagination_view(
    indicators: &[PaginationIndicator],
    current_page: u64,
    total_pages: u64,
    page_url: impl Fn(u64) -> String,
) -> Markup {
    let page_link = |page: u64, text: String, rel: Option<&str>| {
        let url = page_url(page);

        html! {
            a
                href=(url)
                hx-get=(url)
                hx-target="#dashboard-content"
                hx-push-url="true"
                rel=[rel]
                class=(LINK_STYLE)
            {
                (text)
            }
        }
    };

    html! {
        nav class="flex flex-col items-center gap-2 my-4" aria-label="Pagination"
        {
            ul class="flex flex-wrap items-center gap-4"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::Page(page) => {
                                (page_link(*page, page.to_string(), None))
                            }
                            PaginationIndicator::CurrPage(page) => {
                                p aria-current="page" class="font-bold" { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                "..."
                            }
                            PaginationIndicator::NextButton(page) => {
                                (page_link(*page, "Next".to_owned(), Some("next")))
                            }
                            PaginationIndicator::BackButton(page) => {
                                (page_link(*page, "Previous".to_owned(), Some("prev")))
                            }
                        }
                    }
                }
            }

            @if total_pages > 0 {
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Page " (current_page) " of " (total_pages)
                }
            }
        }
    }
}

/// Renders the sales figures for the selected month.
pub(super) fn statistics_view(statistics: &Statistics, month_label: &str) -> Markup {
    html! {
        div id="statistics" class="w-full max-w-md"
        {
            h3 class="text-xl font-semibold mb-4" { "Statistics - " (month_label) }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    tbody
                    {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { "Total sale" }
                            td class={(TABLE_CELL_STYLE) " text-right"}
                            {
                                (format_currency(statistics.total_sale_amount))
                            }
                        }
                        tr class=(TABLE_ROW_STYLE)
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { "Total sold items" }
                            td class={(TABLE_CELL_STYLE) " text-right"}
                            {
                                (statistics.sold_items_count)
                            }
                        }
                        tr class=(TABLE_ROW_STYLE)
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { "Total not sold items" }
                            td class={(TABLE_CELL_STYLE) " text-right"}
                            {
                                (statistics.unsold_items_count)
                            }
                        }
                    }
                }
            }
        }
    }
}
