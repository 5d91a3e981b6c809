//! This modules defines the common functionality for paging data.

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum transactions to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_pages: 5,
        }
    }
}

impl PaginationConfig {
    /// Parse the 1-indexed page number from a query parameter.
    ///
    /// # Errors
    /// Returns [Error::InvalidPagination] if `raw` is not a positive integer.
    pub fn page(&self, raw: Option<&str>) -> Result<u64, Error> {
        parse_positive("page", raw, self.default_page)
    }

    /// Parse the number of transactions per page from a query parameter.
    ///
    /// # Errors
    /// Returns [Error::InvalidPagination] if `raw` is not a positive integer.
    pub fn page_size(&self, raw: Option<&str>) -> Result<u64, Error> {
        parse_positive("perPage", raw, self.default_page_size)
    }
}

/// Parse a positive integer, using `default` when `raw` is missing or blank.
fn parse_positive(name: &str, raw: Option<&str>, default: u64) -> Result<u64, Error> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(default);
    };

    match raw.parse::<u64>() {
        Ok(0) => Err(Error::InvalidPagination(format!(
            "{name} must be at least 1, got 0"
        ))),
        Ok(value) => Ok(value),
        Err(_) => Err(Error::InvalidPagination(format!(
            "{name} must be a positive integer, got \"{raw}\""
        ))),
    }
}

/// The number of pages needed to show `total_records` at `page_size` per page.
pub fn page_count(total_records: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }

    total_records.div_ceil(page_size)
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// Lay out the page links for the pagination bar.
///
/// At most `max_pages` consecutive pages are shown around `curr_page`, with
/// links to the first and last page when they fall outside that window.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let (first, last) = if page_count <= max_pages {
        (1, page_count)
    } else {
        let first = curr_page
            .saturating_sub(max_pages / 2)
            .clamp(1, page_count - max_pages + 1);
        (first, first + max_pages - 1)
    };

    let mut indicators = Vec::new();

    if curr_page > 1 && page_count > 0 {
        indicators.push(PaginationIndicator::BackButton(
            (curr_page - 1).min(page_count),
        ));
    }

    if first > 1 {
        indicators.push(PaginationIndicator::Page(1));

        if first > 2 {
            indicators.push(PaginationIndicator::Ellipsis);
        }
    }

    indicators.extend((first..=last).map(|page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    }));

    if last < page_count {
        if last + 1 < page_count {
            indicators.push(PaginationIndicator::Ellipsis);
        }

        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}
