//! The calendar month filter shared by every query.

use std::{fmt::Display, str::FromStr};

use time::{Month, OffsetDateTime, UtcOffset};

use crate::Error;

/// All months in calendar order.
pub(crate) const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Selects transactions sold in a calendar month of any year.
///
/// The month of a transaction is taken from its sale date in UTC.
/// [MonthFilter::ALL] disables the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthFilter(Option<Month>);

impl MonthFilter {
    /// Matches every transaction.
    pub const ALL: MonthFilter = MonthFilter(None);

    /// Create a filter for a single month.
    pub fn month(month: Month) -> Self {
        Self(Some(month))
    }

    /// The selected month, or `None` if all months are selected.
    pub fn get(self) -> Option<Month> {
        self.0
    }

    /// The month number from 1 to 12, or 0 for all months.
    pub fn number(self) -> u8 {
        self.0.map(|month| month as u8).unwrap_or(0)
    }

    /// Whether a transaction sold at `date_of_sale` passes the filter.
    pub fn matches(self, date_of_sale: OffsetDateTime) -> bool {
        match self.0 {
            Some(month) => date_of_sale.to_offset(UtcOffset::UTC).month() == month,
            None => true,
        }
    }

    /// Parse an optional query parameter.
    ///
    /// A missing parameter is the same as an empty one: all months.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `raw` is not empty, "0", a number
    /// from 1 to 12, or an English month name (full or three letters).
    pub fn parse(raw: Option<&str>) -> Result<Self, Error> {
        match raw {
            Some(raw) => raw.parse(),
            None => Ok(Self::ALL),
        }
    }
}

impl FromStr for MonthFilter {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Ok(Self::ALL);
        }

        if trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return match trimmed.parse::<u8>() {
                Ok(0) => Ok(Self::ALL),
                Ok(number) => Month::try_from(number)
                    .map(Self::month)
                    .map_err(|_| Error::InvalidMonth(raw.to_owned())),
                Err(_) => Err(Error::InvalidMonth(raw.to_owned())),
            };
        }

        let lowercase = trimmed.to_lowercase();

        MONTHS
            .iter()
            .find(|month| {
                let name = month.to_string().to_lowercase();
                name == lowercase || (lowercase.len() == 3 && name.starts_with(&lowercase))
            })
            .map(|month| Self::month(*month))
            .ok_or_else(|| Error::InvalidMonth(raw.to_owned()))
    }
}

impl Display for MonthFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(month) => write!(f, "{month}"),
            None => write!(f, "All"),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::datetime};

    use crate::{Error, month::MonthFilter};

    #[test]
    fn empty_and_zero_select_all_months() {
        assert_eq!(MonthFilter::parse(None), Ok(MonthFilter::ALL));
        assert_eq!(MonthFilter::parse(Some("")), Ok(MonthFilter::ALL));
        assert_eq!(MonthFilter::parse(Some("0")), Ok(MonthFilter::ALL));
    }

    #[test]
    fn parses_month_numbers() {
        assert_eq!(
            MonthFilter::parse(Some("1")),
            Ok(MonthFilter::month(Month::January))
        );
        assert_eq!(
            MonthFilter::parse(Some("12")),
            Ok(MonthFilter::month(Month::December))
        );
        assert_eq!(
            MonthFilter::parse(Some("03")),
            Ok(MonthFilter::month(Month::March))
        );
    }

    #[test]
    fn parses_month_names() {
        assert_eq!(
            MonthFilter::parse(Some("March")),
            Ok(MonthFilter::month(Month::March))
        );
        assert_eq!(
            MonthFilter::parse(Some("sep")),
            Ok(MonthFilter::month(Month::September))
        );
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        for raw in ["13", "-1", "+3", "300", "march-ish", "1.5", "ma"] {
            assert_eq!(
                MonthFilter::parse(Some(raw)),
                Err(Error::InvalidMonth(raw.to_owned())),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn matches_month_in_utc() {
        let filter = MonthFilter::month(Month::March);

        assert!(filter.matches(datetime!(2022-03-15 10:00 UTC)));
        assert!(filter.matches(datetime!(2021-03-01 00:00 UTC)));
        assert!(!filter.matches(datetime!(2022-04-01 00:00 UTC)));
        // Local midnight on the 1st of April is still March in UTC.
        assert!(filter.matches(datetime!(2022-04-01 00:30 +05:30)));
    }

    #[test]
    fn all_matches_everything() {
        assert!(MonthFilter::ALL.matches(datetime!(2022-07-15 10:00 UTC)));
        assert_eq!(MonthFilter::ALL.number(), 0);
        assert_eq!(MonthFilter::month(Month::July).number(), 7);
    }
}
