//! Defines the transaction model, the raw dataset record it is validated from,
//! and the filter used to query stores.

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

use crate::{Error, month::MonthFilter};

// ============================================================================
// MODELS
// ============================================================================

/// A product sale, i.e. an item that was listed and possibly sold.
///
/// Transactions are only created by validating a [RawTransaction] from a
/// dataset, which guarantees a finite, non-negative price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID given to the transaction by the dataset.
    ///
    /// IDs are not guaranteed to be unique.
    pub id: i64,
    /// The product name.
    pub title: String,
    /// A longer description of the product.
    pub description: String,
    /// The listed price of the product.
    pub price: f64,
    /// When the product was sold, or listed if it has not sold.
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_sale: OffsetDateTime,
    /// A short label such as "electronics".
    pub category: String,
    /// Whether the product has been sold.
    pub sold: bool,
    /// A URL to an image of the product.
    pub image: String,
}

/// A transaction record as it appears in a dataset, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct RawTransaction {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<f64>,
    /// An RFC 3339 date-time with any offset.
    pub date_of_sale: Option<String>,
    #[serde(default)]
    pub category: String,
    /// Missing and `null` values are read as unsold.
    pub sold: Option<bool>,
    #[serde(default)]
    pub image: String,
}

impl RawTransaction {
    /// Validate the record found at `index` in a dataset.
    ///
    /// The sale date is normalised to UTC.
    ///
    /// # Errors
    /// Returns [Error::InvalidTransaction] if the price is missing, negative
    /// or not finite, or if the sale date is missing or not an RFC 3339 date-time.
    pub fn validate(self, index: usize) -> Result<Transaction, Error> {
        let invalid = |reason: String| Error::InvalidTransaction {
            index,
            id: self.id,
            reason,
        };

        let price = match self.price {
            Some(price) if price.is_finite() && price >= 0.0 => price,
            Some(price) => return Err(invalid(format!("price {price} is not a non-negative number"))),
            None => return Err(invalid("price is missing".to_owned())),
        };

        let date_of_sale = match &self.date_of_sale {
            Some(raw_date) => OffsetDateTime::parse(raw_date, &Rfc3339)
                .map_err(|error| invalid(format!("invalid date of sale \"{raw_date}\": {error}")))?
                .to_offset(UtcOffset::UTC),
            None => return Err(invalid("date of sale is missing".to_owned())),
        };

        Ok(Transaction {
            id: self.id,
            title: self.title,
            description: self.description,
            price,
            date_of_sale,
            category: self.category,
            sold: self.sold.unwrap_or(false),
            image: self.image,
        })
    }
}

/// Selects which transactions a store query returns.
///
/// The default filter matches every transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Text that must appear in the title or the description, ignoring ASCII
    /// case. An empty string matches everything.
    pub search: String,
    /// The month the transaction must have been sold in.
    pub month: MonthFilter,
}

impl TransactionFilter {
    /// A filter that only selects transactions by month.
    pub fn by_month(month: MonthFilter) -> Self {
        Self {
            search: String::new(),
            month,
        }
    }

    /// Whether `transaction` passes the filter.
    ///
    /// Stores that cannot push the filter down to a query language use this
    /// to filter in memory.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.month.matches(transaction.date_of_sale)
            && (self.search.is_empty()
                || contains_ignore_ascii_case(&transaction.title, &self.search)
                || contains_ignore_ascii_case(&transaction.description, &self.search))
    }
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// A slice of a filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// The number of matching transactions to skip.
    pub offset: u64,
    /// The maximum number of transactions to return.
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::datetime};

    use crate::{
        Error,
        month::MonthFilter,
        transaction::{RawTransaction, TransactionFilter, test_utils::transaction},
    };

    fn raw(price: Option<f64>, date_of_sale: Option<&str>) -> RawTransaction {
        RawTransaction {
            id: 7,
            title: "Backpack".to_owned(),
            price,
            date_of_sale: date_of_sale.map(str::to_owned),
            ..Default::default()
        }
    }

    #[test]
    fn validate_normalises_date_to_utc() {
        let transaction = raw(Some(10.0), Some("2021-11-27T20:29:54+05:30"))
            .validate(0)
            .unwrap();

        assert_eq!(transaction.date_of_sale, datetime!(2021-11-27 14:59:54 UTC));
        assert_eq!(transaction.date_of_sale.offset(), time::UtcOffset::UTC);
    }

    #[test]
    fn validate_reads_missing_sold_as_unsold() {
        let transaction = raw(Some(10.0), Some("2021-11-27T20:29:54Z"))
            .validate(0)
            .unwrap();

        assert!(!transaction.sold);
    }

    #[test]
    fn validate_rejects_negative_price() {
        let result = raw(Some(-0.01), Some("2021-11-27T20:29:54Z")).validate(3);

        assert!(
            matches!(result, Err(Error::InvalidTransaction { index: 3, id: 7, .. })),
            "got {result:?}"
        );
    }

    #[test]
    fn validate_rejects_missing_price_and_date() {
        assert!(raw(None, Some("2021-11-27T20:29:54Z")).validate(0).is_err());
        assert!(raw(Some(1.0), None).validate(0).is_err());
        assert!(raw(Some(f64::NAN), Some("2021-11-27T20:29:54Z")).validate(0).is_err());
    }

    #[test]
    fn validate_rejects_invalid_date() {
        let result = raw(Some(1.0), Some("not a date")).validate(0);

        assert!(matches!(result, Err(Error::InvalidTransaction { .. })));
    }

    #[test]
    fn dataset_json_deserializes_with_null_sold() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 329.85,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://example.com/1.jpg",
            "sold": null,
            "dateOfSale": "2021-11-27T20:29:54+05:30"
        }"#;

        let raw: RawTransaction = serde_json::from_str(json).unwrap();
        let transaction = raw.validate(0).unwrap();

        assert_eq!(transaction.id, 1);
        assert_eq!(transaction.category, "men's clothing");
        assert!(!transaction.sold);
    }

    #[test]
    fn transaction_serializes_with_camel_case_names() {
        let json = serde_json::to_value(transaction(1, 12.5, datetime!(2022-03-01 00:00 UTC))).unwrap();

        assert_eq!(json["dateOfSale"], "2022-03-01T00:00:00Z");
        assert_eq!(json["price"], 12.5);
        assert!(json.get("date_of_sale").is_none());
    }

    #[test]
    fn filter_matches_title_or_description_ignoring_case() {
        let mut item = transaction(1, 10.0, datetime!(2022-03-01 00:00 UTC));
        item.title = "Mens Casual Premium Slim Fit T-Shirts".to_owned();
        item.description = "Slim-fitting style".to_owned();

        let by_title = TransactionFilter {
            search: "t-SHIRT".to_owned(),
            ..Default::default()
        };
        let by_description = TransactionFilter {
            search: "FITTING".to_owned(),
            ..Default::default()
        };
        let no_match = TransactionFilter {
            search: "jacket".to_owned(),
            ..Default::default()
        };

        assert!(by_title.matches(&item));
        assert!(by_description.matches(&item));
        assert!(!no_match.matches(&item));
    }

    #[test]
    fn filter_combines_search_and_month() {
        let mut item = transaction(1, 10.0, datetime!(2022-03-01 00:00 UTC));
        item.title = "Jacket".to_owned();

        let filter = TransactionFilter {
            search: "jack".to_owned(),
            month: MonthFilter::month(Month::April),
        };

        assert!(!filter.matches(&item));
        assert!(TransactionFilter::by_month(MonthFilter::month(Month::March)).matches(&item));
    }
}
