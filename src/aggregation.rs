//! Summaries of transaction sets for the statistics panel and the charts.
//!
//! These are pure functions over slices of transactions. Filtering by month
//! happens in the store before the transactions reach this module.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, ser::SerializeMap};

use crate::transaction::Transaction;

/// The width of each closed price bucket, e.g. `101-200`.
const BUCKET_WIDTH: u32 = 100;

/// The number of closed price buckets before the catch-all bucket.
const CLOSED_BUCKET_COUNT: u32 = 9;

/// Prices above this value go into the catch-all bucket.
const CATCH_ALL_THRESHOLD: f64 = (BUCKET_WIDTH * CLOSED_BUCKET_COUNT) as f64;

/// The label of the bucket counting prices above [CATCH_ALL_THRESHOLD].
pub const CATCH_ALL_LABEL: &str = "901-above";

/// Sales figures for a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// The sum of the prices of the sold transactions.
    pub total_sale_amount: f64,
    /// The number of sold transactions.
    pub sold_items_count: u64,
    /// The number of transactions that have not been sold.
    pub unsold_items_count: u64,
}

/// Compute the sales figures for `transactions`.
pub fn compute_statistics(transactions: &[Transaction]) -> Statistics {
    let (total_sale_amount, sold_items_count) = transactions
        .iter()
        .filter(|transaction| transaction.sold)
        .fold((0.0, 0), |(total, count), transaction| {
            (total + transaction.price, count + 1)
        });

    Statistics {
        total_sale_amount,
        sold_items_count,
        unsold_items_count: transactions.len() as u64 - sold_items_count,
    }
}

/// The number of transactions in each price range.
///
/// Always holds every bucket in ascending order, from `0-100` up to `801-900`,
/// followed by `901-above`. Serialises as a JSON object in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceHistogram {
    buckets: Vec<(String, u64)>,
}

impl PriceHistogram {
    fn empty() -> Self {
        let mut buckets: Vec<(String, u64)> = (0..CLOSED_BUCKET_COUNT)
            .map(|index| (bucket_label(index), 0))
            .collect();
        buckets.push((CATCH_ALL_LABEL.to_owned(), 0));

        Self { buckets }
    }

    /// The count for the bucket with `label`, e.g. "101-200".
    pub fn get(&self, label: &str) -> Option<u64> {
        self.buckets
            .iter()
            .find(|(bucket, _)| bucket == label)
            .map(|(_, count)| *count)
    }

    /// The bucket labels and counts in ascending price order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.buckets
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
    }
}

impl Serialize for PriceHistogram {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;

        for (label, count) in &self.buckets {
            map.serialize_entry(label, count)?;
        }

        map.end()
    }
}

fn bucket_label(index: u32) -> String {
    let max = (index + 1) * BUCKET_WIDTH;
    let min = if index == 0 { 0 } else { max - BUCKET_WIDTH + 1 };

    format!("{min}-{max}")
}

/// The index of the bucket `price` falls in.
///
/// A closed bucket `[min, max]` takes every price from `min` up to the next
/// bucket's `min`, so 100.5 counts towards `0-100`.
fn bucket_index(price: f64) -> usize {
    if price > CATCH_ALL_THRESHOLD {
        return CLOSED_BUCKET_COUNT as usize;
    }

    // Bucket n starts at n * 100 + 1, except the first which starts at 0.
    let index = ((price - 1.0) / BUCKET_WIDTH as f64).floor();

    index.clamp(0.0, (CLOSED_BUCKET_COUNT - 1) as f64) as usize
}

/// Count the transactions in each price range.
pub fn compute_price_histogram(transactions: &[Transaction]) -> PriceHistogram {
    let mut histogram = PriceHistogram::empty();

    for transaction in transactions {
        histogram.buckets[bucket_index(transaction.price)].1 += 1;
    }

    histogram
}

/// The number of transactions in each category, sorted by category name.
pub type CategoryHistogram = BTreeMap<String, u64>;

/// Count the transactions in each category.
///
/// Only categories that appear in `transactions` are included.
pub fn compute_category_histogram(transactions: &[Transaction]) -> CategoryHistogram {
    let mut histogram = CategoryHistogram::new();

    for transaction in transactions {
        *histogram.entry(transaction.category.clone()).or_insert(0) += 1;
    }

    histogram
}


#[cfg(test)]
mod price_histogram_tests {
    use time::macros::datetime;

    use crate::{
        aggregation::{CATCH_ALL_LABEL, compute_price_histogram},
        transaction::{Transaction, test_utils::transaction},
    };

    fn priced(prices: &[f64]) -> Vec<Transaction> {
        prices
            .iter()
            .enumerate()
            .map(|(id, price)| transaction(id as i64, *price, datetime!(2022-03-10 00:00 UTC)))
            .collect()
    }

    #[test]
    fn empty_input_has_every_bucket_zeroed() {
        let histogram = compute_price_histogram(&[]);

        let labels: Vec<&str> = histogram.iter().map(|(label, _)| label).collect();
        assert_eq!(
            labels,
            vec![
                "0-100", "101-200", "201-300", "301-400", "401-500", "501-600", "601-700",
                "701-800", "801-900", "901-above"
            ]
        );
        assert!(histogram.iter().all(|(_, count)| count == 0));
        assert_eq!(histogram.iter().count(), 10);
    }

    #[test]
    fn boundaries_fall_in_one_bucket() {
        let histogram = compute_price_histogram(&priced(&[0.0, 100.0, 101.0, 900.0, 901.0]));

        assert_eq!(histogram.get("0-100"), Some(2));
        assert_eq!(histogram.get("101-200"), Some(1));
        assert_eq!(histogram.get("801-900"), Some(1));
        assert_eq!(histogram.get(CATCH_ALL_LABEL), Some(1));
    }

    #[test]
    fn fractional_gap_prices_go_to_lower_bucket() {
        let histogram = compute_price_histogram(&priced(&[100.5, 200.99, 900.5]));

        assert_eq!(histogram.get("0-100"), Some(1));
        assert_eq!(histogram.get("101-200"), Some(1));
        assert_eq!(histogram.get("801-900"), Some(0));
        assert_eq!(histogram.get(CATCH_ALL_LABEL), Some(1));
    }

    #[test]
    fn counts_sum_to_record_count() {
        let prices: Vec<f64> = (0..250).map(|i| i as f64 * 4.37).collect();
        let histogram = compute_price_histogram(&priced(&prices));

        let total: u64 = histogram.iter().map(|(_, count)| count).sum();

        assert_eq!(total, prices.len() as u64);
    }

    #[test]
    fn mixed_prices_scenario() {
        let histogram = compute_price_histogram(&priced(&[50.0, 150.0, 950.0]));

        for (label, count) in histogram.iter() {
            let want = match label {
                "0-100" | "101-200" | "901-above" => 1,
                _ => 0,
            };
            assert_eq!(count, want, "unexpected count for bucket {label}");
        }
    }

    #[test]
    fn serializes_as_ordered_object() {
        let histogram = compute_price_histogram(&priced(&[950.0]));

        let json = serde_json::to_string(&histogram).unwrap();

        assert!(
            json.starts_with(r#"{"0-100":0,"101-200":0,"#),
            "got {json}"
        );
        assert!(json.ends_with(r#""801-900":0,"901-above":1}"#), "got {json}");
    }
}
