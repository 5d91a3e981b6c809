use time::OffsetDateTime;

use super::Transaction;

/// Create an unsold transaction with placeholder text fields.
pub(crate) fn transaction(id: i64, price: f64, date_of_sale: OffsetDateTime) -> Transaction {
    Transaction {
        id,
        title: format!("Product {id}"),
        description: format!("Description of product {id}"),
        price,
        date_of_sale,
        category: "electronics".to_owned(),
        sold: false,
        image: format!("https://example.com/{id}.jpg"),
    }
}

/// Create a transaction with the given category and sold status.
pub(crate) fn categorised(
    id: i64,
    price: f64,
    date_of_sale: OffsetDateTime,
    category: &str,
    sold: bool,
) -> Transaction {
    Transaction {
        category: category.to_owned(),
        sold,
        ..transaction(id, price, date_of_sale)
    }
}
