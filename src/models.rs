use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned document id; empty until the record has been persisted.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub user_id: String,
}

/// A product to be created; the store mints the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub user_id: String,
}

/// A cart line. The product is snapshotted by value at add time, so later
/// catalog edits do not reach items already in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: i32,
}

/// One sold line inside a transaction. Name and price are snapshots taken at
/// checkout; the product id may dangle if the product is deleted later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub product_id: String,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub items: Vec<TransactionItem>,
    pub total_amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Derived sales report. Never persisted, recomputed on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportData {
    pub total_revenue: Decimal,
    pub transaction_count: usize,
    /// Up to five (product name, units sold) pairs, best seller first.
    pub best_selling_products: Vec<(String, i64)>,
}
