use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{NewProduct, Product, Transaction},
    observable::Subscription,
};

pub mod memory;

pub use memory::MemoryStore;

/// One write inside an atomic batch. Checkout and cancellation are expressed
/// entirely in these three shapes.
#[derive(Debug, Clone)]
pub enum BatchOp {
    /// Add `delta` (may be negative) to a product's stock. Fails the batch if
    /// the product is missing or the resulting stock would be negative.
    AdjustStock { product_id: String, delta: i32 },

    /// Insert a transaction record.
    PutTransaction(Transaction),

    /// Remove a transaction record. Fails the batch if the id is unknown.
    DeleteTransaction { transaction_id: String },
}

/// The hosted document database boundary. Two collections are used: products
/// and transactions, both scoped to an owning user. Live queries push a full
/// snapshot on every committed change; `batch_write` is the sole atomicity
/// primitive, all-or-nothing by contract.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Live feed of the user's products.
    fn watch_products(&self, user_id: &str) -> Subscription<Vec<Product>>;

    /// Live feed of the user's transactions, newest first.
    fn watch_transactions(&self, user_id: &str) -> Subscription<Vec<Transaction>>;

    /// Create a product; the store mints and returns the id.
    async fn add_product(&self, product: NewProduct) -> AppResult<String>;

    /// Overwrite an existing product record.
    async fn set_product(&self, product: Product) -> AppResult<()>;

    async fn delete_product(&self, product_id: &str) -> AppResult<()>;

    /// Commit every op or none of them.
    async fn batch_write(&self, ops: Vec<BatchOp>) -> AppResult<()>;
}
