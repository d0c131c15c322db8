use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{NewProduct, Product, Transaction},
    observable::{Observable, Subscription},
};

use super::{BatchOp, DocumentStore};

/// In-memory document store backing the demo binary and the test suite. It
/// implements the same contract a hosted backend provides: per-user live
/// snapshot feeds and an all-or-nothing `batch_write`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    products: Vec<Product>,
    transactions: Vec<Transaction>,
    product_feeds: HashMap<String, Observable<Vec<Product>>>,
    transaction_feeds: HashMap<String, Observable<Vec<Transaction>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Inner {
    fn products_of(&self, user_id: &str) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect()
    }

    fn transactions_of(&self, user_id: &str) -> Vec<Transaction> {
        let mut txns: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        txns.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        txns
    }

    /// Push fresh snapshots to every live feed after a committed mutation.
    fn notify(&self) {
        for (user_id, feed) in &self.product_feeds {
            feed.set(self.products_of(user_id));
        }
        for (user_id, feed) in &self.transaction_feeds {
            feed.set(self.transactions_of(user_id));
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn watch_products(&self, user_id: &str) -> Subscription<Vec<Product>> {
        let mut inner = self.lock();
        let snapshot = inner.products_of(user_id);
        inner
            .product_feeds
            .entry(user_id.to_string())
            .or_insert_with(|| Observable::new(snapshot))
            .subscribe()
    }

    fn watch_transactions(&self, user_id: &str) -> Subscription<Vec<Transaction>> {
        let mut inner = self.lock();
        let snapshot = inner.transactions_of(user_id);
        inner
            .transaction_feeds
            .entry(user_id.to_string())
            .or_insert_with(|| Observable::new(snapshot))
            .subscribe()
    }

    async fn add_product(&self, product: NewProduct) -> AppResult<String> {
        let id = Uuid::new_v4().to_string();
        let mut inner = self.lock();
        inner.products.push(Product {
            id: id.clone(),
            name: product.name,
            price: product.price,
            stock: product.stock,
            user_id: product.user_id,
        });
        inner.notify();
        Ok(id)
    }

    async fn set_product(&self, product: Product) -> AppResult<()> {
        let mut inner = self.lock();
        let slot = inner
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or(AppError::NotFound)?;
        *slot = product;
        inner.notify();
        Ok(())
    }

    async fn delete_product(&self, product_id: &str) -> AppResult<()> {
        let mut inner = self.lock();
        let before = inner.products.len();
        inner.products.retain(|p| p.id != product_id);
        if inner.products.len() == before {
            return Err(AppError::NotFound);
        }
        inner.notify();
        Ok(())
    }

    async fn batch_write(&self, ops: Vec<BatchOp>) -> AppResult<()> {
        let mut inner = self.lock();

        // Stage the whole batch against copies; nothing is visible until
        // every op has validated.
        let mut products = inner.products.clone();
        let mut transactions = inner.transactions.clone();

        for op in &ops {
            match op {
                BatchOp::AdjustStock { product_id, delta } => {
                    let product = products
                        .iter_mut()
                        .find(|p| p.id == *product_id)
                        .ok_or_else(|| {
                            AppError::Store(format!("product {product_id} not found"))
                        })?;
                    let stock = product.stock + delta;
                    if stock < 0 {
                        return Err(AppError::Store(format!(
                            "insufficient stock for product {product_id}"
                        )));
                    }
                    product.stock = stock;
                }
                BatchOp::PutTransaction(txn) => {
                    if txn.id.is_empty() {
                        return Err(AppError::Store("transaction id is empty".into()));
                    }
                    transactions.push(txn.clone());
                }
                BatchOp::DeleteTransaction { transaction_id } => {
                    let before = transactions.len();
                    transactions.retain(|t| t.id != *transaction_id);
                    if transactions.len() == before {
                        return Err(AppError::Store(format!(
                            "transaction {transaction_id} not found"
                        )));
                    }
                }
            }
        }

        inner.products = products;
        inner.transactions = transactions;
        inner.notify();
        Ok(())
    }
}
