use rust_decimal::Decimal;

use crate::{
    models::{CartItem, Product},
    observable::{Observable, Subscription},
};

/// The in-progress, unsubmitted selection of products. Single-writer,
/// in-memory; every mutation republishes the line items and the derived
/// total.
#[derive(Debug, Clone, Default)]
pub struct CartService {
    items: Observable<Vec<CartItem>>,
    total: Observable<Decimal>,
}

impl CartService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.items.get()
    }

    pub fn watch_items(&self) -> Subscription<Vec<CartItem>> {
        self.items.subscribe()
    }

    /// Sum of price x quantity over all lines, kept current across mutations.
    pub fn total_amount(&self) -> Decimal {
        self.total.get()
    }

    pub fn watch_total(&self) -> Subscription<Decimal> {
        self.total.subscribe()
    }

    /// Add one unit of `product`. An existing line grows by one only while
    /// below the stock passed in here; a new line is only opened when stock
    /// is positive. Hitting the ceiling is a silent no-op, not an error.
    pub fn add_to_cart(&self, product: &Product) {
        self.items.update(|items| {
            if let Some(item) = items.iter_mut().find(|i| i.product.id == product.id) {
                if item.quantity < product.stock {
                    item.quantity += 1;
                }
            } else if product.stock > 0 {
                items.push(CartItem {
                    product: product.clone(),
                    quantity: 1,
                });
            }
        });
        self.recompute_total();
    }

    pub fn remove_from_cart(&self, product_id: &str) {
        self.items
            .update(|items| items.retain(|i| i.product.id != product_id));
        self.recompute_total();
    }

    /// Grow a line by one, capped at the stock snapshotted into the line.
    pub fn increase_quantity(&self, product_id: &str) {
        self.items.update(|items| {
            if let Some(item) = items.iter_mut().find(|i| i.product.id == product_id) {
                if item.quantity < item.product.stock {
                    item.quantity += 1;
                }
            }
        });
        self.recompute_total();
    }

    /// Shrink a line by one; a line at quantity 1 is removed outright so no
    /// zero-quantity line ever exists.
    pub fn decrease_quantity(&self, product_id: &str) {
        self.items.update(|items| {
            let Some(pos) = items.iter().position(|i| i.product.id == product_id) else {
                return;
            };
            if items[pos].quantity > 1 {
                items[pos].quantity -= 1;
            } else {
                items.remove(pos);
            }
        });
        self.recompute_total();
    }

    pub fn clear(&self) {
        self.items.set(Vec::new());
        self.recompute_total();
    }

    fn recompute_total(&self) {
        let total = self
            .items
            .get()
            .iter()
            .map(|i| i.product.price * Decimal::from(i.quantity))
            .sum();
        self.total.set(total);
    }
}
