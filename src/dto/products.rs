use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Raw add/edit product form input. Price and stock arrive as text and are
/// validated before anything is sent to the store.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub stock: String,
}

/// Form fields after validation.
#[derive(Debug, Clone)]
pub struct ValidProduct {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

impl ProductForm {
    pub fn validate(&self) -> AppResult<ValidProduct> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("product name must not be empty".into()));
        }
        let price: Decimal = self
            .price
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("price must be a number".into()))?;
        if price < Decimal::ZERO {
            return Err(AppError::Validation("price must not be negative".into()));
        }
        let stock: i32 = self
            .stock
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("stock must be a whole number".into()))?;
        if stock < 0 {
            return Err(AppError::Validation("stock must not be negative".into()));
        }
        Ok(ValidProduct {
            name: name.to_string(),
            price,
            stock,
        })
    }
}
