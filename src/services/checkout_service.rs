use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{CartItem, Transaction, TransactionItem},
    services::auth_service::require_user,
    state::AppState,
    store::BatchOp,
};

/// Convert a cart snapshot into one atomic commit: a stock decrement per
/// line plus exactly one transaction record. Either everything lands or
/// nothing does; the store's batch write is the only atomicity mechanism.
/// Clearing the cart afterwards is the caller's job.
pub async fn checkout(
    state: &AppState,
    items: &[CartItem],
    total_amount: Decimal,
) -> AppResult<Transaction> {
    let user_id = require_user(state.identity.as_ref())?;

    if items.is_empty() {
        return Err(AppError::Validation("cart is empty".into()));
    }

    let mut ops: Vec<BatchOp> = items
        .iter()
        .map(|item| BatchOp::AdjustStock {
            product_id: item.product.id.clone(),
            delta: -item.quantity,
        })
        .collect();

    let transaction = Transaction {
        id: Uuid::new_v4().to_string(),
        user_id,
        items: items
            .iter()
            .map(|item| TransactionItem {
                product_id: item.product.id.clone(),
                product_name: item.product.name.clone(),
                price: item.product.price,
                quantity: item.quantity,
            })
            .collect(),
        total_amount,
        timestamp: Utc::now(),
    };
    ops.push(BatchOp::PutTransaction(transaction.clone()));

    state.store.batch_write(ops).await?;

    tracing::info!(
        transaction_id = %transaction.id,
        lines = transaction.items.len(),
        total = %transaction.total_amount,
        "checkout committed"
    );

    Ok(transaction)
}

/// The exact inverse of [`checkout`]: restore every line's stock and delete
/// the transaction record, as one atomic batch. If any referenced product no
/// longer exists the whole cancellation fails and the transaction stays.
pub async fn cancel_transaction(state: &AppState, transaction: &Transaction) -> AppResult<()> {
    let mut ops: Vec<BatchOp> = transaction
        .items
        .iter()
        .map(|item| BatchOp::AdjustStock {
            product_id: item.product_id.clone(),
            delta: item.quantity,
        })
        .collect();
    ops.push(BatchOp::DeleteTransaction {
        transaction_id: transaction.id.clone(),
    });

    state.store.batch_write(ops).await?;

    tracing::info!(transaction_id = %transaction.id, "transaction cancelled, stock restored");

    Ok(())
}
