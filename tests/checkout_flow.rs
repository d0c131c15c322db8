use std::sync::Arc;

use rust_decimal::Decimal;

use warung_pos::{
    auth::MemoryIdentity,
    error::AppError,
    models::{CartItem, NewProduct, Product, Transaction},
    services::{auth_service::AuthService, cart_service::CartService, checkout_service},
    state::AppState,
    store::MemoryStore,
};

fn test_state() -> AppState {
    AppState {
        store: Arc::new(MemoryStore::new()),
        identity: Arc::new(MemoryIdentity::new()),
    }
}

async fn sign_in(state: &AppState) -> anyhow::Result<String> {
    let auth = AuthService::new(Arc::clone(&state.identity));
    auth.register("kasir@example.com", "rahasia123").await?;
    auth.current_user()
        .ok_or_else(|| anyhow::anyhow!("no signed-in user after register"))
}

async fn seed_product(
    state: &AppState,
    user_id: &str,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<Product> {
    let id = state
        .store
        .add_product(NewProduct {
            name: name.to_string(),
            price: Decimal::from(price),
            stock,
            user_id: user_id.to_string(),
        })
        .await?;
    Ok(Product {
        id,
        name: name.to_string(),
        price: Decimal::from(price),
        stock,
        user_id: user_id.to_string(),
    })
}

fn products_of(state: &AppState, user_id: &str) -> Vec<Product> {
    state.store.watch_products(user_id).current()
}

fn transactions_of(state: &AppState, user_id: &str) -> Vec<Transaction> {
    state.store.watch_transactions(user_id).current()
}

fn stock_of(state: &AppState, user_id: &str, product_id: &str) -> Option<i32> {
    products_of(state, user_id)
        .into_iter()
        .find(|p| p.id == product_id)
        .map(|p| p.stock)
}

// Full cashier flow: seed -> cart -> checkout -> cancel, asserting the store
// after every atomic step.
#[tokio::test]
async fn checkout_then_cancellation_round_trip() -> anyhow::Result<()> {
    let state = test_state();
    let user_id = sign_in(&state).await?;

    let noodles = seed_product(&state, &user_id, "Indomie Goreng", 3500, 10).await?;
    let tea = seed_product(&state, &user_id, "Teh Botol", 5000, 5).await?;

    let cart = CartService::new();
    cart.add_to_cart(&noodles);
    cart.add_to_cart(&noodles);
    cart.add_to_cart(&tea);
    assert_eq!(cart.total_amount(), Decimal::from(12000));

    let transaction =
        checkout_service::checkout(&state, &cart.items(), cart.total_amount()).await?;
    cart.clear();

    assert_eq!(transaction.total_amount, Decimal::from(12000));
    assert_eq!(transaction.items.len(), 2);
    assert_eq!(stock_of(&state, &user_id, &noodles.id), Some(8));
    assert_eq!(stock_of(&state, &user_id, &tea.id), Some(4));

    let history = transactions_of(&state, &user_id);
    assert_eq!(history.len(), 1, "checkout creates exactly one transaction");
    assert_eq!(history[0].id, transaction.id);

    checkout_service::cancel_transaction(&state, &transaction).await?;
    assert_eq!(stock_of(&state, &user_id, &noodles.id), Some(10));
    assert_eq!(stock_of(&state, &user_id, &tea.id), Some(5));
    assert!(transactions_of(&state, &user_id).is_empty());

    // Cancelling the same transaction again is rejected, not repeated.
    let err = checkout_service::cancel_transaction(&state, &transaction)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
    assert_eq!(stock_of(&state, &user_id, &noodles.id), Some(10));

    Ok(())
}

#[tokio::test]
async fn checkout_requires_a_signed_in_user() -> anyhow::Result<()> {
    let state = test_state();
    let product = seed_product(&state, "someone-else", "Teh Botol", 5000, 5).await?;

    let cart = CartService::new();
    cart.add_to_cart(&product);

    let err = checkout_service::checkout(&state, &cart.items(), cart.total_amount())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
    assert_eq!(stock_of(&state, "someone-else", &product.id), Some(5));
    Ok(())
}

#[tokio::test]
async fn checkout_with_an_empty_cart_is_rejected() -> anyhow::Result<()> {
    let state = test_state();
    sign_in(&state).await?;

    let err = checkout_service::checkout(&state, &[], Decimal::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn failed_checkout_leaves_the_store_untouched() -> anyhow::Result<()> {
    let state = test_state();
    let user_id = sign_in(&state).await?;

    let noodles = seed_product(&state, &user_id, "Indomie Goreng", 3500, 10).await?;
    let tea = seed_product(&state, &user_id, "Teh Botol", 5000, 5).await?;

    let cart = CartService::new();
    cart.add_to_cart(&noodles);
    cart.add_to_cart(&tea);

    // The tea vanishes between carting and checkout.
    state.store.delete_product(&tea.id).await?;
    let products_before = products_of(&state, &user_id);

    let err = checkout_service::checkout(&state, &cart.items(), cart.total_amount())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store(_)));

    // No partial stock decrement, no transaction.
    assert_eq!(products_of(&state, &user_id), products_before);
    assert!(transactions_of(&state, &user_id).is_empty());
    Ok(())
}

#[tokio::test]
async fn overselling_is_rejected_by_the_atomic_batch() -> anyhow::Result<()> {
    let state = test_state();
    let user_id = sign_in(&state).await?;
    let noodles = seed_product(&state, &user_id, "Indomie Goreng", 3500, 2).await?;

    // Bypass the cart's own ceiling to hit the store-level guard.
    let items = vec![CartItem {
        product: noodles.clone(),
        quantity: 3,
    }];
    let err = checkout_service::checkout(&state, &items, Decimal::from(3 * 3500))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
    assert_eq!(stock_of(&state, &user_id, &noodles.id), Some(2));
    assert!(transactions_of(&state, &user_id).is_empty());
    Ok(())
}

#[tokio::test]
async fn cancellation_with_a_deleted_product_fails_atomically() -> anyhow::Result<()> {
    let state = test_state();
    let user_id = sign_in(&state).await?;

    let noodles = seed_product(&state, &user_id, "Indomie Goreng", 3500, 10).await?;
    let tea = seed_product(&state, &user_id, "Teh Botol", 5000, 5).await?;

    let cart = CartService::new();
    cart.add_to_cart(&noodles);
    cart.add_to_cart(&tea);
    let transaction =
        checkout_service::checkout(&state, &cart.items(), cart.total_amount()).await?;

    // The product is deleted after the sale was recorded.
    state.store.delete_product(&tea.id).await?;

    let err = checkout_service::cancel_transaction(&state, &transaction)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store(_)));

    // Nothing was rolled back: the noodles keep their sold stock level and
    // the transaction record stays.
    assert_eq!(stock_of(&state, &user_id, &noodles.id), Some(9));
    assert_eq!(transactions_of(&state, &user_id).len(), 1);
    Ok(())
}
