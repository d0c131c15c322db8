use std::sync::Arc;

use rust_decimal::Decimal;

use warung_pos::{
    auth::MemoryIdentity,
    dto::products::ProductForm,
    error::AppError,
    models::Product,
    services::{auth_service::AuthService, catalog_service::CatalogService},
    state::AppState,
    store::MemoryStore,
};

fn test_state() -> AppState {
    AppState {
        store: Arc::new(MemoryStore::new()),
        identity: Arc::new(MemoryIdentity::new()),
    }
}

fn product(id: &str, name: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: Decimal::from(1000),
        stock: 10,
        user_id: "user-1".to_string(),
    }
}

fn form(name: &str, price: &str, stock: &str) -> ProductForm {
    ProductForm {
        name: name.to_string(),
        price: price.to_string(),
        stock: stock.to_string(),
    }
}

#[tokio::test]
async fn search_is_a_case_insensitive_substring_match() {
    let catalog = CatalogService::new();
    catalog.apply_snapshot(vec![
        product("p1", "Indomie Goreng"),
        product("p2", "Indomie Kuah"),
        product("p3", "Teh Botol"),
    ]);

    catalog.set_search_query("indomie");
    let names: Vec<String> = catalog.products().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Indomie Goreng", "Indomie Kuah"]);

    catalog.set_search_query("GORENG");
    assert_eq!(catalog.products().len(), 1);

    catalog.set_search_query("");
    assert_eq!(catalog.products().len(), 3);
}

#[tokio::test]
async fn filtered_feed_follows_query_changes() {
    let catalog = CatalogService::new();
    catalog.apply_snapshot(vec![
        product("p1", "Indomie Goreng"),
        product("p3", "Teh Botol"),
    ]);

    let mut feed = catalog.watch_products();
    catalog.set_search_query("teh");
    while feed.current().len() != 1 {
        assert!(feed.changed().await, "filter feed closed");
    }
    assert_eq!(feed.current()[0].name, "Teh Botol");
}

#[tokio::test]
async fn lookup_misses_are_not_errors() {
    let catalog = CatalogService::new();
    catalog.apply_snapshot(vec![product("p1", "Indomie Goreng")]);

    assert!(catalog.get_product_by_id("p1").is_some());
    assert!(catalog.get_product_by_id("deleted").is_none());
}

#[tokio::test]
async fn malformed_forms_are_rejected_before_the_store() -> anyhow::Result<()> {
    let state = test_state();
    let auth = AuthService::new(Arc::clone(&state.identity));
    auth.register("kasir@example.com", "rahasia123").await?;
    let user_id = auth.current_user().unwrap();
    let catalog = CatalogService::new();

    for bad in [
        form("", "3500", "10"),
        form("Indomie Goreng", "tiga ribu", "10"),
        form("Indomie Goreng", "-1", "10"),
        form("Indomie Goreng", "3500", "1.5"),
        form("Indomie Goreng", "3500", "-2"),
    ] {
        let err = catalog.add_product(&state, &bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "form: {bad:?}");
    }
    assert!(
        state.store.watch_products(&user_id).current().is_empty(),
        "nothing may reach the store"
    );

    // Decimal prices are accepted.
    catalog
        .add_product(&state, &form("Gula Pasir", "17500.50", "25"))
        .await?;
    assert_eq!(state.store.watch_products(&user_id).current().len(), 1);
    Ok(())
}

#[tokio::test]
async fn add_requires_a_signed_in_user() {
    let state = test_state();
    let catalog = CatalogService::new();

    let err = catalog
        .add_product(&state, &form("Indomie Goreng", "3500", "10"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn update_rewrites_the_stored_product() -> anyhow::Result<()> {
    let state = test_state();
    let auth = AuthService::new(Arc::clone(&state.identity));
    auth.register("kasir@example.com", "rahasia123").await?;
    let user_id = auth.current_user().unwrap();
    let catalog = CatalogService::new();

    let id = catalog
        .add_product(&state, &form("Indomie Goreng", "3500", "10"))
        .await?;
    // No session wiring here; feed the mirror by hand.
    catalog.apply_snapshot(state.store.watch_products(&user_id).current());

    catalog
        .update_product(&state, &id, &form("Indomie Goreng Jumbo", "4500", "8"))
        .await?;
    let stored = state
        .store
        .watch_products(&user_id)
        .current()
        .into_iter()
        .find(|p| p.id == id)
        .unwrap();
    assert_eq!(stored.name, "Indomie Goreng Jumbo");
    assert_eq!(stored.price, Decimal::from(4500));
    assert_eq!(stored.stock, 8);

    let err = catalog
        .update_product(&state, "missing", &form("X", "1", "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn delete_forwards_to_the_store() -> anyhow::Result<()> {
    let state = test_state();
    let auth = AuthService::new(Arc::clone(&state.identity));
    auth.register("kasir@example.com", "rahasia123").await?;
    let user_id = auth.current_user().unwrap();
    let catalog = CatalogService::new();

    let id = catalog
        .add_product(&state, &form("Indomie Goreng", "3500", "10"))
        .await?;
    catalog.delete_product(&state, &id).await?;
    assert!(state.store.watch_products(&user_id).current().is_empty());

    let err = catalog.delete_product(&state, &id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}
