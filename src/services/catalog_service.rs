use std::sync::Arc;

use crate::{
    dto::products::ProductForm,
    error::{AppError, AppResult},
    models::{NewProduct, Product},
    observable::{Observable, Subscription},
    services::auth_service::require_user,
    state::AppState,
};

/// Local mirror of the signed-in user's product catalog, fed by the store's
/// live subscription, plus the name search on top of it. The session layer
/// owns (re)population and calls [`CatalogService::clear`] on sign-out.
#[derive(Debug)]
pub struct CatalogService {
    all_products: Observable<Vec<Product>>,
    search_query: Observable<String>,
    filtered: Observable<Vec<Product>>,
}

impl CatalogService {
    pub fn new() -> Arc<Self> {
        let service = Arc::new(Self {
            all_products: Observable::new(Vec::new()),
            search_query: Observable::new(String::new()),
            filtered: Observable::new(Vec::new()),
        });
        service.spawn_filter_task();
        service
    }

    /// Keeps the filtered view current whenever the mirror or the query
    /// moves. The task ends itself once the service is dropped.
    fn spawn_filter_task(&self) {
        let mut products = self.all_products.subscribe();
        let mut query = self.search_query.subscribe();
        let filtered = self.filtered.clone();
        tokio::spawn(async move {
            loop {
                filtered.set(filter_by_name(&products.current(), &query.current()));
                tokio::select! {
                    changed = products.changed() => if !changed { break },
                    changed = query.changed() => if !changed { break },
                }
            }
        });
    }

    /// Replace the mirror with a fresh store snapshot.
    pub fn apply_snapshot(&self, products: Vec<Product>) {
        self.all_products.set(products);
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.search_query.set(query.into());
    }

    pub fn search_query(&self) -> String {
        self.search_query.get()
    }

    /// Products matching the current search query (all of them when the
    /// query is blank).
    pub fn products(&self) -> Vec<Product> {
        filter_by_name(&self.all_products.get(), &self.search_query.get())
    }

    /// Live feed of the filtered product list.
    pub fn watch_products(&self) -> Subscription<Vec<Product>> {
        self.filtered.subscribe()
    }

    /// Lookup against the unfiltered mirror. `None` means not found: the
    /// product was deleted or the initial snapshot has not arrived yet.
    pub fn get_product_by_id(&self, product_id: &str) -> Option<Product> {
        self.all_products
            .get()
            .into_iter()
            .find(|p| p.id == product_id)
    }

    pub fn clear(&self) {
        self.all_products.set(Vec::new());
        self.search_query.set(String::new());
    }

    pub async fn add_product(&self, state: &AppState, form: &ProductForm) -> AppResult<String> {
        let valid = form.validate()?;
        let user_id = require_user(state.identity.as_ref())?;
        let id = state
            .store
            .add_product(NewProduct {
                name: valid.name,
                price: valid.price,
                stock: valid.stock,
                user_id,
            })
            .await?;
        Ok(id)
    }

    pub async fn update_product(
        &self,
        state: &AppState,
        product_id: &str,
        form: &ProductForm,
    ) -> AppResult<()> {
        let valid = form.validate()?;
        let existing = self
            .get_product_by_id(product_id)
            .ok_or(AppError::NotFound)?;
        state
            .store
            .set_product(Product {
                id: existing.id,
                name: valid.name,
                price: valid.price,
                stock: valid.stock,
                user_id: existing.user_id,
            })
            .await
    }

    pub async fn delete_product(&self, state: &AppState, product_id: &str) -> AppResult<()> {
        state.store.delete_product(product_id).await
    }
}

fn filter_by_name(products: &[Product], query: &str) -> Vec<Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.to_vec();
    }
    products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
