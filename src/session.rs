use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;

use crate::{
    auth::AuthState,
    models::Transaction,
    observable::{Observable, Subscription},
    services::{cart_service::CartService, catalog_service::CatalogService},
    state::AppState,
};

/// Explicit session lifecycle. Consumes the auth state stream and owns the
/// store subscriptions that exist only while a user is signed in: the
/// catalog mirror and the transaction feed. Sign-out tears both down and
/// also empties the cart, so nothing leaks into the next session.
pub struct SessionManager {
    state: AppState,
    catalog: Arc<CatalogService>,
    cart: Arc<CartService>,
    transactions: Observable<Vec<Transaction>>,
    active: Mutex<Option<ActiveSession>>,
}

struct ActiveSession {
    user_id: String,
    product_task: JoinHandle<()>,
    transaction_task: JoinHandle<()>,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.product_task.abort();
        self.transaction_task.abort();
    }
}

impl SessionManager {
    pub fn new(state: AppState, catalog: Arc<CatalogService>, cart: Arc<CartService>) -> Arc<Self> {
        Arc::new(Self {
            state,
            catalog,
            cart,
            transactions: Observable::new(Vec::new()),
            active: Mutex::new(None),
        })
    }

    /// Transaction history for the signed-in user, newest first. Empty when
    /// no session is active.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.get()
    }

    pub fn watch_transactions(&self) -> Subscription<Vec<Transaction>> {
        self.transactions.subscribe()
    }

    /// Drive the lifecycle from the auth state stream. The replayed current
    /// state is applied first, so an already-authenticated session starts
    /// immediately.
    pub fn spawn(self: &Arc<Self>, mut auth_states: Subscription<AuthState>) -> JoinHandle<()> {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            session.apply(auth_states.current());
            while let Some(state) = auth_states.next().await {
                session.apply(state);
            }
        })
    }

    fn apply(&self, state: AuthState) {
        match state {
            AuthState::Authenticated { user_id } => self.on_session_start(&user_id),
            AuthState::Unauthenticated => self.on_session_end(),
            AuthState::Loading | AuthState::Error(_) => {}
        }
    }

    /// Subscribe the catalog mirror and transaction feed for `user_id`.
    /// Re-entrant: a repeat for the same user is a no-op, a different user
    /// tears the old session down first.
    pub fn on_session_start(&self, user_id: &str) {
        let same_user = self.lock().as_ref().is_some_and(|a| a.user_id == user_id);
        if same_user {
            return;
        }
        self.on_session_end();

        let mut products = self.state.store.watch_products(user_id);
        self.catalog.apply_snapshot(products.current());
        let catalog = Arc::clone(&self.catalog);
        let product_task = tokio::spawn(async move {
            while let Some(snapshot) = products.next().await {
                catalog.apply_snapshot(snapshot);
            }
        });

        let mut incoming = self.state.store.watch_transactions(user_id);
        self.transactions.set(incoming.current());
        let feed = self.transactions.clone();
        let transaction_task = tokio::spawn(async move {
            while let Some(snapshot) = incoming.next().await {
                feed.set(snapshot);
            }
        });

        tracing::info!(%user_id, "session started");
        *self.lock() = Some(ActiveSession {
            user_id: user_id.to_string(),
            product_task,
            transaction_task,
        });
    }

    /// Cancel the live subscriptions and clear all session-scoped state.
    pub fn on_session_end(&self) {
        let Some(active) = self.lock().take() else {
            return;
        };
        drop(active);
        // Cart first, so anything observing the emptied feeds below already
        // sees the cart gone too.
        self.cart.clear();
        self.catalog.clear();
        self.transactions.set(Vec::new());
        tracing::info!("session ended");
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
}
