use std::sync::Arc;

use crate::{auth::IdentityProvider, store::DocumentStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
}
