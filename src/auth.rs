use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Authentication lifecycle as observed by the rest of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    Authenticated { user_id: String },
    Unauthenticated,
    Error(String),
}

/// The hosted authentication service boundary.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the signed-in user id on success.
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<String>;

    /// Creates an account and signs it in, returning the new user id.
    async fn register(&self, email: &str, password: &str) -> AppResult<String>;

    async fn sign_out(&self);

    fn current_user(&self) -> Option<String>;
}

/// In-memory identity provider for the demo binary and tests.
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    inner: Mutex<Accounts>,
}

#[derive(Debug, Default)]
struct Accounts {
    // email -> (user id, password)
    by_email: HashMap<String, (String, String)>,
    current: Option<String>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Accounts> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<String> {
        let mut inner = self.lock();
        match inner.by_email.get(email) {
            Some((user_id, stored)) if stored == password => {
                let user_id = user_id.clone();
                inner.current = Some(user_id.clone());
                Ok(user_id)
            }
            _ => Err(AppError::Auth("invalid email or password".into())),
        }
    }

    async fn register(&self, email: &str, password: &str) -> AppResult<String> {
        let mut inner = self.lock();
        if inner.by_email.contains_key(email) {
            return Err(AppError::Auth("email already registered".into()));
        }
        let user_id = Uuid::new_v4().to_string();
        inner
            .by_email
            .insert(email.to_string(), (user_id.clone(), password.to_string()));
        inner.current = Some(user_id.clone());
        Ok(user_id)
    }

    async fn sign_out(&self) {
        self.lock().current = None;
    }

    fn current_user(&self) -> Option<String> {
        self.lock().current.clone()
    }
}
