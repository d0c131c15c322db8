use std::sync::Arc;

use crate::{
    auth::{AuthState, IdentityProvider},
    dto::auth::Credentials,
    error::{AppError, AppResult},
    observable::{Observable, Subscription},
};

/// Session-facing wrapper over the identity provider. Publishes the auth
/// lifecycle as an observable state stream; the session layer reacts to it.
#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    state: Observable<AuthState>,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        // Pick up an already-signed-in session at construction.
        let initial = match identity.current_user() {
            Some(user_id) => AuthState::Authenticated { user_id },
            None => AuthState::Unauthenticated,
        };
        Self {
            identity,
            state: Observable::new(initial),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.get()
    }

    pub fn watch_state(&self) -> Subscription<AuthState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<String> {
        match self.state.get() {
            AuthState::Authenticated { user_id } => Some(user_id),
            _ => None,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<()> {
        self.credentials(email, password).validate()?;
        self.state.set(AuthState::Loading);
        match self.identity.sign_in(email, password).await {
            Ok(user_id) => {
                self.state.set(AuthState::Authenticated { user_id });
                Ok(())
            }
            Err(err) => {
                self.state.set(AuthState::Error(err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> AppResult<()> {
        self.credentials(email, password).validate()?;
        self.state.set(AuthState::Loading);
        match self.identity.register(email, password).await {
            Ok(user_id) => {
                self.state.set(AuthState::Authenticated { user_id });
                Ok(())
            }
            Err(err) => {
                self.state.set(AuthState::Error(err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn logout(&self) {
        self.identity.sign_out().await;
        self.state.set(AuthState::Unauthenticated);
    }

    /// Reset a displayed error so it does not re-trigger on the next state
    /// observation.
    pub fn clear_error(&self) {
        if matches!(self.state.get(), AuthState::Error(_)) {
            self.state.set(AuthState::Unauthenticated);
        }
    }

    fn credentials(&self, email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

/// The signed-in user id, or `Unauthenticated` if there is none.
pub fn require_user(identity: &dyn IdentityProvider) -> AppResult<String> {
    identity.current_user().ok_or(AppError::Unauthenticated)
}
