use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Rejected before the identity provider is ever called.
    pub fn validate(&self) -> AppResult<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "email and password must not be empty".into(),
            ));
        }
        Ok(())
    }
}
