//! # API Types
//!
//! Request and response bodies for the auth endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Email and password as typed into a sign-in or registration form.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Create credentials from form input.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response from `POST /login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Id of the signed-in customer.
    pub user_id: String,
}

/// Response from `POST /admin/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminLoginResponse {
    /// Admin access token.
    pub token: String,
}

/// Error body some backend responses carry.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}
