//! # Sign-in Flows
//!
//! What the sign-in and registration screens do on submit: validate the
//! form, call the backend, and hand a returned token to the identity store.
//! Failures are never retried automatically.

use std::sync::Arc;

use servicehub_session::{AppFlavor, IdentityStore, SessionError, Token};
use thiserror::Error;

use crate::client::ServiceClient;
use crate::error::ApiError;
use crate::types::Credentials;

/// Errors surfaced to the user by a sign-in flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Form input rejected before any request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Identity store rejected the change.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Which action a flow was performing, for picking the toast text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    /// Signing in.
    SignIn,
    /// Creating an account.
    Register,
}

impl FlowError {
    /// Message shown in the failure toast or alert.
    ///
    /// Backend failures get the screen's credential or registration text;
    /// local session failures are reported as such.
    #[must_use]
    pub fn user_message(&self, flavor: AppFlavor, action: FlowAction) -> String {
        match self {
            Self::InvalidInput(reason) => return reason.clone(),
            Self::Session(SessionError::Persistence(_)) => {
                return "Could not save your session. Please try again.".to_string();
            }
            Self::Session(SessionError::Busy) => {
                return "Another sign-in or sign-out is already in progress.".to_string();
            }
            Self::Api(_) | Self::Session(SessionError::EmptyToken) => {}
        }
        let text = match (flavor, action) {
            (AppFlavor::Customer, FlowAction::SignIn) => "Invalid credentials. Please try again.",
            (AppFlavor::Customer, FlowAction::Register) => {
                "Email already registered or something went wrong."
            }
            (AppFlavor::Admin, FlowAction::SignIn) => {
                "Failed to login. Please check your credentials."
            }
            (AppFlavor::Admin, FlowAction::Register) => {
                "Failed to register. Please check your details and try again."
            }
        };
        text.to_string()
    }
}

/// Result type for flows.
pub type FlowResult<T> = Result<T, FlowError>;

/// Sign-in and registration for one app flavor.
#[derive(Debug, Clone)]
pub struct AuthFlow {
    client: ServiceClient,
    flavor: AppFlavor,
    store: Arc<IdentityStore>,
}

impl AuthFlow {
    /// Create a flow that feeds `store`.
    pub fn new(client: ServiceClient, flavor: AppFlavor, store: Arc<IdentityStore>) -> Self {
        Self {
            client,
            flavor,
            store,
        }
    }

    /// Flavor this flow signs in to.
    #[must_use]
    pub fn flavor(&self) -> AppFlavor {
        self.flavor
    }

    /// Identity store this flow updates.
    #[must_use]
    pub fn store(&self) -> &Arc<IdentityStore> {
        &self.store
    }

    /// Authenticate and persist the returned token.
    ///
    /// # Errors
    ///
    /// * [`FlowError::InvalidInput`] - empty email or password
    /// * [`FlowError::Api`] - backend rejected or unreachable
    /// * [`FlowError::Session`] - token could not be persisted
    pub async fn sign_in(&self, creds: &Credentials) -> FlowResult<Token> {
        validate(creds)?;

        let raw = self.client.sign_in(self.flavor, creds).await.map_err(|e| {
            tracing::warn!(flavor = %self.flavor, error = %e, "Sign-in failed");
            e
        })?;
        let token = Token::new(raw)?;
        self.store.login(token.clone()).await?;

        tracing::info!(flavor = %self.flavor, "Signed in");
        Ok(token)
    }

    /// Create an account. The identity is left untouched.
    ///
    /// `confirm_password` is checked when given; the admin registration
    /// form always sends one.
    ///
    /// # Errors
    ///
    /// * [`FlowError::InvalidInput`] - empty fields or mismatched confirmation
    /// * [`FlowError::Api`] - backend rejected or unreachable
    pub async fn register(
        &self,
        creds: &Credentials,
        confirm_password: Option<&str>,
    ) -> FlowResult<()> {
        validate(creds)?;
        if confirm_password.is_some_and(|c| c != creds.password) {
            return Err(FlowError::InvalidInput("Passwords do not match.".to_string()));
        }

        self.client
            .register_account(self.flavor, creds)
            .await
            .map_err(|e| {
                tracing::warn!(flavor = %self.flavor, error = %e, "Registration failed");
                e
            })?;

        tracing::info!(flavor = %self.flavor, "Registered account");
        Ok(())
    }

    /// Create an account, then sign straight in with it.
    ///
    /// # Errors
    ///
    /// Any error from [`register`](Self::register) or [`sign_in`](Self::sign_in).
    pub async fn register_and_sign_in(
        &self,
        creds: &Credentials,
        confirm_password: Option<&str>,
    ) -> FlowResult<Token> {
        self.register(creds, confirm_password).await?;
        self.sign_in(creds).await
    }

    /// Sign out.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Session`] if the durable record could not be removed.
    pub async fn sign_out(&self) -> FlowResult<()> {
        self.store.logout().await?;
        Ok(())
    }
}

fn validate(creds: &Credentials) -> FlowResult<()> {
    if creds.email.trim().is_empty() {
        return Err(FlowError::InvalidInput("Email is required.".to_string()));
    }
    if creds.password.is_empty() {
        return Err(FlowError::InvalidInput("Password is required.".to_string()));
    }
    Ok(())
}
