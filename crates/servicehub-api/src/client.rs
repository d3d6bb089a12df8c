//! # API Client
//!
//! HTTP client for the ServiceHub backend auth endpoints.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use servicehub_session::AppFlavor;

use crate::error::{ApiError, ApiResult};
use crate::types::{AdminLoginResponse, Credentials, ErrorBody, LoginResponse};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the ServiceHub backend.
///
/// The client is cheaply cloneable and can be shared across tasks.
///
/// # Examples
///
/// ```rust,ignore
/// use servicehub_api::{Credentials, ServiceClient};
///
/// let client = ServiceClient::new("http://127.0.0.1:3000")?;
/// let user_id = client.login(&Credentials::new("a@example.com", "secret")).await?;
/// ```
#[derive(Clone, Debug)]
pub struct ServiceClient {
    base_url: String,
    http: Client,
}

impl ServiceClient {
    /// Creates a client for `base_url` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the HTTP client cannot be built.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, http })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Signs a customer in and returns their user id.
    ///
    /// # Errors
    ///
    /// * [`ApiError::Network`] - Network request failed
    /// * [`ApiError::Server`] - Credentials rejected
    /// * [`ApiError::InvalidResponse`] - Body missing a non-empty `userId`
    pub async fn login(&self, creds: &Credentials) -> ApiResult<String> {
        let resp: LoginResponse = self.post_json("/login", creds).await?;
        non_empty(resp.user_id, "userId")
    }

    /// Registers a customer account.
    ///
    /// # Errors
    ///
    /// * [`ApiError::Network`] - Network request failed
    /// * [`ApiError::Server`] - Email taken or validation failed
    pub async fn register(&self, creds: &Credentials) -> ApiResult<()> {
        self.post("/register", creds).await.map(drop)
    }

    /// Signs an admin in and returns their access token.
    ///
    /// # Errors
    ///
    /// * [`ApiError::Network`] - Network request failed
    /// * [`ApiError::Server`] - Credentials rejected
    /// * [`ApiError::InvalidResponse`] - Body missing a non-empty `token`
    pub async fn admin_login(&self, creds: &Credentials) -> ApiResult<String> {
        let resp: AdminLoginResponse = self.post_json("/admin/login", creds).await?;
        non_empty(resp.token, "token")
    }

    /// Registers an admin account.
    ///
    /// # Errors
    ///
    /// * [`ApiError::Network`] - Network request failed
    /// * [`ApiError::Server`] - Email taken or validation failed
    pub async fn admin_register(&self, creds: &Credentials) -> ApiResult<()> {
        self.post("/admin/register", creds).await.map(drop)
    }

    /// Signs in against the endpoint matching `flavor`.
    ///
    /// # Errors
    ///
    /// See [`login`](Self::login) and [`admin_login`](Self::admin_login).
    pub async fn sign_in(&self, flavor: AppFlavor, creds: &Credentials) -> ApiResult<String> {
        match flavor {
            AppFlavor::Customer => self.login(creds).await,
            AppFlavor::Admin => self.admin_login(creds).await,
        }
    }

    /// Registers against the endpoint matching `flavor`.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register) and [`admin_register`](Self::admin_register).
    pub async fn register_account(&self, flavor: AppFlavor, creds: &Credentials) -> ApiResult<()> {
        match flavor {
            AppFlavor::Customer => self.register(creds).await,
            AppFlavor::Admin => self.admin_register(creds).await,
        }
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Response> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");

        let res = self.http.post(&url).json(body).send().await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let text = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or(text);
            tracing::debug!(%url, status, %message, "Request rejected");
            return Err(ApiError::Server { status, message });
        }
        Ok(res)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(path, body)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

fn non_empty(value: String, field: &str) -> ApiResult<String> {
    if value.is_empty() {
        Err(ApiError::InvalidResponse(format!("empty `{field}` in response")))
    } else {
        Ok(value)
    }
}
