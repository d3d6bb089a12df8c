//! # ServiceHub API
//!
//! HTTP client for the ServiceHub backend and the sign-in flows built on it.
//!
//! ## Endpoints
//!
//! | call | body | success |
//! |------|------|---------|
//! | `POST /login` | `{email, password}` | `{userId}` |
//! | `POST /register` | `{email, password}` | any 2xx |
//! | `POST /admin/login` | `{email, password}` | `{token}` |
//! | `POST /admin/register` | `{email, password}` | any 2xx |
//!
//! [`AuthFlow`] wraps these for one [`AppFlavor`](servicehub_session::AppFlavor)
//! and feeds successful sign-ins into an
//! [`IdentityStore`](servicehub_session::IdentityStore).

mod client;
mod error;
mod flow;
mod types;

pub use client::{ServiceClient, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult};
pub use flow::{AuthFlow, FlowAction, FlowError, FlowResult};
pub use types::{AdminLoginResponse, Credentials, LoginResponse};
