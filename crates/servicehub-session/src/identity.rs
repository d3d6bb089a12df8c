//! # Identity
//!
//! The in-memory answer to "who is signed in".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Opaque sign-in token.
///
/// For the customer app this is the user id returned by `/login`; for the
/// admin app it is the token returned by `/admin/login`. Never empty.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token(String);

impl Token {
    /// Wraps a raw token string.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyToken`] if `raw` is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        Ok(Self(raw))
    }

    /// Returns the raw token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form safe to put in logs.
    #[must_use]
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(4).collect();
        if prefix.len() == self.0.len() {
            "****".to_string()
        } else {
            format!("{prefix}****")
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.redacted()).finish()
    }
}

impl TryFrom<String> for Token {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

/// Who is currently signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    /// Nobody is signed in.
    #[default]
    Anonymous,
    /// A user or admin is signed in with the given token.
    Authenticated(Token),
}

impl Identity {
    /// Returns the token if authenticated.
    #[must_use]
    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(token) => Some(token),
        }
    }

    /// Check if someone is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Authenticated(token) => write!(f, "authenticated ({})", token.redacted()),
        }
    }
}

/// Lifecycle of the identity store.
///
/// `Loading` only exists until the durable record has been read once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    /// The durable record has not been read yet.
    #[default]
    Loading,
    /// The identity is known.
    Ready(Identity),
}

impl Phase {
    /// Returns the identity once loading has finished.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Loading => None,
            Self::Ready(identity) => Some(identity),
        }
    }
}
