//! # Identity Store
//!
//! Single source of truth for "is someone signed in", kept in step with a
//! durable backend.
//!
//! The durable write always happens before the in-memory change, so a
//! failed write never leaves the two disagreeing. Login and logout are
//! serialized by an operation guard; an overlapping call is rejected with
//! [`SessionError::Busy`] instead of queuing behind the first one.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::error::{Result, SessionError};
use crate::identity::{Identity, Phase, Token};
use crate::storage::{DurableStore, USER_ID_KEY};

/// Persisted sign-in state shared by every consumer of a session.
///
/// Construct one per process and hand it around in an [`Arc`].
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use servicehub_session::{IdentityStore, MemoryStore, Token};
///
/// let store = IdentityStore::new(Arc::new(MemoryStore::new()));
/// store.initialize().await;
/// assert!(!store.is_authenticated());
///
/// store.login(Token::new("abc123")?).await?;
/// assert!(store.is_authenticated());
/// ```
pub struct IdentityStore {
    storage: Arc<dyn DurableStore>,
    state: watch::Sender<Phase>,
    op_lock: Mutex<()>,
}

impl IdentityStore {
    /// Create a store in the `Loading` phase on top of `storage`.
    pub fn new(storage: Arc<dyn DurableStore>) -> Self {
        let (state, _) = watch::channel(Phase::Loading);
        Self {
            storage,
            state,
            op_lock: Mutex::new(()),
        }
    }

    /// Reads the durable record and leaves the `Loading` phase.
    ///
    /// Unreadable storage degrades to anonymous. Calling this again after
    /// it has completed returns the current identity without re-reading.
    pub async fn initialize(&self) -> Identity {
        let _guard = self.op_lock.lock().await;

        let ready = self.state.borrow().identity().cloned();
        if let Some(identity) = ready {
            tracing::debug!("Identity store already initialized");
            return identity;
        }

        let identity = match self.storage.get(USER_ID_KEY).await {
            Ok(Some(raw)) => match Token::new(raw) {
                Ok(token) => Identity::Authenticated(token),
                Err(_) => {
                    tracing::warn!("Stored user id is empty, starting signed out");
                    Identity::Anonymous
                }
            },
            Ok(None) => Identity::Anonymous,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session, starting signed out");
                Identity::Anonymous
            }
        };

        tracing::info!(identity = %identity, "Identity store initialized");
        self.state.send_replace(Phase::Ready(identity.clone()));
        identity
    }

    /// Persist `token` and switch to authenticated.
    ///
    /// # Errors
    ///
    /// * [`SessionError::Busy`] - another login or logout is in flight
    /// * [`SessionError::Persistence`] - the durable write failed; the
    ///   in-memory identity is left as it was
    pub async fn login(&self, token: Token) -> Result<()> {
        let _guard = self.op_lock.try_lock().map_err(|_| SessionError::Busy)?;

        self.storage.set(USER_ID_KEY, token.as_str()).await?;

        tracing::info!(token = %token.redacted(), "Signed in");
        self.publish(Identity::Authenticated(token));
        Ok(())
    }

    /// Remove the durable record and switch to anonymous.
    ///
    /// Safe to call when already signed out; the removal is still attempted.
    ///
    /// # Errors
    ///
    /// * [`SessionError::Busy`] - another login or logout is in flight
    /// * [`SessionError::Persistence`] - the durable removal failed; the
    ///   in-memory identity is left as it was
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.op_lock.try_lock().map_err(|_| SessionError::Busy)?;

        self.storage.remove(USER_ID_KEY).await?;

        if self.is_authenticated() {
            tracing::info!("Signed out");
        }
        self.publish(Identity::Anonymous);
        Ok(())
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.state.borrow().clone()
    }

    /// Current identity; anonymous while still loading.
    pub fn current(&self) -> Identity {
        self.state.borrow().identity().cloned().unwrap_or_default()
    }

    /// Current token, if signed in.
    pub fn token(&self) -> Option<Token> {
        self.state.borrow().identity().and_then(Identity::token).cloned()
    }

    /// Check if someone is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.state
            .borrow()
            .identity()
            .is_some_and(Identity::is_authenticated)
    }

    /// Start observing identity changes.
    ///
    /// Only changes are delivered: a logout while signed out, or a login
    /// with the token already held, succeeds without notifying. The
    /// subscription ends when the returned handle is dropped.
    pub fn subscribe(&self) -> IdentityWatch {
        IdentityWatch {
            rx: self.state.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.state.receiver_count()
    }

    /// Store `identity` and notify subscribers if it differs.
    fn publish(&self, identity: Identity) {
        let next = Phase::Ready(identity);
        self.state.send_if_modified(|phase| {
            if *phase == next {
                false
            } else {
                *phase = next;
                true
            }
        });
    }
}

impl std::fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityStore")
            .field("phase", &*self.state.borrow())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

/// Subscription to an [`IdentityStore`].
#[derive(Debug, Clone)]
pub struct IdentityWatch {
    rx: watch::Receiver<Phase>,
}

impl IdentityWatch {
    /// Latest published phase.
    pub fn current(&self) -> Phase {
        self.rx.borrow().clone()
    }

    /// Wait for the next change and return the new phase.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Phase> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
