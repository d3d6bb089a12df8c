//! # ServiceHub Session
//!
//! Persisted sign-in identity and root navigation gate shared by the
//! ServiceHub customer and admin apps.
//!
//! ## Components
//!
//! - [`IdentityStore`] - in-memory identity kept in step with a durable record
//! - [`DurableStore`] - key-value backends ([`MemoryStore`], [`FileStore`])
//! - [`NavigationGate`] - picks the signed-in or signed-out screen tree
//! - [`AppFlavor`] - customer vs admin screen trees
//!
//! ## Lifecycle
//!
//! ```text
//!            initialize()
//!  Loading ───────────────► Ready(Anonymous) ◄──── logout() ────┐
//!                                  │                            │
//!                                  └──── login(token) ──► Ready(Authenticated)
//! ```
//!
//! The durable record is a single `"userId"` key. It is written before the
//! in-memory identity changes and removed entirely on logout.

pub mod error;
pub mod flavor;
pub mod gate;
pub mod identity;
pub mod storage;
pub mod store;

pub use error::{Result, SessionError, StorageError, StorageResult};
pub use flavor::{AppFlavor, Screen, ScreenTree};
pub use gate::{GateState, NavigationGate};
pub use identity::{Identity, Phase, Token};
pub use storage::{DurableStore, FileStore, MemoryStore, USER_ID_KEY};
pub use store::{IdentityStore, IdentityWatch};
