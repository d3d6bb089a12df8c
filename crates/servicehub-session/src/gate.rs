//! # Navigation Gate
//!
//! Root decision point: which of a flavor's two screen trees is mounted.
//!
//! The decision itself is [`GateState::from_phase`], a pure function of the
//! store's phase. [`NavigationGate`] pairs it with a subscription so a root
//! component can wait for the next transition.

use std::fmt;

use crate::flavor::{AppFlavor, Screen, ScreenTree};
use crate::identity::{Identity, Phase};
use crate::store::{IdentityStore, IdentityWatch};

/// What the root navigator should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateState {
    /// Identity not read yet; no tree is committed.
    Loading,
    /// Signed-out tree.
    Unauthenticated,
    /// Signed-in tree.
    Authenticated,
}

impl GateState {
    /// Decide the gate state for a store phase.
    #[must_use]
    pub fn from_phase(phase: &Phase) -> Self {
        match phase {
            Phase::Loading => Self::Loading,
            Phase::Ready(Identity::Anonymous) => Self::Unauthenticated,
            Phase::Ready(Identity::Authenticated(_)) => Self::Authenticated,
        }
    }

    /// Tree to mount for this state, `None` while loading.
    #[must_use]
    pub fn tree(self, flavor: AppFlavor) -> Option<ScreenTree> {
        match self {
            Self::Loading => None,
            Self::Unauthenticated => Some(flavor.unauthenticated_tree()),
            Self::Authenticated => Some(flavor.authenticated_tree()),
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Gate bound to an [`IdentityStore`].
///
/// Holds its own subscription; dropping the gate releases it.
#[derive(Debug)]
pub struct NavigationGate {
    flavor: AppFlavor,
    watch: IdentityWatch,
    committed: GateState,
}

impl NavigationGate {
    /// Subscribe a gate to `store`.
    pub fn new(store: &IdentityStore, flavor: AppFlavor) -> Self {
        let watch = store.subscribe();
        let committed = GateState::from_phase(&watch.current());
        Self {
            flavor,
            watch,
            committed,
        }
    }

    /// Flavor whose trees this gate selects between.
    #[must_use]
    pub fn flavor(&self) -> AppFlavor {
        self.flavor
    }

    /// Decision for the store's current identity.
    #[must_use]
    pub fn state(&self) -> GateState {
        GateState::from_phase(&self.watch.current())
    }

    /// Tree that should be mounted right now.
    #[must_use]
    pub fn active_tree(&self) -> Option<ScreenTree> {
        self.state().tree(self.flavor)
    }

    /// Whether `screen` is reachable in the current state.
    #[must_use]
    pub fn can_show(&self, screen: Screen) -> bool {
        self.active_tree().is_some_and(|tree| tree.contains(screen))
    }

    /// Wait until the gate decision differs from the last one returned.
    ///
    /// Identity updates that keep the same decision (for example switching
    /// tokens while signed in) are skipped. Returns `None` once the store is
    /// gone.
    pub async fn changed(&mut self) -> Option<GateState> {
        loop {
            let phase = self.watch.changed().await?;
            let next = GateState::from_phase(&phase);
            if next != self.committed {
                tracing::debug!(from = %self.committed, to = %next, "Gate transition");
                self.committed = next;
                return Some(next);
            }
        }
    }
}
