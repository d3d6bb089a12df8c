//! End-to-end session tests against the on-disk backend.
//!
//! A "restart" is modelled by building a fresh store over the same file.

use std::sync::Arc;

use proptest::prelude::*;
use servicehub_session::{
    AppFlavor, FileStore, GateState, Identity, IdentityStore, NavigationGate, Screen, Token,
};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> IdentityStore {
    IdentityStore::new(Arc::new(FileStore::new(dir.path().join("session.json"))))
}

fn read_record(dir: &TempDir) -> Option<String> {
    std::fs::read_to_string(dir.path().join("session.json")).ok()
}

// ==================== Scenarios ====================

#[tokio::test]
async fn test_login_logout_scenario() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let mut gate = NavigationGate::new(&store, AppFlavor::Customer);

    store.initialize().await;
    assert_eq!(store.current(), Identity::Anonymous);
    assert_eq!(gate.changed().await, Some(GateState::Unauthenticated));
    assert_eq!(
        gate.active_tree().unwrap().initial_route(),
        Screen::Auth
    );

    store.login(Token::new("abc123").unwrap()).await.unwrap();
    assert_eq!(read_record(&dir).as_deref(), Some(r#"{"userId":"abc123"}"#));
    assert_eq!(
        store.current(),
        Identity::Authenticated(Token::new("abc123").unwrap())
    );
    assert_eq!(gate.changed().await, Some(GateState::Authenticated));
    assert_eq!(
        gate.active_tree().unwrap().initial_route(),
        Screen::ProductCatalog
    );

    store.logout().await.unwrap();
    assert_eq!(read_record(&dir), None);
    assert_eq!(store.current(), Identity::Anonymous);
    assert_eq!(gate.changed().await, Some(GateState::Unauthenticated));
}

#[tokio::test]
async fn test_prepopulated_record_restores_session() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("session.json"), r#"{"userId":"xyz"}"#).unwrap();

    let store = open_store(&dir);
    let gate = NavigationGate::new(&store, AppFlavor::Admin);

    let identity = store.initialize().await;
    assert_eq!(identity, Identity::Authenticated(Token::new("xyz").unwrap()));
    assert_eq!(gate.state(), GateState::Authenticated);
    assert!(gate.can_show(Screen::ManageOrders));
}

#[tokio::test]
async fn test_logout_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(&dir);
        store.initialize().await;
        store.login(Token::new("abc").unwrap()).await.unwrap();
        store.logout().await.unwrap();
    }

    let restarted = open_store(&dir);
    assert_eq!(restarted.initialize().await, Identity::Anonymous);
}

#[tokio::test]
async fn test_logout_when_anonymous_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.initialize().await;

    store.logout().await.unwrap();
    store.logout().await.unwrap();

    assert_eq!(store.current(), Identity::Anonymous);
    assert_eq!(read_record(&dir), None);
}

#[tokio::test]
async fn test_corrupt_file_starts_signed_out() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("session.json"), "{ not json").unwrap();

    let store = open_store(&dir);
    assert_eq!(store.initialize().await, Identity::Anonymous);

    // A fresh login overwrites the damaged file.
    store.login(Token::new("abc").unwrap()).await.unwrap();
    assert_eq!(read_record(&dir).as_deref(), Some(r#"{"userId":"abc"}"#));
}

// ==================== Properties ====================

fn gate_for(identity: Identity, flavor: AppFlavor) -> Option<Vec<Screen>> {
    let phase = servicehub_session::Phase::Ready(identity);
    GateState::from_phase(&phase)
        .tree(flavor)
        .map(|tree| tree.screens().to_vec())
}

proptest! {
    /// Property: login then restart restores the same token
    #[test]
    fn prop_login_roundtrips_through_restart(raw in "[A-Za-z0-9_-]{1,64}") {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let dir = TempDir::new().unwrap();

        let restored = rt.block_on(async {
            let store = open_store(&dir);
            store.initialize().await;
            store.login(Token::new(raw.clone()).unwrap()).await.unwrap();
            drop(store);

            open_store(&dir).initialize().await
        });

        prop_assert_eq!(restored, Identity::Authenticated(Token::new(raw).unwrap()));
    }

    /// Property: the gate shows exactly one tree for every ready identity
    #[test]
    fn prop_gate_exclusive_and_exhaustive(raw in proptest::option::of("\\PC{1,32}"), admin in any::<bool>()) {
        let flavor = if admin { AppFlavor::Admin } else { AppFlavor::Customer };
        let identity = match raw {
            Some(raw) => Identity::Authenticated(Token::new(raw).unwrap()),
            None => Identity::Anonymous,
        };
        let signed_in = identity.is_authenticated();

        let screens = gate_for(identity, flavor);
        prop_assert!(screens.is_some());
        let screens = screens.unwrap();

        let expected = if signed_in {
            flavor.authenticated_tree()
        } else {
            flavor.unauthenticated_tree()
        };
        let other = if signed_in {
            flavor.unauthenticated_tree()
        } else {
            flavor.authenticated_tree()
        };

        prop_assert_eq!(screens.as_slice(), expected.screens());
        prop_assert!(screens.iter().all(|s| !other.contains(*s)));
    }
}
