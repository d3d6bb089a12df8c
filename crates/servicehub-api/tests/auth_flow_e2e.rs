//! End-to-end tests: mocked backend, real identity store and gate.

use std::sync::Arc;

use servicehub_api::{AuthFlow, Credentials, FlowError, ServiceClient};
use servicehub_session::{
    AppFlavor, GateState, Identity, IdentityStore, MemoryStore, NavigationGate, Screen, Token,
    USER_ID_KEY,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup(
    server: &MockServer,
    flavor: AppFlavor,
) -> (AuthFlow, Arc<MemoryStore>, NavigationGate) {
    let backend = Arc::new(MemoryStore::new());
    let store = Arc::new(IdentityStore::new(backend.clone()));
    let gate = NavigationGate::new(&store, flavor);
    store.initialize().await;

    let client = ServiceClient::new(server.uri()).unwrap();
    (AuthFlow::new(client, flavor, store), backend, gate)
}

#[tokio::test]
async fn test_customer_sign_in_and_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"userId": "abc123"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (flow, backend, mut gate) = setup(&server, AppFlavor::Customer).await;
    assert_eq!(gate.changed().await, Some(GateState::Unauthenticated));

    let token = flow
        .sign_in(&Credentials::new("a@example.com", "secret"))
        .await
        .unwrap();
    assert_eq!(token.as_str(), "abc123");
    assert_eq!(
        backend.records().get(USER_ID_KEY).map(String::as_str),
        Some("abc123")
    );
    assert_eq!(gate.changed().await, Some(GateState::Authenticated));
    assert!(gate.can_show(Screen::OrderManagement));

    flow.sign_out().await.unwrap();
    assert!(backend.records().is_empty());
    assert_eq!(gate.changed().await, Some(GateState::Unauthenticated));
    assert!(gate.can_show(Screen::Auth));
}

#[tokio::test]
async fn test_admin_register_then_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/register"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "adm-tok"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (flow, _backend, gate) = setup(&server, AppFlavor::Admin).await;

    flow.register_and_sign_in(
        &Credentials::new("root@example.com", "pw"),
        Some("pw"),
    )
    .await
    .unwrap();

    assert_eq!(
        flow.store().current(),
        Identity::Authenticated(Token::new("adm-tok").unwrap())
    );
    assert_eq!(gate.state(), GateState::Authenticated);
    assert_eq!(
        gate.active_tree().unwrap().initial_route(),
        Screen::ManageProduct
    );
}

#[tokio::test]
async fn test_failed_registration_skips_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (flow, backend, gate) = setup(&server, AppFlavor::Customer).await;
    let err = flow
        .register_and_sign_in(&Credentials::new("a@example.com", "pw"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::Api(_)));
    assert!(backend.records().is_empty());
    assert_eq!(gate.state(), GateState::Unauthenticated);
}
