//! Integration tests for the login flow against a mock credential endpoint.

use std::sync::Arc;

use serde_json::json;
use sessiongate_core::auth::{FileTokenStore, MemoryTokenStore};
use sessiongate_core::routes::{Router, View};
use sessiongate_core::{
    AuthClient, LoginFailure, LoginFlow, LoginState, Navigator, SessionContext, SessionToken,
    TokenStore,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingNavigator {
    visits: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, path: &str) {
        self.visits.push(path.to_string());
    }
}

fn auth_client(server: &MockServer) -> AuthClient {
    AuthClient::with_client(reqwest::Client::new(), &server.uri())
}

fn filled(username: &str, password: &str) -> LoginFlow {
    let mut flow = LoginFlow::with_username(username);
    flow.set_password(password);
    flow
}

#[tokio::test]
async fn test_successful_login_adopts_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"username": "alice", "password": "correct"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-999"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let session = SessionContext::new(store.clone());
    let mut nav = RecordingNavigator::default();
    let mut flow = filled("alice", "correct");

    let state = flow.submit(&auth_client(&server), &session, &mut nav).await;

    assert_eq!(state, LoginState::Success);
    assert_eq!(store.read(), SessionToken::new("tok-999"));
    assert_eq!(session.token(), SessionToken::new("tok-999"));
    assert_eq!(nav.visits, vec!["/".to_string()]);
}

#[tokio::test]
async fn test_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_token(SessionToken::new("old").unwrap()));
    let session = SessionContext::new(store.clone());
    let mut nav = RecordingNavigator::default();
    let mut flow = filled("alice", "wrong");

    let state = flow.submit(&auth_client(&server), &session, &mut nav).await;

    assert_eq!(state, LoginState::Failed(LoginFailure::InvalidCredentials));
    assert_eq!(
        flow.form().helper_text.as_deref(),
        Some("Invalid username or password.")
    );
    assert_eq!(store.read(), SessionToken::new("old"));
    assert!(nav.visits.is_empty());
}

#[tokio::test]
async fn test_server_error_and_malformed_body_are_transient() {
    let responses = [
        ResponseTemplate::new(500),
        ResponseTemplate::new(403),
        ResponseTemplate::new(200).set_body_string("not json"),
        ResponseTemplate::new(200).set_body_json(json!({"session": "x"})),
        ResponseTemplate::new(200).set_body_json(json!({"token": ""})),
        ResponseTemplate::new(200).set_body_json(json!({"token": "bad\ntoken"})),
    ];

    for response in responses {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let session = SessionContext::new(store.clone());
        let mut nav = RecordingNavigator::default();
        let mut flow = filled("alice", "secret");

        let state = flow.submit(&auth_client(&server), &session, &mut nav).await;

        assert_eq!(state, LoginState::Failed(LoginFailure::Transient));
        assert_eq!(
            flow.form().helper_text.as_deref(),
            Some("An error occurred. Please try again.")
        );
        assert!(store.read().is_none());
        assert!(session.token().is_none());
        assert!(nav.visits.is_empty());
    }
}

#[tokio::test]
async fn test_unreachable_server_is_transient() {
    // Port 9 (discard) is not served on test hosts
    let auth = AuthClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9");
    let session = SessionContext::new(Arc::new(MemoryTokenStore::new()));
    let mut nav = RecordingNavigator::default();
    let mut flow = filled("alice", "secret");

    let state = flow.submit(&auth, &session, &mut nav).await;
    assert_eq!(state, LoginState::Failed(LoginFailure::Transient));
}

#[tokio::test]
async fn test_missing_fields_never_reach_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
        .expect(0)
        .mount(&server)
        .await;

    let session = SessionContext::new(Arc::new(MemoryTokenStore::new()));
    let mut nav = RecordingNavigator::default();
    for (u, p) in [("", ""), ("alice", ""), ("", "secret")] {
        let mut flow = filled(u, p);
        let state = flow.submit(&auth_client(&server), &session, &mut nav).await;
        assert_eq!(state, LoginState::Failed(LoginFailure::MissingFields));
    }
    assert!(session.token().is_none());
}

#[tokio::test]
async fn test_session_survives_restart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-999"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let router = Router::new();

    {
        let session = SessionContext::new(Arc::new(FileTokenStore::new(dir.path())));
        assert_eq!(router.resolve("/", &session), View::Login);

        let mut nav = RecordingNavigator::default();
        let mut flow = filled("alice", "correct");
        flow.submit(&auth_client(&server), &session, &mut nav).await;
        assert_eq!(router.resolve("/", &session), View::Protected("/".into()));
    }

    // Fresh process: new store handle, new context
    let session = SessionContext::new(Arc::new(FileTokenStore::new(dir.path())));
    assert_eq!(router.resolve("/", &session), View::Protected("/".into()));

    session.clear_token();
    let session = SessionContext::new(Arc::new(FileTokenStore::new(dir.path())));
    assert_eq!(router.resolve("/", &session), View::Login);
}
