//! Integration tests for bearer injection by the request client.

use std::sync::Arc;

use serde_json::json;
use sessiongate_core::auth::MemoryTokenStore;
use sessiongate_core::{RequestClient, SessionContext, SessionToken, TokenStore};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn client(server: &MockServer, store: Arc<dyn TokenStore>) -> RequestClient {
    RequestClient::with_client(reqwest::Client::new(), &server.uri(), store)
}

#[tokio::test]
async fn test_attaches_bearer_when_token_stored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_token(SessionToken::new("abc123").unwrap()));
    let response = client(&server, store).get("/api/items").await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_sends_unauthenticated_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/items"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let response = client(&server, store)
        .post_json("/api/items", &json!({"name": "x"}))
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let received: Vec<Request> = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_reads_store_on_every_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let store: Arc<MemoryTokenStore> = Arc::new(MemoryTokenStore::new());
    let session = SessionContext::new(store.clone());
    let c = client(&server, store);

    c.get("/one").await.unwrap();
    session.set_token(SessionToken::new("tok-1").unwrap());
    c.get("/two").await.unwrap();
    session.clear_token();
    c.get("/three").await.unwrap();

    let received = server.received_requests().await.unwrap();
    let auth: Vec<Option<String>> = received
        .iter()
        .map(|r| {
            r.headers
                .get("authorization")
                .map(|v| v.to_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(auth, vec![None, Some("Bearer tok-1".to_string()), None]);
}

#[tokio::test]
async fn test_unauthorized_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_token(SessionToken::new("expired").unwrap()));
    let session = SessionContext::new(store.clone());
    let response = client(&server, store.clone()).get("/api/items").await.unwrap();

    assert_eq!(response.status(), 401);
    // The client does not react to auth failures
    assert_eq!(store.read(), SessionToken::new("expired"));
    assert!(session.is_authenticated());
}
