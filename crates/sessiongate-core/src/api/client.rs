//! Request client for communicating with the application server.
//!
//! Every request built here reads the token store at the moment it is
//! created, so calls made before the session context is populated (or right
//! after logout) carry exactly what is persisted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::config::Config;

/// Join a base URL and an absolute path without doubling the slash
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// HTTP client that injects the stored bearer token.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RequestClient {
    client: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl RequestClient {
    pub fn new(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(client, &config.base_url, store))
    }

    /// Build around an existing client, sharing its connection pool
    pub fn with_client(client: Client, base_url: &str, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            store,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authorization header for whatever token is stored right now
    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.store.read() {
            match header::HeaderValue::from_str(&token.bearer()) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => {
                    warn!("Stored token is not a valid header value, sending unauthenticated");
                }
            }
        }
        headers
    }

    /// Start a request to `path` with the bearer credential attached
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = join_url(&self.base_url, path);
        let headers = self.auth_headers();
        debug!(%method, %url, authenticated = !headers.is_empty(), "Building request");
        self.client.request(method, url).headers(headers)
    }

    pub async fn get(&self, path: &str) -> reqwest::Result<Response> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> reqwest::Result<Response> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// Send a prepared request. Transport results, including 401s, are
    /// returned to the caller untouched.
    pub async fn send(&self, request: RequestBuilder) -> reqwest::Result<Response> {
        request.send().await
    }
}
