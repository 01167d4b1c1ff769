use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::join_url;
use super::ApiError;
use crate::auth::SessionToken;
use crate::config::Config;

/// Credential endpoint, relative to the base URL
const LOGIN_PATH: &str = "/auth/login";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Client for the authentication endpoint.
///
/// Login requests never carry a stored bearer token.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// Exchange a username/password pair for a session token.
    ///
    /// A 401 maps to `ApiError::Unauthorized`; a 2xx without a usable
    /// `token` field is an `InvalidResponse`. A token that cannot travel in
    /// an `Authorization` header is not usable.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionToken, ApiError> {
        let url = join_url(&self.base_url, LOGIN_PATH);
        debug!(%url, "Submitting credentials");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let text = response.text().await?;
        let parsed: LoginResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Malformed login response: {}", e)))?;

        let token = SessionToken::new(parsed.token).ok_or_else(|| {
            ApiError::InvalidResponse("Login response carried an empty token".into())
        })?;
        if header::HeaderValue::from_str(&token.bearer()).is_err() {
            return Err(ApiError::InvalidResponse(
                "Login response carried a token that cannot be sent as a header".into(),
            ));
        }
        Ok(token)
    }
}
