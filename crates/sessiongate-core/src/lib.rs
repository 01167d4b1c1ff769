//! Core library for sessiongate.
//!
//! Provides the client-side session layer shared by front ends:
//!
//! - `auth`: session token, persistent token stores, the session context,
//!   the login state machine and the access guard
//! - `api`: the bearer-injecting request client and the authentication
//!   endpoint client
//! - `config`: application configuration and directory locations
//! - `routes`: path resolution for the login, protected and not-found views

pub mod api;
pub mod auth;
pub mod config;
pub mod routes;

pub use api::{ApiError, AuthClient, RequestClient};
pub use auth::{
    Access, AccessGuard, Credentials, LoginFailure, LoginFlow, LoginForm, LoginState, Navigator,
    SessionContext, SessionToken, TokenStore,
};
pub use config::Config;
