//! HTTP module for talking to the application server.
//!
//! - `RequestClient`: general-purpose client that attaches the stored
//!   session token as a bearer credential on every request
//! - `AuthClient`: the credential endpoint used by the login flow
//! - `ApiError`: classification of non-success responses

pub mod auth;
pub mod client;
pub mod error;

pub use auth::AuthClient;
pub use client::RequestClient;
pub use error::ApiError;
