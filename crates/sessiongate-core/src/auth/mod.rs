//! Authentication module for managing the user's session.
//!
//! This module provides:
//! - `SessionToken`: the opaque bearer credential issued at login
//! - `TokenStore`: durable single-slot token persistence (file, memory)
//! - `SessionContext`: in-memory, subscribable copy of the token with
//!   write-through mutations
//! - `LoginFlow`: the credential submission state machine
//! - `AccessGuard`: the route predicate for protected views
//!
//! Tokens carry no client-side expiry; the server decides validity.

pub mod guard;
pub mod login;
pub mod session;
pub mod store;
pub mod token;

pub use guard::{Access, AccessGuard};
pub use login::{
    Credentials, LoginFailure, LoginFlow, LoginForm, LoginState, Navigator, Submission,
    SubmitOutcome,
};
pub use session::SessionContext;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use token::SessionToken;
