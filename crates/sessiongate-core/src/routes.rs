//! Route table for front ends.
//!
//! `/ui/login` always renders the login view. Registered protected paths are
//! wrapped by `AccessGuard`. Anything else is not found.

use tracing::debug;

use crate::auth::{Access, AccessGuard, SessionContext};

/// Path of the login view
pub const LOGIN_PATH: &str = "/ui/login";

/// Protected root view, the landing page after login
pub const ROOT_PATH: &str = "/";

/// View selected for a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Login,
    Protected(String),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct Router {
    protected: Vec<String>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Router with only the root view protected
    pub fn new() -> Self {
        Self {
            protected: vec![ROOT_PATH.to_string()],
        }
    }

    /// Register another guarded path
    pub fn protect(mut self, path: &str) -> Self {
        let path = normalize(path);
        if !self.protected.iter().any(|p| *p == path) {
            self.protected.push(path);
        }
        self
    }

    /// Pick the view for `path` given the current session
    pub fn resolve(&self, path: &str, session: &SessionContext) -> View {
        let path = normalize(path);
        if path == LOGIN_PATH {
            return View::Login;
        }
        if !self.protected.contains(&path) {
            return View::NotFound;
        }
        match AccessGuard::check(session.token().as_ref()) {
            Access::Granted => View::Protected(path),
            Access::Redirect(to) => {
                debug!(from = %path, to, "Guard redirect");
                View::Login
            }
        }
    }
}

/// Drop query/fragment and trailing slashes; an empty path is the root
fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        ROOT_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
