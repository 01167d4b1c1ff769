use super::SessionToken;
use crate::routes::LOGIN_PATH;

/// Outcome of guarding a protected route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Render the requested view
    Granted,
    /// Render the view at this path instead
    Redirect(&'static str),
}

/// Route predicate for protected views.
///
/// Stateless; evaluate it on every render.
pub struct AccessGuard;

impl AccessGuard {
    pub fn check(token: Option<&SessionToken>) -> Access {
        match token {
            Some(token) if !token.as_str().is_empty() => Access::Granted,
            _ => Access::Redirect(LOGIN_PATH),
        }
    }
}
