//! Login submission state machine.
//!
//! ```text
//! Idle -> Submitting -> Success
//!                    -> Failed(reason) -> Idle (on the next field edit)
//! ```
//!
//! A submission is split into three steps so a front end can keep handling
//! input while the request is in flight: `begin_submit` validates and moves
//! to `Submitting`, `Submission::send` performs the single network call
//! without borrowing the flow, and `complete` applies the result.

use std::fmt;

use thiserror::Error;
use tracing::{debug, error, info};

use super::{SessionContext, SessionToken};
use crate::api::{ApiError, AuthClient};
use crate::routes::ROOT_PATH;

/// Username/password pair for one submission attempt. Never persisted.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub remember_me: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

/// Why a login attempt ended in `Failed`. The display text is the helper
/// text shown under the form.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    #[error("Please fill out all fields.")]
    MissingFields,

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("An error occurred. Please try again.")]
    Transient,
}

impl LoginFailure {
    fn from_api(err: &ApiError) -> Self {
        if err.is_unauthorized() {
            LoginFailure::InvalidCredentials
        } else {
            LoginFailure::Transient
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginState {
    #[default]
    Idle,
    Submitting,
    Success,
    Failed(LoginFailure),
}

/// Field values and validation state rendered by the login view
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub credentials: Credentials,
    pub username_valid: bool,
    pub password_valid: bool,
    pub helper_text: Option<String>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            username_valid: true,
            password_valid: true,
            helper_text: None,
        }
    }
}

/// Receives the post-login redirect
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

/// Credentials captured by `begin_submit`, ready to be sent
#[derive(Debug)]
pub struct Submission {
    attempt: u64,
    credentials: Credentials,
}

impl Submission {
    /// Issue the one request for this attempt
    pub async fn send(self, auth: &AuthClient) -> SubmitOutcome {
        let result = auth
            .login(&self.credentials.username, &self.credentials.password)
            .await;
        SubmitOutcome {
            attempt: self.attempt,
            result,
        }
    }
}

/// Result of `Submission::send`, to be handed to `LoginFlow::complete`
#[derive(Debug)]
pub struct SubmitOutcome {
    attempt: u64,
    result: Result<SessionToken, ApiError>,
}

#[derive(Debug, Default)]
pub struct LoginFlow {
    state: LoginState,
    form: LoginForm,
    attempt: u64,
}

impl LoginFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flow with the username field prefilled
    pub fn with_username(username: impl Into<String>) -> Self {
        let mut flow = Self::new();
        flow.form.credentials.username = username.into();
        flow
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn form(&self) -> &LoginForm {
        &self.form
    }

    pub fn is_submitting(&self) -> bool {
        self.state == LoginState::Submitting
    }

    // ===== Field edits =====

    pub fn set_username(&mut self, value: impl Into<String>) {
        self.form.credentials.username = value.into();
        self.form.username_valid = true;
        self.leave_failed();
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        self.form.credentials.password = value.into();
        self.form.password_valid = true;
        self.leave_failed();
    }

    pub fn toggle_remember_me(&mut self) {
        self.form.credentials.remember_me = !self.form.credentials.remember_me;
    }

    /// Helper text survives edits; only the next submission replaces it
    fn leave_failed(&mut self) {
        if matches!(self.state, LoginState::Failed(_)) {
            self.state = LoginState::Idle;
        }
    }

    // ===== Submission =====

    /// Validate the form and start an attempt.
    ///
    /// Returns `None` when a submission is already in flight or when a field
    /// is empty; in the latter case the flow is `Failed(MissingFields)` and
    /// nothing is sent.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.is_submitting() {
            debug!("Submit ignored, request already in flight");
            return None;
        }

        let creds = &self.form.credentials;
        self.form.username_valid = !creds.username.is_empty();
        self.form.password_valid = !creds.password.is_empty();
        if !(self.form.username_valid && self.form.password_valid) {
            self.fail(LoginFailure::MissingFields);
            return None;
        }

        self.attempt += 1;
        self.form.helper_text = None;
        self.state = LoginState::Submitting;
        debug!(attempt = self.attempt, "Login submitting");

        Some(Submission {
            attempt: self.attempt,
            credentials: self.form.credentials.clone(),
        })
    }

    /// Apply the result of a submission.
    ///
    /// On success the token is adopted through `SessionContext::set_token`
    /// and the navigator is sent to the root view, each exactly once. An
    /// outcome that does not belong to the attempt in flight is discarded.
    pub fn complete<N: Navigator + ?Sized>(
        &mut self,
        outcome: SubmitOutcome,
        session: &SessionContext,
        navigator: &mut N,
    ) -> LoginState {
        if !self.is_submitting() || outcome.attempt != self.attempt {
            debug!(attempt = outcome.attempt, "Discarding stale login result");
            return self.state;
        }

        match outcome.result {
            Ok(token) => {
                session.set_token(token);
                self.form.credentials.password.clear();
                self.state = LoginState::Success;
                info!(username = %self.form.credentials.username, "Login successful");
                navigator.navigate(ROOT_PATH);
            }
            Err(e) => {
                let failure = LoginFailure::from_api(&e);
                error!(error = %e, ?failure, "Login failed");
                if failure == LoginFailure::InvalidCredentials {
                    self.form.username_valid = false;
                    self.form.password_valid = false;
                }
                self.fail(failure);
            }
        }
        self.state
    }

    /// Validate, send and apply in one go
    pub async fn submit<N: Navigator + ?Sized>(
        &mut self,
        auth: &AuthClient,
        session: &SessionContext,
        navigator: &mut N,
    ) -> LoginState {
        let Some(submission) = self.begin_submit() else {
            return self.state;
        };
        let outcome = submission.send(auth).await;
        self.complete(outcome, session, navigator)
    }

    /// Back to an empty `Idle` form. Any result still in flight is dropped.
    pub fn reset(&mut self) {
        self.state = LoginState::Idle;
        self.form = LoginForm::default();
        self.attempt += 1;
    }

    fn fail(&mut self, failure: LoginFailure) {
        self.form.helper_text = Some(failure.to_string());
        self.state = LoginState::Failed(failure);
    }
}
