//! Application state management for the sessiongate terminal front end.
//!
//! The `App` owns the one `SessionContext` for the process, the login flow,
//! the current location and the channel background tasks report back on.

use std::io::{self, Write};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use sessiongate_core::auth::SubmitOutcome;
use sessiongate_core::routes::{Router, View, LOGIN_PATH, ROOT_PATH};
use sessiongate_core::{
    AuthClient, Config, LoginFlow, LoginState, Navigator, RequestClient, SessionContext,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for username input
const MAX_USERNAME_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Endpoint listed on the home view
pub const HOSTS_PATH: &str = "/v1/general/hosts";

/// Environment variable prefilling the username field
const USERNAME_ENV: &str = "SESSIONGATE_USERNAME";

/// Environment variable prefilling the password field
const PASSWORD_ENV: &str = "SESSIONGATE_PASSWORD";

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    RememberMe,
    Button,
}

impl LoginFocus {
    pub fn next(self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::RememberMe,
            LoginFocus::RememberMe => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Username,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Username,
            LoginFocus::RememberMe => LoginFocus::Password,
            LoginFocus::Button => LoginFocus::RememberMe,
        }
    }
}

/// Results sent back from spawned tasks
enum BackgroundResult {
    Login(SubmitOutcome),
    Hosts {
        generation: u64,
        result: std::result::Result<String, String>,
    },
}

/// Host list shown on the home view.
///
/// Every fetch is tagged with the generation it started in. Logging out
/// bumps the generation, so a fetch still in flight lands as stale.
#[derive(Debug, Default)]
pub struct HostsFetch {
    generation: u64,
    pub loading: bool,
    pub body: Option<String>,
}

impl HostsFetch {
    /// Start a fetch, or `None` when one is already running
    pub fn begin(&mut self) -> Option<u64> {
        if self.loading {
            return None;
        }
        self.loading = true;
        Some(self.generation)
    }

    /// Whether a result from `generation` still applies; settles the fetch if so
    pub fn accept(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        true
    }

    /// Forget the current list and orphan any running fetch
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.loading = false;
        self.body = None;
    }
}

/// Current path, moved by the login flow and by the app itself
#[derive(Debug)]
pub struct Location {
    pub path: String,
}

impl Navigator for Location {
    fn navigate(&mut self, path: &str) {
        debug!(from = %self.path, to = path, "Navigate");
        self.path = path.to_string();
    }
}

pub struct App {
    pub config: Config,
    pub session: SessionContext,
    auth: AuthClient,
    api: RequestClient,
    router: Router,

    pub state: AppState,
    pub location: Location,
    pub login: LoginFlow,
    pub login_focus: LoginFocus,
    pub status_message: Option<String>,
    pub hosts: HostsFetch,

    tx: mpsc::Sender<BackgroundResult>,
    rx: mpsc::Receiver<BackgroundResult>,
}

pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && !c.is_control()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && !c.is_control()
}

impl App {
    /// Create the application with a session seeded from the configured store
    pub fn new(config: Config) -> Result<Self> {
        let store = config.token_store()?;
        let session = SessionContext::new(store.clone());
        let auth = AuthClient::new(&config)?;
        let api = RequestClient::new(&config, store)?;

        let username = std::env::var(USERNAME_ENV)
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let mut login = LoginFlow::with_username(username);
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            login.set_password(password);
        }
        let login_focus = if login.form().credentials.username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            config,
            session,
            auth,
            api,
            router: Router::new(),
            state: AppState::Normal,
            location: Location {
                path: ROOT_PATH.to_string(),
            },
            login,
            login_focus,
            status_message: None,
            hosts: HostsFetch::default(),
            tx,
            rx,
        })
    }

    /// View for the current location, re-guarded on every call
    pub fn current_view(&self) -> View {
        self.router.resolve(&self.location.path, &self.session)
    }

    pub fn go_to(&mut self, path: &str) {
        self.location.navigate(path);
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Start a login attempt from the form. The request runs in the
    /// background; further submits are ignored until it resolves.
    pub fn submit_login(&mut self) {
        let Some(submission) = self.login.begin_submit() else {
            return;
        };
        let auth = self.auth.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = submission.send(&auth).await;
            // Receiver gone means the app is shutting down
            let _ = tx.send(BackgroundResult::Login(outcome)).await;
        });
    }

    fn finish_login(&mut self, outcome: SubmitOutcome) {
        let state = self.login.complete(outcome, &self.session, &mut self.location);
        if state == LoginState::Success {
            self.config.last_username = Some(self.login.form().credentials.username.clone());
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }
            self.status_message = Some("Logged in".to_string());
            self.refresh_hosts();
        }
    }

    /// Interactive login (used for CLI mode)
    pub async fn login_interactive(&mut self) -> Result<()> {
        println!("\n=== Sessiongate Login ===\n");

        let username = match self.config.last_username.clone() {
            Some(last_user) => {
                print!("Username [{}]: ", last_user);
                io::stdout().flush()?;
                let input = Self::read_line()?;
                if input.is_empty() {
                    last_user
                } else {
                    input
                }
            }
            None => {
                print!("Username: ");
                io::stdout().flush()?;
                Self::read_line()?
            }
        };
        let password = rpassword::prompt_password("Password: ")?;

        self.login.set_username(username);
        self.login.set_password(password);

        println!("\nAuthenticating...");
        let state = self
            .login
            .submit(&self.auth, &self.session, &mut self.location)
            .await;

        match state {
            LoginState::Success => {
                self.config.last_username = Some(self.login.form().credentials.username.clone());
                self.config.save().context("Failed to save config")?;
                println!("Login successful!\n");
                Ok(())
            }
            _ => {
                let message = self
                    .login
                    .form()
                    .helper_text
                    .clone()
                    .unwrap_or_else(|| "Login failed".to_string());
                Err(anyhow::anyhow!(message))
            }
        }
    }

    fn read_line() -> Result<String> {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    /// Drop the session and return to the login view
    pub fn logout(&mut self) {
        self.session.clear_token();
        self.login.reset();
        if let Some(ref username) = self.config.last_username {
            self.login.set_username(username.clone());
            self.login_focus = LoginFocus::Password;
        } else {
            self.login_focus = LoginFocus::Username;
        }
        self.hosts.invalidate();
        self.status_message = Some("Logged out".to_string());
        self.go_to(LOGIN_PATH);
        info!("User logged out");
    }

    // =========================================================================
    // Protected data
    // =========================================================================

    /// Fetch the host list through the bearer-injecting client
    pub fn refresh_hosts(&mut self) {
        let Some(generation) = self.hosts.begin() else {
            return;
        };
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match api.get(HOSTS_PATH).await {
                Ok(response) => {
                    let status = response.status();
                    match response.text().await {
                        Ok(body) if status.is_success() => Ok(body),
                        Ok(_) => Err(format!("Server returned {}", status)),
                        Err(e) => Err(e.to_string()),
                    }
                }
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(BackgroundResult::Hosts { generation, result }).await;
        });
    }

    // =========================================================================
    // Background tasks
    // =========================================================================

    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.rx.try_recv() {
            match result {
                BackgroundResult::Login(outcome) => self.finish_login(outcome),
                BackgroundResult::Hosts { generation, result } => {
                    if !self.hosts.accept(generation) {
                        debug!(generation, "Dropping hosts result from before logout");
                        continue;
                    }
                    match result {
                        Ok(body) => {
                            self.hosts.body = Some(body);
                            self.status_message = None;
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to fetch hosts");
                            self.status_message = Some(format!("Error: {}", e));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_cycles() {
        let mut focus = LoginFocus::Username;
        for _ in 0..4 {
            focus = focus.next();
        }
        assert_eq!(focus, LoginFocus::Username);
        assert_eq!(LoginFocus::Username.prev(), LoginFocus::Button);
    }

    #[test]
    fn test_input_limits() {
        assert!(can_add_username_char(0, 'a'));
        assert!(!can_add_username_char(MAX_USERNAME_LENGTH, 'a'));
        assert!(!can_add_password_char(0, '\n'));
        assert!(can_add_password_char(MAX_PASSWORD_LENGTH - 1, 'x'));
    }

    #[test]
    fn test_location_navigates() {
        let mut location = Location {
            path: LOGIN_PATH.to_string(),
        };
        location.navigate(ROOT_PATH);
        assert_eq!(location.path, "/");
    }

    #[test]
    fn test_hosts_fetch_runs_one_at_a_time() {
        let mut hosts = HostsFetch::default();
        let generation = hosts.begin().unwrap();
        assert!(hosts.begin().is_none());

        assert!(hosts.accept(generation));
        assert!(!hosts.loading);
        assert!(hosts.begin().is_some());
    }

    #[test]
    fn test_hosts_fetch_from_before_logout_is_dropped() {
        let mut hosts = HostsFetch::default();
        let stale = hosts.begin().unwrap();

        hosts.invalidate();
        assert!(!hosts.loading);
        assert!(hosts.body.is_none());

        // A new session can fetch while the old request is still out
        let fresh = hosts.begin().unwrap();
        assert_ne!(stale, fresh);
        assert!(!hosts.accept(stale));
        assert!(hosts.loading);

        assert!(hosts.accept(fresh));
        assert!(!hosts.loading);
    }
}
