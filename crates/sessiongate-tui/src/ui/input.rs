//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use sessiongate_core::routes::{View, ROOT_PATH};

use crate::app::{can_add_password_char, can_add_username_char, App, AppState, LoginFocus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    match app.current_view() {
        View::Login => handle_login_input(app, key),
        View::Protected(_) => {
            handle_home_input(app, key);
            Ok(false)
        }
        View::NotFound => {
            match key.code {
                KeyCode::Char('h') => app.go_to(ROOT_PATH),
                KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
                _ => {}
            }
            Ok(false)
        }
    }
}

fn handle_home_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.refresh_hosts(),
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.submit_login(),
            LoginFocus::RememberMe => app.login.toggle_remember_me(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                let mut value = app.login.form().credentials.username.clone();
                value.pop();
                app.login.set_username(value);
            }
            LoginFocus::Password => {
                let mut value = app.login.form().credentials.password.clone();
                value.pop();
                app.login.set_password(value);
            }
            LoginFocus::RememberMe | LoginFocus::Button => {}
        },
        KeyCode::Char(' ') if app.login_focus == LoginFocus::RememberMe => {
            app.login.toggle_remember_me();
        }
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                let current = &app.login.form().credentials.username;
                if can_add_username_char(current.chars().count(), c) {
                    let mut value = current.clone();
                    value.push(c);
                    app.login.set_username(value);
                }
            }
            LoginFocus::Password => {
                let current = &app.login.form().credentials.password;
                if can_add_password_char(current.chars().count(), c) {
                    let mut value = current.clone();
                    value.push(c);
                    app.login.set_password(value);
                }
            }
            // Ignore character input on the checkbox and button
            LoginFocus::RememberMe | LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}
