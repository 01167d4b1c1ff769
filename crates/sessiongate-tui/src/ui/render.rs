use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use sessiongate_core::routes::View;
use sessiongate_core::LoginState;

use crate::app::{App, AppState, LoginFocus, HOSTS_PATH};

use super::styles;

/// Width of the login dialog
const DIALOG_WIDTH: u16 = 50;

/// Visible width of the text fields
const FIELD_WIDTH: usize = 24;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(8),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);

    // The guard runs on every frame, so a logout or cleared store takes
    // effect on the next draw
    match app.current_view() {
        View::Login => render_login(frame, app, chunks[1]),
        View::Protected(path) => render_home(frame, app, &path, chunks[1]),
        View::NotFound => render_not_found(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let session = if app.session.is_authenticated() {
        Span::styled("● signed in", styles::success_style())
    } else {
        Span::styled("○ signed out", styles::muted_style())
    };
    let line = Line::from(vec![
        Span::styled(" sessiongate ", styles::title_style()),
        Span::styled(format!(" {} ", app.location.path), styles::muted_style()),
        session,
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let form = app.login.form();
    let has_helper = form.helper_text.is_some();
    let height = if has_helper { 13 } else { 11 };
    let dialog = centered_rect_fixed(DIALOG_WIDTH, height, area);

    frame.render_widget(Clear, dialog);

    let mut lines = vec![
        Line::from(Span::styled("  Log in to your account", styles::title_style())),
        Line::from(Span::styled("  Enter your credentials.", styles::muted_style())),
        Line::from(""),
    ];

    // Username field
    let focused = app.login_focus == LoginFocus::Username;
    let cursor = if focused { "▌" } else { "" };
    let username = tail(&form.credentials.username, FIELD_WIDTH);
    lines.push(Line::from(vec![
        Span::styled("  Username: [", styles::label_style(form.username_valid)),
        Span::styled(
            format!("{:<width$}{}", username, cursor, width = FIELD_WIDTH),
            styles::field_style(focused),
        ),
        Span::styled("]", styles::label_style(form.username_valid)),
    ]));

    // Password field
    let focused = app.login_focus == LoginFocus::Password;
    let cursor = if focused { "▌" } else { "" };
    let masked = "*".repeat(form.credentials.password.chars().count().min(FIELD_WIDTH));
    lines.push(Line::from(vec![
        Span::styled("  Password: [", styles::label_style(form.password_valid)),
        Span::styled(
            format!("{:<width$}{}", masked, cursor, width = FIELD_WIDTH),
            styles::field_style(focused),
        ),
        Span::styled("]", styles::label_style(form.password_valid)),
    ]));

    // Remember me
    let focused = app.login_focus == LoginFocus::RememberMe;
    let mark = if form.credentials.remember_me { "x" } else { " " };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("[{}]", mark), styles::field_style(focused)),
        Span::styled(" Keep me logged in for 30 days.", styles::muted_style()),
    ]));

    // Login button
    lines.push(Line::from(""));
    let focused = app.login_focus == LoginFocus::Button;
    let label = match app.login.state() {
        LoginState::Submitting => " Logging in… ",
        _ if focused => " ▶ Log in ◀ ",
        _ => "   Log in   ",
    };
    lines.push(Line::from(vec![
        Span::raw("                ["),
        Span::styled(label, styles::field_style(focused)),
        Span::raw("]"),
    ]));

    // Helper text
    if let Some(ref helper) = form.helper_text {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  ! {}", helper),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

fn render_home(frame: &mut Frame, app: &App, path: &str, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(format!("Hosts ({})", HOSTS_PATH), styles::highlight_style())),
        Line::from(""),
    ];

    if app.hosts.loading {
        lines.push(Line::from(Span::styled("Loading…", styles::muted_style())));
    } else {
        match app.hosts.body {
            Some(ref body) => {
                lines.extend(body.lines().map(|l| Line::from(l.to_string())));
            }
            None => {
                lines.push(Line::from(Span::styled(
                    "Press r to load",
                    styles::muted_style(),
                )));
            }
        }
    }

    let block = Block::default()
        .title(format!(" {} ", path))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_not_found(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(Span::styled("404 - Page not found", styles::error_style())),
        Line::from(""),
        Line::from(Span::styled(
            format!("Nothing lives at {}", app.location.path),
            styles::muted_style(),
        )),
        Line::from(vec![
            Span::styled("Press ", styles::muted_style()),
            Span::styled("[h]", styles::help_key_style()),
            Span::styled(" to go home", styles::muted_style()),
        ]),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.current_view() {
        View::Login => "Tab next field · Space toggle · Enter log in · Esc quit",
        View::Protected(_) => "r refresh · L log out · q quit",
        View::NotFound => "h home · q quit",
    };
    let text = match app.status_message {
        Some(ref msg) => format!(" {} │ {}", msg, hints),
        None => format!(" {}", hints),
    };
    frame.render_widget(
        Paragraph::new(text).style(styles::status_bar_style()),
        area,
    );
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(DIALOG_WIDTH, 5, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Last `width` characters of `s`, so the caret end of a long value stays visible
fn tail(s: &str, width: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(width)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail() {
        assert_eq!(tail("alice", 10), "alice");
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("", 3), "");
    }

    #[test]
    fn test_centered_rect_clamps() {
        let r = centered_rect_fixed(50, 10, Rect::new(0, 0, 20, 5));
        assert_eq!(r, Rect::new(0, 0, 20, 5));
        let r = centered_rect_fixed(10, 4, Rect::new(0, 0, 30, 10));
        assert_eq!(r, Rect::new(10, 3, 10, 4));
    }
}
