//! Terminal UI module using ratatui.
//!
//! - `render`: frame rendering for the login, home and not-found views
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling

pub mod input;
pub mod render;
pub mod styles;
