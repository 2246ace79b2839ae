//! Terminal input module (session-facing).
//!
//! This module is independent of any UI framework beyond `crossterm` key
//! events. It maps keys into [`crate::types::QuizAction`]s while a question is
//! on screen and into [`MenuAction`]s on the other screens.

pub mod map;

pub use tui_quiz_types as types;

pub use map::{handle_key_event, handle_menu_key, should_quit, MenuAction};
