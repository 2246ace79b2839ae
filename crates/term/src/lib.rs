//! Terminal quiz renderer.
//!
//! A small rendering layer for terminal play. It avoids widget toolkits and
//! renders every screen into a framebuffer that is diffed and flushed to the
//! terminal.
//!
//! - [`fb`]: styled cell framebuffer and the quiz palette
//! - [`quiz_view`]: pure screen layouts (menu, question, results, high scores)
//! - [`renderer`]: crossterm backend with run-length diffing

pub mod fb;
pub mod quiz_view;
pub mod renderer;

pub use tui_quiz_core as core;
pub use tui_quiz_types as types;

pub use fb::{palette, Cell, CellStyle, FrameBuffer, Rgb};
pub use quiz_view::{
    notice_for, AdapterStatusView, MenuView, Notice, QuizView, ResultsView, Tone, Viewport,
};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
