//! TUI Quiz (workspace facade crate).
//!
//! Re-exports the workspace crates as `tui_quiz::{core,adapter,term,input,types}`
//! and holds the terminal app's screen flow and configuration.

pub mod app;
pub mod config;

pub use tui_quiz_adapter as adapter;
pub use tui_quiz_core as core;
pub use tui_quiz_input as input;
pub use tui_quiz_term as term;
pub use tui_quiz_types as types;

pub use app::{App, Screen};
pub use config::{init_logging, AppConfig};
