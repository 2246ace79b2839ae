//! Key mapping from terminal events to quiz and menu actions.

use crate::types::{PowerUpKind, QuizAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions available outside a running question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    PrevCategory,
    NextCategory,
    CycleMode,
    CycleDifficulty,
    /// Start a round, or go back to the menu from a results screen.
    Confirm,
    Restart,
    ShowHighScores,
    ClearHighScores,
    Back,
    Exit,
}

/// Map keyboard input to quiz actions while a question is shown.
///
/// `1`-`4` select, Enter submits, Space skips (the browser shortcuts), the
/// remaining letters trigger hints and power-ups.
pub fn handle_key_event(key: KeyEvent) -> Option<QuizAction> {
    match key.code {
        // Options
        KeyCode::Char(c @ '1'..='4') => Some(QuizAction::Select(c as usize - '1' as usize)),

        // Answer flow
        KeyCode::Enter => Some(QuizAction::Submit),
        KeyCode::Char(' ') => Some(QuizAction::Skip),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(QuizAction::Hint),

        // Power-ups
        KeyCode::Char('f') | KeyCode::Char('F') => Some(QuizAction::PowerUp(PowerUpKind::FiftyFifty)),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(QuizAction::PowerUp(PowerUpKind::ExtraTime)),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(QuizAction::PowerUp(PowerUpKind::DoublePoints)),

        // Leave the round
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(QuizAction::Quit),

        _ => None,
    }
}

/// Map keyboard input on the menu, results and high-score screens.
pub fn handle_menu_key(key: KeyEvent) -> Option<MenuAction> {
    match key.code {
        KeyCode::Left | KeyCode::Char('k') | KeyCode::Char('K') => Some(MenuAction::PrevCategory),
        KeyCode::Right | KeyCode::Char('j') | KeyCode::Char('J') => Some(MenuAction::NextCategory),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(MenuAction::CycleMode),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(MenuAction::CycleDifficulty),
        KeyCode::Enter => Some(MenuAction::Confirm),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(MenuAction::Restart),
        KeyCode::Char('l') | KeyCode::Char('L') => Some(MenuAction::ShowHighScores),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(MenuAction::ClearHighScores),
        KeyCode::Esc | KeyCode::Backspace => Some(MenuAction::Back),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(MenuAction::Exit),
        _ => None,
    }
}

/// Check if key should exit the program from any screen.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}
