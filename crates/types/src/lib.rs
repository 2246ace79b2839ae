//! Core types module - shared data structures and constants
//!
//! This crate defines the fundamental types used throughout the quiz.
//! Everything here is plain data, usable from the round engine, the terminal
//! views and the remote-control protocol alike.
//!
//! # Round Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `QUESTION_TIME_SECS` | 15 | Countdown per question |
//! | `LOW_TIME_WARNING_SECS` | 5 | Remaining seconds that trigger the low-time warning |
//! | `FEEDBACK_DELAY_MS` | 2000 | Pause after an answer/timeout before the next question |
//! | `HINT_COOLDOWN_MS` | 10000 | Hints unlock this long after a question starts |
//! | `EXTRA_TIME_SECS` | 10 | Seconds added by the extra-time power-up |
//! | `TICK_MS` | 50 | Fixed loop interval used by the terminal runner |
//!
//! # Scoring
//!
//! A correct answer earns 150 points below 5 seconds, 100 points below
//! 10 seconds and 50 points otherwise. Double points doubles one answer.
//!
//! # Examples
//!
//! ```
//! use tui_quiz_types::{Mode, PowerUpKind, QuizAction};
//!
//! let mode = Mode::from_str("Survival").unwrap();
//! assert_eq!(mode, Mode::Survival);
//! assert_eq!(mode.question_count(), 10);
//! assert_eq!(mode.starting_lives(), 3);
//!
//! let action = QuizAction::from_str("fiftyFifty").unwrap();
//! assert_eq!(action, QuizAction::PowerUp(PowerUpKind::FiftyFifty));
//! ```

use serde::{Deserialize, Serialize};

/// Number of answer options on every question.
pub const OPTION_COUNT: usize = 4;

/// Countdown per question in seconds.
pub const QUESTION_TIME_SECS: u32 = 15;

/// Remaining seconds at which the low-time warning fires.
pub const LOW_TIME_WARNING_SECS: u32 = 5;

/// Delay between an answer (or timeout) and the next question.
pub const FEEDBACK_DELAY_MS: u32 = 2000;

/// Hints become available this long after a question is loaded.
pub const HINT_COOLDOWN_MS: u32 = 10_000;

/// Seconds added by the extra-time power-up.
pub const EXTRA_TIME_SECS: u32 = 10;

/// Hints available per round.
pub const MAX_HINTS_PER_ROUND: u32 = 3;

/// Skips available per round.
pub const SKIPS_PER_ROUND: u32 = 3;

/// Charges of each power-up at round start.
pub const POWER_UP_BUDGET: u32 = 1;

/// Lives in survival mode (every other mode has a single life).
pub const SURVIVAL_LIVES: u32 = 3;

/// Questions per round in timed and survival mode.
pub const STANDARD_QUESTION_COUNT: usize = 10;

/// Questions per round in marathon mode.
pub const MARATHON_QUESTION_COUNT: usize = 20;

/// Points for a correct answer under `FAST_ANSWER_SECS`.
pub const POINTS_FAST: u32 = 150;

/// Points for a correct answer under `MEDIUM_ANSWER_SECS`.
pub const POINTS_MEDIUM: u32 = 100;

/// Points for any slower correct answer.
pub const POINTS_SLOW: u32 = 50;

/// Exclusive upper bound (seconds) of the fast bracket.
pub const FAST_ANSWER_SECS: u32 = 5;

/// Exclusive upper bound (seconds) of the medium bracket.
pub const MEDIUM_ANSWER_SECS: u32 = 10;

/// Best possible points for one question without double points.
///
/// Used as the denominator of the performance ratio.
pub const MAX_POINTS_PER_QUESTION: u32 = POINTS_FAST;

/// Maximum number of persisted score records.
pub const LEDGER_CAPACITY: usize = 50;

/// Rows shown on the results-screen leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// Category used when the requested one does not exist.
pub const DEFAULT_CATEGORY: &str = "general";

/// Fixed loop interval of the terminal runner in milliseconds.
pub const TICK_MS: u32 = 50;


/// A single multiple-choice question.
///
/// Field names on the wire follow the question-bank format
/// (`question`, `options`, `answer`, `explanation`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: [String; OPTION_COUNT],
    /// Index of the correct option.
    pub answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: [&str; OPTION_COUNT],
        answer: usize,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options: options.map(str::to_string),
            answer,
            explanation: explanation.into(),
        }
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.answer
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

/// Round mode
///
/// - **Timed**: 10 questions, one life
/// - **Survival**: 10 questions, three lives; losing all ends the round
/// - **Marathon**: 20 questions, one life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Timed,
    Survival,
    Marathon,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Timed, Mode::Survival, Mode::Marathon];

    /// Parse mode from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "timed" => Some(Mode::Timed),
            "survival" => Some(Mode::Survival),
            "marathon" => Some(Mode::Marathon),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Timed => "timed",
            Mode::Survival => "survival",
            Mode::Marathon => "marathon",
        }
    }

    /// Questions requested for a round in this mode.
    pub fn question_count(&self) -> usize {
        match self {
            Mode::Marathon => MARATHON_QUESTION_COUNT,
            Mode::Timed | Mode::Survival => STANDARD_QUESTION_COUNT,
        }
    }

    pub fn starting_lives(&self) -> u32 {
        match self {
            Mode::Survival => SURVIVAL_LIVES,
            Mode::Timed | Mode::Marathon => 1,
        }
    }

    /// Next mode in menu order (wraps).
    pub fn cycle(&self) -> Self {
        match self {
            Mode::Timed => Mode::Survival,
            Mode::Survival => Mode::Marathon,
            Mode::Marathon => Mode::Timed,
        }
    }
}

/// Difficulty label chosen on the start screen.
///
/// It is carried into the score record and shown as a badge; it does not
/// change question selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

/// Limited-use abilities, each with its own per-round budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerUpKind {
    /// Eliminate two wrong options
    FiftyFifty,
    /// Add ten seconds to the countdown
    ExtraTime,
    /// Double the next correct answer
    DoublePoints,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::FiftyFifty,
        PowerUpKind::ExtraTime,
        PowerUpKind::DoublePoints,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fiftyfifty" | "50:50" => Some(PowerUpKind::FiftyFifty),
            "extratime" => Some(PowerUpKind::ExtraTime),
            "doublepoints" => Some(PowerUpKind::DoublePoints),
            _ => None,
        }
    }

    /// camelCase name used by the remote-control protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::FiftyFifty => "fiftyFifty",
            PowerUpKind::ExtraTime => "extraTime",
            PowerUpKind::DoublePoints => "doublePoints",
        }
    }

    /// Short label for the terminal view
    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::FiftyFifty => "50:50",
            PowerUpKind::ExtraTime => "+10s",
            PowerUpKind::DoublePoints => "x2",
        }
    }
}

/// Player actions during a round
///
/// These are issued by both the keyboard and remote controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizAction {
    /// Select option by index (0-based)
    Select(usize),
    /// Submit the selected option
    Submit,
    /// Skip the current question
    Skip,
    /// Eliminate one wrong option
    Hint,
    /// Activate a power-up
    PowerUp(PowerUpKind),
    /// Quit the round (it is still recorded)
    Quit,
    /// Start a new round with the same configuration
    Restart,
}

impl QuizAction {
    /// Parse action from string (for the remote-control protocol)
    ///
    /// Selections are written `select0` .. `select3`; power-ups use their
    /// camelCase names.
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_quiz_types::QuizAction;
    ///
    /// assert_eq!(QuizAction::from_str("submit"), Some(QuizAction::Submit));
    /// assert_eq!(QuizAction::from_str("select2"), Some(QuizAction::Select(2)));
    /// assert_eq!(QuizAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if let Some(idx) = lower.strip_prefix("select") {
            return idx
                .parse::<usize>()
                .ok()
                .filter(|&i| i < OPTION_COUNT)
                .map(QuizAction::Select);
        }
        match lower.as_str() {
            "submit" => Some(QuizAction::Submit),
            "skip" => Some(QuizAction::Skip),
            "hint" => Some(QuizAction::Hint),
            "quit" => Some(QuizAction::Quit),
            "restart" => Some(QuizAction::Restart),
            other => PowerUpKind::from_str(other).map(QuizAction::PowerUp),
        }
    }

    pub fn name(&self) -> String {
        match self {
            QuizAction::Select(i) => format!("select{i}"),
            QuizAction::Submit => "submit".to_string(),
            QuizAction::Skip => "skip".to_string(),
            QuizAction::Hint => "hint".to_string(),
            QuizAction::PowerUp(kind) => kind.as_str().to_string(),
            QuizAction::Quit => "quit".to_string(),
            QuizAction::Restart => "restart".to_string(),
        }
    }
}

/// Achievements unlocked at round end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Achievement {
    QuizMaster,
    PerfectScore,
    SpeedDemon,
    NoHelpNeeded,
}

impl Achievement {
    pub fn title(&self) -> &'static str {
        match self {
            Achievement::QuizMaster => "Quiz Master",
            Achievement::PerfectScore => "Perfect Score",
            Achievement::SpeedDemon => "Speed Demon",
            Achievement::NoHelpNeeded => "No Help Needed",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::QuizMaster => "Score 1000+ points",
            Achievement::PerfectScore => "Get all questions right",
            Achievement::SpeedDemon => "Complete quiz in under 60 seconds",
            Achievement::NoHelpNeeded => "Answer 5+ questions without hints",
        }
    }
}

/// Settings fixed for the whole round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundConfig {
    pub player_name: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub mode: Mode,
}

impl RoundConfig {
    pub fn new(
        player_name: impl Into<String>,
        category: impl Into<String>,
        difficulty: Difficulty,
        mode: Mode,
    ) -> Self {
        let player_name = player_name.into();
        let player_name = if player_name.trim().is_empty() {
            "Player".to_string()
        } else {
            player_name
        };
        Self {
            player_name,
            category: category.into(),
            difficulty,
            mode,
        }
    }

    /// Questions requested for this round (the bank may supply fewer).
    pub fn question_count(&self) -> usize {
        self.mode.question_count()
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self::new("Player", DEFAULT_CATEGORY, Difficulty::Medium, Mode::Timed)
    }
}
