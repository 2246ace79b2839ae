//! Events emitted by a round for the presentation layer.
//!
//! The round pushes events as it transitions; callers drain them with
//! [`RoundState::take_events`](crate::round_state::RoundState::take_events)
//! after each call and render them. Events carry everything a view needs, so
//! renderers never have to diff snapshots.

use serde::Serialize;

use crate::ledger::ScoreRecord;
use crate::types::{Achievement, PowerUpKind};

/// How one question ended (submission or timeout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub question_index: usize,
    pub selected: Option<usize>,
    pub correct_option: usize,
    pub correct: bool,
    pub timed_out: bool,
    pub points: u32,
    pub double_points_applied: bool,
    pub time_taken_secs: u32,
    pub explanation: String,
}

/// Final result of a round, handed to the ledger and the results view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSummary {
    pub record: ScoreRecord,
    pub wrong_count: u32,
    pub accuracy: u32,
    /// `score / (questions * 150)` clamped to `[0, 1]`.
    pub performance: f64,
    pub achievements: Vec<Achievement>,
    /// True when the player quit before the last question.
    pub quit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QuizEvent {
    #[serde(rename_all = "camelCase")]
    QuestionLoaded { index: usize, total: usize },
    #[serde(rename_all = "camelCase")]
    Tick { time_left: u32 },
    /// Fired once per countdown when exactly `LOW_TIME_WARNING_SECS` remain.
    #[serde(rename_all = "camelCase")]
    TimeLow { time_left: u32 },
    AnswerResult(AnswerOutcome),
    #[serde(rename_all = "camelCase")]
    LifeLost { lives_remaining: u32 },
    #[serde(rename_all = "camelCase")]
    Skipped { index: usize, skips_remaining: u32 },
    #[serde(rename_all = "camelCase")]
    HintUsed { removed: usize, hints_used: u32 },
    #[serde(rename_all = "camelCase")]
    PowerUpChanged {
        power_up: PowerUpKind,
        remaining: u32,
        double_points_armed: bool,
        removed: Vec<usize>,
    },
    RoundEnded(Box<RoundSummary>),
}

impl QuizEvent {
    /// Short machine-readable name (the serialized `kind`).
    pub fn name(&self) -> &'static str {
        match self {
            QuizEvent::QuestionLoaded { .. } => "questionLoaded",
            QuizEvent::Tick { .. } => "tick",
            QuizEvent::TimeLow { .. } => "timeLow",
            QuizEvent::AnswerResult(_) => "answerResult",
            QuizEvent::LifeLost { .. } => "lifeLost",
            QuizEvent::Skipped { .. } => "skipped",
            QuizEvent::HintUsed { .. } => "hintUsed",
            QuizEvent::PowerUpChanged { .. } => "powerUpChanged",
            QuizEvent::RoundEnded(_) => "roundEnded",
        }
    }
}
