//! Core quiz logic - deterministic rounds, scoring and high scores
//!
//! This crate contains the quiz rules, the round state machine and the
//! high-score ledger. It has no dependencies on UI or networking; the only
//! I/O is the ledger's optional JSON file store.
//!
//! - **Deterministic**: the same seed deals the same questions and the same eliminations
//! - **Testable**: every rule is a plain method call plus `tick`
//! - **Shared questions**: rounds hold `Arc<Question>`s dealt from the bank
//!
//! # Module Structure
//!
//! - [`bank`]: categorized question store, built-in or loaded from JSON
//! - [`generator`]: deals a shuffled, truncated question list per round
//! - [`round_state`]: the round state machine (countdown, answers, skips, hints, power-ups)
//! - [`scoring`]: time-bracket points, accuracy, performance and achievements
//! - [`power_ups`]: power-up budgets and option elimination
//! - [`events`]: events a round emits for presentation
//! - [`ledger`]: persisted top-50 high-score list
//! - [`session`]: presentation-facing facade tying the above together
//!
//! # Quiz Rules
//!
//! | Rule | Value |
//! |------|-------|
//! | Time per question | 15 s, warning at 5 s |
//! | Points (correct) | < 5 s: 150, < 10 s: 100, else 50 |
//! | Double points | x2 on the next correct answer |
//! | Extra time | +10 s, may exceed 15 |
//! | 50:50 | removes two wrong options |
//! | Hints | one wrong option, 3 per round, unlocks after 10 s |
//! | Skips | 3 per round |
//! | Feedback delay | 2 s before the next question |
//! | Survival | 3 lives, each wrong answer or timeout costs one |
//!
//! # Example
//!
//! ```
//! use tui_quiz_core::{Ledger, MemoryStore, QuestionBank, QuizSession};
//! use tui_quiz_core::types::{Difficulty, Mode, RoundConfig};
//!
//! let ledger = Ledger::open(MemoryStore::new());
//! let mut session = QuizSession::new(QuestionBank::builtin(), ledger, 12345);
//! session.start(RoundConfig::new("Ada", "science", Difficulty::Easy, Mode::Timed));
//!
//! let answer = session.round().unwrap().current_question().unwrap().answer;
//! session.select_option(answer);
//! session.submit();
//! assert_eq!(session.snapshot().unwrap().score, 150);
//! ```
//!
//! # Timing
//!
//! Call [`QuizSession::tick`](session::QuizSession::tick) with the elapsed
//! milliseconds. The countdown moves in whole seconds; sub-second ticks
//! accumulate.

pub mod bank;
pub mod events;
pub mod generator;
pub mod ledger;
pub mod power_ups;
pub mod rng;
pub mod round_state;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use tui_quiz_types as types;

// Re-export commonly used types for convenience
pub use bank::{BankError, QuestionBank};
pub use events::{AnswerOutcome, QuizEvent, RoundSummary};
pub use generator::RoundGenerator;
pub use ledger::{
    JsonFileStore, Ledger, LedgerError, LedgerStore, MemoryStore, PlayerStats, ScoreRecord,
    LEDGER_FILE_NAME,
};
pub use power_ups::PowerUps;
pub use rng::SimpleRng;
pub use round_state::{RoundPhase, RoundState};
pub use scoring::{accuracy_percent, evaluate_achievements, score_answer, AnswerScore};
pub use session::{share_text, today, QuizSession};
pub use snapshot::{PowerUpsSnapshot, QuestionSnapshot, RoundSnapshot};
