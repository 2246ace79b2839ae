//! Round generator - deals the questions for one round
//!
//! Looks up the category (unknown names fall back to `general`), shuffles a copy
//! of its question list with Fisher-Yates and truncates it to the mode's
//! question count.
//!
//! A category with fewer questions than the mode asks for produces a shorter
//! round. Questions are never repeated within a round.

use std::sync::Arc;

use crate::bank::QuestionBank;
use crate::rng::SimpleRng;
use crate::types::{Mode, Question};

#[derive(Debug, Clone)]
pub struct RoundGenerator {
    rng: SimpleRng,
}

impl RoundGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    pub fn from_rng(rng: SimpleRng) -> Self {
        Self { rng }
    }

    /// Deal the ordered question list for a round.
    pub fn generate(&mut self, bank: &QuestionBank, category: &str, mode: Mode) -> Vec<Arc<Question>> {
        let mut questions: Vec<Arc<Question>> = bank.questions(category).to_vec();
        self.rng.shuffle(&mut questions);
        questions.truncate(mode.question_count());

        tracing::debug!(
            requested = category,
            resolved = bank.resolve(category),
            mode = mode.as_str(),
            dealt = questions.len(),
            "generated round"
        );
        questions
    }

    /// Current RNG state; a generator built from it deals the same next round.
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }

    /// Child RNG for per-round randomness (eliminations), split off the main stream.
    pub fn fork_rng(&mut self) -> SimpleRng {
        SimpleRng::new(self.rng.next_u32())
    }
}

impl Default for RoundGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}
