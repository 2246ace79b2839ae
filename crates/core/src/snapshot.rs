use serde::Serialize;

use crate::events::AnswerOutcome;
use crate::power_ups::PowerUps;
use crate::round_state::{RoundPhase, RoundState};
use crate::types::{Difficulty, Mode, OPTION_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSnapshot {
    pub index: usize,
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub eliminated: [bool; OPTION_COUNT],
    /// Only revealed once the question has been answered or timed out.
    pub correct_option: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerUpsSnapshot {
    pub fifty_fifty: u32,
    pub extra_time: u32,
    pub double_points: u32,
    pub double_points_armed: bool,
}

impl PowerUpsSnapshot {
    fn new(power_ups: &PowerUps, double_points_armed: bool) -> Self {
        Self {
            fifty_fifty: power_ups.fifty_fifty,
            extra_time: power_ups.extra_time,
            double_points: power_ups.double_points,
            double_points_armed,
        }
    }
}

/// Read-only view of a round for renderers and remote observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    pub phase: RoundPhase,
    pub player: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub mode: Mode,
    pub question_index: usize,
    pub question_count: usize,
    pub question: Option<QuestionSnapshot>,
    pub selected: Option<usize>,
    pub submitted: bool,
    pub feedback_pending: bool,
    pub time_left: u32,
    pub score: u32,
    pub lives: u32,
    pub correct: u32,
    pub wrong: u32,
    pub skips_remaining: u32,
    pub hints_used: u32,
    pub hint_available: bool,
    pub power_ups: PowerUpsSnapshot,
    pub last_outcome: Option<AnswerOutcome>,
}

impl RoundSnapshot {
    pub fn playable(&self) -> bool {
        matches!(self.phase, RoundPhase::Active { .. }) && !self.submitted
    }

    pub fn is_ended(&self) -> bool {
        self.phase == RoundPhase::Ended
    }

    /// `1`-based progress label, e.g. `3/10`.
    pub fn progress_label(&self) -> String {
        let shown = (self.question_index + 1).min(self.question_count);
        format!("{}/{}", shown, self.question_count)
    }
}

impl From<&RoundState> for RoundSnapshot {
    fn from(state: &RoundState) -> Self {
        let config = state.config();
        let question = state.current_question().map(|q| QuestionSnapshot {
            index: state.current_index(),
            text: q.text.clone(),
            options: q.options.clone(),
            eliminated: *state.eliminated(),
            correct_option: state.answer_submitted().then_some(q.answer),
        });

        Self {
            phase: state.phase(),
            player: config.player_name.clone(),
            category: config.category.clone(),
            difficulty: config.difficulty,
            mode: config.mode,
            question_index: state.current_index(),
            question_count: state.question_count(),
            question,
            selected: state.selected_option(),
            submitted: state.answer_submitted(),
            feedback_pending: state.feedback_pending(),
            time_left: state.time_left_secs(),
            score: state.score(),
            lives: state.lives(),
            correct: state.correct_count(),
            wrong: state.wrong_count(),
            skips_remaining: state.skips_remaining(),
            hints_used: state.hints_used(),
            hint_available: state.hint_available(),
            power_ups: PowerUpsSnapshot::new(state.power_ups(), state.double_points_armed()),
            last_outcome: state.last_outcome().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::QuestionBank;
    use crate::generator::RoundGenerator;
    use crate::rng::SimpleRng;
    use crate::types::{RoundConfig, FEEDBACK_DELAY_MS};

    fn started() -> RoundState {
        let bank = QuestionBank::builtin();
        let config = RoundConfig::new("Ada", "science", Difficulty::Hard, Mode::Timed);
        let questions = RoundGenerator::new(5).generate(&bank, "science", Mode::Timed);
        let mut state = RoundState::new(config, questions, SimpleRng::new(5), "2026-03-04");
        state.start();
        state
    }

    #[test]
    fn test_snapshot_hides_answer_until_submitted() {
        let mut state = started();
        let snap = RoundSnapshot::from(&state);
        assert!(snap.playable());
        assert_eq!(snap.progress_label(), "1/2");
        assert_eq!(snap.question.as_ref().unwrap().correct_option, None);

        state.select_option(0);
        state.submit();
        let snap = RoundSnapshot::from(&state);
        assert!(!snap.playable());
        assert!(snap.feedback_pending);
        assert!(snap.question.as_ref().unwrap().correct_option.is_some());
        assert!(snap.last_outcome.is_some());
    }

    #[test]
    fn test_snapshot_after_end() {
        let mut state = started();
        for _ in 0..2 {
            state.skip();
        }
        let snap = RoundSnapshot::from(&state);
        assert!(snap.is_ended());
        assert!(snap.question.is_none());
        assert_eq!(snap.progress_label(), "2/2");

        state.tick(FEEDBACK_DELAY_MS);
        assert_eq!(RoundSnapshot::from(&state), snap);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let state = started();
        let json = serde_json::to_value(RoundSnapshot::from(&state)).unwrap();
        assert_eq!(json["timeLeft"], 15);
        assert_eq!(json["powerUps"]["fiftyFifty"], 1);
        assert_eq!(json["phase"]["phase"], "active");
        assert_eq!(json["mode"], "timed");
    }
}
