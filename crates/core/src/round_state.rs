//! Round state module - the quiz round state machine
//!
//! A round moves `NotStarted → Active { index } → Ended`. Every mutation goes
//! through a named transition (`start`, `select_option`, `submit`, `skip`,
//! `use_hint`, `use_power_up`, `end`) or through [`RoundState::tick`], which
//! advances the three clocks the round owns:
//!
//! - the per-question countdown (15 s, whole-second steps, timeout at 0),
//! - the feedback delay armed after a submission or timeout (2 s),
//! - the hint cooldown (hints unlock 10 s into a question).
//!
//! The clocks live inside the round, so dropping or replacing a round cancels
//! anything still pending. Calls whose preconditions fail return `false` and
//! change nothing.

use std::sync::Arc;

use crate::events::{AnswerOutcome, QuizEvent, RoundSummary};
use crate::ledger::ScoreRecord;
use crate::power_ups::{eliminate_random, PowerUps, FIFTY_FIFTY_REMOVES, HINT_REMOVES};
use crate::rng::SimpleRng;
use crate::scoring::{
    accuracy_percent, evaluate_achievements, performance_ratio, score_answer, FinalTotals,
};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum RoundPhase {
    NotStarted,
    Active { index: usize },
    Ended,
}

#[derive(Debug, Clone)]
pub struct RoundState {
    config: RoundConfig,
    questions: Vec<Arc<Question>>,
    phase: RoundPhase,
    current_index: usize,
    score: u32,
    lives: u32,
    correct: u32,
    wrong: u32,
    selected: Option<usize>,
    submitted: bool,
    eliminated: [bool; OPTION_COUNT],
    time_left_secs: u32,
    /// Milliseconds into the current countdown second.
    second_ms: u32,
    /// Time the current question's countdown has been running.
    question_elapsed_ms: u32,
    total_elapsed_ms: u64,
    /// Remaining feedback delay; `Some` only between an answer and the next question.
    feedback_ms: Option<u32>,
    skips_remaining: u32,
    hints_used: u32,
    hint_used_this_question: bool,
    power_ups: PowerUps,
    double_points_armed: bool,
    last_outcome: Option<AnswerOutcome>,
    summary: Option<RoundSummary>,
    /// ISO date stamped on the score record.
    date: String,
    rng: SimpleRng,
    events: Vec<QuizEvent>,
}

impl RoundState {
    /// Create a round over an already generated question list.
    pub fn new(
        config: RoundConfig,
        questions: Vec<Arc<Question>>,
        rng: SimpleRng,
        date: impl Into<String>,
    ) -> Self {
        let lives = config.mode.starting_lives();
        Self {
            config,
            questions,
            phase: RoundPhase::NotStarted,
            current_index: 0,
            score: 0,
            lives,
            correct: 0,
            wrong: 0,
            selected: None,
            submitted: false,
            eliminated: [false; OPTION_COUNT],
            time_left_secs: QUESTION_TIME_SECS,
            second_ms: 0,
            question_elapsed_ms: 0,
            total_elapsed_ms: 0,
            feedback_ms: None,
            skips_remaining: SKIPS_PER_ROUND,
            hints_used: 0,
            hint_used_this_question: false,
            power_ups: PowerUps::new(),
            double_points_armed: false,
            last_outcome: None,
            summary: None,
            date: date.into(),
            rng,
            events: Vec::new(),
        }
    }

    /// Reset every counter for the mode and load the first question.
    ///
    /// A round without questions ends immediately.
    pub fn start(&mut self) -> bool {
        if self.phase != RoundPhase::NotStarted {
            return false;
        }

        self.current_index = 0;
        self.score = 0;
        self.lives = self.config.mode.starting_lives();
        self.correct = 0;
        self.wrong = 0;
        self.total_elapsed_ms = 0;
        self.skips_remaining = SKIPS_PER_ROUND;
        self.hints_used = 0;
        self.power_ups = PowerUps::new();
        self.double_points_armed = false;
        self.last_outcome = None;

        tracing::debug!(
            player = %self.config.player_name,
            category = %self.config.category,
            mode = self.config.mode.as_str(),
            questions = self.questions.len(),
            "round started"
        );

        if self.questions.is_empty() {
            self.finish(false);
        } else {
            self.load_question();
        }
        true
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, RoundPhase::Active { .. })
    }

    pub fn is_ended(&self) -> bool {
        self.phase == RoundPhase::Ended
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Arc<Question>> {
        match self.phase {
            RoundPhase::Active { index } => self.questions.get(index),
            _ => None,
        }
    }

    pub fn questions(&self) -> &[Arc<Question>] {
        &self.questions
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong
    }

    pub fn selected_option(&self) -> Option<usize> {
        self.selected
    }

    pub fn answer_submitted(&self) -> bool {
        self.submitted
    }

    pub fn eliminated(&self) -> &[bool; OPTION_COUNT] {
        &self.eliminated
    }

    pub fn time_left_secs(&self) -> u32 {
        self.time_left_secs
    }

    pub fn question_elapsed_ms(&self) -> u32 {
        self.question_elapsed_ms
    }

    pub fn total_elapsed_secs(&self) -> u32 {
        (self.total_elapsed_ms / 1000) as u32
    }

    pub fn feedback_pending(&self) -> bool {
        self.feedback_ms.is_some()
    }

    pub fn skips_remaining(&self) -> u32 {
        self.skips_remaining
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn power_ups(&self) -> &PowerUps {
        &self.power_ups
    }

    pub fn double_points_armed(&self) -> bool {
        self.double_points_armed
    }

    pub fn last_outcome(&self) -> Option<&AnswerOutcome> {
        self.last_outcome.as_ref()
    }

    /// Final result once the round has ended.
    pub fn summary(&self) -> Option<&RoundSummary> {
        self.summary.as_ref()
    }

    /// Whether the answer phase of the current question is open.
    fn accepting_input(&self) -> bool {
        self.is_active() && !self.submitted
    }

    /// Whether `use_hint` would currently be allowed (ignoring eligibility of options).
    pub fn hint_available(&self) -> bool {
        self.accepting_input()
            && self.hints_used < MAX_HINTS_PER_ROUND
            && !self.hint_used_this_question
            && self.question_elapsed_ms >= HINT_COOLDOWN_MS
    }

    /// Milliseconds until the hint cooldown of the current question expires.
    pub fn hint_ready_in_ms(&self) -> u32 {
        HINT_COOLDOWN_MS.saturating_sub(self.question_elapsed_ms)
    }

    /// Take all events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<QuizEvent> {
        std::mem::take(&mut self.events)
    }

    /// Record the option the player is leaning towards.
    ///
    /// Re-selecting overwrites. Eliminated options cannot be selected.
    pub fn select_option(&mut self, index: usize) -> bool {
        if !self.accepting_input() || index >= OPTION_COUNT || self.eliminated[index] {
            return false;
        }
        self.selected = Some(index);
        true
    }

    /// Lock in the selected option, score it and arm the feedback delay.
    pub fn submit(&mut self) -> bool {
        if !self.accepting_input() {
            return false;
        }
        let Some(selected) = self.selected else {
            return false;
        };
        let Some(question) = self.current_question().cloned() else {
            return false;
        };

        self.close_question();

        let time_taken_secs = self.question_elapsed_ms / 1000;
        let is_correct = question.is_correct(selected);
        let armed = if self.double_points_armed {
            self.power_ups.double_points
        } else {
            0
        };
        let result = score_answer(time_taken_secs, is_correct, armed);

        if result.double_points_consumed {
            self.power_ups.consume(PowerUpKind::DoublePoints);
            self.double_points_armed = false;
            self.events.push(QuizEvent::PowerUpChanged {
                power_up: PowerUpKind::DoublePoints,
                remaining: self.power_ups.double_points,
                double_points_armed: false,
                removed: Vec::new(),
            });
        }

        if is_correct {
            self.score = self.score.saturating_add(result.points);
            self.correct += 1;
        } else {
            self.wrong += 1;
        }

        let outcome = AnswerOutcome {
            question_index: self.current_index,
            selected: Some(selected),
            correct_option: question.answer,
            correct: is_correct,
            timed_out: false,
            points: result.points,
            double_points_applied: result.double_points_consumed,
            time_taken_secs,
            explanation: question.explanation.clone(),
        };
        tracing::debug!(
            index = self.current_index,
            correct = is_correct,
            points = result.points,
            time_taken_secs,
            "answer submitted"
        );
        self.finish_question(outcome, !is_correct);
        true
    }

    /// Skip the current question: no scoring, no delay.
    pub fn skip(&mut self) -> bool {
        if !self.accepting_input() || self.skips_remaining == 0 {
            return false;
        }
        self.skips_remaining -= 1;
        self.close_question();
        self.events.push(QuizEvent::Skipped {
            index: self.current_index,
            skips_remaining: self.skips_remaining,
        });
        tracing::debug!(index = self.current_index, skips_remaining = self.skips_remaining, "question skipped");
        self.advance();
        true
    }

    /// Eliminate one wrong, unselected option.
    ///
    /// Limited to one per question and `MAX_HINTS_PER_ROUND` per round, and only
    /// after the cooldown. Nothing is spent when no option is eligible.
    pub fn use_hint(&mut self) -> bool {
        if !self.hint_available() {
            return false;
        }
        let Some(question) = self.current_question().cloned() else {
            return false;
        };

        let removed = eliminate_random(
            &question,
            self.selected,
            &mut self.eliminated,
            HINT_REMOVES,
            &mut self.rng,
        );
        let Some(&option) = removed.first() else {
            return false;
        };

        self.hints_used += 1;
        self.hint_used_this_question = true;
        self.events.push(QuizEvent::HintUsed {
            removed: option,
            hints_used: self.hints_used,
        });
        true
    }

    /// Activate a power-up on the current question.
    ///
    /// Double points only arms here; its charge is spent by the next correct answer.
    pub fn use_power_up(&mut self, kind: PowerUpKind) -> bool {
        if !self.accepting_input() || !self.power_ups.available(kind) {
            return false;
        }

        let mut removed = Vec::new();
        match kind {
            PowerUpKind::FiftyFifty => {
                let Some(question) = self.current_question().cloned() else {
                    return false;
                };
                let gone = eliminate_random(
                    &question,
                    self.selected,
                    &mut self.eliminated,
                    FIFTY_FIFTY_REMOVES,
                    &mut self.rng,
                );
                if gone.is_empty() {
                    return false;
                }
                removed.extend(gone);
                self.power_ups.consume(kind);
            }
            PowerUpKind::ExtraTime => {
                self.time_left_secs = self.time_left_secs.saturating_add(EXTRA_TIME_SECS);
                self.power_ups.consume(kind);
            }
            PowerUpKind::DoublePoints => {
                if self.double_points_armed {
                    return false;
                }
                self.double_points_armed = true;
            }
        }

        self.events.push(QuizEvent::PowerUpChanged {
            power_up: kind,
            remaining: self.power_ups.count(kind),
            double_points_armed: self.double_points_armed,
            removed,
        });
        true
    }

    /// Quit the round. It is finalized and recorded like a completed one.
    pub fn end(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        if !self.submitted {
            self.close_question();
        }
        self.finish(true);
        true
    }

    /// Advance the round's clocks by `elapsed_ms`.
    ///
    /// While an answer is open the countdown runs; after one it is the feedback
    /// delay that runs, and the next question loads when it expires.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if !self.is_active() {
            return;
        }

        if let Some(remaining) = self.feedback_ms {
            let left = remaining.saturating_sub(elapsed_ms);
            if left == 0 {
                self.feedback_ms = None;
                self.advance();
            } else {
                self.feedback_ms = Some(left);
            }
            return;
        }

        let mut budget = elapsed_ms;
        while budget > 0 && self.accepting_input() {
            let step = budget.min(1000 - self.second_ms);
            budget -= step;
            self.second_ms += step;
            self.question_elapsed_ms = self.question_elapsed_ms.saturating_add(step);

            if self.second_ms < 1000 {
                continue;
            }
            self.second_ms = 0;
            self.time_left_secs = self.time_left_secs.saturating_sub(1);
            self.events.push(QuizEvent::Tick {
                time_left: self.time_left_secs,
            });
            if self.time_left_secs == LOW_TIME_WARNING_SECS {
                self.events.push(QuizEvent::TimeLow {
                    time_left: self.time_left_secs,
                });
            }
            if self.time_left_secs == 0 {
                self.timeout();
            }
        }
    }

    /// Countdown expired: a wrong answer worth nothing. Fires at most once per question.
    fn timeout(&mut self) {
        if !self.accepting_input() {
            return;
        }
        let Some(question) = self.current_question().cloned() else {
            return;
        };

        self.close_question();
        self.wrong += 1;

        let outcome = AnswerOutcome {
            question_index: self.current_index,
            selected: self.selected,
            correct_option: question.answer,
            correct: false,
            timed_out: true,
            points: 0,
            double_points_applied: false,
            time_taken_secs: self.question_elapsed_ms / 1000,
            explanation: question.explanation.clone(),
        };
        tracing::debug!(index = self.current_index, "question timed out");
        self.finish_question(outcome, true);
    }

    /// Stop the countdown and bank the question's elapsed time.
    fn close_question(&mut self) {
        self.submitted = true;
        self.total_elapsed_ms += self.question_elapsed_ms as u64;
    }

    fn finish_question(&mut self, outcome: AnswerOutcome, wrong: bool) {
        self.events.push(QuizEvent::AnswerResult(outcome.clone()));
        self.last_outcome = Some(outcome);

        if wrong && self.config.mode == Mode::Survival {
            self.lives = self.lives.saturating_sub(1);
            self.events.push(QuizEvent::LifeLost {
                lives_remaining: self.lives,
            });
        }

        self.feedback_ms = Some(FEEDBACK_DELAY_MS);
    }

    /// Move past the current question, ending the round when nothing is left.
    fn advance(&mut self) {
        if !self.is_active() {
            return;
        }
        self.current_index += 1;

        let out_of_questions = self.current_index >= self.questions.len();
        let out_of_lives = self.config.mode == Mode::Survival && self.lives == 0;
        if out_of_questions || out_of_lives {
            self.finish(false);
        } else {
            self.load_question();
        }
    }

    fn load_question(&mut self) {
        self.phase = RoundPhase::Active {
            index: self.current_index,
        };
        self.selected = None;
        self.submitted = false;
        self.eliminated = [false; OPTION_COUNT];
        self.time_left_secs = QUESTION_TIME_SECS;
        self.second_ms = 0;
        self.question_elapsed_ms = 0;
        self.feedback_ms = None;
        self.hint_used_this_question = false;

        self.events.push(QuizEvent::QuestionLoaded {
            index: self.current_index,
            total: self.questions.len(),
        });
    }

    /// Compute totals, achievements and the score record, then enter `Ended`.
    fn finish(&mut self, quit: bool) {
        self.phase = RoundPhase::Ended;
        self.feedback_ms = None;
        self.submitted = true;

        let question_count = self.questions.len();
        let accuracy = accuracy_percent(self.correct, question_count);
        let performance = performance_ratio(self.score, question_count);
        let total_elapsed_secs = self.total_elapsed_secs();
        let achievements = evaluate_achievements(&FinalTotals {
            score: self.score,
            accuracy,
            total_elapsed_secs,
            correct: self.correct,
            hints_used: self.hints_used,
        });

        let record = ScoreRecord {
            player: self.config.player_name.clone(),
            score: self.score,
            category: self.config.category.clone(),
            difficulty: self.config.difficulty,
            date: self.date.clone(),
            total_elapsed_secs,
            correct_count: self.correct,
            total_questions: question_count as u32,
        };
        let summary = RoundSummary {
            record,
            wrong_count: self.wrong,
            accuracy,
            performance,
            achievements: achievements.to_vec(),
            quit,
        };

        tracing::info!(
            player = %summary.record.player,
            score = self.score,
            correct = self.correct,
            wrong = self.wrong,
            accuracy,
            quit,
            "round ended"
        );

        self.summary = Some(summary.clone());
        self.events.push(QuizEvent::RoundEnded(Box::new(summary)));
    }
}
