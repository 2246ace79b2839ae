//! Quiz session - the presentation-facing facade
//!
//! A session owns the question bank, the round generator, the high-score
//! ledger and at most one round. Presentation code talks only to the session:
//! it starts rounds, forwards player actions, drives `tick`, and drains
//! events. Finished rounds are written to the ledger exactly once.

use tracing::{info, warn};

use crate::bank::QuestionBank;
use crate::events::{QuizEvent, RoundSummary};
use crate::generator::RoundGenerator;
use crate::ledger::{Ledger, LedgerStore, MemoryStore};
use crate::round_state::RoundState;
use crate::snapshot::RoundSnapshot;
use crate::types::{QuizAction, RoundConfig};

/// Today's date as `yyyy-mm-dd` (UTC).
pub fn today() -> String {
    time::OffsetDateTime::now_utc().date().to_string()
}

/// The text offered for sharing a finished round.
pub fn share_text(score: u32) -> String {
    format!("I scored {score} points on QuizMaster Pro! Can you beat my score?")
}

pub struct QuizSession<S: LedgerStore = MemoryStore> {
    bank: QuestionBank,
    generator: RoundGenerator,
    ledger: Ledger<S>,
    round: Option<RoundState>,
    last_config: Option<RoundConfig>,
    /// Rank of the last recorded round, `None` if it did not make the ledger.
    last_rank: Option<usize>,
    recorded: bool,
    /// Events drained from the round, plus any session-level ones.
    events: Vec<QuizEvent>,
    /// Fixed round date; `None` stamps rounds with [`today`].
    date_override: Option<String>,
}

impl<S: LedgerStore> QuizSession<S> {
    pub fn new(bank: QuestionBank, ledger: Ledger<S>, seed: u32) -> Self {
        Self {
            bank,
            generator: RoundGenerator::new(seed),
            ledger,
            round: None,
            last_config: None,
            last_rank: None,
            recorded: false,
            events: Vec::new(),
            date_override: None,
        }
    }

    /// Stamp every round with a fixed date instead of today's.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date_override = Some(date.into());
        self
    }

    /// Start a new round, discarding any round in progress.
    ///
    /// An unknown category falls back to the default one.
    pub fn start(&mut self, mut config: RoundConfig) {
        let category = self.bank.resolve(&config.category).to_string();
        if category != config.category {
            warn!(requested = %config.category, using = %category, "unknown category");
            config.category = category;
        }

        let questions = self.generator.generate(&self.bank, &config.category, config.mode);
        let rng = self.generator.fork_rng();
        let date = self.date_override.clone().unwrap_or_else(today);

        let mut round = RoundState::new(config.clone(), questions, rng, date);
        round.start();

        self.round = Some(round);
        self.last_config = Some(config);
        self.last_rank = None;
        self.recorded = false;
        self.events.clear();
        self.collect();
    }

    /// Play again with the previous configuration and a fresh shuffle.
    pub fn restart(&mut self) -> bool {
        match self.last_config.clone() {
            Some(config) => {
                self.start(config);
                true
            }
            None => false,
        }
    }

    pub fn select_option(&mut self, index: usize) -> bool {
        self.with_round(|r| r.select_option(index))
    }

    pub fn submit(&mut self) -> bool {
        self.with_round(RoundState::submit)
    }

    pub fn skip(&mut self) -> bool {
        self.with_round(RoundState::skip)
    }

    pub fn use_hint(&mut self) -> bool {
        self.with_round(RoundState::use_hint)
    }

    pub fn use_power_up(&mut self, kind: crate::types::PowerUpKind) -> bool {
        self.with_round(|r| r.use_power_up(kind))
    }

    /// Quit the round in progress; it is still recorded.
    pub fn end(&mut self) -> bool {
        self.with_round(RoundState::end)
    }

    pub fn tick(&mut self, elapsed_ms: u32) {
        self.with_round(|r| {
            r.tick(elapsed_ms);
            true
        });
    }

    /// Apply a player action. Returns whether it changed anything.
    pub fn apply_action(&mut self, action: QuizAction) -> bool {
        match action {
            QuizAction::Select(i) => self.select_option(i),
            QuizAction::Submit => self.submit(),
            QuizAction::Skip => self.skip(),
            QuizAction::Hint => self.use_hint(),
            QuizAction::PowerUp(kind) => self.use_power_up(kind),
            QuizAction::Quit => self.end(),
            QuizAction::Restart => self.restart(),
        }
    }

    pub fn take_events(&mut self) -> Vec<QuizEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Option<RoundSnapshot> {
        self.round.as_ref().map(RoundSnapshot::from)
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    pub fn summary(&self) -> Option<&RoundSummary> {
        self.round.as_ref().and_then(RoundState::summary)
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    pub fn last_config(&self) -> Option<&RoundConfig> {
        self.last_config.as_ref()
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger<S> {
        &mut self.ledger
    }

    /// Share text for the finished round, if there is one.
    pub fn share(&self) -> Option<String> {
        self.summary().map(|s| share_text(s.record.score))
    }

    fn with_round(&mut self, f: impl FnOnce(&mut RoundState) -> bool) -> bool {
        let Some(round) = self.round.as_mut() else {
            return false;
        };
        let changed = f(round);
        self.collect();
        changed
    }

    /// Move round events into the session queue and record a finished round.
    fn collect(&mut self) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        self.events.extend(round.take_events());

        if self.recorded {
            return;
        }
        let Some(summary) = round.summary() else {
            return;
        };
        self.recorded = true;

        match self.ledger.record(summary.record.clone()) {
            Ok(rank) => {
                self.last_rank = rank;
                info!(score = summary.record.score, rank = ?rank, "round recorded");
            }
            Err(e) => {
                warn!(error = %e, "failed to persist high score");
                // The in-memory ledger still holds the record.
                self.last_rank = self
                    .ledger
                    .entries()
                    .iter()
                    .position(|r| r == &summary.record)
                    .map(|p| p + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, Mode, PowerUpKind, FEEDBACK_DELAY_MS};

    fn session() -> QuizSession {
        QuizSession::new(QuestionBank::builtin(), Ledger::open(MemoryStore::new()), 11)
            .with_date("2026-05-06")
    }

    fn science() -> RoundConfig {
        RoundConfig::new("Ada", "science", Difficulty::Easy, Mode::Timed)
    }

    fn answer_correctly(s: &mut QuizSession) {
        let answer = s.round().unwrap().current_question().unwrap().answer;
        assert!(s.select_option(answer));
        assert!(s.submit());
        s.tick(FEEDBACK_DELAY_MS);
    }

    #[test]
    fn test_actions_without_round_are_noops() {
        let mut s = session();
        assert!(!s.submit());
        assert!(!s.restart());
        assert!(!s.end());
        s.tick(1000);
        assert!(s.snapshot().is_none());
        assert!(s.take_events().is_empty());
    }

    #[test]
    fn test_finished_round_is_recorded_once() {
        let mut s = session();
        s.start(science());
        answer_correctly(&mut s);
        answer_correctly(&mut s);

        let summary = s.summary().unwrap();
        assert_eq!(summary.record.score, 300);
        assert_eq!(summary.record.date, "2026-05-06");
        assert_eq!(s.ledger().len(), 1);
        assert_eq!(s.last_rank(), Some(1));

        s.tick(10_000);
        s.end();
        assert_eq!(s.ledger().len(), 1);
    }

    #[test]
    fn test_quit_round_is_recorded() {
        let mut s = session();
        s.start(science());
        assert!(s.apply_action(QuizAction::Quit));
        assert!(s.summary().unwrap().quit);
        assert_eq!(s.ledger().len(), 1);
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let mut s = session();
        s.start(RoundConfig::new("Ada", "astrology", Difficulty::Easy, Mode::Timed));
        let snap = s.snapshot().unwrap();
        assert_eq!(snap.category, "general");
        assert_eq!(snap.question_count, 2);
    }

    #[test]
    fn test_restart_reuses_config_and_resets_state() {
        let mut s = session();
        s.start(science());
        s.use_power_up(PowerUpKind::ExtraTime);
        s.skip();
        assert!(s.restart());

        let snap = s.snapshot().unwrap();
        assert_eq!(snap.category, "science");
        assert_eq!(snap.question_index, 0);
        assert_eq!(snap.skips_remaining, 3);
        assert_eq!(snap.power_ups.extra_time, 1);
        assert_eq!(snap.time_left, 15);
    }

    #[test]
    fn test_restart_cancels_pending_feedback() {
        let mut s = session();
        s.start(science());
        answer_correctly(&mut s);
        s.select_option(0);
        s.submit();
        s.restart();
        s.take_events();

        // The old round's feedback delay must not advance the new one.
        s.tick(FEEDBACK_DELAY_MS);
        assert_eq!(s.snapshot().unwrap().question_index, 0);
    }

    #[test]
    fn test_events_are_forwarded() {
        let mut s = session();
        s.start(science());
        let events = s.take_events();
        assert!(matches!(events[0], QuizEvent::QuestionLoaded { index: 0, total: 2 }));

        s.tick(1000);
        assert!(matches!(s.take_events()[0], QuizEvent::Tick { time_left: 14 }));
    }

    #[test]
    fn test_share_text() {
        let mut s = session();
        assert!(s.share().is_none());
        s.start(science());
        answer_correctly(&mut s);
        answer_correctly(&mut s);
        assert_eq!(
            s.share().unwrap(),
            "I scored 300 points on QuizMaster Pro! Can you beat my score?"
        );
    }

    #[test]
    fn test_today_is_iso_date() {
        let date = today();
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
        assert_eq!(&date[7..8], "-");
    }
}
