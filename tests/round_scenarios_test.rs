//! End-to-end round scenarios through the session facade.

use std::collections::BTreeMap;

use tui_quiz::core::{Ledger, MemoryStore, QuestionBank, QuizEvent, QuizSession, RoundPhase};
use tui_quiz::types::{
    Achievement, Difficulty, Mode, PowerUpKind, Question, QuizAction, RoundConfig,
    FEEDBACK_DELAY_MS, QUESTION_TIME_SECS,
};

fn session_with(bank: QuestionBank, seed: u32) -> QuizSession {
    QuizSession::new(bank, Ledger::open(MemoryStore::new()), seed).with_date("2024-05-01")
}

fn numbers_bank(count: usize) -> QuestionBank {
    let questions = (0..count)
        .map(|i| {
            Question::new(
                format!("What is {i} + 1?"),
                ["zero", "one", "two", "three"],
                (i + 1) % 4,
                "",
            )
        })
        .collect();
    let mut categories = BTreeMap::new();
    categories.insert("numbers".to_string(), questions);
    QuestionBank::new(categories).unwrap()
}

fn current_answer(session: &QuizSession) -> usize {
    session.round().unwrap().current_question().unwrap().answer
}

fn answer_correctly(session: &mut QuizSession, secs: u32) {
    session.tick(secs * 1000);
    let answer = current_answer(session);
    assert!(session.select_option(answer));
    assert!(session.submit());
    session.tick(FEEDBACK_DELAY_MS);
}

#[test]
fn science_round_with_two_quick_answers() {
    let mut session = session_with(QuestionBank::builtin(), 12345);
    session.start(RoundConfig::new("Ada", "science", Difficulty::Easy, Mode::Timed));
    assert_eq!(session.round().unwrap().question_count(), 2);

    answer_correctly(&mut session, 3);
    answer_correctly(&mut session, 4);

    let summary = session.summary().expect("round should be over");
    assert_eq!(summary.record.score, 300);
    assert_eq!(summary.record.correct_count, 2);
    assert_eq!(summary.record.total_questions, 2);
    assert_eq!(summary.record.total_elapsed_secs, 7);
    assert_eq!(summary.accuracy, 100);
    assert!(summary.achievements.contains(&Achievement::PerfectScore));
    assert!(summary.achievements.contains(&Achievement::SpeedDemon));
    assert!(!summary.achievements.contains(&Achievement::QuizMaster));

    assert_eq!(session.last_rank(), Some(1));
    assert_eq!(session.ledger().len(), 1);
    assert_eq!(session.share().unwrap(), "I scored 300 points on QuizMaster Pro! Can you beat my score?");
}

#[test]
fn survival_ends_after_three_timeouts() {
    let mut session = session_with(numbers_bank(6), 9);
    session.start(RoundConfig::new("Bo", "numbers", Difficulty::Medium, Mode::Survival));
    session.take_events();

    let mut lives = Vec::new();
    for _ in 0..3 {
        assert!(session.round().unwrap().is_active());
        session.tick(QUESTION_TIME_SECS * 1000);
        lives.push(session.round().unwrap().lives());
        session.tick(FEEDBACK_DELAY_MS);
    }

    assert_eq!(lives, vec![2, 1, 0]);
    let round = session.round().unwrap();
    assert_eq!(round.phase(), RoundPhase::Ended);
    assert_eq!(round.wrong_count(), 3);

    let events = session.take_events();
    let lost: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            QuizEvent::LifeLost { lives_remaining } => Some(*lives_remaining),
            _ => None,
        })
        .collect();
    assert_eq!(lost, vec![2, 1, 0]);
    assert!(matches!(events.last(), Some(QuizEvent::RoundEnded(_))));
}

#[test]
fn survival_waits_for_feedback_before_ending() {
    let mut session = session_with(numbers_bank(6), 9);
    session.start(RoundConfig::new("Bo", "numbers", Difficulty::Medium, Mode::Survival));
    for _ in 0..2 {
        session.tick(QUESTION_TIME_SECS * 1000);
        session.tick(FEEDBACK_DELAY_MS);
    }
    session.tick(QUESTION_TIME_SECS * 1000);
    assert!(session.round().unwrap().is_active());
    session.tick(FEEDBACK_DELAY_MS - 1);
    assert!(session.round().unwrap().is_active());
    session.tick(1);
    assert!(session.round().unwrap().is_ended());
}

#[test]
fn second_submit_changes_nothing() {
    let mut session = session_with(numbers_bank(3), 1);
    session.start(RoundConfig::new("Cy", "numbers", Difficulty::Easy, Mode::Timed));
    let answer = current_answer(&session);
    session.select_option(answer);

    assert!(session.submit());
    let before = session.snapshot().unwrap();
    assert!(!session.submit());
    assert!(!session.apply_action(QuizAction::Submit));
    let after = session.snapshot().unwrap();

    assert_eq!(before.score, after.score);
    assert_eq!(before.correct, after.correct);
    assert_eq!(before.wrong, after.wrong);
}

#[test]
fn double_points_apply_to_next_correct_answer() {
    let mut session = session_with(numbers_bank(3), 5);
    session.start(RoundConfig::new("Di", "numbers", Difficulty::Easy, Mode::Timed));

    assert!(session.use_power_up(PowerUpKind::DoublePoints));
    // Re-arming while armed is a no-op.
    assert!(!session.use_power_up(PowerUpKind::DoublePoints));

    answer_correctly(&mut session, 3);
    let snap = session.snapshot().unwrap();
    assert_eq!(snap.score, 300);
    assert!(!snap.power_ups.double_points_armed);
    assert_eq!(snap.power_ups.double_points, 0);
}

#[test]
fn counters_never_decrease_and_budgets_never_grow() {
    let actions = [
        QuizAction::Hint,
        QuizAction::PowerUp(PowerUpKind::FiftyFifty),
        QuizAction::PowerUp(PowerUpKind::ExtraTime),
        QuizAction::Skip,
        QuizAction::Select(1),
        QuizAction::Submit,
        QuizAction::PowerUp(PowerUpKind::DoublePoints),
        QuizAction::Select(2),
        QuizAction::Submit,
    ];

    let mut session = session_with(numbers_bank(20), 77);
    session.start(RoundConfig::new("Ed", "numbers", Difficulty::Hard, Mode::Marathon));
    let mut prev = session.snapshot().unwrap();

    for step in 0..400usize {
        session.apply_action(actions[step % actions.len()]);
        session.tick(700);
        let snap = session.snapshot().unwrap();

        assert!(snap.score >= prev.score);
        assert!(snap.correct >= prev.correct);
        assert!(snap.wrong >= prev.wrong);
        assert!(snap.hints_used >= prev.hints_used);
        assert!(snap.skips_remaining <= prev.skips_remaining);
        assert!(snap.power_ups.fifty_fifty <= prev.power_ups.fifty_fifty);
        assert!(snap.power_ups.extra_time <= prev.power_ups.extra_time);
        assert!(snap.power_ups.double_points <= prev.power_ups.double_points);
        assert!(snap.lives <= prev.lives);
        prev = snap;
    }
    assert!(session.round().unwrap().is_ended());
}

#[test]
fn same_seed_deals_same_round() {
    let config = RoundConfig::new("Fi", "numbers", Difficulty::Easy, Mode::Timed);
    let mut a = session_with(numbers_bank(15), 2024);
    let mut b = session_with(numbers_bank(15), 2024);
    a.start(config.clone());
    b.start(config);

    let texts = |s: &QuizSession| {
        let mut out = Vec::new();
        let round = s.round().unwrap();
        for i in 0..round.question_count() {
            out.push(round.questions()[i].text.clone());
        }
        out
    };
    assert_eq!(texts(&a), texts(&b));
    assert_eq!(a.round().unwrap().question_count(), 10);
}

#[test]
fn unknown_category_plays_general() {
    let mut session = session_with(QuestionBank::builtin(), 3);
    session.start(RoundConfig::new("Gu", "astrology", Difficulty::Easy, Mode::Timed));
    assert_eq!(session.snapshot().unwrap().category, "general");
}

#[test]
fn quitting_records_the_partial_round() {
    let mut session = session_with(numbers_bank(10), 8);
    session.start(RoundConfig::new("Hu", "numbers", Difficulty::Easy, Mode::Timed));
    answer_correctly(&mut session, 1);
    assert!(session.end());
    assert!(!session.end());

    let summary = session.summary().unwrap();
    assert!(summary.quit);
    assert_eq!(summary.record.score, 150);
    assert_eq!(session.ledger().len(), 1);
}
