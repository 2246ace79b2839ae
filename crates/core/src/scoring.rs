//! Scoring module - points per answer and end-of-round statistics
//!
//! Rules:
//! - A correct answer scores by response time: `t < 5` → 150, `5 ≤ t < 10` → 100,
//!   otherwise 50 (boundaries belong to the slower bracket).
//! - An armed double-points charge doubles a correct answer and is spent by it.
//! - Wrong answers and timeouts score nothing and spend nothing.

use arrayvec::ArrayVec;

use crate::types::{
    Achievement, FAST_ANSWER_SECS, MAX_POINTS_PER_QUESTION, MEDIUM_ANSWER_SECS, POINTS_FAST,
    POINTS_MEDIUM, POINTS_SLOW,
};

/// Result of scoring one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnswerScore {
    /// Points awarded (after any multiplier).
    pub points: u32,
    /// Whether a double-points charge was spent.
    pub double_points_consumed: bool,
}

/// Base points for a correct answer given the whole seconds it took.
pub fn base_points(time_taken_secs: u32) -> u32 {
    if time_taken_secs < FAST_ANSWER_SECS {
        POINTS_FAST
    } else if time_taken_secs < MEDIUM_ANSWER_SECS {
        POINTS_MEDIUM
    } else {
        POINTS_SLOW
    }
}

/// Score one submission.
///
/// `double_points_available` is the number of armed double-points charges.
pub fn score_answer(time_taken_secs: u32, is_correct: bool, double_points_available: u32) -> AnswerScore {
    if !is_correct {
        return AnswerScore::default();
    }

    let points = base_points(time_taken_secs);
    if double_points_available > 0 {
        AnswerScore {
            points: points.saturating_mul(2),
            double_points_consumed: true,
        }
    } else {
        AnswerScore {
            points,
            double_points_consumed: false,
        }
    }
}

/// `round(correct / question_count * 100)`, 0 for an empty round.
pub fn accuracy_percent(correct: u32, question_count: usize) -> u32 {
    if question_count == 0 {
        return 0;
    }
    let total = question_count as u64;
    // Integer round-half-up of correct * 100 / total.
    ((correct as u64 * 200 + total) / (2 * total)) as u32
}

/// `score / (question_count * 150)` clamped to `[0, 1]`.
pub fn performance_ratio(score: u32, question_count: usize) -> f64 {
    if question_count == 0 {
        return 0.0;
    }
    let best = question_count as f64 * MAX_POINTS_PER_QUESTION as f64;
    (score as f64 / best).clamp(0.0, 1.0)
}

/// Final figures the achievements are judged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinalTotals {
    pub score: u32,
    pub accuracy: u32,
    pub total_elapsed_secs: u32,
    pub correct: u32,
    pub hints_used: u32,
}

pub const QUIZ_MASTER_SCORE: u32 = 1000;
pub const SPEED_DEMON_SECS: u32 = 60;
pub const NO_HELP_MIN_CORRECT: u32 = 5;

/// Achievements unlocked by a finished round (any combination may apply).
pub fn evaluate_achievements(totals: &FinalTotals) -> ArrayVec<Achievement, 4> {
    let mut out = ArrayVec::new();
    if totals.score >= QUIZ_MASTER_SCORE {
        out.push(Achievement::QuizMaster);
    }
    if totals.accuracy == 100 {
        out.push(Achievement::PerfectScore);
    }
    if totals.total_elapsed_secs < SPEED_DEMON_SECS {
        out.push(Achievement::SpeedDemon);
    }
    if totals.correct >= NO_HELP_MIN_CORRECT && totals.hints_used == 0 {
        out.push(Achievement::NoHelpNeeded);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_brackets() {
        assert_eq!(base_points(0), 150);
        assert_eq!(base_points(3), 150);
        assert_eq!(base_points(4), 150);
        assert_eq!(base_points(5), 100);
        assert_eq!(base_points(7), 100);
        assert_eq!(base_points(9), 100);
        assert_eq!(base_points(10), 50);
        assert_eq!(base_points(20), 50);
    }

    #[test]
    fn test_score_correct_answers() {
        assert_eq!(score_answer(3, true, 0).points, 150);
        assert_eq!(score_answer(7, true, 0).points, 100);
        assert_eq!(score_answer(20, true, 0).points, 50);
        assert!(!score_answer(3, true, 0).double_points_consumed);
    }

    #[test]
    fn test_double_points() {
        let s = score_answer(3, true, 1);
        assert_eq!(s.points, 300);
        assert!(s.double_points_consumed);

        let s = score_answer(12, true, 1);
        assert_eq!(s.points, 100);
    }

    #[test]
    fn test_incorrect_scores_nothing_and_keeps_charge() {
        for t in [0, 3, 7, 20] {
            let s = score_answer(t, false, 1);
            assert_eq!(s.points, 0);
            assert!(!s.double_points_consumed);
        }
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy_percent(0, 0), 0);
        assert_eq!(accuracy_percent(2, 2), 100);
        assert_eq!(accuracy_percent(1, 3), 33);
        assert_eq!(accuracy_percent(2, 3), 67);
        assert_eq!(accuracy_percent(1, 8), 13); // 12.5 rounds up
        assert_eq!(accuracy_percent(0, 10), 0);
    }

    #[test]
    fn test_performance_clamped() {
        assert_eq!(performance_ratio(0, 0), 0.0);
        assert_eq!(performance_ratio(300, 2), 1.0);
        assert_eq!(performance_ratio(600, 2), 1.0);
        assert!((performance_ratio(150, 2) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_achievements_co_occur() {
        let totals = FinalTotals {
            score: 1500,
            accuracy: 100,
            total_elapsed_secs: 40,
            correct: 10,
            hints_used: 0,
        };
        let got = evaluate_achievements(&totals);
        assert_eq!(
            got.as_slice(),
            &[
                Achievement::QuizMaster,
                Achievement::PerfectScore,
                Achievement::SpeedDemon,
                Achievement::NoHelpNeeded
            ]
        );
    }

    #[test]
    fn test_achievement_thresholds() {
        let totals = FinalTotals {
            score: 999,
            accuracy: 99,
            total_elapsed_secs: 60,
            correct: 5,
            hints_used: 1,
        };
        assert!(evaluate_achievements(&totals).is_empty());

        let totals = FinalTotals {
            hints_used: 0,
            ..totals
        };
        assert_eq!(
            evaluate_achievements(&totals).as_slice(),
            &[Achievement::NoHelpNeeded]
        );
    }
}
