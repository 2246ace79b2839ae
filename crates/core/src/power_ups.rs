//! Power-up budgets and option elimination
//!
//! Budgets only ever go down within a round. Elimination never removes the
//! correct option, the selected option, or an option that is already gone.

use arrayvec::ArrayVec;

use crate::rng::SimpleRng;
use crate::types::{PowerUpKind, Question, OPTION_COUNT, POWER_UP_BUDGET};

/// Options removed by 50:50.
pub const FIFTY_FIFTY_REMOVES: usize = 2;

/// Options removed by a hint.
pub const HINT_REMOVES: usize = 1;

/// Remaining charges per power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PowerUps {
    pub fifty_fifty: u32,
    pub extra_time: u32,
    pub double_points: u32,
}

impl PowerUps {
    pub fn new() -> Self {
        Self {
            fifty_fifty: POWER_UP_BUDGET,
            extra_time: POWER_UP_BUDGET,
            double_points: POWER_UP_BUDGET,
        }
    }

    pub fn count(&self, kind: PowerUpKind) -> u32 {
        match kind {
            PowerUpKind::FiftyFifty => self.fifty_fifty,
            PowerUpKind::ExtraTime => self.extra_time,
            PowerUpKind::DoublePoints => self.double_points,
        }
    }

    pub fn available(&self, kind: PowerUpKind) -> bool {
        self.count(kind) > 0
    }

    /// Spend one charge. Returns false (and changes nothing) when exhausted.
    pub fn consume(&mut self, kind: PowerUpKind) -> bool {
        let slot = match kind {
            PowerUpKind::FiftyFifty => &mut self.fifty_fifty,
            PowerUpKind::ExtraTime => &mut self.extra_time,
            PowerUpKind::DoublePoints => &mut self.double_points,
        };
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}

impl Default for PowerUps {
    fn default() -> Self {
        Self::new()
    }
}

/// Options that an elimination may remove.
pub fn eliminable_options(
    question: &Question,
    selected: Option<usize>,
    eliminated: &[bool; OPTION_COUNT],
) -> ArrayVec<usize, OPTION_COUNT> {
    (0..question.option_count().min(OPTION_COUNT))
        .filter(|&i| !question.is_correct(i) && Some(i) != selected && !eliminated[i])
        .collect()
}

/// Remove up to `count` eligible options chosen uniformly at random.
///
/// Returns the removed indices (possibly fewer than `count`, possibly none).
pub fn eliminate_random(
    question: &Question,
    selected: Option<usize>,
    eliminated: &mut [bool; OPTION_COUNT],
    count: usize,
    rng: &mut SimpleRng,
) -> ArrayVec<usize, OPTION_COUNT> {
    let mut candidates = eliminable_options(question, selected, eliminated);
    let mut removed = ArrayVec::new();

    while removed.len() < count && !candidates.is_empty() {
        let pick = rng.next_range(candidates.len() as u32) as usize;
        let option = candidates.remove(pick);
        eliminated[option] = true;
        removed.push(option);
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question::new("Q", ["a", "b", "c", "d"], 2, "")
    }

    #[test]
    fn test_budgets_start_at_one_and_stop_at_zero() {
        let mut p = PowerUps::new();
        for kind in PowerUpKind::ALL {
            assert_eq!(p.count(kind), 1);
            assert!(p.consume(kind));
            assert_eq!(p.count(kind), 0);
            assert!(!p.consume(kind));
            assert_eq!(p.count(kind), 0);
        }
    }

    #[test]
    fn test_budgets_are_independent() {
        let mut p = PowerUps::new();
        assert!(p.consume(PowerUpKind::ExtraTime));
        assert!(p.available(PowerUpKind::FiftyFifty));
        assert!(p.available(PowerUpKind::DoublePoints));
    }

    #[test]
    fn test_eliminable_excludes_correct_selected_and_removed() {
        let q = question();
        let mut eliminated = [false; OPTION_COUNT];
        assert_eq!(eliminable_options(&q, None, &eliminated).as_slice(), &[0, 1, 3]);
        assert_eq!(eliminable_options(&q, Some(1), &eliminated).as_slice(), &[0, 3]);

        eliminated[3] = true;
        assert_eq!(eliminable_options(&q, Some(1), &eliminated).as_slice(), &[0]);
    }

    #[test]
    fn test_fifty_fifty_removes_two_wrong_options() {
        let q = question();
        for seed in 1..50 {
            let mut rng = SimpleRng::new(seed);
            let mut eliminated = [false; OPTION_COUNT];
            let removed = eliminate_random(&q, Some(0), &mut eliminated, FIFTY_FIFTY_REMOVES, &mut rng);

            assert_eq!(removed.len(), 2);
            assert!(!eliminated[2], "correct option removed");
            assert!(!eliminated[0], "selected option removed");
            assert_eq!(eliminated.iter().filter(|&&e| e).count(), 2);
        }
    }

    #[test]
    fn test_elimination_stops_when_nothing_eligible() {
        let q = question();
        let mut rng = SimpleRng::new(3);
        let mut eliminated = [true, false, false, true];
        let removed = eliminate_random(&q, Some(1), &mut eliminated, HINT_REMOVES, &mut rng);
        assert!(removed.is_empty());
        assert_eq!(eliminated, [true, false, false, true]);
    }
}
