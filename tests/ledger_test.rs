//! High-score ledger properties and file persistence.

use proptest::prelude::*;
use tempfile::tempdir;

use tui_quiz::core::{JsonFileStore, Ledger, LedgerStore, MemoryStore, ScoreRecord};
use tui_quiz::types::{Difficulty, LEDGER_CAPACITY};

fn record(player: &str, score: u32) -> ScoreRecord {
    ScoreRecord {
        player: player.to_string(),
        score,
        category: "general".to_string(),
        difficulty: Difficulty::Medium,
        date: "2024-05-01".to_string(),
        total_elapsed_secs: 30,
        correct_count: score / 150,
        total_questions: 10,
    }
}

proptest! {
    #[test]
    fn ledger_stays_sorted_and_capped(scores in prop::collection::vec(0u32..3000, 0..120)) {
        let mut ledger = Ledger::open(MemoryStore::new());
        for (i, score) in scores.iter().enumerate() {
            let rank = ledger.record(record(&format!("p{i}"), *score)).unwrap();
            if let Some(rank) = rank {
                prop_assert!(rank >= 1 && rank <= LEDGER_CAPACITY);
                prop_assert_eq!(ledger.entries()[rank - 1].score, *score);
            }
        }

        let entries = ledger.entries();
        prop_assert_eq!(entries.len(), scores.len().min(LEDGER_CAPACITY));
        prop_assert!(entries.windows(2).all(|w| w[0].score >= w[1].score));

        let mut expected = scores.clone();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        expected.truncate(LEDGER_CAPACITY);
        let kept: Vec<u32> = entries.iter().map(|r| r.score).collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn top_n_is_a_prefix(scores in prop::collection::vec(0u32..1000, 0..60), n in 0usize..70) {
        let mut ledger = Ledger::open(MemoryStore::new());
        for score in &scores {
            ledger.record(record("p", *score)).unwrap();
        }
        let top = ledger.top_n(n);
        prop_assert_eq!(top.len(), n.min(ledger.len()));
        prop_assert_eq!(top, &ledger.entries()[..top.len()]);
    }
}

#[test]
fn clear_empties_the_ledger() {
    let records = (0..7).map(|i| record("p", i * 100)).collect();
    let mut ledger = Ledger::open(MemoryStore::with_records(records));
    assert_eq!(ledger.len(), 7);

    ledger.clear().unwrap();
    assert!(ledger.top_n(LEDGER_CAPACITY).is_empty());
    assert!(ledger.store().load().unwrap().is_empty());
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quizHighScores.json");

    {
        let mut ledger = Ledger::open(JsonFileStore::new(&path));
        assert!(ledger.is_empty());
        ledger.record(record("ada", 450)).unwrap();
        ledger.record(record("bo", 900)).unwrap();
    }

    let reopened = Ledger::open(JsonFileStore::new(&path));
    let players: Vec<&str> = reopened.entries().iter().map(|r| r.player.as_str()).collect();
    assert_eq!(players, vec!["bo", "ada"]);
    assert_eq!(reopened.player_stats("ada").best_score, 450);
}

#[test]
fn file_uses_short_field_names() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.json");
    let mut ledger = Ledger::open(JsonFileStore::new(&path));
    ledger.record(record("ada", 300)).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let entry = &raw[0];
    assert_eq!(entry["player"], "ada");
    assert_eq!(entry["score"], 300);
    assert_eq!(entry["difficulty"], "medium");
    assert_eq!(entry["time"], 30);
    assert_eq!(entry["correct"], 2);
    assert_eq!(entry["total"], 10);
}

#[test]
fn corrupt_file_opens_empty_and_is_replaced_on_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut ledger = Ledger::open(JsonFileStore::new(&path));
    assert!(ledger.is_empty());
    ledger.record(record("ada", 150)).unwrap();

    let reopened = Ledger::open(JsonFileStore::new(&path));
    assert_eq!(reopened.len(), 1);
}

#[test]
fn clearing_a_file_ledger_removes_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.json");
    let mut ledger = Ledger::open(JsonFileStore::new(&path));
    ledger.record(record("ada", 150)).unwrap();
    assert!(path.exists());

    ledger.clear().unwrap();
    assert!(!path.exists());
    assert!(Ledger::open(JsonFileStore::new(&path)).is_empty());
}
