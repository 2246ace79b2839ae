//! High-score ledger - persisted, capped, sorted list of finished rounds
//!
//! Entries are kept sorted by score, highest first. Ties keep insertion
//! order (the sort is stable), and the list never grows past
//! [`LEDGER_CAPACITY`]. Storage is behind the [`LedgerStore`] trait so the
//! ledger logic runs the same against memory or a JSON file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Difficulty, LEDGER_CAPACITY};

/// Default ledger file name.
pub const LEDGER_FILE_NAME: &str = "quizHighScores.json";

/// One finished round as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player: String,
    pub score: u32,
    pub category: String,
    pub difficulty: Difficulty,
    /// ISO date (`yyyy-mm-dd`) the round was played.
    pub date: String,
    #[serde(rename = "time")]
    pub total_elapsed_secs: u32,
    #[serde(rename = "correct")]
    pub correct_count: u32,
    #[serde(rename = "total")]
    pub total_questions: u32,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ledger data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Backing storage for the ledger.
pub trait LedgerStore {
    /// Load all records. Missing storage is an empty ledger, not an error.
    fn load(&self) -> Result<Vec<ScoreRecord>, LedgerError>;

    /// Replace the stored records.
    fn save(&mut self, records: &[ScoreRecord]) -> Result<(), LedgerError>;

    /// Remove the stored records.
    fn clear(&mut self) -> Result<(), LedgerError>;
}

/// In-memory store; nothing outlives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<ScoreRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ScoreRecord>) -> Self {
        Self { records }
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Vec<ScoreRecord>, LedgerError> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[ScoreRecord]) -> Result<(), LedgerError> {
        self.records = records.to_vec();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), LedgerError> {
        self.records.clear();
        Ok(())
    }
}

/// Single JSON array in a file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| LEDGER_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<Vec<ScoreRecord>, LedgerError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&mut self, records: &[ScoreRecord]) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(records)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), LedgerError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Per-player aggregates over the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PlayerStats {
    pub games_played: u32,
    pub best_score: u32,
    pub average_score: f64,
}

#[derive(Debug)]
pub struct Ledger<S: LedgerStore> {
    store: S,
    entries: Vec<ScoreRecord>,
}

impl<S: LedgerStore> Ledger<S> {
    /// Load the ledger. Unreadable or corrupt data yields an empty ledger.
    pub fn open(store: S) -> Self {
        let mut entries = match store.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "could not load high scores, starting empty");
                Vec::new()
            }
        };
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(LEDGER_CAPACITY);
        Self { store, entries }
    }

    /// Insert a finished round and persist.
    ///
    /// Returns the 1-based rank, or `None` when the record fell off the end.
    /// The in-memory ledger is updated even if persisting fails.
    pub fn record(&mut self, record: ScoreRecord) -> Result<Option<usize>, LedgerError> {
        // New records go last so equal scores keep insertion order.
        let id = self.entries.len();
        let mut tagged: Vec<(usize, ScoreRecord)> =
            self.entries.drain(..).enumerate().collect();
        tagged.push((id, record));
        tagged.sort_by(|a, b| b.1.score.cmp(&a.1.score));
        tagged.truncate(LEDGER_CAPACITY);

        let rank = tagged.iter().position(|(i, _)| *i == id).map(|p| p + 1);
        self.entries = tagged.into_iter().map(|(_, r)| r).collect();

        self.store.save(&self.entries)?;
        tracing::info!(rank = ?rank, entries = self.entries.len(), "high score recorded");
        Ok(rank)
    }

    /// The best `n` entries.
    pub fn top_n(&self, n: usize) -> &[ScoreRecord] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn entries(&self) -> &[ScoreRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry, in memory and in storage.
    pub fn clear(&mut self) -> Result<(), LedgerError> {
        self.entries.clear();
        self.store.clear()?;
        tracing::info!("high scores cleared");
        Ok(())
    }

    pub fn player_stats(&self, player: &str) -> PlayerStats {
        let scores: Vec<u32> = self
            .entries
            .iter()
            .filter(|r| r.player == player)
            .map(|r| r.score)
            .collect();
        if scores.is_empty() {
            return PlayerStats::default();
        }
        let total: u64 = scores.iter().map(|&s| s as u64).sum();
        PlayerStats {
            games_played: scores.len() as u32,
            best_score: scores.iter().copied().max().unwrap_or(0),
            average_score: total as f64 / scores.len() as f64,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
