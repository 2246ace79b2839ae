//! Runtime configuration from environment variables, plus log setup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::core::LEDGER_FILE_NAME;
use crate::types::{Difficulty, Mode, DEFAULT_CATEGORY};

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub player: String,
    pub category: String,
    pub mode: Mode,
    pub difficulty: Difficulty,
    /// `None` seeds from the clock.
    pub seed: Option<u32>,
    pub ledger_path: PathBuf,
    pub bank_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            player: "Player".to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            mode: Mode::Timed,
            difficulty: Difficulty::Medium,
            seed: None,
            ledger_path: PathBuf::from(LEDGER_FILE_NAME),
            bank_path: None,
            log_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let defaults = Self::default();

        Self {
            player: get("QUIZ_PLAYER").unwrap_or(defaults.player),
            category: get("QUIZ_CATEGORY")
                .map(|s| s.to_lowercase())
                .unwrap_or(defaults.category),
            mode: get("QUIZ_MODE")
                .and_then(|s| Mode::from_str(&s))
                .unwrap_or(defaults.mode),
            difficulty: get("QUIZ_DIFFICULTY")
                .and_then(|s| Difficulty::from_str(&s))
                .unwrap_or(defaults.difficulty),
            seed: get("QUIZ_SEED").and_then(|s| s.parse().ok()),
            ledger_path: get("QUIZ_LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ledger_path),
            bank_path: get("QUIZ_BANK_PATH").map(PathBuf::from),
            log_path: get("QUIZ_LOG_PATH").map(PathBuf::from),
        }
    }

    /// Configured seed, or one derived from the clock.
    pub fn seed_or_clock(&self) -> u32 {
        self.seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
    }
}

/// Send `tracing` output to `log_path`, filtered by `RUST_LOG` (default `info`).
///
/// Without a path nothing is installed: the terminal belongs to the quiz.
pub fn init_logging(log_path: Option<&PathBuf>) -> anyhow::Result<()> {
    let Some(path) = log_path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("failed to install log subscriber")?;
    Ok(())
}
