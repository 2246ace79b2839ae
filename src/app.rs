//! Screen flow for the terminal quiz.
//!
//! `App` owns the session and decides which screen is showing. It is driven
//! by key events and ticks, and renders into a framebuffer, so the whole flow
//! runs without a terminal in tests.

use crossterm::event::KeyEvent;
use tracing::{info, warn};

use crate::core::{LedgerStore, QuizEvent, QuizSession};
use crate::input::{handle_key_event, handle_menu_key, should_quit, MenuAction};
use crate::term::{
    notice_for, AdapterStatusView, FrameBuffer, MenuView, Notice, QuizView, ResultsView, Viewport,
};
use crate::types::{Difficulty, Mode, QuizAction, RoundConfig};

/// Leaderboard rows shown on the results screen.
pub const RESULTS_LEADERBOARD_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Quiz,
    Results,
    HighScores {
        confirm_clear: bool,
        from_results: bool,
    },
}

pub struct App<S: LedgerStore> {
    session: QuizSession<S>,
    categories: Vec<String>,
    category_idx: usize,
    player: String,
    mode: Mode,
    difficulty: Difficulty,
    screen: Screen,
    notice: Option<Notice>,
    exit: bool,
}

impl<S: LedgerStore> App<S> {
    /// Start on the menu with the given defaults preselected.
    pub fn new(session: QuizSession<S>, defaults: RoundConfig) -> Self {
        let categories: Vec<String> = session.bank().categories().map(str::to_string).collect();
        let category_idx = categories
            .iter()
            .position(|c| *c == defaults.category)
            .unwrap_or(0);
        Self {
            session,
            categories,
            category_idx,
            player: defaults.player_name,
            mode: defaults.mode,
            difficulty: defaults.difficulty,
            screen: Screen::Menu,
            notice: None,
            exit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    pub fn session(&self) -> &QuizSession<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut QuizSession<S> {
        &mut self.session
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// The round settings currently selected on the menu.
    pub fn menu_config(&self) -> RoundConfig {
        let category = self
            .categories
            .get(self.category_idx)
            .cloned()
            .unwrap_or_default();
        RoundConfig::new(self.player.clone(), category, self.difficulty, self.mode)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if should_quit(key) {
            self.exit = true;
            return;
        }
        match self.screen {
            Screen::Quiz => {
                if let Some(action) = handle_key_event(key) {
                    self.session.apply_action(action);
                }
            }
            Screen::Menu => {
                if let Some(action) = handle_menu_key(key) {
                    self.on_menu(action);
                }
            }
            Screen::Results => {
                if let Some(action) = handle_menu_key(key) {
                    self.on_results(action);
                }
            }
            Screen::HighScores {
                confirm_clear,
                from_results,
            } => {
                if let Some(action) = handle_menu_key(key) {
                    self.on_high_scores(action, confirm_clear, from_results);
                }
            }
        }
    }

    pub fn tick(&mut self, elapsed_ms: u32) {
        self.session.tick(elapsed_ms);
    }

    /// Drain session events, update the notice and the screen, and return
    /// the events for anyone else listening.
    pub fn drain_events(&mut self) -> Vec<QuizEvent> {
        let events = self.session.take_events();
        for event in &events {
            match event {
                QuizEvent::QuestionLoaded { .. } => {
                    self.notice = None;
                    self.screen = Screen::Quiz;
                }
                QuizEvent::RoundEnded(summary) => {
                    self.notice = None;
                    self.screen = Screen::Results;
                    info!(
                        player = %summary.record.player,
                        score = summary.record.score,
                        rank = ?self.session.last_rank(),
                        "round finished"
                    );
                }
                other => {
                    if let Some(notice) = notice_for(other) {
                        self.notice = Some(notice);
                    }
                }
            }
        }
        events
    }

    pub fn render_into(
        &self,
        view: &QuizView,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        match self.screen {
            Screen::Quiz => match self.session.snapshot() {
                Some(snap) => view.render_question_into(&snap, self.notice.as_ref(), adapter, viewport, fb),
                None => self.render_menu(view, viewport, fb),
            },
            Screen::Results => match self.session.summary() {
                Some(summary) => {
                    let share = self.session.share().unwrap_or_default();
                    let results = ResultsView {
                        summary,
                        rank: self.session.last_rank(),
                        leaderboard: self.session.ledger().top_n(RESULTS_LEADERBOARD_ROWS),
                        share: &share,
                    };
                    view.render_results_into(&results, viewport, fb);
                }
                None => self.render_menu(view, viewport, fb),
            },
            Screen::HighScores { confirm_clear, .. } => {
                view.render_high_scores_into(self.session.ledger().entries(), confirm_clear, viewport, fb)
            }
            Screen::Menu => self.render_menu(view, viewport, fb),
        }
    }

    fn render_menu(&self, view: &QuizView, viewport: Viewport, fb: &mut FrameBuffer) {
        let menu = MenuView {
            player: &self.player,
            categories: &self.categories,
            selected: self.category_idx,
            mode: self.mode,
            difficulty: self.difficulty,
            stats: Some(self.session.ledger().player_stats(&self.player)),
        };
        view.render_menu_into(&menu, viewport, fb);
    }

    fn on_menu(&mut self, action: MenuAction) {
        let n = self.categories.len().max(1);
        match action {
            MenuAction::PrevCategory => self.category_idx = (self.category_idx + n - 1) % n,
            MenuAction::NextCategory => self.category_idx = (self.category_idx + 1) % n,
            MenuAction::CycleMode => self.mode = self.mode.cycle(),
            MenuAction::CycleDifficulty => self.difficulty = self.difficulty.cycle(),
            MenuAction::Confirm => self.session.start(self.menu_config()),
            MenuAction::Restart => {
                self.session.apply_action(QuizAction::Restart);
            }
            MenuAction::ShowHighScores => {
                self.screen = Screen::HighScores {
                    confirm_clear: false,
                    from_results: false,
                }
            }
            MenuAction::Exit => self.exit = true,
            MenuAction::ClearHighScores | MenuAction::Back => {}
        }
    }

    fn on_results(&mut self, action: MenuAction) {
        match action {
            MenuAction::Restart => {
                self.session.restart();
            }
            MenuAction::Confirm | MenuAction::Back => self.screen = Screen::Menu,
            MenuAction::ShowHighScores => {
                self.screen = Screen::HighScores {
                    confirm_clear: false,
                    from_results: true,
                }
            }
            MenuAction::Exit => self.exit = true,
            _ => {}
        }
    }

    fn on_high_scores(&mut self, action: MenuAction, confirm_clear: bool, from_results: bool) {
        let back = if from_results && self.session.summary().is_some() {
            Screen::Results
        } else {
            Screen::Menu
        };
        match action {
            MenuAction::ClearHighScores if confirm_clear => {
                if let Err(e) = self.session.ledger_mut().clear() {
                    warn!(error = %e, "failed to clear high scores");
                }
                self.screen = Screen::HighScores {
                    confirm_clear: false,
                    from_results,
                };
            }
            MenuAction::ClearHighScores => {
                self.screen = Screen::HighScores {
                    confirm_clear: true,
                    from_results,
                };
            }
            MenuAction::Back | MenuAction::Confirm => self.screen = back,
            MenuAction::Exit => self.exit = true,
            _ => {
                self.screen = Screen::HighScores {
                    confirm_clear: false,
                    from_results,
                };
            }
        }
    }
}
