//! QuizView: maps session state into a terminal framebuffer.
//!
//! This module is pure (no I/O). Each screen renders into a caller-owned
//! framebuffer so frames can be reused and diffed.

use crate::core::{
    AnswerOutcome, PlayerStats, QuizEvent, RoundSnapshot, RoundSummary, ScoreRecord,
};
use crate::fb::{palette, CellStyle, FrameBuffer};
use crate::types::{Difficulty, Mode, PowerUpKind, LEADERBOARD_SIZE, MAX_HINTS_PER_ROUND};

const TITLE: &str = "QuizMaster Pro";
const MAX_CONTENT_WIDTH: u16 = 72;

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub client_count: u16,
    pub controller_id: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Good,
    Bad,
    Warn,
}

impl Tone {
    fn style(self) -> CellStyle {
        match self {
            Tone::Info => palette::TEXT,
            Tone::Good => palette::CORRECT,
            Tone::Bad => palette::WRONG,
            Tone::Warn => palette::WARNING,
        }
    }
}

/// One-line message shown under the options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub tone: Tone,
}

impl Notice {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// Turn a round event into a player-facing notice, if it warrants one.
pub fn notice_for(event: &QuizEvent) -> Option<Notice> {
    match event {
        QuizEvent::AnswerResult(outcome) => Some(outcome_notice(outcome)),
        QuizEvent::TimeLow { time_left } => {
            Some(Notice::new(format!("Hurry! {time_left}s left"), Tone::Warn))
        }
        QuizEvent::LifeLost { lives_remaining } => Some(Notice::new(
            format!("Life lost! {lives_remaining} remaining"),
            Tone::Bad,
        )),
        QuizEvent::Skipped { skips_remaining, .. } => Some(Notice::new(
            format!("Question skipped ({skips_remaining} skips left)"),
            Tone::Info,
        )),
        QuizEvent::HintUsed { removed, .. } => Some(Notice::new(
            format!("Hint: option {} is wrong", option_label(*removed)),
            Tone::Info,
        )),
        QuizEvent::PowerUpChanged {
            power_up,
            double_points_armed,
            removed,
            ..
        } => {
            let text = match power_up {
                PowerUpKind::FiftyFifty => format!("50:50 removed {} options", removed.len()),
                PowerUpKind::ExtraTime => "+10 seconds!".to_string(),
                PowerUpKind::DoublePoints if *double_points_armed => {
                    "Double points armed for your next correct answer".to_string()
                }
                PowerUpKind::DoublePoints => "Double points used".to_string(),
            };
            Some(Notice::new(text, Tone::Good))
        }
        QuizEvent::QuestionLoaded { .. } | QuizEvent::Tick { .. } | QuizEvent::RoundEnded(_) => {
            None
        }
    }
}

fn outcome_notice(outcome: &AnswerOutcome) -> Notice {
    let mut text = if outcome.timed_out {
        "Time's up!".to_string()
    } else if outcome.correct {
        let bonus = if outcome.double_points_applied { " (x2)" } else { "" };
        format!("Correct! +{}{}", outcome.points, bonus)
    } else {
        format!("Wrong! The answer was {}", option_label(outcome.correct_option))
    };
    if !outcome.explanation.is_empty() {
        text.push_str(" - ");
        text.push_str(&outcome.explanation);
    }
    let tone = if outcome.correct { Tone::Good } else { Tone::Bad };
    Notice::new(text, tone)
}

/// Start screen contents.
#[derive(Debug, Clone, Copy)]
pub struct MenuView<'a> {
    pub player: &'a str,
    pub categories: &'a [String],
    pub selected: usize,
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub stats: Option<PlayerStats>,
}

/// Results screen contents.
#[derive(Debug, Clone, Copy)]
pub struct ResultsView<'a> {
    pub summary: &'a RoundSummary,
    pub rank: Option<usize>,
    pub leaderboard: &'a [ScoreRecord],
    pub share: &'a str,
}

/// Renders every quiz screen. Content is centered and capped in width.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizView;

/// Running cursor over a centered content column.
struct Column<'f> {
    fb: &'f mut FrameBuffer,
    x: u16,
    y: u16,
    width: u16,
}

impl<'f> Column<'f> {
    fn new(fb: &'f mut FrameBuffer, viewport: Viewport) -> Self {
        let width = viewport.width.saturating_sub(4).min(MAX_CONTENT_WIDTH);
        let x = viewport.width.saturating_sub(width) / 2;
        Self { fb, x, y: 1, width }
    }

    fn line(&mut self, s: &str, style: CellStyle) {
        self.fb.put_str(self.x, self.y, s, style);
        self.y = self.y.saturating_add(1);
    }

    fn wrapped(&mut self, s: &str, style: CellStyle) {
        let rows = self.fb.put_wrapped(self.x, self.y, self.width, s, style);
        self.y = self.y.saturating_add(rows.max(1));
    }

    /// Label/value pairs on one line.
    fn pairs(&mut self, items: &[(&str, String)]) {
        let mut cx = self.x;
        for (label, value) in items {
            cx = self.fb.put_str(cx, self.y, label, palette::MUTED);
            cx = self.fb.put_str(cx + 1, self.y, value, palette::LABEL);
            cx = cx.saturating_add(3);
        }
        self.y = self.y.saturating_add(1);
    }

    fn rule(&mut self) {
        let w = self.width;
        self.fb.fill_rect(self.x, self.y, w, 1, '─', palette::BORDER);
        self.y = self.y.saturating_add(1);
    }

    fn gap(&mut self) {
        self.y = self.y.saturating_add(1);
    }

    fn footer(&mut self, s: &str) {
        let y = self.fb.height().saturating_sub(2).max(self.y);
        self.fb.put_str(self.x, y, s, palette::MUTED);
    }
}

impl QuizView {
    pub fn new() -> Self {
        Self
    }

    fn begin(fb: &mut FrameBuffer, viewport: Viewport) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));
    }

    pub fn render_menu_into(&self, menu: &MenuView<'_>, viewport: Viewport, fb: &mut FrameBuffer) {
        Self::begin(fb, viewport);
        let mut col = Column::new(fb, viewport);

        col.line(TITLE, palette::TITLE);
        col.rule();
        col.pairs(&[("Player", menu.player.to_string())]);
        col.gap();

        col.line("Category", palette::LABEL);
        for (i, category) in menu.categories.iter().enumerate() {
            let marker = if i == menu.selected { "> " } else { "  " };
            let style = if i == menu.selected {
                palette::SELECTED
            } else {
                palette::TEXT
            };
            col.line(&format!("{marker}{}", title_case(category)), style);
        }
        col.gap();

        col.pairs(&[
            ("Mode", mode_label(menu.mode).to_string()),
            ("Difficulty", title_case(menu.difficulty.as_str())),
        ]);

        if let Some(stats) = menu.stats.filter(|s| s.games_played > 0) {
            col.gap();
            col.line("Your stats", palette::LABEL);
            col.pairs(&[
                ("Games", stats.games_played.to_string()),
                ("Best", stats.best_score.to_string()),
                ("Average", format!("{:.0}", stats.average_score)),
            ]);
        }

        col.footer("[←/→] category  [m] mode  [d] difficulty  [enter] start  [l] high scores  [q] exit");
    }

    pub fn render_question_into(
        &self,
        snap: &RoundSnapshot,
        notice: Option<&Notice>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        Self::begin(fb, viewport);
        let mut col = Column::new(fb, viewport);

        col.line(
            &format!(
                "{TITLE}  {} · {} · {} · {}",
                snap.player,
                title_case(&snap.category),
                mode_label(snap.mode),
                snap.difficulty.as_str()
            ),
            palette::TITLE,
        );

        let time_style = if snap.time_left <= crate::types::LOW_TIME_WARNING_SECS {
            palette::WARNING
        } else {
            palette::LABEL
        };
        let mut stats = vec![
            ("Question", snap.progress_label()),
            ("Score", snap.score.to_string()),
        ];
        if snap.mode == Mode::Survival {
            stats.push(("Lives", "♥".repeat(snap.lives as usize)));
        }
        col.pairs(&stats);
        let time_x = col.x;
        col.fb.put_str(time_x, col.y, "Time", palette::MUTED);
        col.fb
            .put_str(time_x + 5, col.y, &format!("{}s", snap.time_left), time_style);
        col.gap();
        col.rule();

        let Some(question) = snap.question.as_ref() else {
            col.line("Round over", palette::LABEL);
            return;
        };

        col.wrapped(&question.text, palette::LABEL);
        col.gap();

        for (i, option) in question.options.iter().enumerate() {
            let label = option_label(i);
            if question.eliminated[i] {
                col.line(&format!(" {}  ---", i + 1), palette::MUTED);
                continue;
            }
            let style = match question.correct_option {
                Some(answer) if answer == i => palette::CORRECT,
                Some(_) if snap.selected == Some(i) => palette::WRONG,
                _ if snap.selected == Some(i) => palette::SELECTED,
                _ => palette::TEXT,
            };
            col.line(&format!(" {} {label}. {option}", i + 1), style);
        }
        col.gap();

        let hint = if snap.hint_available {
            "ready".to_string()
        } else {
            format!("{}/{}", snap.hints_used, MAX_HINTS_PER_ROUND)
        };
        col.pairs(&[
            ("Skips", snap.skips_remaining.to_string()),
            ("Hint", hint),
        ]);
        let power = &snap.power_ups;
        let armed = if power.double_points_armed { " ARMED" } else { "" };
        col.line(
            &format!(
                "[f] {} ({})  [t] {} ({})  [x] {} ({}){armed}",
                PowerUpKind::FiftyFifty.label(),
                power.fifty_fifty,
                PowerUpKind::ExtraTime.label(),
                power.extra_time,
                PowerUpKind::DoublePoints.label(),
                power.double_points,
            ),
            palette::TEXT,
        );
        col.gap();

        if let Some(notice) = notice {
            col.wrapped(&notice.text, notice.tone.style());
        }

        if let Some(st) = adapter {
            let ctrl = st
                .controller_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            col.line(
                &format!("remote: {} clients, controller {ctrl}", st.client_count),
                palette::MUTED,
            );
        }

        col.footer("[1-4] select  [enter] submit  [space] skip  [h] hint  [esc] quit round");
    }

    pub fn render_results_into(&self, results: &ResultsView<'_>, viewport: Viewport, fb: &mut FrameBuffer) {
        Self::begin(fb, viewport);
        let mut col = Column::new(fb, viewport);
        let summary = results.summary;
        let record = &summary.record;

        let heading = if summary.quit { "Quiz Ended" } else { "Quiz Complete!" };
        col.line(heading, palette::TITLE);
        col.rule();
        col.pairs(&[("Final Score", record.score.to_string())]);
        col.pairs(&[
            ("Correct", record.correct_count.to_string()),
            ("Wrong", summary.wrong_count.to_string()),
            ("Time", format!("{}s", record.total_elapsed_secs)),
            ("Accuracy", format!("{}%", summary.accuracy)),
        ]);
        let meter_w = col.width.saturating_sub(16).min(40) as usize;
        col.line(
            &format!(
                "Performance {} {:.0}%",
                meter(summary.performance, meter_w),
                summary.performance * 100.0
            ),
            palette::TEXT,
        );
        col.gap();

        if !summary.achievements.is_empty() {
            col.line("Achievements", palette::LABEL);
            for a in &summary.achievements {
                col.line(&format!("  ★ {} - {}", a.title(), a.description()), palette::CORRECT);
            }
            col.gap();
        }

        match results.rank {
            Some(rank) => col.line(&format!("High score rank #{rank}"), palette::WARNING),
            None => col.line("Not in the high scores this time", palette::MUTED),
        }
        col.wrapped(results.share, palette::MUTED);
        col.gap();

        col.line("Leaderboard", palette::LABEL);
        for (i, entry) in results.leaderboard.iter().take(LEADERBOARD_SIZE).enumerate() {
            col.line(&leaderboard_row(i + 1, entry), palette::TEXT);
        }

        col.footer("[r] play again  [enter] menu  [l] high scores  [q] exit");
    }

    pub fn render_high_scores_into(
        &self,
        entries: &[ScoreRecord],
        confirm_clear: bool,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        Self::begin(fb, viewport);
        let mut col = Column::new(fb, viewport);

        col.line("High Scores", palette::TITLE);
        col.rule();
        if entries.is_empty() {
            col.line("No scores yet. Play a round!", palette::MUTED);
        }
        let rows = viewport.height.saturating_sub(8) as usize;
        for (i, entry) in entries.iter().take(rows).enumerate() {
            col.line(&high_score_row(i + 1, entry), palette::TEXT);
        }

        if confirm_clear {
            col.gap();
            col.line("Clear all high scores? Press [c] again to confirm.", palette::WARNING);
        }
        col.footer("[c] clear  [esc] back");
    }
}

fn option_label(index: usize) -> char {
    (b'A' + (index as u8).min(25)) as char
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Timed => "Timed",
        Mode::Survival => "Survival",
        Mode::Marathon => "Marathon",
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn meter(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

fn leaderboard_row(rank: usize, r: &ScoreRecord) -> String {
    format!("{rank:>2}. {:<16} {:>6}  {}", r.player, r.score, title_case(&r.category))
}

fn high_score_row(rank: usize, r: &ScoreRecord) -> String {
    format!(
        "{rank:>2}. {:<16} {:>6}  {:<8} {:<6} {}",
        r.player,
        r.score,
        title_case(&r.category),
        r.difficulty.as_str(),
        r.date
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Ledger, MemoryStore, QuestionBank, QuizSession};
    use crate::types::{Achievement, RoundConfig};

    fn viewport() -> Viewport {
        Viewport::new(100, 40)
    }

    fn session_in(category: &str) -> QuizSession {
        let mut s = QuizSession::new(QuestionBank::builtin(), Ledger::open(MemoryStore::new()), 3)
            .with_date("2026-02-03");
        s.start(RoundConfig::new("Ada", category, Difficulty::Hard, Mode::Survival));
        s
    }

    fn session() -> QuizSession {
        session_in("science")
    }

    fn has_style(fb: &FrameBuffer, style: CellStyle) -> bool {
        (0..fb.height()).any(|y| (0..fb.width()).any(|x| fb.get(x, y).map(|c| c.style) == Some(style)))
    }

    fn record(player: &str, score: u32) -> ScoreRecord {
        ScoreRecord {
            player: player.to_string(),
            score,
            category: "history".to_string(),
            difficulty: Difficulty::Easy,
            date: "2026-02-03".to_string(),
            total_elapsed_secs: 42,
            correct_count: 1,
            total_questions: 1,
        }
    }

    #[test]
    fn renders_question_screen() {
        let s = session();
        let snap = s.snapshot().unwrap();
        let mut fb = FrameBuffer::new(1, 1);
        QuizView::new().render_question_into(&snap, None, None, viewport(), &mut fb);

        let text = fb.text();
        assert!(text.contains("QuizMaster Pro"));
        assert!(text.contains("Science"));
        assert!(text.contains("1/2"));
        assert!(text.contains("♥♥♥"));
        assert!(text.contains(&snap.question.as_ref().unwrap().options[0]));
        assert!(text.contains("15s"));
    }

    #[test]
    fn eliminated_options_are_hidden() {
        let mut s = session_in("history");
        s.use_power_up(PowerUpKind::FiftyFifty);
        let snap = s.snapshot().unwrap();
        let mut fb = FrameBuffer::new(1, 1);
        QuizView::new().render_question_into(&snap, None, None, viewport(), &mut fb);

        let q = snap.question.unwrap();
        let text = fb.text();
        for (i, option) in q.options.iter().enumerate() {
            assert_eq!(text.contains(option.as_str()), !q.eliminated[i]);
        }
        assert!(text.contains("(0)"));
    }

    #[test]
    fn correct_option_highlighted_after_submit() {
        let mut s = session();
        let answer = s.round().unwrap().current_question().unwrap().answer;
        s.select_option(answer);
        s.submit();
        let snap = s.snapshot().unwrap();

        let mut fb = FrameBuffer::new(1, 1);
        assert!(!has_style(&fb, palette::CORRECT));
        QuizView::new().render_question_into(&snap, None, None, viewport(), &mut fb);
        assert!(has_style(&fb, palette::CORRECT));
    }

    #[test]
    fn notices_for_outcomes() {
        let outcome = AnswerOutcome {
            question_index: 0,
            selected: Some(1),
            correct_option: 2,
            correct: false,
            timed_out: false,
            points: 0,
            double_points_applied: false,
            time_taken_secs: 3,
            explanation: "Au comes from Latin 'aurum'".to_string(),
        };
        let notice = notice_for(&QuizEvent::AnswerResult(outcome.clone())).unwrap();
        assert_eq!(notice.tone, Tone::Bad);
        assert!(notice.text.starts_with("Wrong! The answer was C"));
        assert!(notice.text.contains("aurum"));

        let timed_out = AnswerOutcome {
            timed_out: true,
            ..outcome.clone()
        };
        assert!(notice_for(&QuizEvent::AnswerResult(timed_out))
            .unwrap()
            .text
            .starts_with("Time's up!"));

        let right = AnswerOutcome {
            correct: true,
            points: 300,
            double_points_applied: true,
            explanation: String::new(),
            ..outcome
        };
        assert_eq!(
            notice_for(&QuizEvent::AnswerResult(right)).unwrap().text,
            "Correct! +300 (x2)"
        );
        assert!(notice_for(&QuizEvent::Tick { time_left: 3 }).is_none());
    }

    #[test]
    fn renders_results_screen() {
        let summary = RoundSummary {
            record: record("Ada", 1200),
            wrong_count: 0,
            accuracy: 100,
            performance: 0.8,
            achievements: vec![Achievement::QuizMaster, Achievement::PerfectScore],
            quit: false,
        };
        let board = vec![record("Ada", 1200), record("Bob", 900)];
        let share = crate::core::share_text(1200);
        let results = ResultsView {
            summary: &summary,
            rank: Some(1),
            leaderboard: &board,
            share: &share,
        };
        let mut fb = FrameBuffer::new(1, 1);
        QuizView::new().render_results_into(&results, viewport(), &mut fb);

        let text = fb.text();
        assert!(text.contains("Quiz Complete!"));
        assert!(text.contains("1200"));
        assert!(text.contains("100%"));
        assert!(text.contains("Quiz Master"));
        assert!(text.contains("rank #1"));
        assert!(text.contains("Bob"));
        assert!(text.contains("I scored 1200 points"));
    }

    #[test]
    fn renders_menu_and_high_scores() {
        let categories = vec!["general".to_string(), "science".to_string()];
        let menu = MenuView {
            player: "Ada",
            categories: &categories,
            selected: 1,
            mode: Mode::Marathon,
            difficulty: Difficulty::Easy,
            stats: None,
        };
        let mut fb = FrameBuffer::new(1, 1);
        QuizView::new().render_menu_into(&menu, viewport(), &mut fb);
        let text = fb.text();
        assert!(text.contains("> Science"));
        assert!(text.contains("Marathon"));

        QuizView::new().render_high_scores_into(&[], true, viewport(), &mut fb);
        let text = fb.text();
        assert!(text.contains("No scores yet"));
        assert!(text.contains("confirm"));

        QuizView::new().render_high_scores_into(&[record("Cy", 77)], false, viewport(), &mut fb);
        assert!(fb.text().contains("Cy"));
        assert!(fb.text().contains("2026-02-03"));
    }

    #[test]
    fn tiny_viewport_does_not_panic() {
        let s = session();
        let snap = s.snapshot().unwrap();
        let mut fb = FrameBuffer::new(1, 1);
        QuizView::new().render_question_into(&snap, None, None, Viewport::new(3, 2), &mut fb);
        QuizView::new().render_high_scores_into(&[], false, Viewport::new(0, 0), &mut fb);
    }
}
