//! Terminal quiz runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer for output. When the
//! adapter is enabled, remote commands are applied between ticks and every
//! round event is streamed to connected clients.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{info, warn};

use tui_quiz::adapter::Adapter;
use tui_quiz::core::{JsonFileStore, Ledger, QuestionBank, QuizSession};
use tui_quiz::term::{AdapterStatusView, FrameBuffer, QuizView, TerminalRenderer, Viewport};
use tui_quiz::types::{RoundConfig, TICK_MS};
use tui_quiz::{init_logging, App, AppConfig};

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    init_logging(config.log_path.as_ref())?;

    let bank = match &config.bank_path {
        Some(path) => QuestionBank::load_json_file(path)?,
        None => QuestionBank::builtin(),
    };
    let ledger = Ledger::open(JsonFileStore::new(&config.ledger_path));
    let seed = config.seed_or_clock();
    info!(seed, ledger = %config.ledger_path.display(), "starting quiz");

    let session = QuizSession::new(bank, ledger, seed);
    let defaults = RoundConfig::new(
        config.player.clone(),
        config.category.clone(),
        config.difficulty,
        config.mode,
    );
    let mut app = App::new(session, defaults);

    let mut adapter = match Adapter::start_from_env() {
        Ok(adapter) => adapter,
        Err(e) => {
            warn!(error = %e, "adapter unavailable, continuing without remote control");
            None
        }
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut app, adapter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run<S: tui_quiz::core::LedgerStore>(
    term: &mut TerminalRenderer,
    app: &mut App<S>,
    mut adapter: Option<&mut Adapter>,
) -> Result<()> {
    let view = QuizView::new();
    let mut fb = FrameBuffer::new(0, 0);
    let mut last_size = (0u16, 0u16);

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        if (w, h) != last_size {
            term.invalidate();
            last_size = (w, h);
        }
        let status = adapter.as_deref().map(|a| {
            let s = a.status();
            AdapterStatusView {
                client_count: s.client_count.min(u16::MAX as usize) as u16,
                controller_id: s.controller_id,
            }
        });
        app.render_into(&view, status.as_ref(), Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }
        if app.should_exit() {
            return Ok(());
        }

        // Remote commands.
        let remote = match adapter.as_deref_mut() {
            Some(a) => a.pump(app.session_mut()),
            None => false,
        };

        // Tick.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            app.tick(elapsed.as_millis().min(u32::MAX as u128) as u32);
        }

        let events = app.drain_events();
        if let Some(a) = adapter.as_deref_mut() {
            if !events.is_empty() {
                a.broadcast_events(&events);
            }
            if remote || !events.is_empty() {
                a.broadcast_observation(app.session());
            }
        }
    }
}
