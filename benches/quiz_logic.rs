use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tui_quiz::core::{Ledger, MemoryStore, QuestionBank, QuizSession, RoundGenerator, ScoreRecord};
use tui_quiz::term::{FrameBuffer, QuizView, Viewport};
use tui_quiz::types::{Difficulty, Mode, RoundConfig, TICK_MS};

fn config() -> RoundConfig {
    RoundConfig::new("Bench", "general", Difficulty::Medium, Mode::Marathon)
}

fn bench_tick(c: &mut Criterion) {
    let mut session = QuizSession::new(QuestionBank::builtin(), Ledger::open(MemoryStore::new()), 12345);
    session.start(config());

    c.bench_function("round_tick_50ms", |b| {
        b.iter(|| {
            session.tick(black_box(TICK_MS));
            if session.round().is_some_and(|r| r.is_ended()) {
                session.restart();
            }
            session.take_events();
        })
    });
}

fn bench_generate(c: &mut Criterion) {
    let bank = QuestionBank::builtin();
    let mut generator = RoundGenerator::new(12345);

    c.bench_function("generate_round", |b| {
        b.iter(|| generator.generate(&bank, black_box("general"), Mode::Marathon))
    });
}

fn bench_ledger_record(c: &mut Criterion) {
    let mut ledger = Ledger::open(MemoryStore::new());
    let mut score = 0u32;

    c.bench_function("ledger_record_full", |b| {
        b.iter(|| {
            score = score.wrapping_mul(1_103_515_245).wrapping_add(12_345) % 3000;
            ledger
                .record(ScoreRecord {
                    player: "bench".to_string(),
                    score,
                    category: "general".to_string(),
                    difficulty: Difficulty::Medium,
                    date: "2024-01-01".to_string(),
                    total_elapsed_secs: 42,
                    correct_count: 3,
                    total_questions: 10,
                })
                .ok()
        })
    });
}

fn bench_render_question(c: &mut Criterion) {
    let mut session = QuizSession::new(QuestionBank::builtin(), Ledger::open(MemoryStore::new()), 12345);
    session.start(config());
    let view = QuizView::new();
    let mut fb = FrameBuffer::new(100, 30);

    c.bench_function("render_question_100x30", |b| {
        b.iter(|| {
            if let Some(snap) = session.snapshot() {
                view.render_question_into(&snap, None, None, Viewport::new(100, 30), &mut fb);
            }
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_generate,
    bench_ledger_record,
    bench_render_question
);
criterion_main!(benches);
