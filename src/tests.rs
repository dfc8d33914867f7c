//! Crate-level tests for `math_drill_gen`.
//!
//! Included from `lib.rs` under `#[cfg(test)]`.
//!
//! # Coverage
//!
//! | Group | What is tested |
//! |-------|----------------|
//! | Exact values | Reciprocal identity, tokens never empty, agreement with floating-point trig |
//! | Leveling | Level table is monotonic and bounded |
//! | Streaming | Any chunking of a corpus yields the same records |
//! | Trig drill | Served levels follow the score; bank content is never undefined |
//! | Arithmetic drill | Corpus file → stream → session → persisted high score |
//! | Radian drill | Endless single-level source keeps serving |
//! | Determinism | Same seed → same question sequence |

use std::time::Instant;

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use crate::drill_engine::{
    corpus::{CorpusStream, MemoryChunks},
    exact::is_exact_angle,
    store::load_high_score,
};
use crate::{
    exact_value, level_from_difficulty, trig_bank, write_arithmetic_corpus, write_records,
    AngleNotation, BonusScheme, FinishReason, JsonFileStore, MemoryStore, QuestionKind,
    RadDegSource, RecordSource, Session, SessionConfig, Transition, TrigOp, VecSource,
};

// ── helpers ──────────────────────────────────────────────────────────────────

/// Answer the current question correctly, returning the transition.
fn answer_correctly<S: RecordSource, K: crate::KeyValueStore>(
    session: &mut Session<S, K>,
    now: Instant,
) -> Transition {
    let answer = session
        .current_question()
        .map(|q| q.answer.to_string())
        .expect("a question is on screen");
    session.submit_answer(&answer, now)
}

fn float_value(op: TrigOp, deg: i32) -> f64 {
    let r = (deg as f64).to_radians();
    match op {
        TrigOp::Sin => r.sin(),
        TrigOp::Cos => r.cos(),
        TrigOp::Tan => r.sin() / r.cos(),
        TrigOp::Sec => 1.0 / r.cos(),
        TrigOp::Csc => 1.0 / r.sin(),
        TrigOp::Cot => r.cos() / r.sin(),
    }
}

fn denominator(op: TrigOp, deg: i32) -> f64 {
    let r = (deg as f64).to_radians();
    match op {
        TrigOp::Sin | TrigOp::Cos => 1.0,
        TrigOp::Tan | TrigOp::Sec => r.cos(),
        TrigOp::Csc | TrigOp::Cot => r.sin(),
    }
}

fn exact_angle() -> impl Strategy<Value = i32> {
    (-48i32..=48, prop::sample::select(vec![30, 45])).prop_map(|(k, step)| k * step)
}

fn op() -> impl Strategy<Value = TrigOp> {
    prop::sample::select(TrigOp::ALL.to_vec())
}

// ── exact values ─────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn reciprocal_operators_match_their_base(deg in exact_angle()) {
        prop_assert_eq!(exact_value(TrigOp::Csc, deg)?, exact_value(TrigOp::Sin, deg)?.reciprocal());
        prop_assert_eq!(exact_value(TrigOp::Sec, deg)?, exact_value(TrigOp::Cos, deg)?.reciprocal());
        prop_assert_eq!(exact_value(TrigOp::Cot, deg)?, exact_value(TrigOp::Tan, deg)?.reciprocal());
    }

    #[test]
    fn double_reciprocal_is_identity(deg in exact_angle(), op in op()) {
        let v = exact_value(op, deg)?;
        prop_assert_eq!(v.reciprocal().reciprocal(), v);
    }

    #[test]
    fn tokens_are_never_empty(deg in exact_angle(), op in op()) {
        prop_assert!(!exact_value(op, deg)?.to_string().is_empty());
    }

    #[test]
    fn exact_values_agree_with_float_trig(deg in exact_angle(), op in op()) {
        let v = exact_value(op, deg)?;
        match v.approx() {
            Some(approx) => {
                let expected = float_value(op, deg);
                prop_assert!((approx - expected).abs() < 1e-9, "{op}({deg}) = {v}, float {expected}");
            }
            None => prop_assert!(denominator(op, deg).abs() < 1e-9, "{op}({deg}) should be defined"),
        }
    }

    #[test]
    fn level_table_is_monotonic(a in 0.0f64..12.0, b in 0.0f64..12.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(level_from_difficulty(lo) <= level_from_difficulty(hi));
        prop_assert!((1..=10).contains(&level_from_difficulty(hi)));
    }
}

#[test]
fn non_exact_angles_are_rejected() {
    assert!(!is_exact_angle(10));
    assert!(exact_value(TrigOp::Sin, 10).is_err());
}

// ── streaming ────────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn any_chunking_yields_the_same_records(cuts in prop::collection::vec(0usize..4000, 0..12)) {
        let bank = trig_bank(-90, 90, AngleNotation::Degrees, BonusScheme::default()).unwrap();
        let mut bytes = Vec::new();
        write_records(&mut bytes, &bank).unwrap();

        let mut cuts: Vec<usize> = cuts.into_iter().map(|c| c % (bytes.len() + 1)).collect();
        cuts.sort_unstable();
        cuts.dedup();
        let mut chunks = Vec::new();
        let mut start = 0;
        for cut in cuts {
            chunks.push(bytes[start..cut].to_vec());
            start = cut;
        }
        chunks.push(bytes[start..].to_vec());

        let mut stream = CorpusStream::new(MemoryChunks::new(chunks));
        let mut back = Vec::new();
        while let Some(r) = stream.next_record().unwrap() {
            back.push(r);
        }
        prop_assert_eq!(back, bank);
        prop_assert_eq!(stream.malformed_count(), 0);
    }
}

// ── trig drill ───────────────────────────────────────────────────────────────

#[test]
fn trig_session_serves_the_level_of_the_score() {
    let bank = trig_bank(-720, 720, AngleNotation::Degrees, BonusScheme::default()).unwrap();
    let config = SessionConfig { seed: Some(9), ..SessionConfig::trig_drill() };
    let mut session = Session::new(config.clone(), VecSource::new(bank), MemoryStore::new()).unwrap();
    let now = Instant::now();

    let mut transition = session.start(now);
    for _ in 0..60 {
        match transition {
            Transition::Asked(view) => {
                let record = session.current_question().unwrap();
                assert_eq!(record.level, config.level_for_score(view.score));
                assert_eq!(record.kind(), QuestionKind::Trig);
                assert_ne!(record.answer.to_string(), "U");
                assert!(view.display.starts_with("\\(") && view.display.ends_with("\\)"));
            }
            Transition::Finished(summary) => {
                assert_eq!(summary.reason, FinishReason::EndOfContent);
                return;
            }
            other => panic!("unexpected transition {other:?}"),
        }
        transition = answer_correctly(&mut session, now);
    }
    assert_eq!(session.score(), 60);
}

#[test]
fn a_miss_after_progress_retries_the_same_question() {
    let bank = trig_bank(-360, 360, AngleNotation::Degrees, BonusScheme::default()).unwrap();
    let config = SessionConfig { seed: Some(1), ..SessionConfig::trig_drill() };
    let mut session = Session::new(config, VecSource::new(bank), MemoryStore::new()).unwrap();
    let now = Instant::now();
    session.start(now);
    for _ in 0..3 {
        answer_correctly(&mut session, now);
    }
    let shown = session.current_question().cloned();
    assert!(matches!(session.submit_answer("definitely wrong", now), Transition::Retry(_)));
    assert_eq!(session.score(), 2);
    assert_eq!(session.current_question().cloned(), shown);
}

// ── arithmetic drill ─────────────────────────────────────────────────────────

#[test]
fn arithmetic_corpus_file_drives_a_persistent_session() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = dir.path().join("questions.jsonl");
    let store_path = dir.path().join("scores.json");

    let mut file = std::fs::File::create(&corpus_path).unwrap();
    write_arithmetic_corpus(&mut file, 6, 3, 0).unwrap();
    drop(file);

    let config = SessionConfig {
        buffer_target: 2,
        recent_window: 4,
        level_cap: 3,
        corpus_levels: 3,
        max_initial_skip: 0,
        seed: Some(5),
        ..SessionConfig::arithmetic_drill()
    };
    let source = CorpusStream::from_reader(std::fs::File::open(&corpus_path).unwrap());
    let store = JsonFileStore::open(&store_path).unwrap();
    let mut session = Session::new(config.clone(), source, store).unwrap();
    let now = Instant::now();

    let mut transition = session.start(now);
    let summary = loop {
        match transition {
            Transition::Asked(_) => transition = answer_correctly(&mut session, now),
            Transition::Finished(summary) => break summary,
            other => panic!("unexpected transition {other:?}"),
        }
    };
    assert_eq!(summary.reason, FinishReason::EndOfContent);
    assert!(summary.score >= 1);
    assert!(summary.new_high_score);

    let reopened = JsonFileStore::open(&store_path).unwrap();
    assert_eq!(load_high_score(&reopened, &config.high_score_key), summary.score);
}

// ── radian drill ─────────────────────────────────────────────────────────────

#[test]
fn radian_drill_keeps_serving_at_level_one() {
    let config = SessionConfig { seed: Some(2), ..SessionConfig::radian_drill() };
    let source = RadDegSource::new(StdRng::seed_from_u64(2));
    let mut session = Session::new(config, source, MemoryStore::new()).unwrap();
    let now = Instant::now();

    let mut transition = session.start(now);
    for _ in 0..25 {
        let Transition::Asked(view) = transition else { panic!("expected a question") };
        assert_eq!(view.level, 1);
        assert!(matches!(view.kind, QuestionKind::DegToRad | QuestionKind::RadToDeg));
        transition = answer_correctly(&mut session, now);
    }
    assert_eq!(session.score(), 25);
}

// ── determinism ──────────────────────────────────────────────────────────────

#[test]
fn same_seed_serves_the_same_sequence() {
    let run = |seed: u64| -> Vec<String> {
        let bank = trig_bank(-360, 360, AngleNotation::Degrees, BonusScheme::default()).unwrap();
        let config = SessionConfig { seed: Some(seed), ..SessionConfig::trig_drill() };
        let mut session = Session::new(config, VecSource::new(bank), MemoryStore::new()).unwrap();
        let now = Instant::now();
        session.start(now);
        let mut seen = Vec::new();
        for _ in 0..12 {
            let Some(q) = session.current_question() else { break };
            seen.push(q.expression.clone());
            if !matches!(answer_correctly(&mut session, now), Transition::Asked(_)) {
                break;
            }
        }
        seen
    };
    assert_eq!(run(77), run(77));
}
