//! # math_drill_gen
//!
//! An offline question generation and leveling engine for timed math drills.
//!
//! The library builds questions for three drills (exact trig values, mental
//! arithmetic, degree/radian conversion), grades each question into a
//! difficulty level, and runs a timed session that serves questions at the
//! level matching the player's running score.
//!
//! ## How it works
//!
//! 1. Questions come from a [`RecordSource`]: the in-memory trig bank from
//!    [`trig_bank`], a JSONL corpus streamed through [`CorpusStream`], or the
//!    endless [`RadDegSource`].
//! 2. A sampler routes every record into a per-level pool and draws from the
//!    pool for the current level with a deterministic per-level sequence,
//!    avoiding anything in the recent-question window.
//! 3. A [`Session`] shows one question at a time under a countdown. A correct
//!    answer scores +1 and moves on; a wrong one scores −1 and retries the same
//!    question. The session ends when the score drops below zero, time runs
//!    out, or the corpus has nothing left for the current level.
//! 4. [`run_session`] drives a session on tokio with a real timer and emits
//!    [`SessionUpdate`]s for whatever renders it.
//!
//! ## Key features
//!
//! - **Exact answers**: trig values are table lookups rendered as canonical
//!   tokens (`-r3/2`, `2r3/3`, `U`); reciprocals are derived, never computed.
//! - **Deterministic**: set `SessionConfig::seed` to reproduce a session's
//!   draws exactly — useful for tests and replays.
//! - **Streaming corpora**: lines may be split across chunks arbitrarily, and
//!   malformed lines are skipped, never fatal.
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Instant;
//!
//! use math_drill_gen::{
//!     trig_bank, AngleNotation, BonusScheme, MemoryStore, Session, SessionConfig, Transition,
//!     VecSource,
//! };
//!
//! let bank = trig_bank(-360, 360, AngleNotation::Degrees, BonusScheme::default())?;
//! let config = SessionConfig { seed: Some(42), ..SessionConfig::trig_drill() };
//! let mut session = Session::new(config, VecSource::new(bank), MemoryStore::new())?;
//!
//! let now = Instant::now();
//! if let Transition::Asked(q) = session.start(now) {
//!     println!("Q (level {}): {}", q.level, q.display);
//! }
//!
//! let answer = session.current_question().map(|q| q.answer.to_string()).unwrap_or_default();
//! session.submit_answer(&answer, now);
//! assert_eq!(session.score(), 1);
//! # Ok::<(), math_drill_gen::DrillError>(())
//! ```

pub mod drill_engine;

// Convenience re-exports so callers can use `math_drill_gen::Session`
// directly without reaching into `drill_engine::`.
pub use drill_engine::{
    canonical_answer, classify, exact_value, level_from_difficulty, run_session, trig_bank,
    write_arithmetic_corpus, write_records, AngleNotation, AnswerChecker, AnswerValue,
    BonusScheme, Classification, CorpusStream, DrillError, ExactValue, FinishReason,
    JsonFileStore, KeyValueStore, MemoryStore, Phase, QuestionKind, QuestionRecord,
    QuestionTicket, QuestionView, RadDegSource, RecordSource, Result, Session, SessionConfig,
    SessionSummary, SessionUpdate, Transition, TrigOp, VecSource,
};

#[cfg(test)]
mod tests;
