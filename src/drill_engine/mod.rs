//! Core drill engine — exact values, leveling, corpus streaming, sampling and timed sessions.
//!
//! ## Module overview
//!
//! | Module       | Purpose |
//! |--------------|---------|
//! | `models`     | Shared types: operators, question kinds, answers, corpus records |
//! | `error`      | `DrillError` and the crate `Result` alias |
//! | `exact`      | Exact trig values as canonical tokens, reciprocal derivation |
//! | `classifier` | Trig difficulty scoring and the difficulty → level table |
//! | `arith`      | Arithmetic expression generator and carry/borrow difficulty |
//! | `radians`    | Degree/radian notation, parsing and the endless conversion source |
//! | `bank`       | Offline builders: trig bank, JSONL writers, arithmetic corpus |
//! | `corpus`     | Chunked byte sources, line splitting, streaming record sources |
//! | `pool`       | Per-level pools, Park–Miller sequences, recency window, sampler |
//! | `answer`     | Per-kind answer checking |
//! | `store`      | Key-value persistence for high score and recent history |
//! | `config`     | `SessionConfig` presets, env overrides, validation |
//! | `session`    | The timed session state machine |
//! | `driver`     | tokio loop running a session against real time |
//! | `helpers`    | Display markup and small numeric helpers |
//! | `logging`    | `tracing-subscriber` setup for binaries and demos |

pub mod answer;
pub mod arith;
pub mod bank;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod driver;
pub mod error;
pub mod exact;
pub mod helpers;
pub mod logging;
pub mod models;
pub mod pool;
pub mod radians;
pub mod session;
pub mod store;

// Re-export the public API surface so callers can use
// `drill_engine::Session` without reaching into sub-modules.
pub use answer::AnswerChecker;
pub use bank::{trig_bank, write_arithmetic_corpus, write_records, AngleNotation};
pub use classifier::{classify, level_from_difficulty, BonusScheme, Classification};
pub use config::SessionConfig;
pub use corpus::{CorpusStream, RecordSource, VecSource};
pub use driver::{run_session, SessionUpdate};
pub use error::{DrillError, Result};
pub use exact::{canonical_answer, exact_value, ExactValue, Magnitude};
pub use models::{AnswerValue, QuestionKind, QuestionRecord, TrigOp};
pub use radians::RadDegSource;
pub use session::{FinishReason, Phase, QuestionTicket, QuestionView, Session, SessionSummary, Transition};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
