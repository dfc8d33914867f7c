//! The timed quiz session.
//!
//! ```text
//! Idle ──start──▶ AwaitingAnswer ──correct──▶ AwaitingAnswer (next question)
//!                       │        ──wrong────▶ AwaitingAnswer (same question)
//!                       │        ──wrong, score < 0──▶ Finished(ScoreBelowZero)
//!                       │        ──timer─────────────▶ Finished(TimeUp)
//!                       └──no content for level──────▶ Finished(EndOfContent)
//! ```
//!
//! Every question (and every retry of one) gets a fresh [`QuestionTicket`].
//! A timeout only applies to the ticket that is still current, so a timer
//! that fires after the question moved on, or after the session ended, is a
//! no-op. Time is passed in by the caller, which keeps the machine
//! independent of any runtime.

use std::fmt;
use std::time::{Duration, Instant};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{error, info, warn};

use crate::drill_engine::{
    answer::AnswerChecker,
    config::SessionConfig,
    corpus::RecordSource,
    error::{DrillError, Result},
    helpers::{display_markup, wrap_math},
    models::{QuestionKind, QuestionRecord},
    pool::{ParkMiller, Sampler},
    store::{load_high_score, load_recent, save_high_score, save_recent, KeyValueStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    ScoreBelowZero,
    TimeUp,
    EndOfContent,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::ScoreBelowZero => write!(f, "score below zero"),
            FinishReason::TimeUp         => write!(f, "time up"),
            FinishReason::EndOfContent   => write!(f, "end of content"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingAnswer,
    Finished(FinishReason),
}

/// Identifies one timed showing of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestionTicket(u64);

/// What the renderer needs to show the current question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub ticket: QuestionTicket,
    pub expression: String,
    /// Markup for the external renderer.
    pub display: String,
    pub kind: QuestionKind,
    pub level: u8,
    pub score: i64,
    pub high_score: i64,
    pub deadline: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub score: i64,
    pub high_score: i64,
    pub reason: FinishReason,
    pub new_high_score: bool,
}

/// Result of feeding one event into the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// A new question is on screen.
    Asked(QuestionView),
    /// Wrong answer; the same question is shown again with a fresh timer.
    Retry(QuestionView),
    Finished(SessionSummary),
    /// The event did not apply (stale timer, session not running).
    Ignored,
}

struct ActiveQuestion {
    record: QuestionRecord,
    ticket: QuestionTicket,
    deadline: Instant,
}

pub struct Session<S, K> {
    config: SessionConfig,
    checker: AnswerChecker,
    sampler: Sampler<S>,
    store: K,
    seed: u64,
    phase: Phase,
    score: i64,
    high_score: i64,
    current: Option<ActiveQuestion>,
    generation: u64,
}

fn session_seed(fixed: Option<u64>) -> u64 {
    match fixed {
        Some(seed) => seed,
        None => StdRng::from_entropy().gen(),
    }
}

impl<S: RecordSource, K: KeyValueStore> Session<S, K> {
    /// New idle session over `source`. Reads the high score and history from `store`.
    pub fn new(config: SessionConfig, source: S, store: K) -> Result<Self> {
        config.validate()?;
        let seed = session_seed(config.seed);
        let high_score = load_high_score(&store, &config.high_score_key);
        let sampler = Self::build_sampler(&config, &store, source, seed);
        Ok(Self {
            checker: AnswerChecker::new(config.answer_tolerance),
            config,
            sampler,
            store,
            seed,
            phase: Phase::Idle,
            score: 0,
            high_score,
            current: None,
            generation: 0,
        })
    }

    fn build_sampler(config: &SessionConfig, store: &K, source: S, seed: u64) -> Sampler<S> {
        let history = match &config.recent_key {
            Some(key) => load_recent(store, key),
            None => Vec::new(),
        };
        Sampler::with_history(source, config.sampler_settings(), seed, history)
    }

    // -- accessors ----------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn high_score(&self) -> i64 {
        self.high_score
    }

    pub fn level(&self) -> u8 {
        self.config.level_for_score(self.score)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// The question on screen, or the last one shown once finished.
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.current.as_ref().map(|q| &q.record)
    }

    pub fn ticket(&self) -> Option<QuestionTicket> {
        match self.phase {
            Phase::AwaitingAnswer => self.current.as_ref().map(|q| q.ticket),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::AwaitingAnswer => self.current.as_ref().map(|q| q.deadline),
            _ => None,
        }
    }

    /// Time left on the current question; zero when nothing is running.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline()
            .map_or(Duration::ZERO, |d| d.saturating_duration_since(now))
    }

    pub fn view(&self) -> Option<QuestionView> {
        if self.phase != Phase::AwaitingAnswer {
            return None;
        }
        let q = self.current.as_ref()?;
        let display = match q.record.kind() {
            QuestionKind::Trig | QuestionKind::Arithmetic => display_markup(&q.record.expression),
            QuestionKind::DegToRad | QuestionKind::RadToDeg => wrap_math(&q.record.expression),
        };
        Some(QuestionView {
            ticket: q.ticket,
            expression: q.record.expression.clone(),
            display,
            kind: q.record.kind(),
            level: self.level(),
            score: self.score,
            high_score: self.high_score,
            deadline: q.deadline,
        })
    }

    // -- events -------------------------------------------------------------

    /// Leave `Idle` by showing the first question.
    pub fn start(&mut self, now: Instant) -> Transition {
        if self.phase != Phase::Idle {
            return Transition::Ignored;
        }
        info!(seed = self.seed, high_score = self.high_score, "session started");
        if self.config.max_initial_skip > 0 {
            let n = ParkMiller::for_level(self.seed, 0).pick(self.config.max_initial_skip as usize);
            if let Err(err) = self.sampler.skip_initial(n as u64) {
                error!(%err, "initial corpus skip failed");
                return self.finish(FinishReason::EndOfContent);
            }
        }
        self.ask_next(now)
    }

    pub fn submit_answer(&mut self, input: &str, now: Instant) -> Transition {
        if self.phase != Phase::AwaitingAnswer {
            return Transition::Ignored;
        }
        let Some(q) = self.current.as_ref() else {
            return Transition::Ignored;
        };
        if now >= q.deadline {
            return self.finish(FinishReason::TimeUp);
        }
        if self.checker.is_correct(&q.record, input) {
            self.score += 1;
            self.ask_next(now)
        } else {
            self.score -= 1;
            if self.score < 0 {
                return self.finish(FinishReason::ScoreBelowZero);
            }
            let deadline = now + self.config.question_timeout;
            let ticket = self.next_ticket();
            if let Some(q) = self.current.as_mut() {
                q.ticket = ticket;
                q.deadline = deadline;
            }
            self.view().map_or(Transition::Ignored, Transition::Retry)
        }
    }

    /// Timer callback for `ticket`. Stale tickets are ignored.
    pub fn on_timeout(&mut self, ticket: QuestionTicket) -> Transition {
        if self.ticket() != Some(ticket) {
            return Transition::Ignored;
        }
        self.finish(FinishReason::TimeUp)
    }

    /// Deadline check for callers that poll instead of arming a timer.
    pub fn poll_timeout(&mut self, now: Instant) -> Transition {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.finish(FinishReason::TimeUp),
            _ => Transition::Ignored,
        }
    }

    /// Start over on a fresh source: new seed, pools and window; score back to 0.
    ///
    /// A session abandoned mid-question still keeps its high score.
    pub fn restart(&mut self, source: S, now: Instant) -> Transition {
        if self.phase == Phase::AwaitingAnswer {
            self.record_high_score();
        }
        self.seed = session_seed(self.config.seed);
        self.sampler = Self::build_sampler(&self.config, &self.store, source, self.seed);
        self.high_score = load_high_score(&self.store, &self.config.high_score_key).max(self.high_score);
        self.score = 0;
        self.current = None;
        self.phase = Phase::Idle;
        self.start(now)
    }

    // -- internals ----------------------------------------------------------

    fn next_ticket(&mut self) -> QuestionTicket {
        self.generation += 1;
        QuestionTicket(self.generation)
    }

    fn ask_next(&mut self, now: Instant) -> Transition {
        let level = self.level();
        let record = match self.sampler.next_question(level) {
            Ok(record) => record,
            Err(DrillError::StreamExhausted { .. }) => {
                return self.finish(FinishReason::EndOfContent);
            }
            Err(err) => {
                error!(level, %err, "question source failed");
                return self.finish(FinishReason::EndOfContent);
            }
        };
        self.persist_recent();
        let ticket = self.next_ticket();
        self.current = Some(ActiveQuestion {
            record,
            ticket,
            deadline: now + self.config.question_timeout,
        });
        self.phase = Phase::AwaitingAnswer;
        self.view().map_or(Transition::Ignored, Transition::Asked)
    }

    fn persist_recent(&mut self) {
        let Some(key) = self.config.recent_key.as_deref() else {
            return;
        };
        let recent = self.sampler.recent().to_vec();
        if let Err(err) = save_recent(&mut self.store, key, &recent) {
            warn!(%err, "could not persist recent questions");
        }
    }

    /// Persist the score if it beats the best so far.
    fn record_high_score(&mut self) -> bool {
        if self.score <= self.high_score {
            return false;
        }
        self.high_score = self.score;
        if let Err(err) = save_high_score(&mut self.store, &self.config.high_score_key, self.score) {
            warn!(%err, "could not persist high score");
        }
        info!(score = self.score, "new high score");
        true
    }

    fn finish(&mut self, reason: FinishReason) -> Transition {
        self.phase = Phase::Finished(reason);
        let new_high_score = self.record_high_score();
        info!(score = self.score, %reason, "session finished");
        Transition::Finished(SessionSummary {
            score: self.score,
            high_score: self.high_score,
            reason,
            new_high_score,
        })
    }
}
