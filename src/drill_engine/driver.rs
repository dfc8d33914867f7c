//! Runs a [`Session`] against real time on tokio.
//!
//! One task owns the session. Each question races three things: the next
//! answer from the answer channel, the question's deadline, and a one-second
//! countdown tick. Whatever wins is applied to the session before anything
//! else is looked at, so a timer and an answer never interleave.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::drill_engine::{
    corpus::RecordSource,
    session::{FinishReason, QuestionView, Session, SessionSummary, Transition},
    store::KeyValueStore,
};

const TICK: Duration = Duration::from_secs(1);

/// Everything the presentation side is told about a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// A question is on screen (again, after a wrong answer).
    Question(QuestionView),
    Verdict { correct: bool, score: i64 },
    Tick { remaining: Duration },
    Finished(SessionSummary),
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

/// Drive `session` until it finishes.
///
/// Returns `None` when the session is abandoned: the answer channel closed or
/// nobody listens to updates any more.
pub async fn run_session<S, K>(
    session: &mut Session<S, K>,
    mut answers: mpsc::Receiver<String>,
    updates: mpsc::Sender<SessionUpdate>,
) -> Option<SessionSummary>
where
    S: RecordSource,
    K: KeyValueStore,
{
    let mut transition = session.start(now());
    let mut answered = false;

    loop {
        if answered {
            let correct = match &transition {
                Transition::Asked(_) => Some(true),
                Transition::Retry(_) => Some(false),
                Transition::Finished(s) => match s.reason {
                    FinishReason::ScoreBelowZero => Some(false),
                    FinishReason::EndOfContent => Some(true),
                    FinishReason::TimeUp => None,
                },
                Transition::Ignored => None,
            };
            if let Some(correct) = correct {
                let update = SessionUpdate::Verdict { correct, score: session.score() };
                updates.send(update).await.ok()?;
            }
        }

        match transition {
            Transition::Asked(view) | Transition::Retry(view) => {
                updates.send(SessionUpdate::Question(view)).await.ok()?;
            }
            Transition::Finished(summary) => {
                updates.send(SessionUpdate::Finished(summary.clone())).await.ok()?;
                return Some(summary);
            }
            Transition::Ignored => {}
        }

        let (Some(ticket), Some(deadline)) = (session.ticket(), session.deadline()) else {
            // Nothing to wait for; only reachable if the session never started.
            return None;
        };
        let sleep = time::sleep_until(Instant::from_std(deadline));
        tokio::pin!(sleep);
        let mut tick = time::interval_at(Instant::now() + TICK, TICK);

        (transition, answered) = loop {
            tokio::select! {
                biased;
                input = answers.recv() => match input {
                    Some(input) => break (session.submit_answer(&input, now()), true),
                    None => {
                        info!(score = session.score(), "answer channel closed, abandoning session");
                        return None;
                    }
                },
                _ = &mut sleep => break (session.on_timeout(ticket), false),
                _ = tick.tick() => {
                    let remaining = session.remaining(now());
                    debug!(?remaining, "tick");
                    updates.send(SessionUpdate::Tick { remaining }).await.ok()?;
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill_engine::{
        config::SessionConfig,
        corpus::VecSource,
        models::{AnswerValue, QuestionKind, QuestionRecord},
        store::MemoryStore,
    };

    fn session() -> Session<VecSource, MemoryStore> {
        let records = (1..=40)
            .map(|n| {
                QuestionRecord::new(
                    1,
                    format!("{n} + 0"),
                    AnswerValue::Numeric(n as f64),
                    1.0,
                    QuestionKind::Arithmetic,
                )
            })
            .collect();
        let config = SessionConfig {
            buffer_target: 4,
            recent_window: 4,
            level_cap: 1,
            corpus_levels: 1,
            max_initial_skip: 0,
            seed: Some(3),
            ..SessionConfig::arithmetic_drill()
        };
        Session::new(config, VecSource::new(records), MemoryStore::new()).unwrap()
    }

    fn drain(rx: &mut mpsc::Receiver<SessionUpdate>) -> Vec<SessionUpdate> {
        let mut out = Vec::new();
        while let Ok(update) = rx.try_recv() {
            out.push(update);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_question_times_out_with_countdown() {
        let mut s = session();
        let (_answer_tx, answer_rx) = mpsc::channel(8);
        let (update_tx, mut update_rx) = mpsc::channel(256);
        let started = Instant::now();

        let summary = run_session(&mut s, answer_rx, update_tx).await.unwrap();
        assert_eq!(summary.reason, FinishReason::TimeUp);
        assert_eq!(Instant::now() - started, Duration::from_secs(20));

        let updates = drain(&mut update_rx);
        assert!(matches!(updates.first(), Some(SessionUpdate::Question(_))));
        assert_eq!(
            updates.get(1),
            Some(&SessionUpdate::Tick { remaining: Duration::from_secs(19) })
        );
        assert!(matches!(updates.last(), Some(SessionUpdate::Finished(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn answers_are_judged_until_score_drops_below_zero() {
        let mut s = session();
        let (answer_tx, answer_rx) = mpsc::channel(8);
        let (update_tx, mut update_rx) = mpsc::channel(8);

        let controller = async move {
            let mut verdicts = Vec::new();
            let mut correct_left = 2;
            while let Some(update) = update_rx.recv().await {
                match update {
                    SessionUpdate::Question(view) => {
                        let reply = if correct_left > 0 {
                            correct_left -= 1;
                            view.expression.trim_end_matches(" + 0").to_string()
                        } else {
                            "wrong".to_string()
                        };
                        answer_tx.send(reply).await.unwrap();
                    }
                    SessionUpdate::Verdict { correct, score } => verdicts.push((correct, score)),
                    SessionUpdate::Tick { .. } => {}
                    SessionUpdate::Finished(_) => break,
                }
            }
            verdicts
        };

        let (summary, verdicts) = tokio::join!(run_session(&mut s, answer_rx, update_tx), controller);
        let summary = summary.unwrap();
        assert_eq!(summary.reason, FinishReason::ScoreBelowZero);
        assert_eq!(summary.score, -1);
        assert_eq!(summary.high_score, 0);
        assert_eq!(
            verdicts,
            vec![(true, 1), (true, 2), (false, 1), (false, 0), (false, -1)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn closed_answer_channel_abandons_the_session() {
        let mut s = session();
        let (answer_tx, answer_rx) = mpsc::channel::<String>(1);
        drop(answer_tx);
        let (update_tx, mut update_rx) = mpsc::channel(8);

        assert_eq!(run_session(&mut s, answer_rx, update_tx).await, None);
        let updates = drain(&mut update_rx);
        assert_eq!(updates.len(), 1);
        assert!(matches!(updates[0], SessionUpdate::Question(_)));
    }
}
