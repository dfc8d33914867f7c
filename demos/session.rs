//! Play a timed drill in the terminal.
//!
//! Run with:
//!   cargo run --example session               # exact trig values
//!   cargo run --example session -- radian     # degree/radian conversion
//!   cargo run --example session -- arith questions.jsonl
//!
//! Type an answer and press enter. Trig answers use the canonical tokens
//! (`r3/2`, `-2r3/3`, `U`); radians may be typed as `3pi/4`.
//!
//! `DRILL_*` variables override the session config (`DRILL_TIMEOUT_SECS=30`,
//! `DRILL_SEED=7`, …). Scores are kept in `drill_scores.json`, or wherever
//! `DRILL_STORE` points.

use std::io::BufRead;

use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::mpsc;

use math_drill_gen::{
    drill_engine::logging::init_tracing, run_session, trig_bank, AngleNotation, BonusScheme,
    CorpusStream, DrillError, JsonFileStore, RadDegSource, RecordSource, Session, SessionConfig,
    SessionUpdate, VecSource,
};

fn source_for(mode: &str, path: Option<&str>) -> math_drill_gen::Result<(SessionConfig, Box<dyn RecordSource>)> {
    match mode {
        "trig" => {
            let bank = trig_bank(-720, 720, AngleNotation::Degrees, BonusScheme::default())?;
            Ok((SessionConfig::trig_drill(), Box::new(VecSource::new(bank))))
        }
        "radian" => Ok((
            SessionConfig::radian_drill(),
            Box::new(RadDegSource::new(StdRng::from_entropy())),
        )),
        "arith" => {
            let path = path.ok_or_else(|| DrillError::config("arith mode needs a corpus path"))?;
            let file = std::fs::File::open(path)?;
            Ok((SessionConfig::arithmetic_drill(), Box::new(CorpusStream::from_reader(file))))
        }
        other => Err(DrillError::config(format!("unknown mode {other:?}"))),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> math_drill_gen::Result<()> {
    init_tracing("warn");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = args.first().map(String::as_str).unwrap_or("trig");
    let (config, source) = source_for(mode, args.get(1).map(String::as_str))?;
    let config = config.with_env_overrides();

    let store_path = std::env::var("DRILL_STORE").unwrap_or_else(|_| "drill_scores.json".to_string());
    let store = JsonFileStore::open(&store_path)?;
    let mut session = Session::new(config, source, store)?;

    // stdin is blocking; read it on its own thread.
    let (answer_tx, answer_rx) = mpsc::channel::<String>(8);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if answer_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    let (update_tx, mut update_rx) = mpsc::channel(32);
    let printer = async move {
        while let Some(update) = update_rx.recv().await {
            match update {
                SessionUpdate::Question(q) => {
                    println!();
                    println!("  [level {}  score {}  best {}]", q.level, q.score, q.high_score);
                    println!("  Q: {}", q.expression);
                }
                SessionUpdate::Verdict { correct, score } => {
                    let mark = if correct { "✓" } else { "✗" };
                    println!("  {mark}  score {score}");
                }
                SessionUpdate::Tick { remaining } => {
                    let secs = remaining.as_secs();
                    if secs <= 5 {
                        println!("  … {secs}s");
                    }
                }
                SessionUpdate::Finished(summary) => {
                    println!();
                    println!("══ Game over: {} ══", summary.reason);
                    println!("  Score: {}  Best: {}", summary.score, summary.high_score);
                    if summary.new_high_score {
                        println!("  New high score!");
                    }
                }
            }
        }
    };

    let (outcome, ()) = tokio::join!(run_session(&mut session, answer_rx, update_tx), printer);
    if outcome.is_none() {
        println!("  Session abandoned.");
    }
    // The stdin thread may still be parked on a read.
    std::process::exit(0);
}
