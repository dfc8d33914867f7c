//! Build the question corpora offline.
//!
//! Run with:
//!   cargo run --example build_corpus -- [out_dir] [per_level]
//!
//! Writes two JSONL files into `out_dir` (default `.`):
//!
//! - `trig_bank.jsonl` — every exact-angle question in −720°..720°, degree
//!   notation, undefined answers left out.
//! - `arith_corpus.jsonl` — `per_level` (default 100) arithmetic questions for
//!   each of the 30 levels, generated from seed 0 upward.
//!
//! Both stream straight back through `CorpusStream`. Set `RUST_LOG=debug` to
//! watch progress.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use math_drill_gen::{
    drill_engine::{bank::MAX_ARITHMETIC_LEVELS, logging::init_tracing},
    trig_bank, write_arithmetic_corpus, write_records, AngleNotation, BonusScheme,
};

fn main() -> math_drill_gen::Result<()> {
    init_tracing("info");

    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    let per_level: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(100);
    std::fs::create_dir_all(&out_dir)?;

    // ── trig bank ────────────────────────────────────────────────────────────
    let bank = trig_bank(-720, 720, AngleNotation::Degrees, BonusScheme::default())?;
    let trig_path = out_dir.join("trig_bank.jsonl");
    let written = write_records(&mut BufWriter::new(File::create(&trig_path)?), &bank)?;
    println!("  {written:>6} trig questions  → {}", trig_path.display());

    let mut by_level = [0usize; 11];
    for record in &bank {
        by_level[record.level as usize] += 1;
    }
    for (level, count) in by_level.iter().enumerate().skip(1) {
        println!("         level {level:>2}: {count}");
    }

    // ── arithmetic corpus ────────────────────────────────────────────────────
    let arith_path = out_dir.join("arith_corpus.jsonl");
    let mut writer = BufWriter::new(File::create(&arith_path)?);
    let report = write_arithmetic_corpus(&mut writer, per_level, MAX_ARITHMETIC_LEVELS, 0)?;
    println!(
        "  {:>6} arithmetic questions → {} ({} seeds tried)",
        report.written,
        arith_path.display(),
        report.seeds_tried
    );
    Ok(())
}
