//! Offline corpus builders.
//!
//! The trig bank is small enough to build in memory and feed straight into a
//! session through [`VecSource`](crate::drill_engine::corpus::VecSource). The
//! arithmetic corpus is written as JSONL and streamed back later through
//! [`CorpusStream`](crate::drill_engine::corpus::CorpusStream).

use std::collections::BTreeMap;
use std::io::Write;

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use crate::drill_engine::{
    arith::generate_expression,
    classifier::{classify, BonusScheme},
    error::{DrillError, Result},
    exact::{defined_value, is_exact_angle},
    models::{AnswerValue, QuestionKind, QuestionRecord, TrigOp},
    radians::degrees_to_radians_text,
};

/// Highest level the arithmetic generator fills reliably.
pub const MAX_ARITHMETIC_LEVELS: u8 = 30;

/// How angles appear in trig expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleNotation {
    /// `sin(-30°)`
    #[default]
    Degrees,
    /// `sin(-π/6)`
    Radians,
}

fn trig_expression(op: TrigOp, deg: i32, notation: AngleNotation) -> String {
    match notation {
        AngleNotation::Degrees => format!("{op}({deg}°)"),
        AngleNotation::Radians => format!("{op}({})", degrees_to_radians_text(deg)),
    }
}

/// Every exact angle in `min_deg..=max_deg` under all six operators.
///
/// Undefined values are left out; the bank only asks questions with an answer.
pub fn trig_bank(
    min_deg: i32,
    max_deg: i32,
    notation: AngleNotation,
    bonuses: BonusScheme,
) -> Result<Vec<QuestionRecord>> {
    let mut records = Vec::new();
    for deg in (min_deg..=max_deg).filter(|d| is_exact_angle(*d)) {
        for op in TrigOp::ALL {
            let value = match defined_value(op, deg) {
                Ok(value) => value,
                Err(DrillError::UndefinedValue { .. }) => continue,
                Err(err) => return Err(err),
            };
            let class = classify(op, deg, bonuses);
            records.push(QuestionRecord::new(
                class.level,
                trig_expression(op, deg, notation),
                AnswerValue::Text(value.to_string()),
                class.difficulty,
                QuestionKind::Trig,
            ));
        }
    }
    debug!(min_deg, max_deg, ?notation, count = records.len(), "trig bank built");
    Ok(records)
}

/// Write records as JSONL. Returns the number written.
pub fn write_records<'a, W, I>(writer: &mut W, records: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a QuestionRecord>,
{
    let mut written = 0;
    for record in records {
        writeln!(writer, "{}", record.to_json_line()?)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusReport {
    pub written: usize,
    /// Seeds consumed, including those whose level was full or out of range.
    pub seeds_tried: u64,
    pub per_level: BTreeMap<u8, usize>,
}

/// Generate arithmetic records seed by seed until each of levels `1..=levels`
/// holds `per_level` entries, writing them as JSONL in generation order.
///
/// Seed `n` always yields the same expression, so a corpus can be rebuilt
/// from `first_seed` alone.
pub fn write_arithmetic_corpus<W: Write>(
    writer: &mut W,
    per_level: usize,
    levels: u8,
    first_seed: u64,
) -> Result<CorpusReport> {
    if levels == 0 || levels > MAX_ARITHMETIC_LEVELS {
        return Err(DrillError::config(format!(
            "levels must be in 1..={MAX_ARITHMETIC_LEVELS}, got {levels}"
        )));
    }
    let mut counts: BTreeMap<u8, usize> = (1..=levels).map(|l| (l, 0)).collect();
    let mut written = 0;
    let mut seed = first_seed;
    let target = per_level * levels as usize;

    while written < target {
        let generated = generate_expression(&mut StdRng::seed_from_u64(seed));
        seed = seed.wrapping_add(1);
        let level = generated.level();
        let Some(count) = counts.get_mut(&level) else {
            continue;
        };
        if *count >= per_level {
            continue;
        }
        *count += 1;
        written += 1;
        writeln!(writer, "{}", generated.into_record().to_json_line()?)?;
    }
    writer.flush()?;

    let report = CorpusReport {
        written,
        seeds_tried: seed.wrapping_sub(first_seed),
        per_level: counts,
    };
    info!(written, seeds_tried = report.seeds_tried, levels, "arithmetic corpus written");
    Ok(report)
}
