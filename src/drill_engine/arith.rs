//! Arithmetic expression generator and its mental-arithmetic difficulty model.
//!
//! Difficulty counts the work a person does on paper: digits handled, carries
//! in addition, borrows in subtraction, partial products in multiplication and
//! the chunk-by-chunk steps of long division. An expression's difficulty is
//! the sum over its operations, scaled by `1.1^(ops - 1)` for chaining.

use std::collections::HashSet;
use std::fmt;

use rand::{seq::SliceRandom, Rng};

use crate::drill_engine::{
    helpers::round_to,
    models::{AnswerValue, QuestionKind, QuestionRecord},
};

/// Most operations chained into one expression.
pub const MAX_OPS: u8 = 4;
/// Expressions above this raw difficulty are thrown away and regenerated.
pub const MAX_RAW_DIFFICULTY: f64 = 30.0;
/// Chance of appending another operation after each one.
const CONTINUE_PROBABILITY: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub const ALL: [ArithOp; 4] = [ArithOp::Add, ArithOp::Sub, ArithOp::Mul, ArithOp::Div];

    pub fn symbol(self) -> char {
        match self {
            ArithOp::Add => '+',
            ArithOp::Sub => '-',
            ArithOp::Mul => '*',
            ArithOp::Div => '/',
        }
    }

    fn binds_tighter(self) -> bool {
        matches!(self, ArithOp::Mul | ArithOp::Div)
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Per-operation difficulty
// ---------------------------------------------------------------------------

fn digits(n: i64) -> Vec<u32> {
    n.unsigned_abs()
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect()
}

fn zero_pad(mut d: Vec<u32>, len: usize) -> Vec<u32> {
    while d.len() < len {
        d.insert(0, 0);
    }
    d
}

/// `0.5` per digit of the shorter operand plus `0.75` per carry.
pub fn addition_difficulty(a: i64, b: i64) -> f64 {
    let (da, db) = (digits(a), digits(b));
    let base = da.len().min(db.len()) as f64 * 0.5;
    let width = da.len().max(db.len());
    let (pa, pb) = (zero_pad(da, width), zero_pad(db, width));
    let mut carry = 0;
    let mut carries = 0;
    for i in (0..width).rev() {
        let sum = pa[i] + pb[i] + carry;
        if sum >= 10 {
            carries += 1;
            carry = sum / 10;
        } else {
            carry = 0;
        }
    }
    base + carries as f64 * 0.75
}

/// `0.5` per digit of the smaller operand plus `0.75` per borrow.
pub fn subtraction_difficulty(a: i64, b: i64) -> f64 {
    let (small, big) = if a <= b { (a, b) } else { (b, a) };
    let (ds, dbig) = (digits(small), digits(big));
    let base = ds.len() as f64 * 0.5;
    let ds = zero_pad(ds, dbig.len());
    let mut borrow = 0;
    let mut borrows = 0;
    for i in (0..dbig.len()).rev() {
        let top = dbig[i] as i64 - borrow;
        if top < ds.get(i).copied().unwrap_or(0) as i64 {
            borrows += 1;
            borrow = 1;
        } else {
            borrow = 0;
        }
    }
    base + borrows as f64 * 0.75
}

/// Sum the partials in order, charging an addition for each one after the first.
fn accumulate(partials: &[i64]) -> (i64, f64) {
    let mut total = 0;
    let mut diff = 0.0;
    for &p in partials {
        if total == 0 {
            total = p;
        } else {
            diff += addition_difficulty(total, p);
            total += p;
        }
    }
    (total, diff)
}

fn multiply_digit(digit: i64, number: i64) -> (i64, f64) {
    let d = digits(number);
    let n = d.len();
    let partials: Vec<i64> = d
        .iter()
        .enumerate()
        .rev()
        .map(|(i, &x)| digit * x as i64 * 10i64.pow((n - 1 - i) as u32))
        .collect();
    let (total, add) = accumulate(&partials);
    (total, n as f64 * 0.5 + add)
}

/// Long multiplication: one single-digit pass per non-zero digit of `a`.
///
/// Returns `(product, difficulty)`.
pub fn multiplication_difficulty(a: i64, b: i64) -> (i64, f64) {
    let d = digits(a);
    let n = d.len();
    let mut subtotal = 0.0;
    let mut partials = Vec::new();
    for (i, &core) in d.iter().enumerate() {
        if core == 0 {
            continue;
        }
        let (value, diff) = multiply_digit(core as i64, b);
        subtotal += diff;
        partials.push(value * 10i64.pow((n - 1 - i) as u32));
    }
    let (total, add) = accumulate(&partials);
    (total, subtotal + add)
}

/// Rounded leading-digit factor used to estimate a two-digit divisor.
fn estimate_factor(divisor: i64) -> f64 {
    if divisor < 10 {
        return divisor as f64;
    }
    let d = digits(divisor);
    let tens = d[0] as f64 * 10.0;
    let rounded = if d[1] >= 5 { tens + 10.0 } else { tens };
    rounded / 10.0
}

struct DivisionState {
    difficulty: f64,
    factoring_used: bool,
}

fn divide_chunk(chunk: i64, divisor: i64, state: &mut DivisionState) -> i64 {
    if chunk < divisor {
        return chunk;
    }
    if !state.factoring_used {
        if divisor > 9 {
            state.difficulty += 0.25;
        }
        state.factoring_used = true;
    }
    let factor = estimate_factor(divisor);
    if chunk < 10 && factor < 10.0 {
        state.difficulty += 0.5;
        return 0;
    }
    if factor < 10.0 && chunk as f64 <= factor * 10.0 {
        state.difficulty += 1.0;
        return 0;
    }
    let mut m = ((chunk as f64 / factor).floor() as i64).max(1);
    let mut previous: Option<i64> = None;
    loop {
        let (product, diff) = multiplication_difficulty(m, divisor);
        state.difficulty += diff;
        if product == chunk {
            return 0;
        }
        if product < chunk {
            previous = Some(product);
            m += 1;
        } else {
            return match previous {
                Some(prev) => {
                    state.difficulty += subtraction_difficulty(chunk, prev);
                    chunk - prev
                }
                None => chunk,
            };
        }
    }
}

/// Long division, bringing down one digit of the dividend at a time.
pub fn division_difficulty(dividend: i64, divisor: i64) -> f64 {
    if divisor <= 0 {
        return 0.0;
    }
    let mut state = DivisionState { difficulty: 0.0, factoring_used: false };
    let mut rem = 0;
    for d in digits(dividend) {
        rem = rem * 10 + d as i64;
        if rem >= divisor {
            rem = divide_chunk(rem, divisor, &mut state);
        }
    }
    state.difficulty
}

/// `(result, difficulty)` of one step.
pub fn step_difficulty(a: i64, b: i64, op: ArithOp) -> (i64, f64) {
    match op {
        ArithOp::Add => (a + b, addition_difficulty(a, b)),
        ArithOp::Sub => (a - b, subtraction_difficulty(a, b)),
        ArithOp::Mul => multiplication_difficulty(a, b),
        ArithOp::Div => (a / b, division_difficulty(a, b)),
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedExpression {
    pub expression: String,
    pub answer: i64,
    pub difficulty: f64,
    pub ops: u8,
}

impl GeneratedExpression {
    /// `round(difficulty)`, ties to even.
    pub fn level(&self) -> u8 {
        self.difficulty.round_ties_even().clamp(0.0, u8::MAX as f64) as u8
    }

    pub fn into_record(self) -> QuestionRecord {
        QuestionRecord::new(
            self.level(),
            self.expression,
            AnswerValue::Numeric(self.answer as f64),
            round_to(self.difficulty, 2),
            QuestionKind::Arithmetic,
        )
    }
}

fn divisors(n: i64) -> Vec<i64> {
    if n <= 1 {
        return Vec::new();
    }
    (2..n).filter(|i| n % i == 0).collect()
}

fn wrap_if_needed(expression: String, op: ArithOp) -> String {
    if op.binds_tighter() && expression.contains(['+', '-']) {
        format!("({expression})")
    } else {
        expression
    }
}

/// One attempt; `None` when nothing could be appended.
fn try_generate<R: Rng + ?Sized>(rng: &mut R) -> Option<GeneratedExpression> {
    let start: i64 = rng.gen_range(1..=100);
    let mut expression = start.to_string();
    let mut result = start;
    let mut difficulty = 0.0;
    let mut ops = 0u8;
    let mut used_factors = HashSet::from([start]);

    while ops < MAX_OPS {
        let op = *ArithOp::ALL.choose(rng)?;
        let next = match op {
            ArithOp::Add => rng.gen_range(1..=100),
            ArithOp::Sub => {
                if result == 0 {
                    break;
                }
                rng.gen_range(1..=result)
            }
            ArithOp::Mul => loop {
                let candidate = rng.gen_range(2..=20);
                if used_factors.insert(candidate) {
                    break candidate;
                }
            },
            ArithOp::Div => {
                let options: Vec<i64> = divisors(result)
                    .into_iter()
                    .filter(|d| !used_factors.contains(d))
                    .collect();
                let Some(&pick) = options.choose(rng) else {
                    break;
                };
                used_factors.insert(pick);
                pick
            }
        };

        let (value, diff) = step_difficulty(result, next, op);
        difficulty += diff;
        result = value;
        expression = format!("{} {op} {next}", wrap_if_needed(expression, op));
        ops += 1;
        if rng.gen::<f64>() >= CONTINUE_PROBABILITY {
            break;
        }
    }

    if ops == 0 || difficulty > MAX_RAW_DIFFICULTY {
        return None;
    }
    Some(GeneratedExpression {
        expression,
        answer: result,
        difficulty: difficulty * 1.1f64.powi(ops as i32 - 1),
        ops,
    })
}

/// Generate one expression, retrying until an attempt is usable.
pub fn generate_expression<R: Rng + ?Sized>(rng: &mut R) -> GeneratedExpression {
    loop {
        if let Some(generated) = try_generate(rng) {
            return generated;
        }
    }
}
