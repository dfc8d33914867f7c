//! Exact trig values for special angles, as canonical answer tokens.
//!
//! Values are never computed in floating point. sin, cos and tan come from
//! three fixed tables keyed by reference angle; sec, csc and cot are always
//! derived as the reciprocal of cos, sin and tan through [`Magnitude::reciprocal`],
//! so every answer stays inside the same closed vocabulary:
//!
//! | token   | value   | reciprocal |
//! |---------|---------|------------|
//! | `0`     | 0       | `U`        |
//! | `1`     | 1       | `1`        |
//! | `1/2`   | 0.5     | `2`        |
//! | `2`     | 2       | `1/2`      |
//! | `r2/2`  | √2/2    | `r2`       |
//! | `r2`    | √2      | `r2/2`     |
//! | `r3/2`  | √3/2    | `2r3/3`    |
//! | `2r3/3` | 2√3/3   | `r3/2`     |
//! | `r3/3`  | √3/3    | `r3`       |
//! | `r3`    | √3      | `r3/3`     |
//!
//! `U` marks an undefined value; its reciprocal is `0`.

use std::fmt;
use std::str::FromStr;

use crate::drill_engine::{
    error::{DrillError, Result},
    models::TrigOp,
};

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Unsigned magnitude of a defined exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Magnitude {
    Zero,
    One,
    Half,
    Two,
    Root2Over2,
    Root2,
    Root3Over2,
    TwoRoot3Over3,
    Root3Over3,
    Root3,
}

impl Magnitude {
    pub const ALL: [Magnitude; 10] = [
        Magnitude::Zero,
        Magnitude::One,
        Magnitude::Half,
        Magnitude::Two,
        Magnitude::Root2Over2,
        Magnitude::Root2,
        Magnitude::Root3Over2,
        Magnitude::TwoRoot3Over3,
        Magnitude::Root3Over3,
        Magnitude::Root3,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Magnitude::Zero          => "0",
            Magnitude::One           => "1",
            Magnitude::Half          => "1/2",
            Magnitude::Two           => "2",
            Magnitude::Root2Over2    => "r2/2",
            Magnitude::Root2         => "r2",
            Magnitude::Root3Over2    => "r3/2",
            Magnitude::TwoRoot3Over3 => "2r3/3",
            Magnitude::Root3Over3    => "r3/3",
            Magnitude::Root3         => "r3",
        }
    }

    /// Rationalised reciprocal; `None` means undefined (1/0).
    pub fn reciprocal(self) -> Option<Magnitude> {
        Some(match self {
            Magnitude::Zero          => return None,
            Magnitude::One           => Magnitude::One,
            Magnitude::Half          => Magnitude::Two,
            Magnitude::Two           => Magnitude::Half,
            Magnitude::Root2Over2    => Magnitude::Root2,
            Magnitude::Root2         => Magnitude::Root2Over2,
            Magnitude::Root3Over2    => Magnitude::TwoRoot3Over3,
            Magnitude::TwoRoot3Over3 => Magnitude::Root3Over2,
            Magnitude::Root3Over3    => Magnitude::Root3,
            Magnitude::Root3         => Magnitude::Root3Over3,
        })
    }

    pub fn approx(self) -> f64 {
        let r2 = std::f64::consts::SQRT_2;
        let r3 = 3f64.sqrt();
        match self {
            Magnitude::Zero          => 0.0,
            Magnitude::One           => 1.0,
            Magnitude::Half          => 0.5,
            Magnitude::Two           => 2.0,
            Magnitude::Root2Over2    => r2 / 2.0,
            Magnitude::Root2         => r2,
            Magnitude::Root3Over2    => r3 / 2.0,
            Magnitude::TwoRoot3Over3 => 2.0 * r3 / 3.0,
            Magnitude::Root3Over3    => r3 / 3.0,
            Magnitude::Root3         => r3,
        }
    }

    fn from_token(token: &str) -> Option<Magnitude> {
        Magnitude::ALL.into_iter().find(|m| m.token() == token)
    }
}

/// An exact trig value: a signed magnitude, or undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExactValue {
    Undefined,
    Defined { negative: bool, magnitude: Magnitude },
}

impl ExactValue {
    pub const ZERO: ExactValue = ExactValue::Defined {
        negative: false,
        magnitude: Magnitude::Zero,
    };

    /// Build a signed value; zero is never negative.
    pub fn signed(magnitude: Magnitude, negative: bool) -> Self {
        ExactValue::Defined {
            negative: negative && magnitude != Magnitude::Zero,
            magnitude,
        }
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, ExactValue::Undefined)
    }

    /// Reciprocal with the sign carried through. `0 ↔ U`.
    pub fn reciprocal(self) -> ExactValue {
        match self {
            ExactValue::Undefined => ExactValue::ZERO,
            ExactValue::Defined { negative, magnitude } => match magnitude.reciprocal() {
                Some(r) => ExactValue::signed(r, negative),
                None => ExactValue::Undefined,
            },
        }
    }

    /// Floating-point value, `None` when undefined.
    pub fn approx(self) -> Option<f64> {
        match self {
            ExactValue::Undefined => None,
            ExactValue::Defined { negative, magnitude } => {
                let v = magnitude.approx();
                Some(if negative { -v } else { v })
            }
        }
    }
}

impl fmt::Display for ExactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExactValue::Undefined => write!(f, "U"),
            ExactValue::Defined { negative, magnitude } => {
                if *negative {
                    write!(f, "-")?;
                }
                write!(f, "{}", magnitude.token())
            }
        }
    }
}

impl FromStr for ExactValue {
    type Err = DrillError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("u") {
            return Ok(ExactValue::Undefined);
        }
        let (negative, core) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let magnitude = Magnitude::from_token(&core.to_ascii_lowercase())
            .ok_or_else(|| DrillError::malformed(format!("not a canonical answer: {s}")))?;
        if negative && magnitude == Magnitude::Zero {
            return Err(DrillError::malformed("zero is never signed"));
        }
        Ok(ExactValue::signed(magnitude, negative))
    }
}

// ---------------------------------------------------------------------------
// Angle geometry
// ---------------------------------------------------------------------------

/// True if the angle has an exact value: a multiple of 30, 45 or 60 degrees.
pub fn is_exact_angle(deg: i32) -> bool {
    deg % 30 == 0 || deg % 45 == 0 || deg % 60 == 0
}

/// Angle reduced into `[0, 360)`.
pub fn canonical_angle(deg: i32) -> i32 {
    deg.rem_euclid(360)
}

/// Quadrant 1..=4 of the reduced angle; an axis angle belongs to the quadrant it opens.
pub fn quadrant(deg: i32) -> u8 {
    match canonical_angle(deg) {
        0..=89 => 1,
        90..=179 => 2,
        180..=269 => 3,
        _ => 4,
    }
}

/// Equivalent angle in `[0, 90]`.
pub fn reference_angle(deg: i32) -> i32 {
    let a = canonical_angle(deg);
    match a {
        0..=90 => a,
        91..=180 => 180 - a,
        181..=270 => a - 180,
        _ => 360 - a,
    }
}

// ---------------------------------------------------------------------------
// Base tables
// ---------------------------------------------------------------------------

fn sin_base(reference: i32) -> ExactValue {
    let m = match reference {
        0  => Magnitude::Zero,
        30 => Magnitude::Half,
        45 => Magnitude::Root2Over2,
        60 => Magnitude::Root3Over2,
        _  => Magnitude::One,
    };
    ExactValue::signed(m, false)
}

fn cos_base(reference: i32) -> ExactValue {
    let m = match reference {
        0  => Magnitude::One,
        30 => Magnitude::Root3Over2,
        45 => Magnitude::Root2Over2,
        60 => Magnitude::Half,
        _  => Magnitude::Zero,
    };
    ExactValue::signed(m, false)
}

fn tan_base(reference: i32) -> ExactValue {
    let m = match reference {
        0  => Magnitude::Zero,
        30 => Magnitude::Root3Over3,
        45 => Magnitude::One,
        60 => Magnitude::Root3,
        _  => return ExactValue::Undefined,
    };
    ExactValue::signed(m, false)
}

fn with_sign(value: ExactValue, negative: bool) -> ExactValue {
    match value {
        ExactValue::Undefined => ExactValue::Undefined,
        ExactValue::Defined { magnitude, .. } => ExactValue::signed(magnitude, negative),
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Exact value of `op(deg)`.
///
/// Fails with [`DrillError::InvalidAngle`] when `deg` is not a multiple of
/// 30, 45 or 60. Undefined combinations (e.g. `tan(90°)`) are returned as
/// [`ExactValue::Undefined`], not as errors.
pub fn exact_value(op: TrigOp, deg: i32) -> Result<ExactValue> {
    if !is_exact_angle(deg) {
        return Err(DrillError::InvalidAngle { degrees: deg });
    }
    let q = quadrant(deg);
    let reference = reference_angle(deg);
    Ok(match op {
        TrigOp::Sin => with_sign(sin_base(reference), q == 3 || q == 4),
        TrigOp::Cos => with_sign(cos_base(reference), q == 2 || q == 3),
        TrigOp::Tan => with_sign(tan_base(reference), q == 2 || q == 4),
        TrigOp::Csc => exact_value(TrigOp::Sin, deg)?.reciprocal(),
        TrigOp::Sec => exact_value(TrigOp::Cos, deg)?.reciprocal(),
        TrigOp::Cot => exact_value(TrigOp::Tan, deg)?.reciprocal(),
    })
}

/// Like [`exact_value`], but an undefined result is an error.
///
/// Used by corpus builders, where every emitted question needs an answer.
pub fn defined_value(op: TrigOp, deg: i32) -> Result<ExactValue> {
    let value = exact_value(op, deg)?;
    if value.is_undefined() {
        return Err(DrillError::UndefinedValue { op, degrees: deg });
    }
    Ok(value)
}

/// Canonical answer string for `op(deg)`.
pub fn canonical_answer(op: TrigOp, deg: i32) -> Result<String> {
    Ok(exact_value(op, deg)?.to_string())
}
