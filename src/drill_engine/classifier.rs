//! Difficulty scoring for trig questions and the difficulty → level table.
//!
//! The base difficulty grows in half-point steps with the raw (unreduced)
//! angle, so `sin(750°)` is harder than `sin(30°)` even though the values
//! agree. Axis angles (multiples of 90° after reduction) are always base 1.
//! Bonuses are added for reciprocal operators, undefined combinations and
//! negative angles; the last two have magnitudes that differ between the two
//! known question banks, so they are carried by [`BonusScheme`].

use serde::{Deserialize, Serialize};

use crate::drill_engine::{exact::canonical_angle, models::TrigOp};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 10;

/// Bonus magnitudes added on top of the base difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusScheme {
    /// sec, csc, cot.
    pub reciprocal: f64,
    /// The combination has no value (e.g. tan 90°).
    pub undefined: f64,
    /// Angle below zero.
    pub negative: f64,
}

impl BonusScheme {
    /// +1 for every bonus.
    pub const fn whole() -> Self {
        Self { reciprocal: 1.0, undefined: 1.0, negative: 1.0 }
    }

    /// +1 reciprocal and undefined, +0.5 for a negative angle.
    pub const fn half_negative() -> Self {
        Self { reciprocal: 1.0, undefined: 1.0, negative: 0.5 }
    }
}

impl Default for BonusScheme {
    fn default() -> Self {
        Self::half_negative()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub difficulty: f64,
    pub level: u8,
}

/// True where `op` has no value at the reduced angle `canonical`.
///
/// tan and sec need cos ≠ 0; csc and cot need sin ≠ 0.
pub fn is_undefined(op: TrigOp, canonical: i32) -> bool {
    let cos_zero = (canonical - 90).rem_euclid(180) == 0;
    let sin_zero = canonical.rem_euclid(180) == 0;
    match op {
        TrigOp::Tan | TrigOp::Sec => cos_zero,
        TrigOp::Csc | TrigOp::Cot => sin_zero,
        TrigOp::Sin | TrigOp::Cos => false,
    }
}

/// Difficulty before bonuses.
pub fn base_difficulty(deg: i32) -> f64 {
    if canonical_angle(deg) % 90 == 0 {
        1.0
    } else {
        1.0 + 0.5 * (deg.unsigned_abs() / 90) as f64
    }
}

pub fn difficulty(op: TrigOp, deg: i32, bonuses: BonusScheme) -> f64 {
    let mut bonus = 0.0;
    if op.is_reciprocal() {
        bonus += bonuses.reciprocal;
    }
    if is_undefined(op, canonical_angle(deg)) {
        bonus += bonuses.undefined;
    }
    if deg < 0 {
        bonus += bonuses.negative;
    }
    base_difficulty(deg) + bonus
}

/// Fixed bucket table. 1 through 4.5 map one-to-one onto levels 1..=8,
/// 5 and 5.5 share level 9, 6 and 6.5 share level 10.
///
/// Input is snapped to the nearest half point; anything below 1 is level 1,
/// anything above 6.5 is level 10.
pub fn level_from_difficulty(difficulty: f64) -> u8 {
    let halves = (difficulty * 2.0).round() as i64;
    match halves {
        i64::MIN..=2 => 1,
        3 => 2,
        4 => 3,
        5 => 4,
        6 => 5,
        7 => 6,
        8 => 7,
        9 => 8,
        10 | 11 => 9,
        _ => 10,
    }
}

pub fn classify(op: TrigOp, deg: i32, bonuses: BonusScheme) -> Classification {
    let difficulty = difficulty(op, deg, bonuses);
    Classification {
        difficulty,
        level: level_from_difficulty(difficulty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_angles_are_easy() {
        let c = classify(TrigOp::Sin, 90, BonusScheme::whole());
        assert_eq!(c, Classification { difficulty: 1.0, level: 1 });
        // 720 is congruent to 0: still base 1
        assert_eq!(base_difficulty(720), 1.0);
    }

    #[test]
    fn tan_90_gets_the_undefined_bonus() {
        let c = classify(TrigOp::Tan, 90, BonusScheme::whole());
        assert_eq!(c.difficulty, 2.0);
        assert_eq!(c.level, 3);
    }

    #[test]
    fn raw_angle_drives_the_base() {
        assert_eq!(base_difficulty(30), 1.0);
        assert_eq!(base_difficulty(150), 1.5);
        assert_eq!(base_difficulty(390), 3.0);
        assert_eq!(base_difficulty(-150), 1.5);
    }

    #[test]
    fn negative_bonus_follows_the_scheme() {
        let whole = difficulty(TrigOp::Sin, -30, BonusScheme::whole());
        let half = difficulty(TrigOp::Sin, -30, BonusScheme::half_negative());
        assert_eq!(whole, 2.0);
        assert_eq!(half, 1.5);
    }

    #[test]
    fn reciprocal_and_undefined_stack() {
        // csc(-180°): base 1, +1 reciprocal, +1 undefined, +1 negative
        assert_eq!(difficulty(TrigOp::Csc, -180, BonusScheme::whole()), 4.0);
        assert_eq!(difficulty(TrigOp::Cot, 90, BonusScheme::whole()), 2.0);
    }

    #[test]
    fn undefined_check() {
        assert!(is_undefined(TrigOp::Tan, 270));
        assert!(is_undefined(TrigOp::Sec, 90));
        assert!(!is_undefined(TrigOp::Tan, 180));
        assert!(is_undefined(TrigOp::Cot, 0));
        assert!(is_undefined(TrigOp::Csc, 180));
        assert!(!is_undefined(TrigOp::Sin, 90));
    }

    #[test]
    fn level_table_is_exact() {
        let table = [
            (1.0, 1), (1.5, 2), (2.0, 3), (2.5, 4), (3.0, 5), (3.5, 6),
            (4.0, 7), (4.5, 8), (5.0, 9), (5.5, 9), (6.0, 10), (6.5, 10),
        ];
        for (d, level) in table {
            assert_eq!(level_from_difficulty(d), level, "difficulty {d}");
        }
    }

    #[test]
    fn level_table_is_monotonic() {
        let mut last = 0;
        for step in 0..=20 {
            let level = level_from_difficulty(step as f64 * 0.5);
            assert!(level >= last);
            assert!((MIN_LEVEL..=MAX_LEVEL).contains(&level));
            last = level;
        }
    }
}
