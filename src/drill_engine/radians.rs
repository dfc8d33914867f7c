//! Degree/radian notation and the conversion drill.

use std::f64::consts::PI;

use rand::Rng;

use crate::drill_engine::{
    corpus::RecordSource,
    error::Result,
    helpers::gcd,
    models::{AnswerValue, QuestionKind, QuestionRecord},
};

/// Degree prompts for the deg → rad direction.
pub const DEG_VALUES: [i32; 31] = [
    0, 30, 45, 60, 90, 120, 135, 150, 180, -30, -45, -60, -90, -120, -135, -150, -180,
    210, 225, 240, 270, -210, -225, -240, -270, 300, 315, 330, -300, -315, -330,
];

/// `(numerator, denominator)` multiples of π for the rad → deg direction.
pub const RAD_FRACTIONS: [(i32, i32); 9] = [
    (0, 1), (1, 6), (1, 4), (1, 3), (1, 2), (2, 3), (3, 4), (5, 6), (1, 1),
];

/// Reduced multiple of π, e.g. `-150` → `"-5π/6"`, `180` → `"π"`.
pub fn degrees_to_radians_text(deg: i32) -> String {
    if deg == 0 {
        return "0".to_string();
    }
    let sign = if deg < 0 { "-" } else { "" };
    let num = deg.unsigned_abs() as i64;
    let g = gcd(num, 180);
    let (n, d) = (num / g, 180 / g);
    let coeff = if n == 1 { String::new() } else { n.to_string() };
    if d == 1 {
        format!("{sign}{coeff}π")
    } else {
        format!("{sign}{coeff}π/{d}")
    }
}

/// Parse a radian answer: `"pi/6"`, `"-3π/4"`, `"2pi"`, `"-pi"`, or a plain decimal.
pub fn parse_radians(input: &str) -> Option<f64> {
    let s: String = input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if s.is_empty() {
        return None;
    }
    let s = s.replace('π', "pi");
    if !s.contains("pi") {
        return s.parse::<f64>().ok().filter(|v| v.is_finite());
    }
    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s.strip_prefix('+').unwrap_or(&s)),
    };
    let (head, tail) = body.split_once("pi")?;
    let coeff = if head.is_empty() {
        1.0
    } else {
        head.strip_suffix('*').unwrap_or(head).parse::<f64>().ok()?
    };
    let den = if tail.is_empty() {
        1.0
    } else {
        tail.strip_prefix('/')?.parse::<f64>().ok()?
    };
    if den == 0.0 || !coeff.is_finite() || !den.is_finite() {
        return None;
    }
    Some(sign * coeff * PI / den)
}

pub fn parse_degrees(input: &str) -> Option<f64> {
    let s = input.trim().trim_end_matches('°');
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// An angle in either notation, returned in degrees.
pub fn parse_angle(input: &str) -> Option<f64> {
    let lowered = input.to_lowercase();
    if lowered.contains("pi") || lowered.contains('π') {
        parse_radians(input).map(f64::to_degrees)
    } else {
        parse_degrees(input)
    }
}

fn fraction_text(num: i32, den: i32) -> String {
    let coeff = if num == 1 { String::new() } else { num.to_string() };
    match (num, den) {
        (0, _) => "0".to_string(),
        (_, 1) => format!("{coeff}\\pi"),
        _ => format!("{coeff}\\pi/{den}"),
    }
}

/// One conversion question, direction chosen by coin flip.
pub fn generate_question<R: Rng>(rng: &mut R) -> QuestionRecord {
    if rng.gen_bool(0.5) {
        let deg = DEG_VALUES[rng.gen_range(0..DEG_VALUES.len())];
        QuestionRecord::new(
            1,
            format!("{deg}^\\circ"),
            AnswerValue::Numeric((deg as f64).to_radians()),
            1.0,
            QuestionKind::DegToRad,
        )
    } else {
        let (num, den) = RAD_FRACTIONS[rng.gen_range(0..RAD_FRACTIONS.len())];
        let negative = num != 0 && rng.gen_bool(0.5);
        let sign = if negative { "-" } else { "" };
        let degrees = (num * 180 / den) as f64;
        QuestionRecord::new(
            1,
            format!("{sign}{}", fraction_text(num, den)),
            AnswerValue::Numeric(if negative { -degrees } else { degrees }),
            1.0,
            QuestionKind::RadToDeg,
        )
    }
}

/// Endless source of conversion questions, all at level 1.
pub struct RadDegSource<R> {
    rng: R,
}

impl<R: Rng> RadDegSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> RecordSource for RadDegSource<R> {
    fn next_record(&mut self) -> Result<Option<QuestionRecord>> {
        Ok(Some(generate_question(&mut self.rng)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn radian_text_is_reduced() {
        assert_eq!(degrees_to_radians_text(0), "0");
        assert_eq!(degrees_to_radians_text(180), "π");
        assert_eq!(degrees_to_radians_text(-150), "-5π/6");
        assert_eq!(degrees_to_radians_text(30), "π/6");
        assert_eq!(degrees_to_radians_text(720), "4π");
        assert_eq!(degrees_to_radians_text(-135), "-3π/4");
    }

    #[test]
    fn radian_parser_accepts_common_forms() {
        assert!(close(parse_radians("pi/6").unwrap(), PI / 6.0));
        assert!(close(parse_radians("-3π/4").unwrap(), -3.0 * PI / 4.0));
        assert!(close(parse_radians(" 2 pi ").unwrap(), 2.0 * PI));
        assert!(close(parse_radians("-pi").unwrap(), -PI));
        assert!(close(parse_radians("0.5236").unwrap(), 0.5236));
        assert_eq!(parse_radians("pi/0"), None);
        assert_eq!(parse_radians("abc"), None);
        assert_eq!(parse_radians(""), None);
    }

    #[test]
    fn angle_parser_handles_both_notations() {
        assert!(close(parse_angle("-3pi/4").unwrap(), -135.0));
        assert!(close(parse_angle("150").unwrap(), 150.0));
        assert!(close(parse_angle("45°").unwrap(), 45.0));
        assert_eq!(parse_angle("sideways"), None);
    }

    #[test]
    fn generated_questions_are_consistent() {
        let mut src = RadDegSource::new(StdRng::seed_from_u64(3));
        for _ in 0..50 {
            let q = src.next_record().unwrap().unwrap();
            assert_eq!(q.level, 1);
            let AnswerValue::Numeric(v) = q.answer else { panic!("numeric answer expected") };
            match q.kind() {
                QuestionKind::DegToRad => {
                    let deg: f64 = q.expression.trim_end_matches("^\\circ").parse().unwrap();
                    assert!(close(v, deg.to_radians()));
                }
                QuestionKind::RadToDeg => assert!(v.abs() <= 180.0),
                other => panic!("unexpected kind {other:?}"),
            }
        }
    }
}
