//! Answer checking, chosen per question kind.
//!
//! | kind         | user input                 | comparison                 |
//! |--------------|----------------------------|----------------------------|
//! | `Trig`       | canonical token (`-r3/2`)  | trimmed, case-insensitive  |
//! | `Arithmetic` | number or `a/b`            | within tolerance           |
//! | `DegToRad`   | `pi/4`, `-3π/4`, decimal   | within tolerance           |
//! | `RadToDeg`   | number of degrees          | within tolerance           |
//!
//! Input that does not parse is simply wrong; it is never an error.

use crate::drill_engine::{
    models::{AnswerValue, QuestionKind, QuestionRecord},
    radians::{parse_degrees, parse_radians},
};

/// Default absolute tolerance for numeric answers.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Parse a plain number or a simple fraction `a/b`.
pub fn parse_number(input: &str) -> Option<f64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    let value = match s.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => s.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Numeric value of a canonical-style token such as `2r3/3` or `-r2`.
///
/// `rN` stands for √N and may carry an integer coefficient (`2r3`).
pub fn parse_canonical_numeric(input: &str) -> Option<f64> {
    let s = input.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }
    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest.to_string()),
        None => (1.0, s.clone()),
    };
    let term = |t: &str| -> Option<f64> {
        match t.split_once('r') {
            Some((coeff, radicand)) => {
                let c = if coeff.is_empty() { 1.0 } else { coeff.parse::<f64>().ok()? };
                let r = radicand.parse::<f64>().ok()?;
                (r >= 0.0).then(|| c * r.sqrt())
            }
            None => t.parse::<f64>().ok(),
        }
    };
    let value = match body.split_once('/') {
        Some((num, den)) => {
            let d = term(den)?;
            if d == 0.0 {
                return None;
            }
            term(num)? / d
        }
        None => term(&body)?,
    };
    Some(sign * value)
}

/// Compares answers for one question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerChecker {
    pub tolerance: f64,
}

impl Default for AnswerChecker {
    fn default() -> Self {
        Self { tolerance: DEFAULT_TOLERANCE }
    }
}

impl AnswerChecker {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn is_correct(&self, record: &QuestionRecord, input: &str) -> bool {
        match record.kind() {
            QuestionKind::Trig => match &record.answer {
                AnswerValue::Text(expected) => text_matches(expected, input),
                AnswerValue::Numeric(expected) => {
                    let given = parse_canonical_numeric(input).or_else(|| parse_number(input));
                    self.close(given, *expected)
                }
            },
            QuestionKind::Arithmetic => self.numeric(record, parse_number(input)),
            QuestionKind::DegToRad => self.numeric(record, parse_radians(input)),
            QuestionKind::RadToDeg => self.numeric(record, parse_degrees(input)),
        }
    }

    fn numeric(&self, record: &QuestionRecord, given: Option<f64>) -> bool {
        match &record.answer {
            AnswerValue::Numeric(expected) => self.close(given, *expected),
            AnswerValue::Text(expected) => match parse_number(expected) {
                Some(expected) => self.close(given, expected),
                None => false,
            },
        }
    }

    fn close(&self, given: Option<f64>, expected: f64) -> bool {
        given.is_some_and(|g| (g - expected).abs() < self.tolerance)
    }
}

fn text_matches(expected: &str, input: &str) -> bool {
    input.trim().to_lowercase() == expected.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(answer: AnswerValue, kind: QuestionKind) -> QuestionRecord {
        QuestionRecord::new(1, "q", answer, 1.0, kind)
    }

    #[test]
    fn trig_answers_compare_as_text() {
        let q = record(AnswerValue::Text("-r3/2".into()), QuestionKind::Trig);
        let checker = AnswerChecker::default();
        assert!(checker.is_correct(&q, "-r3/2"));
        assert!(checker.is_correct(&q, "  -R3/2 "));
        // numerically equal but not canonical
        assert!(!checker.is_correct(&q, "-0.866"));
        assert!(!checker.is_correct(&q, "-3r/2"));
    }

    #[test]
    fn numeric_trig_answers_accept_radical_tokens() {
        let q = record(AnswerValue::Numeric(3f64.sqrt() / 2.0), QuestionKind::Trig);
        let checker = AnswerChecker::default();
        assert!(checker.is_correct(&q, "r3/2"));
        assert!(checker.is_correct(&q, "0.866"));
        assert!(!checker.is_correct(&q, "-r3/2"));
    }

    #[test]
    fn undefined_token_is_case_insensitive() {
        let q = record(AnswerValue::Text("U".into()), QuestionKind::Trig);
        assert!(AnswerChecker::default().is_correct(&q, "u"));
    }

    #[test]
    fn arithmetic_uses_tolerance() {
        let q = record(AnswerValue::Numeric(51.0), QuestionKind::Arithmetic);
        let checker = AnswerChecker::default();
        assert!(checker.is_correct(&q, "51"));
        assert!(checker.is_correct(&q, "51.005"));
        assert!(!checker.is_correct(&q, "51.5"));
        assert!(!checker.is_correct(&q, "fifty-one"));
        assert!(!checker.is_correct(&q, ""));
    }

    #[test]
    fn radian_answers_accept_pi_notation() {
        let q = record(
            AnswerValue::Numeric(-135f64.to_radians()),
            QuestionKind::DegToRad,
        );
        let checker = AnswerChecker::default();
        assert!(checker.is_correct(&q, "-3pi/4"));
        assert!(checker.is_correct(&q, "-2.356"));
        assert!(!checker.is_correct(&q, "3pi/4"));
    }

    #[test]
    fn degree_answers() {
        let q = record(AnswerValue::Numeric(-150.0), QuestionKind::RadToDeg);
        assert!(AnswerChecker::default().is_correct(&q, "-150"));
        assert!(!AnswerChecker::default().is_correct(&q, "150"));
    }

    #[test]
    fn fractions_and_radicals() {
        assert_eq!(parse_number("3/4"), Some(0.75));
        assert_eq!(parse_number("1/0"), None);
        let v = parse_canonical_numeric("2r3/3").unwrap();
        assert!((v - 2.0 * 3f64.sqrt() / 3.0).abs() < 1e-12);
        assert_eq!(parse_canonical_numeric("-1/2"), Some(-0.5));
        assert_eq!(parse_canonical_numeric("U"), None);
    }
}
