use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::drill_engine::error::DrillError;

// ---------------------------------------------------------------------------
// Trig operators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrigOp {
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
}

impl TrigOp {
    /// All six operators in bank order.
    pub const ALL: [TrigOp; 6] = [
        TrigOp::Sin,
        TrigOp::Cos,
        TrigOp::Tan,
        TrigOp::Sec,
        TrigOp::Csc,
        TrigOp::Cot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TrigOp::Sin => "sin",
            TrigOp::Cos => "cos",
            TrigOp::Tan => "tan",
            TrigOp::Sec => "sec",
            TrigOp::Csc => "csc",
            TrigOp::Cot => "cot",
        }
    }

    /// sec, csc and cot.
    pub fn is_reciprocal(self) -> bool {
        matches!(self, TrigOp::Sec | TrigOp::Csc | TrigOp::Cot)
    }
}

impl fmt::Display for TrigOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TrigOp {
    type Err = DrillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sin" => Ok(TrigOp::Sin),
            "cos" => Ok(TrigOp::Cos),
            "tan" => Ok(TrigOp::Tan),
            "sec" => Ok(TrigOp::Sec),
            "csc" => Ok(TrigOp::Csc),
            "cot" => Ok(TrigOp::Cot),
            _ => Err(DrillError::UnknownOperator(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Question records
// ---------------------------------------------------------------------------

/// How a question's answer is compared against user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Canonical exact-value token, compared as text.
    Trig,
    /// Integer/decimal result of an expression.
    Arithmetic,
    /// Degrees shown, radians expected (accepts `pi` notation).
    DegToRad,
    /// Radians shown, degrees expected.
    RadToDeg,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Trig       => write!(f, "Trig"),
            QuestionKind::Arithmetic => write!(f, "Arithmetic"),
            QuestionKind::DegToRad   => write!(f, "Degrees → Radians"),
            QuestionKind::RadToDeg   => write!(f, "Radians → Degrees"),
        }
    }
}

/// Either a canonical text answer or a numeric one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Numeric(f64),
    Text(String),
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Numeric(v) => write!(f, "{v}"),
            AnswerValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One line of the corpus.
///
/// `kind` is optional on the wire; see [`QuestionRecord::kind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub level: u8,
    pub expression: String,
    pub answer: AnswerValue,
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default, rename = "kind", skip_serializing_if = "Option::is_none")]
    pub declared_kind: Option<QuestionKind>,
}

impl QuestionRecord {
    pub fn new(
        level: u8,
        expression: impl Into<String>,
        answer: AnswerValue,
        difficulty: f64,
        kind: QuestionKind,
    ) -> Self {
        Self {
            level,
            expression: expression.into(),
            answer,
            difficulty,
            declared_kind: Some(kind),
        }
    }

    /// Declared kind, or inferred from the answer: text → trig, number → arithmetic.
    pub fn kind(&self) -> QuestionKind {
        self.declared_kind.unwrap_or(match self.answer {
            AnswerValue::Text(_) => QuestionKind::Trig,
            AnswerValue::Numeric(_) => QuestionKind::Arithmetic,
        })
    }

    /// Parse one corpus line.
    pub fn from_json_line(line: &str) -> Result<Self, DrillError> {
        let rec: QuestionRecord = serde_json::from_str(line)
            .map_err(|e| DrillError::malformed(format!("{e}: {line}")))?;
        if rec.level == 0 {
            return Err(DrillError::malformed(format!("level 0: {line}")));
        }
        if rec.expression.trim().is_empty() {
            return Err(DrillError::malformed(format!("empty expression: {line}")));
        }
        Ok(rec)
    }

    pub fn to_json_line(&self) -> Result<String, DrillError> {
        Ok(serde_json::to_string(self)?)
    }
}
