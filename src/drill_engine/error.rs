//! Error types for the drill engine.

use thiserror::Error;

use crate::drill_engine::models::TrigOp;

/// Result type alias using the engine's error type.
pub type Result<T> = std::result::Result<T, DrillError>;

/// Errors that can occur while building, streaming or sampling questions.
#[derive(Error, Debug)]
pub enum DrillError {
    /// A corpus line could not be parsed into a record. Skipped by readers.
    #[error("Malformed corpus record: {reason}")]
    MalformedRecord { reason: String },

    /// The record source ran dry while a level still needed filling.
    #[error("Corpus exhausted while filling level {level}")]
    StreamExhausted { level: u8 },

    /// Angle is not a multiple of 30, 45 or 60 degrees.
    #[error("Angle {degrees}° has no exact trig value")]
    InvalidAngle { degrees: i32 },

    /// A combination with no value was asked for an answer.
    #[error("{op}({degrees}°) is undefined")]
    UndefinedValue { op: TrigOp, degrees: i32 },

    #[error("Unknown trig operator: {0}")]
    UnknownOperator(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key-value store failure.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DrillError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for errors a reader should skip over rather than surface.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_is_recoverable_and_exhaustion_is_not() {
        assert!(DrillError::malformed("bad json").is_recoverable());
        assert!(!DrillError::StreamExhausted { level: 3 }.is_recoverable());
    }

    #[test]
    fn messages_name_the_offending_input() {
        let err = DrillError::UndefinedValue { op: TrigOp::Tan, degrees: 90 };
        assert_eq!(err.to_string(), "tan(90°) is undefined");
        let err = DrillError::InvalidAngle { degrees: 20 };
        assert!(err.to_string().contains("20°"));
    }
}
