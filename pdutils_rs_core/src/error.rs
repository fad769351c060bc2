use std::fmt;

use thiserror::Error;

use crate::df::ValueKind;

/// a single offending parameter reported by the type checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub name: String,
    pub received: ValueKind,
    pub expected: Option<ValueKind>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expected {
            Some(expected) => write!(
                f,
                "parameter `{}` received a wrong type: got {}, expected {}",
                self.name, self.received, expected
            ),
            None => write!(
                f,
                "parameter `{}` received a wrong type: got {}, no default to infer from",
                self.name, self.received
            ),
        }
    }
}

fn join_mismatches(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(Mismatch::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum PdError {
    /// bad inputs: missing columns, unknown mode tokens, invalid step, ...
    #[error("validation error: {0}")]
    Validation(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("type mismatch: {}", join_mismatches(.0))]
    TypeMismatch(Vec<Mismatch>),
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl PdError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PdError>;
