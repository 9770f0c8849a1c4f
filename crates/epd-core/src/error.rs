//! Parse failure diagnostics

use thiserror::Error;

/// Why a suite line could not become a [`Record`](crate::Record).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("no move annotation")]
    NoMoveAnnotation,

    /// Carries the position fragment as it appeared in the line.
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// Carries the move fragment as it appeared in the line.
    #[error("invalid move: {0}")]
    InvalidMove(String),
}

/// A line that did not parse, together with the original text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ParseFailure {
    pub raw: String,
    pub reason: FailureReason,
}

impl ParseFailure {
    pub fn new(raw: &str, reason: FailureReason) -> Self {
        Self {
            raw: raw.to_string(),
            reason,
        }
    }

    /// Lines without any move annotation are structural (blank-equivalent),
    /// not malformed entries.
    pub fn is_structural(&self) -> bool {
        self.reason == FailureReason::NoMoveAnnotation
    }
}
