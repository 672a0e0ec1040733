//! Parser error types.

/// Error returned when Markdown structure is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A fenced code block is never closed.
    #[error("unterminated code fence opened at line {line}")]
    UnterminatedFence {
        /// 1-based line of the opening fence.
        line: usize,
    },
}

impl ParseError {
    /// Source line the error points at.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::UnterminatedFence { line } => *line,
        }
    }
}
