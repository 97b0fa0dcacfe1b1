//! Condition expression errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogicError {
    #[error("empty condition")]
    Empty,

    #[error("operator without an operand in `{0}`")]
    MissingOperand(String),

    #[error("unbalanced parentheses in `{0}`")]
    UnbalancedParens(String),

    #[error("unterminated quote in `{0}`")]
    UnterminatedQuote(String),
}
