//! Lexer errors

use thiserror::Error;
use weave_ast::Span;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' on line {line}")]
    UnexpectedCharacter { ch: char, line: usize, span: Span },

    #[error("unterminated string literal on line {line}")]
    UnterminatedLiteral { line: usize, span: Span },

    #[error("'(' opened on line {line} is never closed")]
    UnterminatedRegion { line: usize, span: Span },

    #[error("invalid header directive on line {line}: {text}")]
    InvalidDirective { text: String, line: usize, span: Span },

    #[error("header directive on line {line} appears after ordinary content")]
    MisplacedDirective { line: usize, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::UnterminatedLiteral { span, .. }
            | LexError::UnterminatedRegion { span, .. }
            | LexError::InvalidDirective { span, .. }
            | LexError::MisplacedDirective { span, .. } => *span,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { line, .. }
            | LexError::UnterminatedLiteral { line, .. }
            | LexError::UnterminatedRegion { line, .. }
            | LexError::InvalidDirective { line, .. }
            | LexError::MisplacedDirective { line, .. } => *line,
        }
    }
}
