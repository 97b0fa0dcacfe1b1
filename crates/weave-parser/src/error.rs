//! Parser error types

use thiserror::Error;
use weave_ast::Span;
use weave_lexer::{LexError, TokenKind};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected token on line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
        line: usize,
    },

    #[error("unexpected end of file: expected {expected}")]
    UnexpectedEof {
        expected: String,
        span: Span,
        line: usize,
    },

    #[error("'else' on line {line} does not follow an if block")]
    UnmatchedElse { span: Span, line: usize },

    #[error("condition on line {line} mixes native and host atoms in a way that cannot be split")]
    MixedCondition { span: Span, line: usize },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(err) => err.span(),
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span, .. } => *span,
            ParseError::UnmatchedElse { span, .. } => *span,
            ParseError::MixedCondition { span, .. } => *span,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            ParseError::Lex(err) => err.line(),
            ParseError::UnexpectedToken { line, .. }
            | ParseError::UnexpectedEof { line, .. }
            | ParseError::UnmatchedElse { line, .. }
            | ParseError::MixedCondition { line, .. } => *line,
        }
    }

    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span, line: usize) -> Self {
        let expected = expected.into();
        if found == TokenKind::Eof {
            return ParseError::UnexpectedEof { expected, span, line };
        }
        ParseError::UnexpectedToken {
            expected,
            found: found.describe().to_string(),
            span,
            line,
        }
    }
}
