//! Weave Semantic Checker
//!
//! Walks a parsed file with a scope stack of host bindings and validates
//! every host fragment in a sandboxed, time-bounded probe. Diagnostics are
//! accumulated for the whole file; the tree is never modified.

mod checker;
mod config;
mod probe;

pub use checker::*;
pub use config::ProbeConfig;
pub use probe::{declared_names, loop_variables, Probe, ProbeError};

use thiserror::Error;
use weave_ast::{SourceFile, Span};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("invalid host code on line {line}: {message}")]
    InvalidHost { message: String, line: usize, span: Span },

    #[error("host code on line {line} exceeded the {budget_ms} ms validation budget")]
    Timeout { budget_ms: u64, line: usize, span: Span },

    #[error("host code on line {line} exceeded a resource limit: {message}")]
    ResourceLimit { message: String, line: usize, span: Span },

    #[error("empty condition on line {line}")]
    EmptyCondition { line: usize, span: Span },

    #[error("logic operator without an operand on line {line}")]
    DanglingOperator { line: usize, span: Span },

    #[error("invalid native condition on line {line}: {message}")]
    InvalidNativeCondition { message: String, line: usize, span: Span },

    #[error("`for` on line {line} has no loop parameters")]
    EmptyForParams { line: usize, span: Span },

    #[error("functions can only be defined at the top level (line {line})")]
    NestedFunction { line: usize, span: Span },

    #[error("`while` on line {line} combines host and native conditions with `||`")]
    MixedOrLoop { line: usize, span: Span },

    #[error("exported name `{name}` on line {line} is not a top-level binding")]
    UnboundExport { name: String, line: usize },
}

impl SemanticError {
    pub fn line(&self) -> usize {
        match self {
            SemanticError::InvalidHost { line, .. }
            | SemanticError::Timeout { line, .. }
            | SemanticError::ResourceLimit { line, .. }
            | SemanticError::EmptyCondition { line, .. }
            | SemanticError::DanglingOperator { line, .. }
            | SemanticError::InvalidNativeCondition { line, .. }
            | SemanticError::EmptyForParams { line, .. }
            | SemanticError::NestedFunction { line, .. }
            | SemanticError::MixedOrLoop { line, .. }
            | SemanticError::UnboundExport { line, .. } => *line,
        }
    }

    /// Source span, when the error points at a statement
    pub fn span(&self) -> Option<Span> {
        match self {
            SemanticError::InvalidHost { span, .. }
            | SemanticError::Timeout { span, .. }
            | SemanticError::ResourceLimit { span, .. }
            | SemanticError::EmptyCondition { span, .. }
            | SemanticError::DanglingOperator { span, .. }
            | SemanticError::InvalidNativeCondition { span, .. }
            | SemanticError::EmptyForParams { span, .. }
            | SemanticError::NestedFunction { span, .. }
            | SemanticError::MixedOrLoop { span, .. } => Some(*span),
            SemanticError::UnboundExport { .. } => None,
        }
    }
}

/// Check a file with default probe limits
pub fn check(file: &SourceFile) -> Result<(), Vec<SemanticError>> {
    Checker::new(&ProbeConfig::default()).check_file(file)
}
