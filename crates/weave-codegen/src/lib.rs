//! Weave Codegen - host program generation
//!
//! Lowers a parsed source file to a Rhai program. Command lines become
//! `emit` calls, native conditions become reference-flag marks and guarded
//! `jump` calls whose continuations hold the nested bodies, and action
//! blocks are wrapped by their registered handler.

mod handlers;
mod ids;
mod lower;
mod writer;

pub use handlers::{ActionHandler, ActionRegistry, BlockWrap, ExecuteHandler, RepeatHandler};
pub use ids::IdAllocator;
pub use lower::Generator;
pub use writer::{HostProgram, HostWriter};

use thiserror::Error;
use weave_ast::SourceFile;

/// Default scoreboard objective holding reference flags
pub const DEFAULT_OBJECTIVE: &str = "weave.logic";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodegenError {
    #[error("no handler registered for action '@{name}'")]
    UnknownHandler { name: String, line: usize },

    #[error("invalid parameters for action '@{name}': {message}")]
    InvalidParams {
        name: String,
        message: String,
        line: usize,
    },

    #[error("invalid native condition: {message}")]
    InvalidCondition { message: String, line: usize },

    #[error("a loop condition cannot combine host and native parts with '||'")]
    MixedOrLoop { line: usize },

    #[error("empty condition")]
    EmptyCondition { line: usize },
}

impl CodegenError {
    pub fn line(&self) -> usize {
        match self {
            CodegenError::UnknownHandler { line, .. }
            | CodegenError::InvalidParams { line, .. }
            | CodegenError::InvalidCondition { line, .. }
            | CodegenError::MixedOrLoop { line }
            | CodegenError::EmptyCondition { line } => *line,
        }
    }
}

/// Generate the host program for a file
pub fn generate(
    file: &SourceFile,
    registry: &ActionRegistry,
    ids: &mut IdAllocator,
    objective: &str,
) -> Result<HostProgram, CodegenError> {
    Generator::new(registry, ids, objective).generate(file)
}
