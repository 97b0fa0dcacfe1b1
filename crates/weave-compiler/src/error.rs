//! Compile errors

use thiserror::Error;
use weave_checker::SemanticError;
use weave_codegen::CodegenError;
use weave_parser::ParseError;
use weave_runtime::RuntimeError;

use crate::ConfigError;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{file}: {source}")]
    Parse { file: String, source: ParseError },

    #[error("{file}: {} semantic error(s)", .errors.len())]
    Semantic {
        file: String,
        errors: Vec<SemanticError>,
    },

    #[error("{file}: {source}")]
    Codegen { file: String, source: CodegenError },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("import cycle: {}", .files.join(" -> "))]
    ImportCycle { files: Vec<String> },

    #[error("{file}: namespace '{namespace}' is reserved for generated functions")]
    ReservedNamespace { file: String, namespace: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CompileError {
    /// The source file the error belongs to, if any
    pub fn file(&self) -> Option<&str> {
        match self {
            CompileError::Parse { file, .. }
            | CompileError::Semantic { file, .. }
            | CompileError::Codegen { file, .. }
            | CompileError::ReservedNamespace { file, .. } => Some(file),
            CompileError::Runtime(
                RuntimeError::Compile { file, .. }
                | RuntimeError::Script { file, .. }
                | RuntimeError::MissingExport { file, .. },
            ) => Some(file),
            CompileError::Runtime(RuntimeError::Internal(_))
            | CompileError::ImportCycle { .. }
            | CompileError::Config(_) => None,
        }
    }
}
