//! Weave - mcfunction files with embedded Rhai logic
//!
//! This is the root workspace crate that provides integration tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use weave_ast as ast;
pub use weave_checker as checker;
pub use weave_codegen as codegen;
pub use weave_compiler as compiler;
pub use weave_datapack as datapack;
pub use weave_lexer as lexer;
pub use weave_logic as logic;
pub use weave_parser as parser;
pub use weave_runtime as runtime;
