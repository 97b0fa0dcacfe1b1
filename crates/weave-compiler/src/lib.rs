//! Weave Compiler - the full pipeline
//!
//! Every source unit is parsed, checked and lowered to a host program.
//! The programs then run in import order against one runtime, producing a
//! single output tree. Any failure aborts the whole run.

mod compiler;
mod config;
mod error;
mod order;

pub use compiler::{Compiler, SourceUnit, LOAD_TAG};
pub use config::{CompilerConfig, ConfigError, OutputConfig, ProjectConfig};
pub use error::CompileError;
pub use order::execution_order;

pub use weave_runtime::{FunctionId, OutputTree, Snippet};
