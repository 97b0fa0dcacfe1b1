//! Weave Datapack - datapack directory I/O
//!
//! Finds source function files, writes compiled output trees, and watches
//! a source tree for changes.

mod discover;
mod error;
mod watch;
mod writer;

pub use discover::{discover, namespaces};
pub use error::{DatapackError, Result};
pub use watch::{relevant_paths, SourceWatcher};
pub use writer::{DatapackWriter, TagFile, WriteSummary};

/// Directory of function files inside a namespace
pub const FUNCTIONS_DIR: &str = "functions";

pub const FUNCTION_EXTENSION: &str = "mcfunction";
