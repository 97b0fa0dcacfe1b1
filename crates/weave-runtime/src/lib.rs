//! Weave Runtime - generation-time execution
//!
//! Runs generated host programs. `emit(command)` appends to the active
//! function; `jump(predicate, continuation)` creates a child function,
//! invokes it from the active one, and calls `continuation` with the child
//! active. Nested jumps therefore produce a tree of function files.

mod error;
mod runtime;
mod snippet;

pub use error::RuntimeError;
pub use runtime::{RunUnit, Runtime, RuntimeConfig, DEFAULT_MAX_CALL_LEVELS};
pub use snippet::{FunctionId, OutputTree, Snippet};
