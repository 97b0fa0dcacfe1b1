//! Weave Logic - Condition normalization and segmentation
//!
//! Native conditions are parsed into [`LogicExpr`] trees, rewritten into
//! signed conjunctions by [`normalize`], and cut into [`Segment`]s that the
//! code generator lowers to guarded jumps and reference flags.

mod error;
mod expr;
mod normalize;
mod segment;

pub use error::LogicError;
pub use expr::{LogicExpr, LogicOp};
pub use normalize::{is_normalized, normalize};
pub use segment::{segments, Segment, SignedAtom};

/// Parse and normalize condition text
pub fn normalize_str(text: &str) -> Result<LogicExpr, LogicError> {
    LogicExpr::parse(text).map(normalize)
}
