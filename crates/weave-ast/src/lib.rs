//! Weave AST - Core types for the abstract syntax tree
//!
//! This crate defines the statement tree produced by the parser, spans for
//! source locations, and the header bindings of a source file.

mod span;
mod stmt;
mod header;

pub use span::*;
pub use stmt::*;
pub use header::*;

use serde::{Deserialize, Serialize};

/// A parsed program: a flat list of top-level statements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Statement>,
    pub span: Span,
}

/// Render text as a host-language template literal
///
/// Back-ticks are doubled; `${...}` stays live and is interpolated when the
/// generated program runs.
pub fn template_literal(text: &str) -> String {
    format!("`{}`", text.replace('`', "``"))
}

/// One parsed source file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceFile {
    pub header: Header,
    pub program: Program,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_literal_doubles_backticks() {
        assert_eq!(template_literal("say hi"), "`say hi`");
        assert_eq!(template_literal("say `x` ${n}"), "`say ``x`` ${n}`");
    }
}
