//! Statement AST nodes

use serde::{Deserialize, Serialize};
use crate::Span;

/// A block of statements between braces
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// A statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
    /// 1-based source line the statement starts on
    pub line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StatementKind {
    /// A target-platform command line: `say hello`
    Command(String),

    /// A host-language fragment: `let n = 3;`
    HostCode(String),

    /// `if (cond) { ... } elif (cond) { ... } else { ... }`
    ///
    /// An `elif` is folded into an alternate block holding a single nested `If`.
    If {
        condition: Condition,
        consequent: Block,
        alternate: Option<Block>,
    },

    /// `while (cond) { ... }`
    While {
        condition: Condition,
        body: Block,
    },

    /// `for (i in 0..3) { ... }`
    For {
        params: String,
        body: Block,
    },

    /// `@name(params) { ... }`, dispatched to a registered handler
    Action {
        name: String,
        params: String,
        body: Block,
    },
}

/// How the native and host halves of a condition combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combinator {
    And,
    Or,
}

/// A structural condition split into its native-predicate and host halves
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Condition {
    /// Native predicate expression, atoms still quoted: `"A" && !"B"`
    pub native: String,
    /// Host boolean expression: `n > 1`
    pub host: String,
    /// Set only when both halves are present
    pub combinator: Option<Combinator>,
    /// An operator was written without one of its operands
    pub missing_operand: bool,
    pub span: Span,
}

impl Condition {
    pub fn has_native(&self) -> bool {
        !self.native.trim().is_empty()
    }

    pub fn has_host(&self) -> bool {
        !self.host.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_native() && !self.has_host()
    }
}

impl Statement {
    /// Nested blocks in source order
    pub fn blocks(&self) -> Vec<&Block> {
        match &self.kind {
            StatementKind::If { consequent, alternate, .. } => {
                let mut blocks = vec![consequent];
                blocks.extend(alternate.iter());
                blocks
            }
            StatementKind::While { body, .. }
            | StatementKind::For { body, .. }
            | StatementKind::Action { body, .. } => vec![body],
            StatementKind::Command(_) | StatementKind::HostCode(_) => Vec::new(),
        }
    }
}
