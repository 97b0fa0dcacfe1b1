//! Condition trees and their split into native and host halves

use weave_ast::Combinator;

/// A parsed condition region before splitting
#[derive(Debug, Clone, PartialEq)]
pub enum CondExpr {
    /// Quoted native predicate, quotes included
    Native(String),
    /// Bare host sub-expression
    Host(String),
    Not(Box<CondExpr>),
    And(Box<CondExpr>, Box<CondExpr>),
    Or(Box<CondExpr>, Box<CondExpr>),
    /// An operator with no operand on one side
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Empty,
    Native,
    Host,
    Mixed,
}

impl Flavor {
    fn join(self, other: Flavor) -> Flavor {
        match (self, other) {
            (Flavor::Empty, f) | (f, Flavor::Empty) => f,
            (a, b) if a == b => a,
            _ => Flavor::Mixed,
        }
    }
}

/// Native text, host text and combinator of a split condition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Split {
    pub native: String,
    pub host: String,
    pub combinator: Option<Combinator>,
}

impl CondExpr {
    fn flavor(&self) -> Flavor {
        match self {
            CondExpr::Native(_) => Flavor::Native,
            CondExpr::Host(_) => Flavor::Host,
            CondExpr::Missing => Flavor::Empty,
            CondExpr::Not(inner) => inner.flavor(),
            CondExpr::And(a, b) | CondExpr::Or(a, b) => a.flavor().join(b.flavor()),
        }
    }

    /// Push negations below every mixed node
    fn push_not(self, negate: bool) -> CondExpr {
        if self.flavor() != Flavor::Mixed {
            return if negate { CondExpr::Not(Box::new(self)) } else { self };
        }
        match self {
            CondExpr::Not(inner) => inner.push_not(!negate),
            CondExpr::And(a, b) if negate => {
                CondExpr::Or(Box::new(a.push_not(true)), Box::new(b.push_not(true)))
            }
            CondExpr::Or(a, b) if negate => {
                CondExpr::And(Box::new(a.push_not(true)), Box::new(b.push_not(true)))
            }
            CondExpr::And(a, b) => CondExpr::And(Box::new(a.push_not(false)), Box::new(b.push_not(false))),
            CondExpr::Or(a, b) => CondExpr::Or(Box::new(a.push_not(false)), Box::new(b.push_not(false))),
            atom => atom,
        }
    }

    /// Children of a top-level run of the same operator
    fn operands(self, and: bool, out: &mut Vec<CondExpr>) {
        match self {
            CondExpr::And(a, b) if and => {
                a.operands(and, out);
                b.operands(and, out);
            }
            CondExpr::Or(a, b) if !and => {
                a.operands(and, out);
                b.operands(and, out);
            }
            other => out.push(other),
        }
    }

    /// Source-like text of a single-flavor subtree
    pub fn render(&self) -> String {
        match self {
            CondExpr::Native(text) | CondExpr::Host(text) => text.clone(),
            CondExpr::Missing => String::new(),
            CondExpr::Not(inner) => format!("!{}", inner.render_operand()),
            CondExpr::And(a, b) => join(a, b, "&&"),
            CondExpr::Or(a, b) => join(a, b, "||"),
        }
    }

    fn render_operand(&self) -> String {
        match self {
            CondExpr::Native(text) => text.clone(),
            CondExpr::Host(text) if is_simple(text) => text.clone(),
            CondExpr::Not(_) => self.render(),
            _ => format!("({})", self.render()),
        }
    }
}

fn join(a: &CondExpr, b: &CondExpr, op: &str) -> String {
    match (a, b) {
        (CondExpr::Missing, other) | (other, CondExpr::Missing) => other.render(),
        _ => format!("{} {} {}", a.render_operand(), op, b.render_operand()),
    }
}

fn join_all(parts: &[CondExpr], op: &str) -> String {
    let rendered: Vec<String> = parts
        .iter()
        .filter(|p| **p != CondExpr::Missing)
        .map(|p| if parts.len() > 1 { p.render_operand() } else { p.render() })
        .collect();
    rendered.join(&format!(" {op} "))
}

fn is_simple(text: &str) -> bool {
    text.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '.'))
}

/// Split a condition tree at its top level
///
/// Returns `None` when native and host atoms are interleaved below the top
/// level in a way no single combinator can express.
pub fn split(expr: CondExpr) -> Option<Split> {
    let expr = expr.push_not(false);
    match expr.flavor() {
        Flavor::Empty => Some(Split::default()),
        Flavor::Native => Some(Split {
            native: expr.render(),
            ..Split::default()
        }),
        Flavor::Host => Some(Split {
            host: expr.render(),
            ..Split::default()
        }),
        Flavor::Mixed => {
            let combinator = match expr {
                CondExpr::And(..) => Combinator::And,
                CondExpr::Or(..) => Combinator::Or,
                _ => return None,
            };
            let mut parts = Vec::new();
            expr.operands(combinator == Combinator::And, &mut parts);
            let (native, host): (Vec<CondExpr>, Vec<CondExpr>) =
                parts.into_iter().partition(|p| p.flavor() == Flavor::Native);
            if host.iter().any(|p| p.flavor() == Flavor::Mixed) {
                return None;
            }
            let op = match combinator {
                Combinator::And => "&&",
                Combinator::Or => "||",
            };
            Some(Split {
                native: join_all(&native, op),
                host: join_all(&host, op),
                combinator: Some(combinator),
            })
        }
    }
}
