//! Rewriting expressions into signed conjunctions
//!
//! After normalization no `Or` node remains: `A || B` is rewritten to
//! `!(!A && !B)`. Positive `And` children are merged into their parent,
//! duplicate children are removed and single-child compounds collapse into
//! their child. Negated `And` children stay nested; they become segments.

use std::collections::HashSet;

use crate::{LogicExpr, LogicOp};

/// Normalize to a fixpoint
pub fn normalize(expr: LogicExpr) -> LogicExpr {
    let mut current = expr;
    // each productive pass removes at least one node or operator
    for _ in 0..=current.size() {
        let next = simplify(current.clone());
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// One bottom-up simplification pass
fn simplify(expr: LogicExpr) -> LogicExpr {
    let LogicExpr::Compound {
        op,
        children,
        positive,
    } = expr
    else {
        return expr;
    };

    let mut children: Vec<LogicExpr> = children.into_iter().map(simplify).collect();
    let positive = match op {
        LogicOp::And => positive,
        LogicOp::Or => {
            children = children.into_iter().map(LogicExpr::negate).collect();
            !positive
        }
    };

    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match child {
            LogicExpr::Compound {
                op: LogicOp::And,
                children: nested,
                positive: true,
            } => flat.extend(nested),
            other => flat.push(other),
        }
    }

    let mut seen = HashSet::new();
    flat.retain(|child| seen.insert(child.canonical()));

    if flat.len() == 1 {
        if let Some(only) = flat.pop() {
            return if positive { only } else { only.negate() };
        }
    }
    LogicExpr::Compound {
        op: LogicOp::And,
        children: flat,
        positive,
    }
}

/// Whether `expr` is already in normalized form
pub fn is_normalized(expr: &LogicExpr) -> bool {
    match expr {
        LogicExpr::Var { .. } => true,
        LogicExpr::Compound { op, children, .. } => {
            *op == LogicOp::And
                && children.len() > 1
                && children.iter().all(|child| {
                    !matches!(child, LogicExpr::Compound { positive: true, .. })
                        && is_normalized(child)
                })
        }
    }
}
