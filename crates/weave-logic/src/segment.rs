//! Splitting a normalized expression into conjunctive segments

use crate::{LogicExpr, LogicOp};

/// One conjunct of a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedAtom {
    /// A native predicate expected to hold (`positive`) or fail
    Atom { text: String, positive: bool },
    /// The result of another segment
    Ref { segment: usize, positive: bool },
}

impl SignedAtom {
    pub fn is_positive(&self) -> bool {
        match self {
            SignedAtom::Atom { positive, .. } | SignedAtom::Ref { positive, .. } => *positive,
        }
    }
}

/// A conjunction of signed atoms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub atoms: Vec<SignedAtom>,
}

impl Segment {
    /// Indices of segments this one refers to
    pub fn references(&self) -> impl Iterator<Item = usize> + '_ {
        self.atoms.iter().filter_map(|atom| match atom {
            SignedAtom::Ref { segment, .. } => Some(*segment),
            SignedAtom::Atom { .. } => None,
        })
    }
}

/// Segment a normalized expression
///
/// Segment 0 is the top-level conjunction. Every negated conjunction below
/// it is lifted into a new segment, numbered in depth-first order, and
/// replaced by a negative reference. A segment only refers to segments with
/// a greater index.
pub fn segments(expr: &LogicExpr) -> Vec<Segment> {
    let mut segments = vec![Segment::default()];
    match expr {
        LogicExpr::Compound {
            positive: false, ..
        } => {
            let inner = lift(&mut segments, expr);
            segments[0].atoms.push(SignedAtom::Ref {
                segment: inner,
                positive: false,
            });
        }
        _ => fill(&mut segments, 0, expr),
    }
    segments
}

/// Add the conjuncts of a positive node to segment `index`
fn fill(segments: &mut Vec<Segment>, index: usize, expr: &LogicExpr) {
    match expr {
        LogicExpr::Var { atom, positive } => segments[index].atoms.push(SignedAtom::Atom {
            text: atom.clone(),
            positive: *positive,
        }),
        LogicExpr::Compound {
            positive: false, ..
        } => {
            let inner = lift(segments, expr);
            segments[index].atoms.push(SignedAtom::Ref {
                segment: inner,
                positive: false,
            });
        }
        LogicExpr::Compound {
            op: LogicOp::And,
            children,
            ..
        } => {
            for child in children {
                fill(segments, index, child);
            }
        }
        // unnormalized input: a positive Or is !(!a && !b)
        LogicExpr::Compound {
            op: LogicOp::Or,
            children,
            ..
        } => {
            let negated = LogicExpr::Compound {
                op: LogicOp::And,
                children: children.iter().cloned().map(LogicExpr::negate).collect(),
                positive: false,
            };
            fill(segments, index, &negated);
        }
    }
}

/// Move the children of a negated compound into a fresh segment
fn lift(segments: &mut Vec<Segment>, expr: &LogicExpr) -> usize {
    let index = segments.len();
    segments.push(Segment::default());
    if let LogicExpr::Compound { op, children, .. } = expr {
        let positive = LogicExpr::Compound {
            op: *op,
            children: children.clone(),
            positive: true,
        };
        fill(segments, index, &positive);
    }
    index
}
