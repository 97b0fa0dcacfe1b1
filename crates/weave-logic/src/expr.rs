//! Boolean expressions over native predicate atoms

use std::collections::BTreeSet;
use std::fmt;

use crate::LogicError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
        }
    }
}

/// A signed boolean expression tree
///
/// Atoms are stored unquoted. `positive == false` negates the whole node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicExpr {
    Var {
        atom: String,
        positive: bool,
    },
    Compound {
        op: LogicOp,
        children: Vec<LogicExpr>,
        positive: bool,
    },
}

impl LogicExpr {
    pub fn var(atom: impl Into<String>) -> Self {
        LogicExpr::Var {
            atom: atom.into(),
            positive: true,
        }
    }

    /// Parse `"A" && !("B" || 'C')` style text without simplifying it
    pub fn parse(text: &str) -> Result<Self, LogicError> {
        if text.trim().is_empty() {
            return Err(LogicError::Empty);
        }
        split_top(text, "||", text)?;
        parse_node(text, text)
    }

    pub fn is_positive(&self) -> bool {
        match self {
            LogicExpr::Var { positive, .. } | LogicExpr::Compound { positive, .. } => *positive,
        }
    }

    /// Flip the sign of this node only
    pub fn negate(self) -> Self {
        match self {
            LogicExpr::Var { atom, positive } => LogicExpr::Var {
                atom,
                positive: !positive,
            },
            LogicExpr::Compound {
                op,
                children,
                positive,
            } => LogicExpr::Compound {
                op,
                children,
                positive: !positive,
            },
        }
    }

    /// Evaluate under an assignment of truth values to atoms
    pub fn evaluate(&self, truth: &dyn Fn(&str) -> bool) -> bool {
        match self {
            LogicExpr::Var { atom, positive } => truth(atom) == *positive,
            LogicExpr::Compound {
                op,
                children,
                positive,
            } => {
                let value = match op {
                    LogicOp::And => children.iter().all(|c| c.evaluate(truth)),
                    LogicOp::Or => children.iter().any(|c| c.evaluate(truth)),
                };
                value == *positive
            }
        }
    }

    /// Distinct atoms in sorted order
    pub fn atoms(&self) -> BTreeSet<&str> {
        let mut atoms = BTreeSet::new();
        self.collect_atoms(&mut atoms);
        atoms
    }

    fn collect_atoms<'a>(&'a self, atoms: &mut BTreeSet<&'a str>) {
        match self {
            LogicExpr::Var { atom, .. } => {
                atoms.insert(atom);
            }
            LogicExpr::Compound { children, .. } => {
                for child in children {
                    child.collect_atoms(atoms);
                }
            }
        }
    }

    /// Order-independent text used to compare expressions
    pub fn canonical(&self) -> String {
        match self {
            LogicExpr::Var { atom, positive } => format!("{}{}", sign(*positive), quote(atom)),
            LogicExpr::Compound {
                op,
                children,
                positive,
            } => {
                let mut parts: Vec<String> = children.iter().map(LogicExpr::canonical).collect();
                parts.sort();
                format!("{}({})", sign(*positive), parts.join(op.symbol()))
            }
        }
    }

    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        match self {
            LogicExpr::Var { .. } => 1,
            LogicExpr::Compound { children, .. } => {
                1 + children.iter().map(LogicExpr::size).sum::<usize>()
            }
        }
    }
}

impl fmt::Display for LogicExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicExpr::Var { atom, positive } => write!(f, "{}{}", sign(*positive), quote(atom)),
            LogicExpr::Compound {
                op,
                children,
                positive,
            } => {
                write!(f, "{}(", sign(*positive))?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op.symbol())?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn sign(positive: bool) -> &'static str {
    if positive {
        ""
    } else {
        "!"
    }
}

fn quote(atom: &str) -> String {
    format!("\"{}\"", atom.replace('\\', "\\\\").replace('"', "\\\""))
}

// === Parsing ===

fn parse_node(text: &str, whole: &str) -> Result<LogicExpr, LogicError> {
    let (body, positive) = strip_prefixes(text, whole)?;
    if body.is_empty() {
        return Err(LogicError::MissingOperand(whole.to_string()));
    }
    for op in [LogicOp::Or, LogicOp::And] {
        let parts = split_top(body, op.symbol(), whole)?;
        if parts.len() > 1 {
            let children = parts
                .into_iter()
                .map(|part| parse_node(part, whole))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(LogicExpr::Compound {
                op,
                children,
                positive,
            });
        }
    }
    Ok(LogicExpr::Var {
        atom: unquote(body),
        positive,
    })
}

/// Strip leading negations and redundant outer parentheses
fn strip_prefixes<'a>(text: &'a str, whole: &str) -> Result<(&'a str, bool), LogicError> {
    let mut body = text.trim();
    let mut positive = true;
    loop {
        if let Some(rest) = body.strip_prefix('!') {
            positive = !positive;
            body = rest.trim();
        } else if body.starts_with('(')
            && body.ends_with(')')
            && closing_paren(body, whole)? == body.len() - 1
        {
            body = body[1..body.len() - 1].trim();
        } else {
            return Ok((body, positive));
        }
    }
}

/// Walk `text` outside of quoted literals, yielding byte offsets and paren depth
///
/// `visit` returns `true` to stop early.
fn walk(
    text: &str,
    whole: &str,
    mut visit: impl FnMut(usize, u8, i32) -> bool,
) -> Result<(), LogicError> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' && q != b'`' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' | b'`' => quote = Some(b),
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(LogicError::UnbalancedParens(whole.to_string()));
                }
            }
            _ => {}
        }
        if visit(i, b, depth) {
            return Ok(());
        }
        i += 1;
    }
    if quote.is_some() {
        return Err(LogicError::UnterminatedQuote(whole.to_string()));
    }
    if depth != 0 {
        return Err(LogicError::UnbalancedParens(whole.to_string()));
    }
    Ok(())
}

/// Offset of the paren closing the `(` at offset 0
fn closing_paren(text: &str, whole: &str) -> Result<usize, LogicError> {
    let mut close = None;
    walk(text, whole, |i, b, depth| {
        if b == b')' && depth == 0 {
            close = Some(i);
            return true;
        }
        false
    })?;
    close.ok_or_else(|| LogicError::UnbalancedParens(whole.to_string()))
}

/// Split on `op` where it occurs at paren depth 0 outside quotes
fn split_top<'a>(text: &'a str, op: &str, whole: &str) -> Result<Vec<&'a str>, LogicError> {
    let bytes = text.as_bytes();
    let mut cuts = Vec::new();
    let mut skip_until = 0;
    walk(text, whole, |i, _, depth| {
        if i >= skip_until && depth == 0 && bytes[i..].starts_with(op.as_bytes()) {
            cuts.push(i);
            skip_until = i + op.len();
        }
        false
    })?;
    let mut parts = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        parts.push(&text[start..cut]);
        start = cut + op.len();
    }
    parts.push(&text[start..]);
    Ok(parts)
}

/// Remove one layer of quotes if the whole atom is a single literal
fn unquote(atom: &str) -> String {
    let atom = atom.trim();
    let Some(q) = atom.chars().next().filter(|c| matches!(c, '"' | '\'' | '`')) else {
        return atom.to_string();
    };
    let mut out = String::new();
    let mut chars = atom[1..].char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if q != '`' => {
                if let Some((_, escaped)) = chars.next() {
                    out.push(escaped);
                }
            }
            c if c == q => {
                return if i + 2 == atom.len() {
                    out.trim().to_string()
                } else {
                    atom.to_string()
                };
            }
            c => out.push(c),
        }
    }
    atom.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_structure() {
        let expr = LogicExpr::parse(r#""A" && !("B" || 'C')"#).expect("parse");
        let LogicExpr::Compound { op, children, positive } = &expr else {
            panic!("expected compound");
        };
        assert_eq!(*op, LogicOp::And);
        assert!(positive);
        assert_eq!(children[0], LogicExpr::var("A"));
        assert_eq!(
            children[1],
            LogicExpr::Compound {
                op: LogicOp::Or,
                children: vec![LogicExpr::var("B"), LogicExpr::var("C")],
                positive: false,
            }
        );
    }

    #[test]
    fn operators_inside_quotes_are_atoms() {
        let expr = LogicExpr::parse(r#""entity @s[tag=a||b]""#).expect("parse");
        assert_eq!(expr, LogicExpr::var("entity @s[tag=a||b]"));
    }

    #[test]
    fn escaped_quotes_are_unescaped() {
        let expr = LogicExpr::parse(r#""data entity @s {Name:\"x\"}""#).expect("parse");
        assert_eq!(expr, LogicExpr::var(r#"data entity @s {Name:"x"}"#));
    }

    #[test]
    fn negation_inside_parens() {
        assert_eq!(
            LogicExpr::parse(r#"(!"A")"#).expect("parse"),
            LogicExpr::var("A").negate()
        );
    }

    #[test]
    fn adjacent_groups_keep_their_parens() {
        let expr = LogicExpr::parse(r#"("A") && ("B")"#).expect("parse");
        assert!(matches!(expr, LogicExpr::Compound { op: LogicOp::And, .. }));
    }

    #[test]
    fn errors() {
        assert_eq!(LogicExpr::parse("  "), Err(LogicError::Empty));
        assert!(matches!(
            LogicExpr::parse(r#""A" &&"#),
            Err(LogicError::MissingOperand(_))
        ));
        assert!(matches!(
            LogicExpr::parse(r#"("A""#),
            Err(LogicError::UnbalancedParens(_))
        ));
        assert!(matches!(
            LogicExpr::parse(r#""A"#),
            Err(LogicError::UnterminatedQuote(_))
        ));
    }

    #[test]
    fn evaluate_and_display() {
        let expr = LogicExpr::parse(r#"!("A" || "B")"#).expect("parse");
        assert!(expr.evaluate(&|_| false));
        assert!(!expr.evaluate(&|a| a == "B"));
        assert_eq!(expr.to_string(), r#"!("A" || "B")"#);
        assert_eq!(LogicExpr::parse(&expr.to_string()).expect("reparse"), expr);
    }

    #[test]
    fn canonical_ignores_order() {
        let a = LogicExpr::parse(r#""A" && "B""#).expect("parse");
        let b = LogicExpr::parse(r#""B" && "A""#).expect("parse");
        assert_eq!(a.canonical(), b.canonical());
        assert_ne!(a, b);
    }
}
