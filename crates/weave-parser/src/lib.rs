//! Weave Parser - Recursive descent parser
//!
//! Builds a [`SourceFile`] from a weave source. Key points:
//! - `elif` / `else if` chains fold into nested `If` alternates
//! - conditions are parsed as boolean trees, then split into a native
//!   predicate half and a host expression half joined by one combinator
//! - parsing stops at the first error

mod condition;
mod error;
mod parser;

pub use condition::{split, CondExpr, Split};
pub use error::*;
pub use parser::*;

use weave_ast::{Program, SourceFile};
use weave_lexer::tokenize;

/// Parse a source string into a [`SourceFile`]
pub fn parse(source: &str) -> Result<SourceFile, ParseError> {
    let lexed = tokenize(source)?;
    let mut parser = Parser::new(source, lexed.tokens);
    let program = parser.parse_program()?;
    Ok(SourceFile {
        header: lexed.header,
        program,
    })
}

/// Parse a source string, discarding its header
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    parse(source).map(|file| file.program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_ast::{Combinator, StatementKind};

    fn body(source: &str) -> Vec<StatementKind> {
        parse_program(source)
            .unwrap_or_else(|e| panic!("failed to parse: {e}"))
            .body
            .into_iter()
            .map(|s| s.kind)
            .collect()
    }

    #[test]
    fn test_parse_flat_program() {
        let stmts = body("say a\n\nlet n = 2;\nsay b\n");
        assert_eq!(stmts.len(), 3);
        assert!(matches!(&stmts[0], StatementKind::Command(c) if c == "say a"));
        assert!(matches!(&stmts[1], StatementKind::HostCode(h) if h == "let n = 2;"));
    }

    #[test]
    fn test_parse_if_native_and_host() {
        let stmts = body("if (\"block ~ ~ ~ stone\" && a != 1) {\n  say 1\n}");
        let StatementKind::If { condition, consequent, alternate } = &stmts[0] else {
            panic!("expected if");
        };
        assert_eq!(condition.native, "\"block ~ ~ ~ stone\"");
        assert_eq!(condition.host, "a != 1");
        assert_eq!(condition.combinator, Some(Combinator::And));
        assert_eq!(consequent.statements.len(), 1);
        assert!(alternate.is_none());
    }

    #[test]
    fn test_elif_chain_folds_right() {
        let source = "if (\"A\") {\n say a\n} elif (\"B\") {\n say b\n} else if (x) {\n say c\n} else {\n say d\n}";
        let stmts = body(source);
        assert_eq!(stmts.len(), 1);
        let StatementKind::If { alternate: Some(alt), .. } = &stmts[0] else {
            panic!("expected if with alternate");
        };
        let StatementKind::If { alternate: Some(alt), condition, .. } = &alt.statements[0].kind else {
            panic!("expected nested if");
        };
        assert_eq!(condition.native, "\"B\"");
        let StatementKind::If { alternate: Some(last), condition, .. } = &alt.statements[0].kind else {
            panic!("expected third if");
        };
        assert_eq!(condition.host, "x");
        assert!(matches!(&last.statements[0].kind, StatementKind::Command(c) if c == "say d"));
    }

    #[test]
    fn test_else_on_next_line() {
        let stmts = body("if (\"A\") {\n say a\n}\nelse {\n say b\n}\nsay c");
        assert_eq!(stmts.len(), 2);
        assert!(matches!(&stmts[0], StatementKind::If { alternate: Some(_), .. }));
    }

    #[test]
    fn test_if_without_else_keeps_following_statement() {
        let stmts = body("if (\"A\") {\n say a\n}\n\nsay b");
        assert_eq!(stmts.len(), 2);
        assert!(matches!(&stmts[1], StatementKind::Command(c) if c == "say b"));
    }

    #[test]
    fn test_parse_loops_and_actions() {
        let stmts = body("for (i in 0..3) {\n say ${i}\n}\nwhile (n < 3) {\n n += 1;\n}\n@execute(as @a) { say hi }");
        assert!(matches!(&stmts[0], StatementKind::For { params, .. } if params == "i in 0..3"));
        assert!(matches!(&stmts[1], StatementKind::While { condition, .. } if condition.host == "n < 3"));
        let StatementKind::Action { name, params, body } = &stmts[2] else {
            panic!("expected action");
        };
        assert_eq!(name, "execute");
        assert_eq!(params, "as @a");
        assert_eq!(body.statements.len(), 1);
    }

    #[test]
    fn test_call_combinators() {
        let stmts = body("if (\"A\".or(ready)) {\n}");
        let StatementKind::If { condition, .. } = &stmts[0] else {
            panic!("expected if");
        };
        assert_eq!(condition.native, "\"A\"");
        assert_eq!(condition.host, "ready");
        assert_eq!(condition.combinator, Some(Combinator::Or));
    }

    #[test]
    fn test_missing_operand_is_recorded() {
        let stmts = body("if (\"A\" &&) {\n}");
        let StatementKind::If { condition, .. } = &stmts[0] else {
            panic!("expected if");
        };
        assert!(condition.missing_operand);
        assert_eq!(condition.native, "\"A\"");
    }

    #[test]
    fn test_empty_condition() {
        let stmts = body("while () {\n}");
        let StatementKind::While { condition, .. } = &stmts[0] else {
            panic!("expected while");
        };
        assert!(condition.is_empty());
        assert!(!condition.missing_operand);
    }

    #[test]
    fn test_unmatched_else() {
        let err = parse("say a\nelse {\n}").unwrap_err();
        assert!(matches!(err, ParseError::UnmatchedElse { line: 2, .. }));
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse("if (\"A\") {\n say a\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_stray_closing_brace() {
        let err = parse("say a\n}").unwrap_err();
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_mixed_condition_error() {
        let err = parse("if ((\"A\" && x) || y) {\n}").unwrap_err();
        assert!(matches!(err, ParseError::MixedCondition { line: 1, .. }));
    }

    #[test]
    fn test_lex_errors_pass_through() {
        let err = parse("if (\"A) {\n}").unwrap_err();
        assert!(matches!(err, ParseError::Lex(_)));
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn test_header_is_kept() {
        let file = parse(";;import;lib;util\nsay hi").expect("parse");
        assert_eq!(file.header.imports[0].name, "util");
        assert_eq!(file.program.body[0].line, 2);
    }

    #[test]
    fn test_ast_serializes() {
        let file = parse("if (\"A\") { say 1 }").expect("parse");
        let json = serde_json::to_string(&file).expect("json");
        assert!(json.contains("\"Command\":\"say 1\""));
    }
}
