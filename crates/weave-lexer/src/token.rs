//! Token definitions for weave sources

use logos::Logos;

/// Kinds of tokens produced for a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // === Lines ===
    /// A target-platform command line
    Command,
    /// A host-language fragment (one line, or a brace-balanced run of lines)
    Host,

    // === Structural keywords ===
    If,
    Elif,
    Else,
    While,
    For,
    /// `@name`, a handler-dispatched block
    Action,

    // === Delimiters ===
    LParen,
    RParen,
    LBrace,
    RBrace,

    // === Parameter regions ===
    /// Raw text between the parens of `for (...)` or `@name(...)`
    Params,

    // === Condition regions ===
    /// A quoted native predicate, quotes included
    NativeAtom,
    /// A bare host boolean sub-expression
    HostAtom,
    AndAnd,
    OrOr,
    Bang,
    /// `.and(`
    AndCall,
    /// `.or(`
    OrCall,

    // === Special ===
    Eol,
    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::Elif
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Action
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Command => "command",
            TokenKind::Host => "host code",
            TokenKind::If => "'if'",
            TokenKind::Elif => "'elif'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::For => "'for'",
            TokenKind::Action => "action",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Params => "parameters",
            TokenKind::NativeAtom => "native predicate",
            TokenKind::HostAtom => "host expression",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::AndCall => "'.and('",
            TokenKind::OrCall => "'.or('",
            TokenKind::Eol => "end of line",
            TokenKind::Eof => "end of file",
        }
    }
}

/// Fine-grained tokens inside a condition region
///
/// Host atoms are reassembled from runs of these by the lexer, so only the
/// pieces that matter for splitting are distinguished.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum CondToken {
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r#"'([^'\\]|\\.)*'"#)]
    Quoted,

    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!=")]
    NotEq,
    #[token("!")]
    Bang,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    #[regex(r"\.and[ \t]*\(")]
    AndCall,
    #[regex(r"\.or[ \t]*\(")]
    OrCall,

    #[regex(r#"[^ \t\r\n\f()&|!"'.\x00-\x08]+"#)]
    Word,
    #[regex(r"[&|.]")]
    Punct,
}

impl CondToken {
    /// Tokens that end an operand
    pub fn closes_operand(&self) -> bool {
        matches!(
            self,
            CondToken::AndAnd
                | CondToken::OrOr
                | CondToken::RParen
                | CondToken::AndCall
                | CondToken::OrCall
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<CondToken> {
        CondToken::lexer(src).map(|t| t.expect("lex")).collect()
    }

    #[test]
    fn splits_operators_from_words() {
        assert_eq!(
            kinds(r#""A" && !b != 1"#),
            vec![
                CondToken::Quoted,
                CondToken::AndAnd,
                CondToken::Bang,
                CondToken::Word,
                CondToken::NotEq,
                CondToken::Word,
            ]
        );
    }

    #[test]
    fn call_combinators() {
        assert_eq!(
            kinds(r#""A".and (x)"#),
            vec![CondToken::Quoted, CondToken::AndCall, CondToken::Word, CondToken::RParen]
        );
        assert_eq!(kinds("a.len"), vec![CondToken::Word, CondToken::Punct, CondToken::Word]);
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(CondToken::lexer("a \u{1} b").any(|t| t.is_err()));
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(CondToken::lexer("\"abc").any(|t| t.is_err()));
    }
}
