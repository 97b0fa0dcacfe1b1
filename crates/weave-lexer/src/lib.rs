//! Weave Lexer - Line classification for hybrid command/host sources
//!
//! A weave source is line oriented. Every line is classified as one of:
//! - a target-platform command (`say hi`)
//! - host code (`let n = 3;`, or a brace-balanced run of lines)
//! - a structural line (`if (...) {`, `} else {`, `for (...) {`, `@name(...) {`)
//!
//! Condition regions of structural lines are tokenized with a logos lexer
//! ([`CondToken`]) and reassembled into native atoms, host atoms and operators.

mod error;
mod scan;
mod token;
mod vocabulary;

pub use error::LexError;
pub use token::*;
pub use vocabulary::{is_command_line, COMMAND_NAMES};

use logos::Logos;
use weave_ast::{line_of, Binding, Header, Span};

/// A token with its span and 1-based line
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub line: usize,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}

/// Result of lexing one source file
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub header: Header,
    pub tokens: Vec<Token>,
}

/// Tokenize a source file, consuming its header block first
pub fn tokenize(source: &str) -> Result<Lexed, LexError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Lexed, LexError> {
        let header = self.header()?;
        while self.pos < self.source.len() {
            let end = self.line_end(self.pos);
            self.line(self.pos, end)?;
            self.finish_line();
        }
        let end = self.source.len();
        self.push(TokenKind::Eof, Span::new(end, end));
        Ok(Lexed {
            header,
            tokens: self.tokens,
        })
    }

    // === Cursor helpers ===

    fn line_end(&self, from: usize) -> usize {
        self.source[from..]
            .find('\n')
            .map_or(self.source.len(), |i| from + i)
    }

    /// Move the cursor forward to `to`, counting the newlines passed
    fn advance_to(&mut self, to: usize) {
        let to = to.min(self.source.len());
        if to > self.pos {
            self.line += self.source[self.pos..to].matches('\n').count();
            self.pos = to;
        }
    }

    /// Line number of an offset at or after the cursor
    fn line_at(&self, offset: usize) -> usize {
        let offset = offset.min(self.source.len()).max(self.pos);
        self.line + self.source[self.pos..offset].matches('\n').count()
    }

    /// Drop whatever is left of the current line and step over its newline
    fn finish_line(&mut self) {
        let end = self.line_end(self.pos);
        self.advance_to(end);
        if self.pos < self.source.len() {
            let ends_statement = self
                .tokens
                .last()
                .is_some_and(|t| t.kind != TokenKind::Eol);
            if ends_statement {
                self.push(TokenKind::Eol, Span::new(self.pos, self.pos + 1));
            }
            self.advance_to(self.pos + 1);
        }
    }

    fn skip_inline_ws(&mut self) {
        let rest = &self.source[self.pos..];
        let skipped = rest.len() - rest.trim_start_matches([' ', '\t', '\r']).len();
        self.pos += skipped;
    }

    fn skip_ws(&mut self) {
        let rest = &self.source[self.pos..];
        let skipped = rest.len() - rest.trim_start().len();
        self.advance_to(self.pos + skipped);
    }

    fn at(&self, c: char) -> bool {
        self.source[self.pos..].starts_with(c)
    }

    fn push(&mut self, kind: TokenKind, span: Span) {
        self.tokens.push(Token {
            kind,
            span,
            line: self.line,
        });
    }

    fn push_at(&mut self, kind: TokenKind, span: Span) {
        let line = self.line_at(span.start);
        self.tokens.push(Token { kind, span, line });
    }

    // === Header ===

    fn header(&mut self) -> Result<Header, LexError> {
        let mut header = Header::default();
        while self.pos < self.source.len() {
            let end = self.line_end(self.pos);
            let raw = &self.source[self.pos..end];
            let text = raw.trim();
            if !text.is_empty() && !text.starts_with(";;") {
                break;
            }
            if !text.is_empty() {
                let start = self.pos + (raw.len() - raw.trim_start().len());
                let span = Span::new(start, start + text.len());
                let (is_export, binding) = self.directive(text, span)?;
                if is_export {
                    header.exports.push(binding);
                } else {
                    header.imports.push(binding);
                }
            }
            self.advance_to(end);
            self.advance_to(self.pos + 1);
        }
        Ok(header)
    }

    /// `;;import;<target>;<name>` or `;;export;<target>;<name>`
    fn directive(&self, text: &str, span: Span) -> Result<(bool, Binding), LexError> {
        let invalid = || LexError::InvalidDirective {
            text: text.to_string(),
            line: self.line,
            span,
        };
        let parts: Vec<&str> = text[2..].split(';').map(str::trim).collect();
        let [kind, target, name] = parts.as_slice() else {
            return Err(invalid());
        };
        let is_export = match *kind {
            "import" => false,
            "export" => true,
            _ => return Err(invalid()),
        };
        if target.is_empty() || !is_identifier(name) {
            return Err(invalid());
        }
        Ok((
            is_export,
            Binding {
                target: target.to_string(),
                name: name.to_string(),
                line: self.line,
            },
        ))
    }

    // === Lines ===

    fn line(&mut self, start: usize, end: usize) -> Result<(), LexError> {
        let source = self.source;
        let raw = &source[start..end];
        let text = raw.trim();
        if text.is_empty() {
            self.advance_to(end);
            return Ok(());
        }
        let lead = start + (raw.len() - raw.trim_start().len());
        self.advance_to(lead);
        if text.starts_with('}') || structural_keyword(text).is_some() {
            return self.structural();
        }
        self.content(lead, lead + text.len(), true)
    }

    /// Classify a trimmed, non-structural piece of a line
    fn content(&mut self, start: usize, end: usize, allow_block: bool) -> Result<(), LexError> {
        let source = self.source;
        let text = &source[start..end];
        let span = Span::new(start, end);
        if text.starts_with(";;") {
            return Err(LexError::MisplacedDirective {
                line: self.line,
                span,
            });
        }
        if text.ends_with(';') {
            return self.host(start, end, allow_block);
        }
        if text.starts_with('#') || text.starts_with("//") {
            self.advance_to(end);
            return Ok(());
        }
        if is_command_line(text) {
            self.push(TokenKind::Command, span);
            self.advance_to(end);
            return Ok(());
        }
        self.host(start, end, allow_block)
    }

    /// Host code; an unbalanced `{` swallows lines until the braces balance
    fn host(&mut self, start: usize, end: usize, allow_block: bool) -> Result<(), LexError> {
        let mut depth = scan::brace_balance(&self.source[start..end]);
        let mut cursor = end;
        if allow_block {
            while depth > 0 && cursor < self.source.len() {
                let next = cursor + 1;
                cursor = self.line_end(next);
                depth += scan::brace_balance(&self.source[next..cursor]);
            }
        }
        let len = self.source[start..cursor].trim_end().len();
        self.push(TokenKind::Host, Span::new(start, start + len));
        self.advance_to(cursor);
        Ok(())
    }

    // === Structural lines ===

    fn structural(&mut self) -> Result<(), LexError> {
        let source = self.source;
        loop {
            self.skip_inline_ws();
            let end = self.line_end(self.pos);
            if self.pos >= end {
                return Ok(());
            }
            let rest = &source[self.pos..end];
            if rest.starts_with('}') {
                self.push(TokenKind::RBrace, Span::new(self.pos, self.pos + 1));
                self.pos += 1;
                continue;
            }
            let Some((kind, len)) = structural_keyword(rest) else {
                let trimmed = rest.trim_end().len();
                return self.content(self.pos, self.pos + trimmed, true);
            };
            self.push(kind, Span::new(self.pos, self.pos + len));
            self.pos += len;
            match kind {
                TokenKind::If | TokenKind::Elif | TokenKind::While => self.condition_region()?,
                TokenKind::For | TokenKind::Action => self.params_region()?,
                _ => {}
            }
            self.skip_ws();
            if !self.at('{') {
                // the parser reports the missing block
                return Ok(());
            }
            self.push(TokenKind::LBrace, Span::new(self.pos, self.pos + 1));
            self.pos += 1;
            self.inline_body()?;
        }
    }

    /// Content following `{` on the same line
    fn inline_body(&mut self) -> Result<(), LexError> {
        let source = self.source;
        self.skip_inline_ws();
        let end = self.line_end(self.pos);
        let rest = &source[self.pos..end];
        if rest.trim().is_empty() || rest.starts_with('}') {
            return Ok(());
        }
        if structural_keyword(rest).is_some() {
            return self.structural();
        }
        let start = self.pos;
        match scan::closing_brace(rest) {
            Some(offset) => {
                let inner = rest[..offset].trim_end();
                self.content(start, start + inner.len(), false)?;
                self.pos = start + offset;
                Ok(())
            }
            None => self.content(start, start + rest.trim_end().len(), true),
        }
    }

    /// `( <condition> )`, possibly spanning lines
    fn condition_region(&mut self) -> Result<(), LexError> {
        let source = self.source;
        self.skip_ws();
        if !self.at('(') {
            return Ok(());
        }
        let open = self.pos;
        self.push(TokenKind::LParen, Span::new(open, open + 1));
        let base = open + 1;
        let mut lexer = CondToken::lexer(&source[base..]);
        let mut pieces = Vec::new();
        let mut depth = 0usize;
        let close = loop {
            let Some(result) = lexer.next() else {
                return Err(LexError::UnterminatedRegion {
                    line: self.line,
                    span: Span::new(open, self.source.len()),
                });
            };
            let span = Span::new(base + lexer.span().start, base + lexer.span().end);
            let tok = match result {
                Ok(tok) => tok,
                Err(()) => return Err(self.bad_condition(span)),
            };
            match tok {
                CondToken::LParen | CondToken::AndCall | CondToken::OrCall => depth += 1,
                CondToken::RParen if depth == 0 => break span,
                CondToken::RParen => depth -= 1,
                _ => {}
            }
            pieces.push((tok, span));
        };
        self.assemble(&pieces);
        self.push_at(TokenKind::RParen, close);
        self.advance_to(close.end);
        Ok(())
    }

    fn bad_condition(&self, span: Span) -> LexError {
        let line = line_of(self.source, span.start);
        match span.slice(self.source).chars().next() {
            Some('"') | Some('\'') => LexError::UnterminatedLiteral {
                line,
                span: Span::new(span.start, self.source.len()),
            },
            Some(ch) => LexError::UnexpectedCharacter { ch, line, span },
            None => LexError::UnterminatedRegion { line, span },
        }
    }

    /// Rebuild condition pieces into atoms and operators
    fn assemble(&mut self, pieces: &[(CondToken, Span)]) {
        let mut i = 0;
        let mut operand = true;
        while i < pieces.len() {
            let (tok, span) = pieces[i];
            if operand {
                match tok {
                    CondToken::Bang => {
                        self.push_at(TokenKind::Bang, span);
                        i += 1;
                    }
                    CondToken::LParen if is_group(pieces, i) => {
                        self.push_at(TokenKind::LParen, span);
                        i += 1;
                    }
                    CondToken::Quoted
                        if pieces.get(i + 1).map_or(true, |(t, _)| t.closes_operand()) =>
                    {
                        self.push_at(TokenKind::NativeAtom, span);
                        i += 1;
                        operand = false;
                    }
                    // missing operand, left for the parser to record
                    CondToken::AndAnd | CondToken::OrOr | CondToken::RParen => operand = false,
                    _ => {
                        i = self.host_atom(pieces, i);
                        operand = false;
                    }
                }
                continue;
            }
            match tok {
                CondToken::AndAnd => {
                    self.push_at(TokenKind::AndAnd, span);
                    operand = true;
                    i += 1;
                }
                CondToken::OrOr => {
                    self.push_at(TokenKind::OrOr, span);
                    operand = true;
                    i += 1;
                }
                CondToken::RParen => {
                    self.push_at(TokenKind::RParen, span);
                    i += 1;
                }
                CondToken::AndCall | CondToken::OrCall => {
                    let kind = if tok == CondToken::AndCall {
                        TokenKind::AndCall
                    } else {
                        TokenKind::OrCall
                    };
                    self.push_at(kind, span);
                    i = self.host_atom(pieces, i + 1);
                }
                _ => i = self.host_atom(pieces, i),
            }
        }
    }

    /// Push the host atom starting at `start`; returns the index after it
    fn host_atom(&mut self, pieces: &[(CondToken, Span)], start: usize) -> usize {
        let mut depth = 0usize;
        let mut i = start;
        while let Some((tok, _)) = pieces.get(i) {
            match tok {
                CondToken::LParen | CondToken::AndCall | CondToken::OrCall => depth += 1,
                CondToken::RParen if depth == 0 => break,
                CondToken::RParen => depth -= 1,
                CondToken::AndAnd | CondToken::OrOr if depth == 0 => break,
                _ => {}
            }
            i += 1;
        }
        if i > start {
            let span = pieces[start].1.merge(pieces[i - 1].1);
            self.push_at(TokenKind::HostAtom, span);
        }
        i
    }

    /// `( <raw params> )` of `for` and actions
    fn params_region(&mut self) -> Result<(), LexError> {
        let source = self.source;
        self.skip_ws();
        if !self.at('(') {
            return Ok(());
        }
        let open = self.pos;
        self.push(TokenKind::LParen, Span::new(open, open + 1));
        let Some(offset) = scan::matching_paren(&source[open + 1..]) else {
            return Err(LexError::UnterminatedRegion {
                line: self.line,
                span: Span::new(open, self.source.len()),
            });
        };
        let close = open + 1 + offset;
        let raw = &source[open + 1..close];
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let start = open + 1 + (raw.len() - raw.trim_start().len());
            self.push_at(TokenKind::Params, Span::new(start, start + trimmed.len()));
        }
        self.push_at(TokenKind::RParen, Span::new(close, close + 1));
        self.advance_to(close + 1);
        Ok(())
    }
}

/// Whether the `(` at `open` is a grouping rather than part of a host atom
fn is_group(pieces: &[(CondToken, Span)], open: usize) -> bool {
    let mut depth = 0usize;
    for (i, (tok, _)) in pieces.iter().enumerate().skip(open) {
        match tok {
            CondToken::LParen | CondToken::AndCall | CondToken::OrCall => depth += 1,
            CondToken::RParen => {
                depth -= 1;
                if depth == 0 {
                    return pieces.get(i + 1).map_or(true, |(t, _)| t.closes_operand());
                }
            }
            _ => {}
        }
    }
    false
}

/// Recognise a structural keyword at the start of `text`
///
/// Returns the token kind and the byte length of the keyword text; `else if`
/// is a single `Elif`.
fn structural_keyword(text: &str) -> Option<(TokenKind, usize)> {
    if let Some(rest) = text.strip_prefix('@') {
        let name = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        let opens = rest[name..].trim_start().starts_with('(');
        return (name > 0 && opens).then_some((TokenKind::Action, 1 + name));
    }
    let word = text.bytes().take_while(u8::is_ascii_alphabetic).count();
    let after = &text[word..];
    let next = after.trim_start();
    let opens = next.starts_with('(');
    match &text[..word] {
        "if" if opens => Some((TokenKind::If, word)),
        "elif" if opens => Some((TokenKind::Elif, word)),
        "while" if opens => Some((TokenKind::While, word)),
        "for" if opens => Some((TokenKind::For, word)),
        "else" => {
            let gap = after.len() - next.len();
            if let Some(tail) = next.strip_prefix("if") {
                if gap > 0 && tail.trim_start().starts_with('(') {
                    return Some((TokenKind::Elif, word + gap + 2));
                }
            }
            (next.is_empty() || next.starts_with('{')).then_some((TokenKind::Else, word))
        }
        _ => None,
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("lex")
            .tokens
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Eol)
            .collect()
    }

    fn texts(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .expect("lex")
            .tokens
            .iter()
            .filter(|t| !matches!(t.kind, TokenKind::Eol | TokenKind::Eof))
            .map(|t| (t.kind, t.text(source).to_string()))
            .collect()
    }

    #[test]
    fn test_line_classification() {
        let source = "say hi\nlet n = 3;\n# comment\n// note\nprint(n)\nfunction demo:main";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Command,
                TokenKind::Host,
                TokenKind::Host,
                TokenKind::Command,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_terminator_wins_over_vocabulary() {
        assert_eq!(kinds("say hi;"), vec![TokenKind::Host, TokenKind::Eof]);
    }

    #[test]
    fn test_header_bindings() {
        let lexed = tokenize(";;import;lib;util\n;;export;shared;cfg\n\nsay hi").expect("lex");
        assert_eq!(lexed.header.imports.len(), 1);
        assert_eq!(lexed.header.imports[0].target, "lib");
        assert_eq!(lexed.header.imports[0].name, "util");
        assert_eq!(lexed.header.exports[0].name, "cfg");
        assert_eq!(lexed.header.exports[0].line, 2);
        assert_eq!(lexed.tokens[0].line, 4);
    }

    #[test]
    fn test_misplaced_directive() {
        let err = tokenize("say hi\n;;import;lib;util").unwrap_err();
        assert!(matches!(err, LexError::MisplacedDirective { line: 2, .. }));
    }

    #[test]
    fn test_invalid_directive() {
        let err = tokenize(";;import;lib").unwrap_err();
        assert!(matches!(err, LexError::InvalidDirective { line: 1, .. }));
        assert!(tokenize(";;share;lib;x").is_err());
    }

    #[test]
    fn test_host_block_spans_lines() {
        let source = "fn greet(n) {\n  if n > 1 { print(n); }\n}\nsay done";
        let tokens = texts(source);
        assert_eq!(tokens[0].0, TokenKind::Host);
        assert_eq!(tokens[0].1, "fn greet(n) {\n  if n > 1 { print(n); }\n}");
        assert_eq!(tokens[1], (TokenKind::Command, "say done".to_string()));
    }

    #[test]
    fn test_if_else_chain() {
        let source = "if (\"A\") {\n  say a\n} else if (n > 1) {\n  say b\n} else {\n  say c\n}";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::If,
                TokenKind::LParen,
                TokenKind::NativeAtom,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Command,
                TokenKind::RBrace,
                TokenKind::Elif,
                TokenKind::LParen,
                TokenKind::HostAtom,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Command,
                TokenKind::RBrace,
                TokenKind::Else,
                TokenKind::LBrace,
                TokenKind::Command,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_inline_bodies() {
        let source = "if (\"A\") { say 1 } else { say 2 }";
        let tokens = texts(source);
        assert_eq!(tokens[5], (TokenKind::Command, "say 1".to_string()));
        assert_eq!(tokens[6].0, TokenKind::RBrace);
        assert_eq!(tokens[9], (TokenKind::Command, "say 2".to_string()));
        assert_eq!(tokens[10].0, TokenKind::RBrace);
    }

    #[test]
    fn test_nested_inline_structure() {
        let source = "while (\"A\") { if (x) { say 1 } }";
        let count = kinds(source)
            .iter()
            .filter(|k| **k == TokenKind::RBrace)
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_condition_atoms() {
        let source = "if (\"block ~ ~ ~ stone\" && a != 1) {\n}";
        let tokens = texts(source);
        assert_eq!(tokens[2], (TokenKind::NativeAtom, "\"block ~ ~ ~ stone\"".to_string()));
        assert_eq!(tokens[3].0, TokenKind::AndAnd);
        assert_eq!(tokens[4], (TokenKind::HostAtom, "a != 1".to_string()));
    }

    #[test]
    fn test_quoted_host_comparison() {
        let source = "if (\"a\" == name) {\n}";
        let tokens = texts(source);
        assert_eq!(tokens[2], (TokenKind::HostAtom, "\"a\" == name".to_string()));
    }

    #[test]
    fn test_groups_and_calls() {
        let source = "if (!(\"A\" || \"B\").and(f(x) > 2)) {\n}";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::If,
                TokenKind::LParen,
                TokenKind::Bang,
                TokenKind::LParen,
                TokenKind::NativeAtom,
                TokenKind::OrOr,
                TokenKind::NativeAtom,
                TokenKind::RParen,
                TokenKind::AndCall,
                TokenKind::HostAtom,
                TokenKind::RParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_call_parens_stay_in_host_atom() {
        let source = "if (len(xs) > 0 && \"A\") {\n}";
        let tokens = texts(source);
        assert_eq!(tokens[2], (TokenKind::HostAtom, "len(xs) > 0".to_string()));
        assert_eq!(tokens[4].0, TokenKind::NativeAtom);
    }

    #[test]
    fn test_multiline_condition() {
        let source = "if (\"A\" &&\n    \"B\") {\n  say 1\n}";
        let lexed = tokenize(source).expect("lex");
        let atoms: Vec<usize> = lexed
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::NativeAtom)
            .map(|t| t.line)
            .collect();
        assert_eq!(atoms, vec![1, 2]);
        let say = lexed.tokens.iter().find(|t| t.kind == TokenKind::Command);
        assert_eq!(say.map(|t| t.line), Some(3));
    }

    #[test]
    fn test_for_and_action_params() {
        let tokens = texts("for (i in 0..3) {\n}\n@execute(as @a) {\n}");
        assert_eq!(tokens[0].0, TokenKind::For);
        assert_eq!(tokens[2], (TokenKind::Params, "i in 0..3".to_string()));
        assert_eq!(tokens[6], (TokenKind::Action, "@execute".to_string()));
        assert_eq!(tokens[8], (TokenKind::Params, "as @a".to_string()));
    }

    #[test]
    fn test_missing_operand_is_lexed() {
        assert_eq!(
            kinds("if (\"A\" &&) {\n}")[2..5],
            [TokenKind::NativeAtom, TokenKind::AndAnd, TokenKind::RParen]
        );
    }

    #[test]
    fn test_unterminated_literal() {
        let err = tokenize("say a\nif (\"A) {\n}").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedLiteral { line: 2, .. }));
    }

    #[test]
    fn test_unterminated_region() {
        let err = tokenize("for (i in 0..3 {\n}").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedRegion { line: 1, .. }));
    }

    #[test]
    fn test_keyword_prefixes_are_not_structural() {
        assert_eq!(structural_keyword("iffy(1)"), None);
        assert_eq!(structural_keyword("elsewhere"), None);
        assert_eq!(structural_keyword("else if (x)"), Some((TokenKind::Elif, 7)));
        assert_eq!(structural_keyword("@repeat (3)"), Some((TokenKind::Action, 7)));
    }
}
