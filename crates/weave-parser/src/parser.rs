//! Recursive descent parser implementation

use weave_ast::*;
use weave_lexer::{Token, TokenKind};

use crate::condition::{split, CondExpr};
use crate::ParseError;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    /// Set when a condition operator lacks an operand
    missing_operand: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            missing_operand: false,
        }
    }

    // === Utilities ===

    fn current(&self) -> Token {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .cloned()
            .unwrap_or_else(|| Token {
                kind: TokenKind::Eof,
                span: Span::new(self.source.len(), self.source.len()),
                line: line_of(self.source, self.source.len()),
            })
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        ParseError::unexpected(expected, token.kind, token.span, token.line)
    }

    fn text(&self, token: &Token) -> &'a str {
        token.text(self.source)
    }

    fn skip_eols(&mut self) {
        while self.at(TokenKind::Eol) {
            self.advance();
        }
    }

    /// Span of the most recently consumed token
    fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(Span::dummy(), |t| t.span)
    }

    // === Program ===

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        self.skip_eols();
        while !self.at(TokenKind::Eof) {
            body.push(self.parse_statement()?);
            self.skip_eols();
        }
        let span = match (body.first(), body.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => Span::dummy(),
        };
        Ok(Program { body, span })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let open = self.consume(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        self.skip_eols();
        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Eof) {
                return Err(self.unexpected("'}'"));
            }
            statements.push(self.parse_statement()?);
            self.skip_eols();
        }
        let close = self.consume(TokenKind::RBrace)?;
        Ok(Block {
            statements,
            span: open.span.merge(close.span),
        })
    }

    // === Statements ===

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let token = self.current();
        let kind = match token.kind {
            TokenKind::Command => {
                self.advance();
                StatementKind::Command(self.text(&token).to_string())
            }
            TokenKind::Host => {
                self.advance();
                StatementKind::HostCode(self.text(&token).to_string())
            }
            TokenKind::If => return self.parse_if(),
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Action => self.parse_action()?,
            TokenKind::Else | TokenKind::Elif => {
                return Err(ParseError::UnmatchedElse {
                    span: token.span,
                    line: token.line,
                })
            }
            _ => return Err(self.unexpected("statement")),
        };
        Ok(Statement {
            kind,
            span: token.span.merge(self.previous_span()),
            line: token.line,
        })
    }

    /// `if`/`elif` with its alternate chain folded into nested ifs
    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.advance();
        let condition = self.parse_condition()?;
        let consequent = self.parse_block()?;

        let checkpoint = self.pos;
        self.skip_eols();
        let alternate = match self.peek() {
            TokenKind::Else => {
                self.advance();
                Some(self.parse_block()?)
            }
            TokenKind::Elif => {
                let nested = self.parse_if()?;
                Some(Block {
                    span: nested.span,
                    statements: vec![nested],
                })
            }
            _ => {
                self.pos = checkpoint;
                None
            }
        };

        Ok(Statement {
            kind: StatementKind::If {
                condition,
                consequent,
                alternate,
            },
            span: keyword.span.merge(self.previous_span()),
            line: keyword.line,
        })
    }

    fn parse_while(&mut self) -> Result<StatementKind, ParseError> {
        self.consume(TokenKind::While)?;
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;
        Ok(StatementKind::While { condition, body })
    }

    fn parse_for(&mut self) -> Result<StatementKind, ParseError> {
        self.consume(TokenKind::For)?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(StatementKind::For { params, body })
    }

    fn parse_action(&mut self) -> Result<StatementKind, ParseError> {
        let token = self.consume(TokenKind::Action)?;
        let name = self.text(&token).trim_start_matches('@').to_string();
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(StatementKind::Action { name, params, body })
    }

    fn parse_params(&mut self) -> Result<String, ParseError> {
        self.consume(TokenKind::LParen)?;
        let params = if self.at(TokenKind::Params) {
            let token = self.advance();
            self.text(&token).to_string()
        } else {
            String::new()
        };
        self.consume(TokenKind::RParen)?;
        Ok(params)
    }

    // === Conditions ===

    fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        let open = self.consume(TokenKind::LParen)?;
        self.missing_operand = false;
        let expr = if self.at(TokenKind::RParen) {
            CondExpr::Missing
        } else {
            self.parse_or()?
        };
        let close = self.consume(TokenKind::RParen)?;
        let span = open.span.merge(close.span);

        let parts = split(expr).ok_or(ParseError::MixedCondition {
            span,
            line: open.line,
        })?;
        Ok(Condition {
            native: parts.native,
            host: parts.host,
            combinator: parts.combinator,
            missing_operand: self.missing_operand,
            span,
        })
    }

    fn parse_or(&mut self) -> Result<CondExpr, ParseError> {
        let mut left = self.parse_and()?;
        while self.at(TokenKind::OrOr) {
            self.advance();
            let right = self.parse_and()?;
            left = CondExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<CondExpr, ParseError> {
        let mut left = self.parse_unary()?;
        while self.at(TokenKind::AndAnd) {
            self.advance();
            let right = self.parse_unary()?;
            left = CondExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<CondExpr, ParseError> {
        if self.at(TokenKind::Bang) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(CondExpr::Not(Box::new(inner)));
        }
        self.parse_postfix()
    }

    /// `<expr>.and(host)` / `<expr>.or(host)`
    fn parse_postfix(&mut self) -> Result<CondExpr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            let is_and = match self.peek() {
                TokenKind::AndCall => true,
                TokenKind::OrCall => false,
                _ => return Ok(expr),
            };
            self.advance();
            let argument = if self.at(TokenKind::HostAtom) {
                let token = self.advance();
                CondExpr::Host(self.text(&token).to_string())
            } else {
                self.missing_operand = true;
                CondExpr::Missing
            };
            self.consume(TokenKind::RParen)?;
            expr = if is_and {
                CondExpr::And(Box::new(expr), Box::new(argument))
            } else {
                CondExpr::Or(Box::new(expr), Box::new(argument))
            };
        }
    }

    fn parse_primary(&mut self) -> Result<CondExpr, ParseError> {
        match self.peek() {
            TokenKind::NativeAtom => {
                let token = self.advance();
                Ok(CondExpr::Native(self.text(&token).to_string()))
            }
            TokenKind::HostAtom => {
                let token = self.advance();
                Ok(CondExpr::Host(self.text(&token).to_string()))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = if self.at(TokenKind::RParen) {
                    self.missing_operand = true;
                    CondExpr::Missing
                } else {
                    self.parse_or()?
                };
                self.consume(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::AndAnd | TokenKind::OrOr | TokenKind::RParen => {
                self.missing_operand = true;
                Ok(CondExpr::Missing)
            }
            _ => Err(self.unexpected("condition operand")),
        }
    }
}
