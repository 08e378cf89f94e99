//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, the [`SyntaxError`] type and
//! the cursor helpers every grammar rule is built on.
//!
//! # Parser Architecture
//!
//! Recursive descent with one token of lookahead plus a one-token peek for
//! the few places that need it (assignment vs. call, range vs. named type):
//! - This module: Parser struct, helper methods, and the program entry point
//! - `declarations`: program header, declaration part, types, subprograms
//! - `statements`: compound, assignment, `jika`, `selama`, `untuk`, `ulangi`, calls
//! - `expressions`: relational, additive and multiplicative levels, factors
//!
//! Parser methods are split across those files using `impl Parser` blocks.
//! The first grammar violation aborts parsing; there is no resynchronization.

use crate::lexer::{Dfa, LexError, Lexer, Token, TokenKind};
use crate::parser::tree::Program;
use thiserror::Error;
use tracing::debug;

/// First grammar violation in a token stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Syntax error at line {line}, column {column}: expected {expected}, found {found} (near: {context})")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub expected: String,
    /// `KIND(lexeme)` of the offending token, or `end of input`.
    pub found: String,
    /// Up to two tokens each side of the offending one.
    pub context: String,
}

/// Recursive descent parser for Pascal-S
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
}

impl Parser {
    /// Comment tokens in `tokens` are skipped wherever the cursor moves.
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut parser = Self {
            tokens,
            position: 0,
        };
        parser.skip_comments();
        parser
    }

    /// Lex `source` with `dfa` and wrap the tokens.
    pub fn from_source(source: &str, dfa: &Dfa) -> Result<Self, LexError> {
        let tokens = Lexer::new(source, dfa).tokenize()?;
        Ok(Self::new(tokens))
    }

    /// Parse a whole program: `program name ; block .` and nothing after.
    pub fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let header = self.parse_program_header()?;
        let block = self.parse_block()?;
        let dot = self.expect(&TokenKind::Dot, "'.' at end of program")?;

        if !self.is_at_end() {
            return Err(self.error("end of input after final '.'"));
        }

        debug!(program = %header.name.text, "parsed program");
        Ok(Program { header, block, dot })
    }

    // ===== Helper methods =====

    pub(crate) fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// The `n`th significant token from the cursor (0 is the current one).
    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens[self.position.min(self.tokens.len())..]
            .iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .nth(n)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek().is_some_and(|t| &t.kind == kind)
    }

    pub(crate) fn check_token(&self, kind: &TokenKind, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is(kind, text))
    }

    pub(crate) fn check_keyword(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(word))
    }

    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
            self.skip_comments();
        }
        token
    }

    pub(crate) fn match_keyword(&mut self, word: &str) -> Option<Token> {
        if self.check_keyword(word) {
            self.advance()
        } else {
            None
        }
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind, text: &str) -> Option<Token> {
        if self.check_token(kind, text) {
            self.advance()
        } else {
            None
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            self.consume(expected)
        } else {
            Err(self.error(expected))
        }
    }

    pub(crate) fn expect_keyword(&mut self, word: &str) -> Result<Token, SyntaxError> {
        match self.match_keyword(word) {
            Some(token) => Ok(token),
            None => Err(self.error(format!("'{word}'"))),
        }
    }

    pub(crate) fn expect_identifier(&mut self, ctx: &str) -> Result<Token, SyntaxError> {
        self.expect(&TokenKind::Identifier, &format!("identifier {ctx}"))
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<Token, SyntaxError> {
        self.expect(&TokenKind::Semicolon, &format!("';' {ctx}"))
    }

    /// Take the current token, which the caller has already checked.
    pub(crate) fn consume(&mut self, expected: &str) -> Result<Token, SyntaxError> {
        self.advance().ok_or_else(|| self.error(expected))
    }

    /// Build an error describing the token under the cursor.
    pub(crate) fn error(&self, expected: impl Into<String>) -> SyntaxError {
        let (line, column, found) = match self.peek() {
            Some(token) => (token.line, token.column, token.to_string()),
            None => {
                let (line, column) = self.end_position();
                (line, column, "end of input".to_string())
            }
        };

        let from = self.position.saturating_sub(2);
        let to = (self.position + 3).min(self.tokens.len());
        let context = self.tokens[from.min(to)..to]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        SyntaxError {
            line,
            column,
            expected: expected.into(),
            found,
            context,
        }
    }

    fn end_position(&self) -> (usize, usize) {
        match self.tokens.last() {
            Some(last) => (last.line, last.column + last.text.chars().count()),
            None => (1, 1),
        }
    }

    fn skip_comments(&mut self) {
        while self.check(&TokenKind::Comment) {
            self.position += 1;
        }
    }
}
