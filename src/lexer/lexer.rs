//! DFA-driven lexer for Pascal-S source
//!
//! Each token is found by walking the [`Dfa`] from its start state for as
//! long as some transition applies, remembering the last accepting state
//! seen. The cursor is then rolled back to that checkpoint and the lexeme is
//! re-consumed, so line and column bookkeeping never reflects the overshoot.
//!
//! Whitespace and comments (`{ ... }`, `(* ... *)`) are skipped between
//! tokens. Unterminated comments and characters that start no token are
//! recorded as diagnostics and scanning carries on; [`Lexer::tokenize`]
//! reports all of them together.

use super::classes::{self, ANY, ANY_NON_QUOTE, IDENT_CONTINUE};
use super::dfa::{Dfa, StateId};
use super::token::{Span, Token, TokenKind};
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Which comment delimiter pair was left open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `{ ... }`
    Brace,
    /// `(* ... *)`
    ParenStar,
}

impl fmt::Display for CommentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentStyle::Brace => f.write_str("{ ... }"),
            CommentStyle::ParenStar => f.write_str("(* ... *)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexDiagnosticKind {
    #[error("unterminated {style} comment")]
    UnterminatedComment { style: CommentStyle },

    #[error("illegal character '{0}'")]
    IllegalCharacter(char),
}

/// One recorded lexical problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexDiagnostic {
    pub kind: LexDiagnosticKind,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LexDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.column, self.kind)
    }
}

/// Every diagnostic from one scan, reported together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_diagnostics(.diagnostics))]
pub struct LexError {
    pub diagnostics: Vec<LexDiagnostic>,
}

fn render_diagnostics(diagnostics: &[LexDiagnostic]) -> String {
    let mut out = format!("{} lexical error(s)", diagnostics.len());
    for diag in diagnostics {
        out.push_str("\n  ");
        out.push_str(&diag.to_string());
    }
    out
}

/// Tokens plus whatever diagnostics were collected along the way.
#[derive(Debug, Clone, Default)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<LexDiagnostic>,
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    position: usize,
    line: usize,
    column: usize,
}

pub struct Lexer<'a> {
    dfa: &'a Dfa,
    source: &'a str,
    input: Vec<char>,
    /// Byte offset of every char, plus one trailing entry for the end.
    offsets: Vec<usize>,
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, dfa: &'a Dfa) -> Self {
        let mut input = Vec::with_capacity(source.len());
        let mut offsets = Vec::with_capacity(source.len() + 1);
        for (offset, ch) in source.char_indices() {
            input.push(ch);
            offsets.push(offset);
        }
        offsets.push(source.len());

        Self {
            dfa,
            source,
            input,
            offsets,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scan the whole input, returning diagnostics as data.
    pub fn scan(mut self) -> LexOutput {
        let mut out = LexOutput::default();

        loop {
            self.skip_whitespace_and_comments(&mut out.diagnostics);
            if self.is_at_end() {
                break;
            }

            match self.next_token() {
                Some(token) => {
                    trace!(line = token.line, column = token.column, "{}", token);
                    out.tokens.push(token);
                }
                None => {
                    let (line, column) = (self.line, self.column);
                    if let Some(bad) = self.advance() {
                        out.diagnostics.push(LexDiagnostic {
                            kind: LexDiagnosticKind::IllegalCharacter(bad),
                            line,
                            column,
                        });
                    }
                }
            }
        }

        fuse_hyphenated_keywords(&mut out.tokens, self.source);
        debug!(
            tokens = out.tokens.len(),
            diagnostics = out.diagnostics.len(),
            "scan finished"
        );
        out
    }

    /// Scan the whole input, failing if anything was recorded.
    pub fn tokenize(self) -> Result<Vec<Token>, LexError> {
        let out = self.scan();
        if out.diagnostics.is_empty() {
            Ok(out.tokens)
        } else {
            Err(LexError {
                diagnostics: out.diagnostics,
            })
        }
    }

    /// Longest-match scan of one token. Leaves the cursor untouched and
    /// returns `None` when no accepting state is reachable.
    fn next_token(&mut self) -> Option<Token> {
        let start = self.cursor();
        let quoted = self.peek() == Some('\'');
        let mut state = self.dfa.start();
        let mut last_accepting: Option<(StateId, usize)> = None;

        while let Some(ch) = self.peek() {
            let Some(next) = self.transition(state, ch, quoted) else {
                break;
            };
            self.advance();
            state = next;
            if self.dfa.is_accepting(state) {
                last_accepting = Some((state, self.position));
            }
        }

        self.restore(start);
        let (final_state, end) = last_accepting?;
        while self.position < end {
            self.advance();
        }

        let span = Span::new(self.offsets[start.position], self.offsets[end]);
        let text = &self.source[span.start..span.end];
        let kind = classify_lexeme(self.dfa.state_name(final_state), text);
        Some(Token::new(kind, text, start.line, start.column, span))
    }

    /// Resolve one step, trying exact character, class labels, the
    /// identifier fallback, the wildcard, then (inside quotes) the
    /// non-quote wildcard.
    fn transition(&self, state: StateId, ch: char, quoted: bool) -> Option<StateId> {
        let mut buf = [0u8; 4];
        if let Some(next) = self.dfa.next_state(state, ch.encode_utf8(&mut buf)) {
            return Some(next);
        }
        for label in classes::classify(ch).iter() {
            if let Some(next) = self.dfa.next_state(state, label) {
                return Some(next);
            }
        }
        if classes::is_ident_continue(ch) {
            if let Some(next) = self.dfa.next_state(state, IDENT_CONTINUE) {
                return Some(next);
            }
        }
        if let Some(next) = self.dfa.next_state(state, ANY) {
            return Some(next);
        }
        if quoted && ch != '\'' && ch != '\n' {
            return self.dfa.next_state(state, ANY_NON_QUOTE);
        }
        None
    }

    fn skip_whitespace_and_comments(&mut self, diagnostics: &mut Vec<LexDiagnostic>) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('{') => self.skip_comment(CommentStyle::Brace, diagnostics),
                Some('(') if self.peek_ahead(1) == Some('*') => {
                    self.skip_comment(CommentStyle::ParenStar, diagnostics)
                }
                _ => break,
            }
        }
    }

    /// Skip one comment. If it never closes, record a diagnostic and resume
    /// right after the opening delimiter.
    fn skip_comment(&mut self, style: CommentStyle, diagnostics: &mut Vec<LexDiagnostic>) {
        let open = self.cursor();
        let opener_len = match style {
            CommentStyle::Brace => 1,
            CommentStyle::ParenStar => 2,
        };
        for _ in 0..opener_len {
            self.advance();
        }
        let after_open = self.cursor();

        while let Some(ch) = self.advance() {
            match style {
                CommentStyle::Brace if ch == '}' => return,
                CommentStyle::ParenStar if ch == '*' && self.peek() == Some(')') => {
                    self.advance();
                    return;
                }
                _ => {}
            }
        }

        debug!(line = open.line, column = open.column, "unterminated {} comment", style);
        diagnostics.push(LexDiagnostic {
            kind: LexDiagnosticKind::UnterminatedComment { style },
            line: open.line,
            column: open.column,
        });
        self.restore(after_open);
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn cursor(&self) -> Cursor {
        Cursor {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    fn restore(&mut self, cursor: Cursor) {
        self.position = cursor.position;
        self.line = cursor.line;
        self.column = cursor.column;
    }
}

/// Map an accepting state and its lexeme to a token kind, then retag
/// identifiers that are reserved words.
pub fn classify_lexeme(state: &str, text: &str) -> TokenKind {
    let kind = match (state, text) {
        ("NUM_INT" | "NUM_REAL", _) => TokenKind::Number,
        (_, ":=") => TokenKind::AssignOperator,
        (_, "..") => TokenKind::RangeOperator,
        ("STR", _) => {
            if unquote(text).chars().count() == 1 {
                TokenKind::CharLiteral
            } else {
                TokenKind::StringLiteral
            }
        }
        ("CHR", _) => TokenKind::CharLiteral,
        (_, ";") => TokenKind::Semicolon,
        (_, ",") => TokenKind::Comma,
        (_, ":") => TokenKind::Colon,
        (_, ".") => TokenKind::Dot,
        (_, "(") => TokenKind::LParenthesis,
        (_, ")") => TokenKind::RParenthesis,
        (_, "[") => TokenKind::LBracket,
        (_, "]") => TokenKind::RBracket,
        (_, "+" | "-" | "*" | "/") => TokenKind::ArithmeticOperator,
        (_, "=" | "<>" | "<" | "<=" | ">" | ">=") => TokenKind::RelationalOperator,
        ("ID", _) => TokenKind::Identifier,
        (other, _) => TokenKind::Other(other.to_string()),
    };

    if kind == TokenKind::Identifier {
        retag_word(text)
    } else {
        kind
    }
}

fn retag_word(text: &str) -> TokenKind {
    let lowered = text.to_ascii_lowercase();
    if classes::is_keyword(&lowered) {
        TokenKind::Keyword
    } else if classes::is_logical_word(&lowered) {
        TokenKind::LogicalOperator
    } else if classes::is_arithmetic_word(&lowered) {
        TokenKind::ArithmeticOperator
    } else {
        TokenKind::Identifier
    }
}

/// Content of a quoted literal with the outer quotes removed and `''`
/// collapsed to `'`.
pub fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text);
    inner.replace("''", "'")
}

/// Merge `word - word` runs with no gaps into one keyword token when the
/// joined text is reserved (`selain-itu`, `turun-ke`).
fn fuse_hyphenated_keywords(tokens: &mut Vec<Token>, source: &str) {
    let is_word = |t: &Token| matches!(t.kind, TokenKind::Identifier | TokenKind::Keyword);

    let mut i = 0;
    while i + 2 < tokens.len() {
        let (left, dash, right) = (&tokens[i], &tokens[i + 1], &tokens[i + 2]);
        let adjacent = left.span.end == dash.span.start && dash.span.end == right.span.start;

        if adjacent && is_word(left) && dash.text == "-" && is_word(right) {
            let span = Span::new(left.span.start, right.span.end);
            let text = &source[span.start..span.end];
            if classes::is_keyword(&text.to_ascii_lowercase()) {
                let fused = Token::new(TokenKind::Keyword, text, left.line, left.column, span);
                trace!("fused {}", fused);
                tokens[i] = fused;
                tokens.remove(i + 1);
                tokens.remove(i + 1);
            }
        }
        i += 1;
    }
}
