//! Token definitions shared by the lexer and the parser.

use std::fmt;

/// Byte range of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Token kinds produced by the lexer.
///
/// The kind is decided in two passes: first from the accepting DFA state
/// (or, for punctuation, the exact lexeme), then by a reserved-word lookup
/// for identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Number,
    StringLiteral,
    CharLiteral,
    AssignOperator,
    RangeOperator,
    ArithmeticOperator,
    RelationalOperator,
    LogicalOperator,
    Semicolon,
    Comma,
    Colon,
    Dot,
    LParenthesis,
    RParenthesis,
    LBracket,
    RBracket,
    Comment,
    /// Accepting state of an external DFA with no known mapping; carries the state name.
    Other(String),
}

impl TokenKind {
    /// Upper-case tag used in the `KIND(lexeme)` textual form.
    pub fn tag(&self) -> &str {
        match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::CharLiteral => "CHAR_LITERAL",
            TokenKind::AssignOperator => "ASSIGN_OPERATOR",
            TokenKind::RangeOperator => "RANGE_OPERATOR",
            TokenKind::ArithmeticOperator => "ARITHMETIC_OPERATOR",
            TokenKind::RelationalOperator => "RELATIONAL_OPERATOR",
            TokenKind::LogicalOperator => "LOGICAL_OPERATOR",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::Dot => "DOT",
            TokenKind::LParenthesis => "LPARENTHESIS",
            TokenKind::RParenthesis => "RPARENTHESIS",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Comment => "COMMENT",
            TokenKind::Other(state) => state,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A lexeme with its kind and the position where it starts.
///
/// Line and column are 1-based; the column counts characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
            span,
        }
    }

    /// True when this is a keyword whose text matches `word` case-insensitively.
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(word)
    }

    /// True when the token has the given kind and exact (case-insensitive) text.
    pub fn is(&self, kind: &TokenKind, text: &str) -> bool {
        &self.kind == kind && self.text.eq_ignore_ascii_case(text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_form() {
        let tok = Token::new(TokenKind::Keyword, "mulai", 2, 1, Span::new(12, 17));
        assert_eq!(tok.to_string(), "KEYWORD(mulai)");

        let other = Token::new(TokenKind::Other("HASH".into()), "#", 1, 1, Span::new(0, 1));
        assert_eq!(other.to_string(), "HASH(#)");
    }

    #[test]
    fn test_keyword_match_ignores_case() {
        let tok = Token::new(TokenKind::Keyword, "MULAI", 1, 1, Span::new(0, 5));
        assert!(tok.is_keyword("mulai"));
        assert!(!tok.is_keyword("selesai"));

        let ident = Token::new(TokenKind::Identifier, "mulai", 1, 1, Span::new(0, 5));
        assert!(!ident.is_keyword("mulai"));
    }
}
