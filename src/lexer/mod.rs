//! Lexical analysis for Pascal-S
//!
//! This module contains:
//! - `classes`: character classes and reserved word tables
//! - `dfa`: the automaton and its text/JSON formats
//! - `token`: token kinds and positions
//! - `lexer`: the maximal-munch driver

pub mod classes;
pub mod dfa;
pub mod lexer;
pub mod token;

pub use dfa::{Dfa, DfaBuilder, DfaError, StateId};
pub use lexer::{
    classify_lexeme, unquote, CommentStyle, LexDiagnostic, LexDiagnosticKind, LexError,
    LexOutput, Lexer,
};
pub use token::{Span, Token, TokenKind};
