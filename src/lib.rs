//! # Introduction
//!
//! A front end for Pascal-S with Indonesian reserved words. Source text is
//! scanned by a table-driven automaton, parsed into a lossless concrete
//! tree, and checked against a block-structured symbol table.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer (DFA) → Tokens → Parser → Parse tree → Checker → Symbol table
//! ```
//!
//! 1. [`lexer`]: maximal-munch scanning over a [`lexer::Dfa`] that is either
//!    built in or loaded from a text/JSON description. Comments and illegal
//!    characters are reported as diagnostics without stopping the scan.
//! 2. [`parser`]: recursive descent with one token of lookahead. Every
//!    terminal stays in the tree, so [`parser::Program::tokens`] reproduces
//!    the comment-free token stream.
//! 3. [`semantic`]: `tab`/`btab`/`atab` tables plus a display of active
//!    blocks, filled by [`semantic::ScopeChecker`].
//!
//! ## Example
//!
//! ```
//! use pascal_s::{compile, lexer::Dfa};
//!
//! let source = "program Hai; variabel x: integer; mulai x := 1 selesai.";
//! let (program, table) = compile(source, &Dfa::pascal_s()).unwrap();
//! assert_eq!(program.name(), "Hai");
//! assert!(table.tab_len() > 2);
//! ```

pub mod lexer;
pub mod parser;
pub mod semantic;

use lexer::{Dfa, LexError, Lexer};
use parser::{Parser, Program, SyntaxError};
use semantic::{SemanticError, SymbolTable};
use thiserror::Error;

/// Failure of any pipeline stage.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("Semantic error: {0}")]
    Semantic(#[from] SemanticError),
}

/// Lex and parse `source`.
pub fn parse(source: &str, dfa: &Dfa) -> Result<Program, CompileError> {
    let tokens = Lexer::new(source, dfa).tokenize()?;
    let program = Parser::new(tokens).parse_program()?;
    Ok(program)
}

/// Run the whole pipeline and return the tree with its populated table.
pub fn compile(source: &str, dfa: &Dfa) -> Result<(Program, SymbolTable), CompileError> {
    let program = parse(source, dfa)?;
    let mut table = SymbolTable::new();
    semantic::check_program(&program, &mut table)?;
    Ok((program, table))
}
