//! Pascal-S parser
//!
//! This module turns the token stream into a concrete parse tree:
//! - [`parse`]: Parser struct, cursor helpers and [`SyntaxError`]
//! - [`declarations`], [`statements`], [`expressions`]: grammar rules
//! - [`tree`]: parse-tree node definitions
//! - [`printer`]: token walk and indented trace
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent with one token of lookahead. The tree is
//! lossless: keywords, punctuation and operators stay attached to the nodes
//! that consumed them, and empty statements are kept as explicit nodes.

pub mod declarations;
pub mod expressions;
pub mod parse;
pub mod printer;
pub mod statements;
pub mod tree;

pub use parse::{Parser, SyntaxError};
pub use printer::{Child, TreeNode, TreePrinter};
pub use tree::*;
