//! Error types for the symbol table and the scope/type checker

use super::symbol_table::ObjectKind;
use thiserror::Error;

/// Low-level table failure. The checker never lets one escape unwrapped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolTableError {
    #[error("identifier '{name}' already declared in current scope")]
    Duplicate { name: String },

    #[error("{table} index 0 is the reserved sentinel")]
    SentinelAccess { table: &'static str },

    #[error("{table} index {index} out of range (size {len})")]
    IndexOutOfRange {
        table: &'static str,
        index: usize,
        len: usize,
    },

    #[error("array {low}..{high} of elements sized {element_size} does not fit in storage")]
    ArrayTooLarge {
        low: i64,
        high: i64,
        element_size: usize,
    },
}

/// First violation found by the scope/type checker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("{kind} '{name}' is already declared in this scope")]
    Duplicate { kind: ObjectKind, name: String },

    #[error("unknown type '{name}'")]
    UnknownType { name: String },

    #[error("'{name}' is not a type")]
    NotAType { name: String },

    #[error("'{name}' is not a constant")]
    NotAConstant { name: String },

    #[error("undeclared identifier '{name}'")]
    Undeclared { name: String },

    #[error("cannot assign to '{name}'")]
    NotAssignable { name: String },

    #[error("'{name}' is not a procedure or function")]
    NotCallable { name: String },

    #[error("range bound is not a constant ordinal expression")]
    NonConstantBound,

    #[error("empty range {low}..{high}")]
    EmptyRange { low: i64, high: i64 },

    #[error("integer literal {text} is out of range")]
    IntegerOutOfRange { text: String },

    #[error("storage for '{name}' does not fit in the address space")]
    StorageOverflow { name: String },

    #[error("symbol table error: {0}")]
    Table(#[from] SymbolTableError),
}
