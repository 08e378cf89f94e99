//! Semantic analysis for Pascal-S
//!
//! - [`symbol_table`]: the tab/btab/atab tables and the display of active blocks
//! - [`checker`]: declaration registration and scope checks over the parse tree
//! - [`errors`]: table and checker error types

pub mod checker;
pub mod errors;
pub mod symbol_table;

pub use checker::{infer_literal_type, ResolvedType, ScopeChecker};
pub use errors::{SemanticError, SymbolTableError};
pub use symbol_table::{
    ArrayEntry, ArrayId, BaseType, BlockEntry, BlockId, EntryId, ObjectKind, SymbolTable,
    TabEntry, BUILTIN_PROCEDURES, GLOBAL_BLOCK,
};

use crate::parser::Program;

/// Populate `table` from `program`, stopping at the first violation.
pub fn check_program(program: &Program, table: &mut SymbolTable) -> Result<(), SemanticError> {
    ScopeChecker::new(table).check(program)
}
