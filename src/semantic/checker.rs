//! Scope and type checker
//!
//! Walks the parse tree top-down, declarations before statements, and fills
//! the [`SymbolTable`]:
//!
//! 1. The program name goes into the global block as a procedure.
//! 2. Constants, types, variables, then subprograms are registered in
//!    source order. Each subprogram gets its own block one level deeper,
//!    with parameters at addresses `0..psize` and locals after them.
//! 3. The compound statement of each block is walked in that block's scope
//!    to check that every name used is declared and used sensibly.
//!
//! Array bounds must be constant ordinal expressions: integer or char
//! literals, earlier integer or char constants, sign and `+ - * bagi mod`.
//! The first violation stops the walk.

use super::errors::SemanticError;
use super::symbol_table::{ArrayId, BaseType, BlockId, EntryId, ObjectKind, SymbolTable, GLOBAL_BLOCK};
use crate::lexer::classes::is_boolean_word;
use crate::lexer::{unquote, Token, TokenKind};
use crate::parser::tree::*;
use tracing::debug;

/// Storage units taken by a by-reference parameter.
const REFERENCE_SIZE: usize = 1;

/// A type reference after name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedType {
    pub typ: BaseType,
    /// Array table index for arrays, 0 otherwise.
    pub reference: usize,
    pub size: usize,
}

impl ResolvedType {
    fn base(typ: BaseType) -> Self {
        Self {
            typ,
            reference: 0,
            size: 1,
        }
    }
}

/// Value of a constant ordinal expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ordinal {
    value: i64,
    typ: BaseType,
}

/// Base type implied by a literal's spelling: integer, real, boolean word,
/// or a quoted literal holding exactly one character. All-digit text is an
/// integer whether or not its value fits.
pub fn infer_literal_type(text: &str) -> BaseType {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        BaseType::Ints
    } else if text.contains('.') && text.parse::<f64>().is_ok() {
        BaseType::Reals
    } else if is_boolean_word(text) {
        BaseType::Bools
    } else if text.len() >= 2
        && text.starts_with('\'')
        && text.ends_with('\'')
        && unquote(text).chars().count() == 1
    {
        BaseType::Chars
    } else {
        BaseType::NoType
    }
}

pub struct ScopeChecker<'t> {
    table: &'t mut SymbolTable,
    /// Functions whose bodies are being walked, innermost last.
    functions: Vec<EntryId>,
}

impl<'t> ScopeChecker<'t> {
    pub fn new(table: &'t mut SymbolTable) -> Self {
        Self {
            table,
            functions: Vec::new(),
        }
    }

    /// Check a whole program, leaving the table populated.
    pub fn check(&mut self, program: &Program) -> Result<(), SemanticError> {
        let name = &program.header.name.text;
        debug!("[Semantic] Declaring program '{}'", name);
        self.declare(name, ObjectKind::Procedure, BaseType::NoType, GLOBAL_BLOCK.index(), true, 0)?;

        self.check_block(&program.block, GLOBAL_BLOCK, 0)
    }

    /// Register a block's declarations, then walk its statements.
    /// `first_address` is where locals start (after any parameters).
    fn check_block(
        &mut self,
        block: &Block,
        block_id: BlockId,
        first_address: usize,
    ) -> Result<(), SemanticError> {
        let decls = &block.declarations;

        for section in &decls.constants {
            for decl in &section.declarations {
                self.check_const_declaration(decl)?;
            }
        }

        for section in &decls.types {
            for decl in &section.declarations {
                self.check_type_declaration(decl)?;
            }
        }

        let mut address = first_address;
        for section in &decls.variables {
            for decl in &section.declarations {
                address = self.check_variable_declaration(decl, address)?;
            }
        }
        self.table.set_block_vars(block_id, address)?;

        for sub in &decls.subprograms {
            self.check_subprogram(sub)?;
        }

        self.check_compound(&block.body)
    }

    fn check_const_declaration(&mut self, decl: &ConstDeclaration) -> Result<(), SemanticError> {
        let name = &decl.name.text;
        debug!("[Semantic] Declaring constant '{}'", name);

        let negative = decl.value.sign.as_ref().is_some_and(|s| s.text == "-");
        let (typ, value) = self.constant_value(&decl.value.value, negative)?;

        self.declare(name, ObjectKind::Constant, typ, 0, true, value)?;
        Ok(())
    }

    /// Type and stored value of a constant: the ordinal value for integers,
    /// chars and booleans, 0 otherwise.
    fn constant_value(&mut self, token: &Token, negative: bool) -> Result<(BaseType, i64), SemanticError> {
        let out_of_range = || SemanticError::IntegerOutOfRange {
            text: token.text.clone(),
        };

        if token.kind == TokenKind::Identifier && !is_boolean_word(&token.text) {
            let entry = self.resolve(&token.text)?;
            let entry = self.table.tab(entry)?;
            if entry.kind != ObjectKind::Constant {
                return Err(SemanticError::NotAConstant {
                    name: token.text.clone(),
                });
            }
            let value = if entry.typ == BaseType::Ints && negative {
                entry.address.checked_neg().ok_or_else(out_of_range)?
            } else {
                entry.address
            };
            return Ok((entry.typ, value));
        }

        let typ = infer_literal_type(&token.text);
        let value = match typ {
            BaseType::Ints => {
                let value = token.text.parse::<i64>().map_err(|_| out_of_range())?;
                if negative {
                    -value
                } else {
                    value
                }
            }
            BaseType::Chars => unquote(&token.text).chars().next().map_or(0, |c| c as i64),
            BaseType::Bools => i64::from(
                token.text.eq_ignore_ascii_case("benar") || token.text.eq_ignore_ascii_case("true"),
            ),
            _ => 0,
        };
        Ok((typ, value))
    }

    fn check_type_declaration(&mut self, decl: &TypeDeclaration) -> Result<(), SemanticError> {
        let name = &decl.name.text;
        debug!("[Semantic] Declaring type '{}'", name);

        if self.table.lookup_current_scope(name).is_some() {
            return Err(duplicate(ObjectKind::Type, name));
        }
        let resolved = self.resolve_type(&decl.type_ref)?;
        self.declare(name, ObjectKind::Type, resolved.typ, resolved.reference, true, 0)?;
        Ok(())
    }

    /// Register each name at consecutive addresses; returns the next free one.
    fn check_variable_declaration(
        &mut self,
        decl: &VariableDeclaration,
        mut address: usize,
    ) -> Result<usize, SemanticError> {
        let resolved = self.resolve_type(&decl.type_ref)?;

        for name in decl.names.names() {
            debug!("[Semantic] Declaring variable '{}' at address {}", name, address);
            self.declare(
                name,
                ObjectKind::Variable,
                resolved.typ,
                resolved.reference,
                true,
                stored_address(name, address)?,
            )?;
            address = next_address(name, address, resolved.size)?;
        }

        Ok(address)
    }

    /// Create the subprogram's block, register it in the enclosing scope,
    /// then check parameters and body one level deeper.
    fn check_subprogram(&mut self, sub: &Subprogram) -> Result<(), SemanticError> {
        let name = &sub.name().text;
        let (kind, result) = match sub {
            Subprogram::Procedure(_) => (ObjectKind::Procedure, ResolvedType::base(BaseType::NoType)),
            Subprogram::Function(f) => (ObjectKind::Function, self.resolve_type(&f.return_type)?),
        };
        debug!("[Semantic] Declaring {} '{}'", kind, name);

        if self.table.lookup_current_scope(name).is_some() {
            return Err(duplicate(kind, name));
        }
        let block = self.table.enter_block();
        let entry = self.declare(name, kind, result.typ, block.index(), true, 0)?;

        self.table.push_block_scope(block);
        let outcome = self.check_subprogram_scope(sub, kind, entry, block);
        self.table.pop_scope();
        outcome
    }

    fn check_subprogram_scope(
        &mut self,
        sub: &Subprogram,
        kind: ObjectKind,
        entry: EntryId,
        block: BlockId,
    ) -> Result<(), SemanticError> {
        let mut address = 0;
        let mut lastpar = EntryId::NONE;

        for group in sub.parameters().map(|p| p.groups.as_slice()).unwrap_or(&[]) {
            let resolved = self.resolve_type(&group.type_ref)?;
            let by_value = !group.is_by_reference();
            let size = if by_value { resolved.size } else { REFERENCE_SIZE };

            for name in group.names.names() {
                debug!("[Semantic] Declaring parameter '{}' at address {}", name, address);
                lastpar = self.declare(
                    name,
                    ObjectKind::Variable,
                    resolved.typ,
                    resolved.reference,
                    by_value,
                    stored_address(name, address)?,
                )?;
                address = next_address(name, address, size)?;
            }
        }
        self.table.set_block_params(block, lastpar, address)?;

        if kind == ObjectKind::Function {
            self.functions.push(entry);
        }
        let outcome = self.check_block(sub.block(), block, address);
        if kind == ObjectKind::Function {
            self.functions.pop();
        }
        outcome
    }

    /// Resolve a type reference, creating array table rows as needed.
    pub fn resolve_type(&mut self, type_ref: &TypeRef) -> Result<ResolvedType, SemanticError> {
        match type_ref {
            TypeRef::Simple(token) => Ok(ResolvedType::base(simple_type(&token.text))),
            TypeRef::Named(token) => {
                let Some(id) = self.table.lookup(&token.text) else {
                    return Err(SemanticError::UnknownType {
                        name: token.text.clone(),
                    });
                };
                let entry = self.table.tab(id)?;
                if entry.kind != ObjectKind::Type {
                    return Err(SemanticError::NotAType {
                        name: token.text.clone(),
                    });
                }
                let size = if entry.typ == BaseType::Arrays {
                    self.table.atab(ArrayId(entry.reference))?.size
                } else {
                    1
                };
                Ok(ResolvedType {
                    typ: entry.typ,
                    reference: entry.reference,
                    size,
                })
            }
            TypeRef::Array(array) => {
                let (low, high) = self.evaluate_range(&array.index)?;
                let element = self.resolve_type(&array.element)?;
                let id = self.table.enter_array(
                    low.typ,
                    element.typ,
                    element.reference,
                    low.value,
                    high.value,
                    element.size,
                )?;
                let size = self.table.atab(id)?.size;
                debug!(array = %id, low = low.value, high = high.value, size, "array type entered");
                Ok(ResolvedType {
                    typ: BaseType::Arrays,
                    reference: id.index(),
                    size,
                })
            }
            TypeRef::Range(range) => {
                let (low, _) = self.evaluate_range(range)?;
                Ok(ResolvedType::base(low.typ))
            }
        }
    }

    fn evaluate_range(&mut self, range: &Range) -> Result<(Ordinal, Ordinal), SemanticError> {
        let low = self.evaluate_simple(&range.low)?;
        let high = self.evaluate_simple(&range.high)?;

        if low.typ != high.typ {
            return Err(SemanticError::NonConstantBound);
        }
        if low.value > high.value {
            return Err(SemanticError::EmptyRange {
                low: low.value,
                high: high.value,
            });
        }
        Ok((low, high))
    }

    fn evaluate_simple(&mut self, expr: &SimpleExpression) -> Result<Ordinal, SemanticError> {
        let mut acc = self.evaluate_term(&expr.first)?;
        if let Some(sign) = &expr.sign {
            acc = apply(&sign.text, Ordinal { value: 0, typ: BaseType::Ints }, acc)?;
        }
        for (op, term) in &expr.rest {
            let rhs = self.evaluate_term(term)?;
            acc = apply(&op.text, acc, rhs)?;
        }
        Ok(acc)
    }

    fn evaluate_term(&mut self, term: &Term) -> Result<Ordinal, SemanticError> {
        let mut acc = self.evaluate_factor(&term.first)?;
        for (op, factor) in &term.rest {
            let rhs = self.evaluate_factor(factor)?;
            acc = apply(&op.text, acc, rhs)?;
        }
        Ok(acc)
    }

    fn evaluate_factor(&mut self, factor: &Factor) -> Result<Ordinal, SemanticError> {
        match factor {
            Factor::Literal(Literal {
                token,
                kind: LiteralKind::Integer,
            }) => token
                .text
                .parse::<i64>()
                .map(|value| Ordinal {
                    value,
                    typ: BaseType::Ints,
                })
                .map_err(|_| SemanticError::IntegerOutOfRange {
                    text: token.text.clone(),
                }),
            Factor::Literal(Literal {
                token,
                kind: LiteralKind::Char,
            }) => {
                let ch = unquote(&token.text)
                    .chars()
                    .next()
                    .ok_or(SemanticError::NonConstantBound)?;
                Ok(Ordinal {
                    value: ch as i64,
                    typ: BaseType::Chars,
                })
            }
            Factor::Variable(VariableAccess { name, index: None }) => {
                let id = self.resolve(&name.text)?;
                let entry = self.table.tab(id)?;
                if entry.kind == ObjectKind::Constant
                    && matches!(entry.typ, BaseType::Ints | BaseType::Chars)
                {
                    Ok(Ordinal {
                        value: entry.address,
                        typ: entry.typ,
                    })
                } else {
                    Err(SemanticError::NonConstantBound)
                }
            }
            Factor::Parenthesized { inner, .. } if inner.relation.is_none() => {
                self.evaluate_simple(&inner.left)
            }
            _ => Err(SemanticError::NonConstantBound),
        }
    }

    // ===== Statements =====

    fn check_compound(&mut self, compound: &CompoundStatement) -> Result<(), SemanticError> {
        self.check_statements(&compound.statements)
    }

    fn check_statements(&mut self, list: &StatementList) -> Result<(), SemanticError> {
        for stmt in &list.statements {
            self.check_statement(stmt)?;
        }
        Ok(())
    }

    fn check_statement(&mut self, stmt: &Statement) -> Result<(), SemanticError> {
        match stmt {
            Statement::Compound(compound) => self.check_compound(compound),
            Statement::Assignment(assign) => {
                let id = self.resolve(&assign.target.name.text)?;
                let kind = self.table.tab(id)?.kind;
                let own_function = kind == ObjectKind::Function && self.functions.contains(&id);
                if kind != ObjectKind::Variable && !own_function {
                    return Err(SemanticError::NotAssignable {
                        name: assign.target.name.text.clone(),
                    });
                }
                if let Some(suffix) = &assign.target.index {
                    self.check_expression(&suffix.index)?;
                }
                self.check_expression(&assign.value)
            }
            Statement::If(stmt) => {
                self.check_expression(&stmt.condition)?;
                self.check_statement(&stmt.then_branch)?;
                match &stmt.else_clause {
                    Some(else_clause) => self.check_statement(&else_clause.body),
                    None => Ok(()),
                }
            }
            Statement::While(stmt) => {
                self.check_expression(&stmt.condition)?;
                self.check_statement(&stmt.body)
            }
            Statement::For(stmt) => {
                let id = self.resolve(&stmt.variable.text)?;
                if self.table.tab(id)?.kind != ObjectKind::Variable {
                    return Err(SemanticError::NotAssignable {
                        name: stmt.variable.text.clone(),
                    });
                }
                self.check_expression(&stmt.start)?;
                self.check_expression(&stmt.end)?;
                self.check_statement(&stmt.body)
            }
            Statement::Repeat(stmt) => {
                self.check_statements(&stmt.body)?;
                self.check_expression(&stmt.condition)
            }
            Statement::Call(call) => self.check_call(call),
            Statement::Empty => Ok(()),
        }
    }

    fn check_call(&mut self, call: &Call) -> Result<(), SemanticError> {
        let id = self.resolve(&call.name.text)?;
        let kind = self.table.tab(id)?.kind;
        if !matches!(kind, ObjectKind::Procedure | ObjectKind::Function) {
            return Err(SemanticError::NotCallable {
                name: call.name.text.clone(),
            });
        }
        if let Some(args) = &call.arguments {
            for arg in &args.arguments {
                self.check_expression(arg)?;
            }
        }
        Ok(())
    }

    fn check_expression(&mut self, expr: &Expression) -> Result<(), SemanticError> {
        self.check_simple(&expr.left)?;
        if let Some(relation) = &expr.relation {
            self.check_simple(&relation.right)?;
        }
        Ok(())
    }

    fn check_simple(&mut self, expr: &SimpleExpression) -> Result<(), SemanticError> {
        self.check_term(&expr.first)?;
        for (_, term) in &expr.rest {
            self.check_term(term)?;
        }
        Ok(())
    }

    fn check_term(&mut self, term: &Term) -> Result<(), SemanticError> {
        self.check_factor(&term.first)?;
        for (_, factor) in &term.rest {
            self.check_factor(factor)?;
        }
        Ok(())
    }

    fn check_factor(&mut self, factor: &Factor) -> Result<(), SemanticError> {
        match factor {
            Factor::Not { operand, .. } => self.check_factor(operand),
            Factor::Parenthesized { inner, .. } => self.check_expression(inner),
            Factor::Literal(_) => Ok(()),
            Factor::Variable(access) => {
                self.resolve(&access.name.text)?;
                match &access.index {
                    Some(suffix) => self.check_expression(&suffix.index),
                    None => Ok(()),
                }
            }
            Factor::Call(call) => self.check_call(call),
        }
    }

    // ===== Helpers =====

    fn resolve(&mut self, name: &str) -> Result<EntryId, SemanticError> {
        self.table.lookup(name).ok_or_else(|| SemanticError::Undeclared {
            name: name.to_string(),
        })
    }

    /// Insert into the current block, reporting a clash as a duplicate of `kind`.
    fn declare(
        &mut self,
        name: &str,
        kind: ObjectKind,
        typ: BaseType,
        reference: usize,
        normal: bool,
        address: i64,
    ) -> Result<EntryId, SemanticError> {
        if self.table.lookup_current_scope(name).is_some() {
            return Err(duplicate(kind, name));
        }
        Ok(self.table.insert(name, kind, typ, reference, normal, address)?)
    }
}

fn duplicate(kind: ObjectKind, name: &str) -> SemanticError {
    SemanticError::Duplicate {
        kind,
        name: name.to_string(),
    }
}

fn storage_overflow(name: &str) -> SemanticError {
    SemanticError::StorageOverflow {
        name: name.to_string(),
    }
}

/// Address as stored in a `tab` row.
fn stored_address(name: &str, address: usize) -> Result<i64, SemanticError> {
    i64::try_from(address).map_err(|_| storage_overflow(name))
}

/// First address after an object of `size` units placed at `address`.
fn next_address(name: &str, address: usize, size: usize) -> Result<usize, SemanticError> {
    address.checked_add(size).ok_or_else(|| storage_overflow(name))
}

fn simple_type(word: &str) -> BaseType {
    match word.to_ascii_lowercase().as_str() {
        "integer" => BaseType::Ints,
        "real" => BaseType::Reals,
        "boolean" => BaseType::Bools,
        "char" => BaseType::Chars,
        _ => BaseType::NoType,
    }
}

/// Fold one integer operator. Chars only pass through unchanged.
fn apply(op: &str, lhs: Ordinal, rhs: Ordinal) -> Result<Ordinal, SemanticError> {
    if lhs.typ != BaseType::Ints || rhs.typ != BaseType::Ints {
        return Err(SemanticError::NonConstantBound);
    }
    let (a, b) = (lhs.value, rhs.value);
    let value = match op.to_ascii_lowercase().as_str() {
        "+" => a.checked_add(b),
        "-" => a.checked_sub(b),
        "*" => a.checked_mul(b),
        "bagi" => a.checked_div(b),
        "mod" => a.checked_rem(b),
        _ => None,
    };
    value
        .map(|value| Ordinal {
            value,
            typ: BaseType::Ints,
        })
        .ok_or(SemanticError::NonConstantBound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Dfa;
    use crate::semantic::errors::SymbolTableError;
    use crate::semantic::symbol_table::TabEntry;
    use crate::parser::Parser;

    fn check(source: &str) -> Result<SymbolTable, SemanticError> {
        let program = Parser::from_source(source, &Dfa::pascal_s())
            .unwrap()
            .parse_program()
            .unwrap();
        let mut table = SymbolTable::new();
        ScopeChecker::new(&mut table).check(&program)?;
        Ok(table)
    }

    fn entry<'a>(table: &'a SymbolTable, name: &str) -> &'a TabEntry {
        (1..table.tab_len())
            .map(|i| table.tab(EntryId(i)).unwrap())
            .find(|e| e.name == name)
            .unwrap_or_else(|| panic!("no entry named {name}"))
    }

    #[test]
    fn test_infer_literal_type() {
        assert_eq!(infer_literal_type("42"), BaseType::Ints);
        assert_eq!(infer_literal_type("3.14"), BaseType::Reals);
        assert_eq!(infer_literal_type("salah"), BaseType::Bools);
        assert_eq!(infer_literal_type("'x'"), BaseType::Chars);
        assert_eq!(infer_literal_type("''''"), BaseType::Chars);
        assert_eq!(infer_literal_type("'xy'"), BaseType::NoType);
        assert_eq!(infer_literal_type("99999999999999999999"), BaseType::Ints);
    }

    #[test]
    fn test_integer_constant_out_of_range() {
        let err = check("program P; konstanta C = 99999999999999999999; mulai selesai.").unwrap_err();
        assert_eq!(
            err,
            SemanticError::IntegerOutOfRange {
                text: "99999999999999999999".into()
            }
        );

        let table = check(
            "program P; konstanta Maks = 9223372036854775807; Min = -Maks; mulai selesai.",
        )
        .unwrap();
        assert_eq!(entry(&table, "Maks").address, i64::MAX);
        assert_eq!(entry(&table, "Min").address, -i64::MAX);
    }

    #[test]
    fn test_storage_overflow_is_an_error() {
        let err = check(
            "program P; variabel v: larik[1..9000000000000000000] dari larik[1..10] dari integer; mulai selesai.",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::Table(SymbolTableError::ArrayTooLarge { .. })
        ));

        let err = check(
            "program P; tipe Besar = larik[1..9000000000000000000] dari integer;
             variabel x, y, z: Besar; mulai selesai.",
        )
        .unwrap_err();
        assert_eq!(err, SemanticError::StorageOverflow { name: "z".into() });
    }

    #[test]
    fn test_constants_store_values() {
        let table = check(
            "program P; konstanta N = 10; M = -N; C = 'a'; B = benar; R = 2.5; mulai selesai.",
        )
        .unwrap();

        let n = entry(&table, "N");
        assert_eq!((n.kind, n.typ, n.address), (ObjectKind::Constant, BaseType::Ints, 10));
        assert_eq!(entry(&table, "M").address, -10);
        assert_eq!(entry(&table, "C").typ, BaseType::Chars);
        assert_eq!(entry(&table, "C").address, 97);
        assert_eq!(entry(&table, "B").address, 1);
        assert_eq!(entry(&table, "R").typ, BaseType::Reals);
        assert_eq!(entry(&table, "R").address, 0);
    }

    #[test]
    fn test_array_bounds_are_evaluated() {
        let table = check(
            "program P;
             konstanta N = 5;
             tipe Vek = larik[1..N * 2] dari integer;
             variabel v: Vek; h: larik['a'..'c'] dari real; i: integer;
             mulai selesai.",
        )
        .unwrap();

        let vek = entry(&table, "Vek");
        assert_eq!(vek.typ, BaseType::Arrays);
        let atab = table.atab(ArrayId(vek.reference)).unwrap();
        assert_eq!((atab.low, atab.high, atab.size), (1, 10, 10));

        let h = entry(&table, "h");
        let atab = table.atab(ArrayId(h.reference)).unwrap();
        assert_eq!(atab.index_type, BaseType::Chars);
        assert_eq!(atab.size, 3);

        assert_eq!(entry(&table, "v").address, 0);
        assert_eq!(entry(&table, "h").address, 10);
        assert_eq!(entry(&table, "i").address, 13);
        assert_eq!(table.btab(GLOBAL_BLOCK).unwrap().vsize, 14);
    }

    #[test]
    fn test_bad_bounds() {
        let err = check("program P; variabel v: larik[1..'c'] dari integer; mulai selesai.").unwrap_err();
        assert_eq!(err, SemanticError::NonConstantBound);

        let err = check("program P; variabel v: larik[10..1] dari integer; mulai selesai.").unwrap_err();
        assert_eq!(err, SemanticError::EmptyRange { low: 10, high: 1 });

        let err = check(
            "program P; variabel n: integer; v: larik[1..n] dari integer; mulai selesai.",
        )
        .unwrap_err();
        assert_eq!(err, SemanticError::NonConstantBound);
    }

    #[test]
    fn test_parameters_precede_locals() {
        let table = check(
            "program P;
             prosedur p(a: integer; variabel b: real);
             variabel t: integer;
             mulai t := a selesai;
             mulai selesai.",
        )
        .unwrap();

        let p = entry(&table, "p");
        let block = BlockId(p.reference);
        let a = entry(&table, "a");
        let b = entry(&table, "b");
        let t = entry(&table, "t");

        assert_eq!((a.address, a.level, a.normal), (0, 1, true));
        assert_eq!((b.address, b.normal), (1, false));
        assert_eq!(t.address, 2);

        let btab = table.btab(block).unwrap();
        assert_eq!(btab.psize, 2);
        assert_eq!(btab.vsize, 3);
        assert_eq!(table.tab(btab.lastpar).unwrap().name, "b");
        assert_eq!(table.level(), 0);
    }

    #[test]
    fn test_unknown_and_non_type_names() {
        assert_eq!(
            check("program P; variabel x: Tidakada; mulai selesai.").unwrap_err(),
            SemanticError::UnknownType {
                name: "Tidakada".into()
            }
        );
        assert_eq!(
            check("program P; variabel x: integer; y: x; mulai selesai.").unwrap_err(),
            SemanticError::NotAType { name: "x".into() }
        );
    }

    #[test]
    fn test_statement_checks() {
        assert_eq!(
            check("program P; mulai y := 1 selesai.").unwrap_err(),
            SemanticError::Undeclared { name: "y".into() }
        );
        assert_eq!(
            check("program P; konstanta K = 1; mulai K := 2 selesai.").unwrap_err(),
            SemanticError::NotAssignable { name: "K".into() }
        );
        assert_eq!(
            check("program P; variabel x: integer; mulai x(1) selesai.").unwrap_err(),
            SemanticError::NotCallable { name: "x".into() }
        );
        assert!(check("program P; variabel x: integer; mulai writeln(x); read(x) selesai.").is_ok());
    }

    #[test]
    fn test_function_may_assign_own_name() {
        let ok = check(
            "program P;
             fungsi dua: integer;
             mulai dua := 2 selesai;
             mulai selesai.",
        );
        assert!(ok.is_ok());

        let err = check(
            "program P;
             fungsi dua: integer;
             mulai dua := 2 selesai;
             mulai dua := 3 selesai.",
        )
        .unwrap_err();
        assert_eq!(err, SemanticError::NotAssignable { name: "dua".into() });
    }

    #[test]
    fn test_duplicate_subprogram() {
        let err = check(
            "program P;
             variabel hitung: integer;
             prosedur hitung; mulai selesai;
             mulai selesai.",
        )
        .unwrap_err();
        assert_eq!(
            err,
            SemanticError::Duplicate {
                kind: ObjectKind::Procedure,
                name: "hitung".into()
            }
        );
    }
}
