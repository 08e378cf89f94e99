//! Concrete parse tree for Pascal-S
//!
//! Every node owns its children and keeps the terminal tokens it consumed
//! (keywords, punctuation, operators), so diagnostics can point at exact
//! source positions and [`Program::tokens`] can rebuild the token stream.
//! Separators are stored next to the items they separate: a list of `n`
//! items has `n - 1` separators.

use crate::lexer::Token;

/// `program name; block .`
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub header: ProgramHeader,
    pub block: Block,
    pub dot: Token,
}

impl Program {
    pub fn name(&self) -> &str {
        &self.header.name.text
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramHeader {
    pub program_keyword: Token,
    pub name: Token,
    pub semicolon: Token,
}

/// Declarations followed by a compound statement. Used for the program body
/// and for every subprogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub declarations: DeclarationPart,
    pub body: CompoundStatement,
}

/// Declaration groups in their fixed order. Each group may repeat.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeclarationPart {
    pub constants: Vec<ConstSection>,
    pub types: Vec<TypeSection>,
    pub variables: Vec<VarSection>,
    pub subprograms: Vec<Subprogram>,
}

impl DeclarationPart {
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
            && self.types.is_empty()
            && self.variables.is_empty()
            && self.subprograms.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstSection {
    pub keyword: Token,
    pub declarations: Vec<ConstDeclaration>,
}

/// `name = value ;`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDeclaration {
    pub name: Token,
    pub equals: Token,
    pub value: ConstValue,
    pub semicolon: Token,
}

/// Optionally signed literal or constant name.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstValue {
    pub sign: Option<Token>,
    pub value: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSection {
    pub keyword: Token,
    pub declarations: Vec<TypeDeclaration>,
}

/// `name = type ;`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration {
    pub name: Token,
    pub equals: Token,
    pub type_ref: TypeRef,
    pub semicolon: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarSection {
    pub keyword: Token,
    pub declarations: Vec<VariableDeclaration>,
}

/// `a, b : type ;`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub names: IdentifierList,
    pub colon: Token,
    pub type_ref: TypeRef,
    pub semicolon: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierList {
    pub identifiers: Vec<Token>,
    pub commas: Vec<Token>,
}

impl IdentifierList {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(|t| t.text.as_str())
    }
}

/// Type reference in a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// `integer`, `real`, `boolean` or `char`
    Simple(Token),
    /// A previously declared type name
    Named(Token),
    Array(Box<ArrayType>),
    Range(Range),
}

/// `larik [ low .. high ] dari element`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub keyword: Token,
    pub lbracket: Token,
    pub index: Range,
    pub rbracket: Token,
    pub of_keyword: Token,
    pub element: TypeRef,
}

/// `low .. high`
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub low: SimpleExpression,
    pub range_operator: Token,
    pub high: SimpleExpression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Subprogram {
    Procedure(ProcedureDeclaration),
    Function(FunctionDeclaration),
}

impl Subprogram {
    pub fn name(&self) -> &Token {
        match self {
            Subprogram::Procedure(p) => &p.name,
            Subprogram::Function(f) => &f.name,
        }
    }

    pub fn parameters(&self) -> Option<&FormalParameterList> {
        match self {
            Subprogram::Procedure(p) => p.parameters.as_ref(),
            Subprogram::Function(f) => f.parameters.as_ref(),
        }
    }

    pub fn block(&self) -> &Block {
        match self {
            Subprogram::Procedure(p) => &p.block,
            Subprogram::Function(f) => &f.block,
        }
    }
}

/// `prosedur name (params)? ; block ;`
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureDeclaration {
    pub keyword: Token,
    pub name: Token,
    pub parameters: Option<FormalParameterList>,
    pub semicolon: Token,
    pub block: Block,
    pub end_semicolon: Token,
}

/// `fungsi name (params)? : type ; block ;`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub keyword: Token,
    pub name: Token,
    pub parameters: Option<FormalParameterList>,
    pub colon: Token,
    pub return_type: TypeRef,
    pub semicolon: Token,
    pub block: Block,
    pub end_semicolon: Token,
}

/// `( group ; group ... )`
#[derive(Debug, Clone, PartialEq)]
pub struct FormalParameterList {
    pub lparen: Token,
    pub groups: Vec<ParameterGroup>,
    pub separators: Vec<Token>,
    pub rparen: Token,
}

/// `variabel? a, b : type`
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGroup {
    pub var_keyword: Option<Token>,
    pub names: IdentifierList,
    pub colon: Token,
    pub type_ref: TypeRef,
}

impl ParameterGroup {
    /// By-reference parameters are prefixed with `variabel`.
    pub fn is_by_reference(&self) -> bool {
        self.var_keyword.is_some()
    }
}

/// `mulai statements selesai`
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundStatement {
    pub begin: Token,
    pub statements: StatementList,
    pub end: Token,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementList {
    pub statements: Vec<Statement>,
    pub separators: Vec<Token>,
}

impl StatementList {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Compound(CompoundStatement),
    Assignment(AssignmentStatement),
    If(IfStatement),
    While(WhileStatement),
    For(ForStatement),
    Repeat(RepeatStatement),
    Call(Call),
    /// Nothing between two separators, or before `selesai`/`sampai`.
    Empty,
}

/// `target := value`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStatement {
    pub target: VariableAccess,
    pub assign: Token,
    pub value: Expression,
}

/// `jika cond maka stmt (selain-itu stmt)?`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub if_keyword: Token,
    pub condition: Expression,
    pub then_keyword: Token,
    pub then_branch: Box<Statement>,
    pub else_clause: Option<ElseClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseClause {
    pub else_keyword: Token,
    pub body: Box<Statement>,
}

/// `selama cond lakukan stmt`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub while_keyword: Token,
    pub condition: Expression,
    pub do_keyword: Token,
    pub body: Box<Statement>,
}

/// `untuk v := start (ke | turun-ke) end lakukan stmt`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub for_keyword: Token,
    pub variable: Token,
    pub assign: Token,
    pub start: Expression,
    pub direction: Token,
    pub end: Expression,
    pub do_keyword: Token,
    pub body: Box<Statement>,
}

impl ForStatement {
    pub fn is_downward(&self) -> bool {
        self.direction.text.eq_ignore_ascii_case("turun-ke")
    }
}

/// `ulangi statements sampai cond`
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatStatement {
    pub repeat_keyword: Token,
    pub body: StatementList,
    pub until_keyword: Token,
    pub condition: Expression,
}

/// `name` or `name(args)`, as a statement or inside an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: Token,
    pub arguments: Option<ArgumentList>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentList {
    pub lparen: Token,
    pub arguments: Vec<Expression>,
    pub commas: Vec<Token>,
    pub rparen: Token,
}

/// `name` or `name[index]`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableAccess {
    pub name: Token,
    pub index: Option<IndexSuffix>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSuffix {
    pub lbracket: Token,
    pub index: Box<Expression>,
    pub rbracket: Token,
}

/// `simple (relop simple)?`
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub left: SimpleExpression,
    pub relation: Option<Relation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub operator: Token,
    pub right: SimpleExpression,
}

/// `sign? term (addop term)*`
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleExpression {
    pub sign: Option<Token>,
    pub first: Term,
    pub rest: Vec<(Token, Term)>,
}

/// `factor (mulop factor)*`
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub first: Factor,
    pub rest: Vec<(Token, Factor)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Factor {
    Not {
        operator: Token,
        operand: Box<Factor>,
    },
    Parenthesized {
        lparen: Token,
        inner: Box<Expression>,
        rparen: Token,
    },
    Literal(Literal),
    Variable(VariableAccess),
    Call(Call),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Real,
    Char,
    String,
    Boolean,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub token: Token,
    pub kind: LiteralKind,
}

impl Expression {
    /// The single factor when the expression has no operators at all.
    pub fn as_factor(&self) -> Option<&Factor> {
        if self.relation.is_some() {
            return None;
        }
        self.left.as_factor()
    }
}

impl SimpleExpression {
    pub fn as_factor(&self) -> Option<&Factor> {
        if self.sign.is_some() || !self.rest.is_empty() || !self.first.rest.is_empty() {
            return None;
        }
        Some(&self.first.first)
    }
}
