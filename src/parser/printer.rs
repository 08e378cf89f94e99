//! Generic traversal of the parse tree
//!
//! [`TreeNode`] exposes each node's label and its ordered children (nested
//! nodes and retained terminal tokens). Two consumers are built on it:
//! [`Program::tokens`], which flattens the tree back into its token stream,
//! and [`TreePrinter`], which renders an indented trace.

use crate::lexer::Token;
use crate::parser::tree::*;
use std::fmt::Write as _;

/// One child of a parse-tree node.
pub enum Child<'a> {
    Token(&'a Token),
    Node(&'a dyn TreeNode),
}

pub trait TreeNode {
    fn label(&self) -> &'static str;
    fn children(&self) -> Vec<Child<'_>>;
}

fn token(t: &Token) -> Child<'_> {
    Child::Token(t)
}

fn node(n: &dyn TreeNode) -> Child<'_> {
    Child::Node(n)
}

/// Interleave `items` with their separators: item, sep, item, ...
fn separated<'a, T: TreeNode>(items: &'a [T], separators: &'a [Token]) -> Vec<Child<'a>> {
    let mut out = Vec::with_capacity(items.len() + separators.len());
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            if let Some(sep) = separators.get(i - 1) {
                out.push(token(sep));
            }
        }
        out.push(node(item));
    }
    out
}

impl TreeNode for Program {
    fn label(&self) -> &'static str {
        "program"
    }
    fn children(&self) -> Vec<Child<'_>> {
        vec![node(&self.header), node(&self.block), token(&self.dot)]
    }
}

impl TreeNode for ProgramHeader {
    fn label(&self) -> &'static str {
        "program_header"
    }
    fn children(&self) -> Vec<Child<'_>> {
        vec![
            token(&self.program_keyword),
            token(&self.name),
            token(&self.semicolon),
        ]
    }
}

impl TreeNode for Block {
    fn label(&self) -> &'static str {
        "block"
    }
    fn children(&self) -> Vec<Child<'_>> {
        vec![node(&self.declarations), node(&self.body)]
    }
}

impl TreeNode for DeclarationPart {
    fn label(&self) -> &'static str {
        "declaration_part"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out: Vec<Child<'_>> = Vec::new();
        out.extend(self.constants.iter().map(|s| node(s)));
        out.extend(self.types.iter().map(|s| node(s)));
        out.extend(self.variables.iter().map(|s| node(s)));
        out.extend(self.subprograms.iter().map(|s| node(s)));
        out
    }
}

impl TreeNode for ConstSection {
    fn label(&self) -> &'static str {
        "const_section"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out = vec![token(&self.keyword)];
        out.extend(self.declarations.iter().map(|d| node(d)));
        out
    }
}

impl TreeNode for ConstDeclaration {
    fn label(&self) -> &'static str {
        "const_declaration"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out = vec![token(&self.name), token(&self.equals)];
        out.extend(self.value.sign.iter().map(token));
        out.push(token(&self.value.value));
        out.push(token(&self.semicolon));
        out
    }
}

impl TreeNode for TypeSection {
    fn label(&self) -> &'static str {
        "type_section"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out = vec![token(&self.keyword)];
        out.extend(self.declarations.iter().map(|d| node(d)));
        out
    }
}

impl TreeNode for TypeDeclaration {
    fn label(&self) -> &'static str {
        "type_declaration"
    }
    fn children(&self) -> Vec<Child<'_>> {
        vec![
            token(&self.name),
            token(&self.equals),
            node(&self.type_ref),
            token(&self.semicolon),
        ]
    }
}

impl TreeNode for VarSection {
    fn label(&self) -> &'static str {
        "var_section"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out = vec![token(&self.keyword)];
        out.extend(self.declarations.iter().map(|d| node(d)));
        out
    }
}

impl TreeNode for VariableDeclaration {
    fn label(&self) -> &'static str {
        "variable_declaration"
    }
    fn children(&self) -> Vec<Child<'_>> {
        vec![
            node(&self.names),
            token(&self.colon),
            node(&self.type_ref),
            token(&self.semicolon),
        ]
    }
}

impl TreeNode for IdentifierList {
    fn label(&self) -> &'static str {
        "identifier_list"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out = Vec::new();
        for (i, ident) in self.identifiers.iter().enumerate() {
            if i > 0 {
                if let Some(comma) = self.commas.get(i - 1) {
                    out.push(token(comma));
                }
            }
            out.push(token(ident));
        }
        out
    }
}

impl TreeNode for TypeRef {
    fn label(&self) -> &'static str {
        match self {
            TypeRef::Simple(_) => "simple_type",
            TypeRef::Named(_) => "named_type",
            TypeRef::Array(_) => "array_type",
            TypeRef::Range(_) => "range_type",
        }
    }
    fn children(&self) -> Vec<Child<'_>> {
        match self {
            TypeRef::Simple(t) | TypeRef::Named(t) => vec![token(t)],
            TypeRef::Array(array) => vec![
                token(&array.keyword),
                token(&array.lbracket),
                node(&array.index),
                token(&array.rbracket),
                token(&array.of_keyword),
                node(&array.element),
            ],
            TypeRef::Range(range) => range.children(),
        }
    }
}

impl TreeNode for Range {
    fn label(&self) -> &'static str {
        "range"
    }
    fn children(&self) -> Vec<Child<'_>> {
        vec![
            node(&self.low),
            token(&self.range_operator),
            node(&self.high),
        ]
    }
}

impl TreeNode for Subprogram {
    fn label(&self) -> &'static str {
        match self {
            Subprogram::Procedure(_) => "procedure_declaration",
            Subprogram::Function(_) => "function_declaration",
        }
    }
    fn children(&self) -> Vec<Child<'_>> {
        match self {
            Subprogram::Procedure(p) => {
                let mut out = vec![token(&p.keyword), token(&p.name)];
                out.extend(p.parameters.iter().map(|params| node(params)));
                out.push(token(&p.semicolon));
                out.push(node(&p.block));
                out.push(token(&p.end_semicolon));
                out
            }
            Subprogram::Function(f) => {
                let mut out = vec![token(&f.keyword), token(&f.name)];
                out.extend(f.parameters.iter().map(|params| node(params)));
                out.push(token(&f.colon));
                out.push(node(&f.return_type));
                out.push(token(&f.semicolon));
                out.push(node(&f.block));
                out.push(token(&f.end_semicolon));
                out
            }
        }
    }
}

impl TreeNode for FormalParameterList {
    fn label(&self) -> &'static str {
        "formal_parameter_list"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out = vec![token(&self.lparen)];
        out.extend(separated(&self.groups, &self.separators));
        out.push(token(&self.rparen));
        out
    }
}

impl TreeNode for ParameterGroup {
    fn label(&self) -> &'static str {
        "parameter_group"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out: Vec<Child<'_>> = self.var_keyword.iter().map(token).collect();
        out.push(node(&self.names));
        out.push(token(&self.colon));
        out.push(node(&self.type_ref));
        out
    }
}

impl TreeNode for CompoundStatement {
    fn label(&self) -> &'static str {
        "compound_statement"
    }
    fn children(&self) -> Vec<Child<'_>> {
        vec![token(&self.begin), node(&self.statements), token(&self.end)]
    }
}

impl TreeNode for StatementList {
    fn label(&self) -> &'static str {
        "statement_list"
    }
    fn children(&self) -> Vec<Child<'_>> {
        separated(&self.statements, &self.separators)
    }
}

impl TreeNode for Statement {
    fn label(&self) -> &'static str {
        match self {
            Statement::Compound(_) => "compound_statement",
            Statement::Assignment(_) => "assignment_statement",
            Statement::If(_) => "if_statement",
            Statement::While(_) => "while_statement",
            Statement::For(_) => "for_statement",
            Statement::Repeat(_) => "repeat_statement",
            Statement::Call(_) => "procedure_call",
            Statement::Empty => "empty_statement",
        }
    }
    fn children(&self) -> Vec<Child<'_>> {
        match self {
            Statement::Compound(c) => c.children(),
            Statement::Assignment(a) => {
                vec![node(&a.target), token(&a.assign), node(&a.value)]
            }
            Statement::If(s) => {
                let mut out = vec![
                    token(&s.if_keyword),
                    node(&s.condition),
                    token(&s.then_keyword),
                    node(s.then_branch.as_ref()),
                ];
                if let Some(else_clause) = &s.else_clause {
                    out.push(token(&else_clause.else_keyword));
                    out.push(node(else_clause.body.as_ref()));
                }
                out
            }
            Statement::While(s) => vec![
                token(&s.while_keyword),
                node(&s.condition),
                token(&s.do_keyword),
                node(s.body.as_ref()),
            ],
            Statement::For(s) => vec![
                token(&s.for_keyword),
                token(&s.variable),
                token(&s.assign),
                node(&s.start),
                token(&s.direction),
                node(&s.end),
                token(&s.do_keyword),
                node(s.body.as_ref()),
            ],
            Statement::Repeat(s) => vec![
                token(&s.repeat_keyword),
                node(&s.body),
                token(&s.until_keyword),
                node(&s.condition),
            ],
            Statement::Call(call) => call.children(),
            Statement::Empty => Vec::new(),
        }
    }
}

impl TreeNode for Call {
    fn label(&self) -> &'static str {
        "call"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out = vec![token(&self.name)];
        out.extend(self.arguments.iter().map(|args| node(args)));
        out
    }
}

impl TreeNode for ArgumentList {
    fn label(&self) -> &'static str {
        "argument_list"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out = vec![token(&self.lparen)];
        out.extend(separated(&self.arguments, &self.commas));
        out.push(token(&self.rparen));
        out
    }
}

impl TreeNode for VariableAccess {
    fn label(&self) -> &'static str {
        "variable"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out = vec![token(&self.name)];
        if let Some(suffix) = &self.index {
            out.push(token(&suffix.lbracket));
            out.push(node(suffix.index.as_ref()));
            out.push(token(&suffix.rbracket));
        }
        out
    }
}

impl TreeNode for Expression {
    fn label(&self) -> &'static str {
        "expression"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out = vec![node(&self.left)];
        if let Some(relation) = &self.relation {
            out.push(token(&relation.operator));
            out.push(node(&relation.right));
        }
        out
    }
}

impl TreeNode for SimpleExpression {
    fn label(&self) -> &'static str {
        "simple_expression"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out: Vec<Child<'_>> = self.sign.iter().map(token).collect();
        out.push(node(&self.first));
        for (op, term) in &self.rest {
            out.push(token(op));
            out.push(node(term));
        }
        out
    }
}

impl TreeNode for Term {
    fn label(&self) -> &'static str {
        "term"
    }
    fn children(&self) -> Vec<Child<'_>> {
        let mut out = vec![node(&self.first)];
        for (op, factor) in &self.rest {
            out.push(token(op));
            out.push(node(factor));
        }
        out
    }
}

impl TreeNode for Factor {
    fn label(&self) -> &'static str {
        match self {
            Factor::Not { .. } => "not_factor",
            Factor::Parenthesized { .. } => "parenthesized",
            Factor::Literal(_) => "literal",
            Factor::Variable(_) => "variable",
            Factor::Call(_) => "function_call",
        }
    }
    fn children(&self) -> Vec<Child<'_>> {
        match self {
            Factor::Not { operator, operand } => vec![token(operator), node(operand.as_ref())],
            Factor::Parenthesized {
                lparen,
                inner,
                rparen,
            } => vec![token(lparen), node(inner.as_ref()), token(rparen)],
            Factor::Literal(lit) => vec![token(&lit.token)],
            Factor::Variable(access) => access.children(),
            Factor::Call(call) => call.children(),
        }
    }
}

fn collect_tokens<'a>(n: &'a dyn TreeNode, out: &mut Vec<&'a Token>) {
    for child in n.children() {
        match child {
            Child::Token(t) => out.push(t),
            Child::Node(inner) => collect_tokens(inner, out),
        }
    }
}

impl Program {
    /// Every retained terminal, in source order.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        collect_tokens(self, &mut out);
        out
    }
}

/// Indented `<label>` / `KIND(lexeme)` trace of a tree.
pub struct TreePrinter {
    indent: usize,
}

impl Default for TreePrinter {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl TreePrinter {
    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }

    pub fn print(&self, root: &dyn TreeNode) -> String {
        let mut out = String::new();
        self.write_node(root, 0, &mut out);
        out
    }

    fn write_node(&self, n: &dyn TreeNode, depth: usize, out: &mut String) {
        let pad = " ".repeat(depth * self.indent);
        let _ = writeln!(out, "{pad}<{}>", n.label());
        for child in n.children() {
            match child {
                Child::Token(t) => {
                    let _ = writeln!(out, "{pad}{}{}", " ".repeat(self.indent), t);
                }
                Child::Node(inner) => self.write_node(inner, depth + 1, out),
            }
        }
    }
}
