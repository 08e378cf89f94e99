// Integration tests for the recursive-descent parser

use pascal_s::lexer::{Dfa, Lexer, TokenKind};
use pascal_s::parser::*;
use pascal_s::{parse, CompileError};

fn parse_ok(source: &str) -> Program {
    parse(source, &Dfa::pascal_s()).expect("Parsing failed")
}

fn syntax_error(source: &str) -> SyntaxError {
    match parse(source, &Dfa::pascal_s()) {
        Err(CompileError::Syntax(e)) => e,
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

fn body(program: &Program) -> &[Statement] {
    &program.block.body.statements.statements
}

#[test]
fn test_minimal_program() {
    let program = parse_ok("program Hi;\nmulai\nselesai.");

    assert_eq!(program.name(), "Hi");
    assert!(program.block.declarations.is_empty());
    assert!(program.block.body.statements.is_empty());
    assert_eq!(program.dot.kind, TokenKind::Dot);
}

#[test]
fn test_if_else_with_assignments() {
    let program = parse_ok(
        "program P; variabel x: integer;
         mulai jika 1 < 2 maka x := 1 selain-itu x := 2 selesai.",
    );

    let Statement::If(stmt) = &body(&program)[0] else {
        panic!("Expected if statement");
    };
    let relation = stmt.condition.relation.as_ref().expect("Expected relation");
    assert_eq!(relation.operator.text, "<");

    match stmt.then_branch.as_ref() {
        Statement::Assignment(a) => assert_eq!(a.target.name.text, "x"),
        _ => panic!("Expected assignment in then branch"),
    }
    match &stmt.else_clause {
        Some(else_clause) => match else_clause.body.as_ref() {
            Statement::Assignment(a) => match a.value.as_factor() {
                Some(Factor::Literal(literal)) => assert_eq!(literal.token.text, "2"),
                _ => panic!("Expected literal value"),
            },
            _ => panic!("Expected assignment in else branch"),
        },
        None => panic!("Expected else clause"),
    }
}

#[test]
fn test_stray_semicolons_become_empty_statements() {
    let program = parse_ok("program P; mulai ; writeln; ; selesai.");
    let statements = body(&program);

    assert_eq!(statements.len(), 4);
    assert!(matches!(statements[0], Statement::Empty));
    assert!(matches!(statements[1], Statement::Call(_)));
    assert!(matches!(statements[2], Statement::Empty));
    assert!(matches!(statements[3], Statement::Empty));
    assert_eq!(program.block.body.statements.separators.len(), 3);
}

#[test]
fn test_nested_subprograms() {
    let program = parse_ok(
        "program P;
         fungsi luar(a, b: integer; variabel c: real): integer;
           prosedur dalam;
           mulai selesai;
         mulai luar := a + b selesai;
         mulai selesai.",
    );

    let subs = &program.block.declarations.subprograms;
    assert_eq!(subs.len(), 1);
    let Subprogram::Function(f) = &subs[0] else {
        panic!("Expected function");
    };
    assert_eq!(f.name.text, "luar");

    let params = f.parameters.as_ref().expect("Expected parameters");
    assert_eq!(params.groups.len(), 2);
    assert!(!params.groups[0].is_by_reference());
    assert!(params.groups[1].is_by_reference());
    assert_eq!(params.groups[0].names.names().collect::<Vec<_>>(), vec!["a", "b"]);

    assert_eq!(f.block.declarations.subprograms.len(), 1);
    assert_eq!(f.block.declarations.subprograms[0].name().text, "dalam");
}

#[test]
fn test_type_forms() {
    let program = parse_ok(
        "program P;
         konstanta N = 3;
         tipe Angka = integer; Sub = 1..N; Huruf = 'a'..'z'; Vek = larik[0..N - 1] dari Angka;
         variabel v: Vek;
         mulai selesai.",
    );

    let types = &program.block.declarations.types[0].declarations;
    assert!(matches!(types[0].type_ref, TypeRef::Simple(_)));
    assert!(matches!(types[1].type_ref, TypeRef::Range(_)));
    assert!(matches!(types[2].type_ref, TypeRef::Range(_)));
    match &types[3].type_ref {
        TypeRef::Array(array) => {
            assert!(matches!(array.element, TypeRef::Named(_)));
            assert_eq!(array.index.high.rest.len(), 1);
        }
        _ => panic!("Expected array type"),
    }

    let vars = &program.block.declarations.variables[0].declarations;
    assert!(matches!(vars[0].type_ref, TypeRef::Named(_)));
}

#[test]
fn test_loops() {
    let program = parse_ok(
        "program P; variabel i: integer;
         mulai
           untuk i := 10 turun-ke 1 lakukan writeln(i);
           selama i < 5 lakukan i := i + 1;
           ulangi i := i - 1; writeln sampai i = 0
         selesai.",
    );
    let statements = body(&program);

    match &statements[0] {
        Statement::For(stmt) => assert!(stmt.is_downward()),
        _ => panic!("Expected for statement"),
    }
    assert!(matches!(statements[1], Statement::While(_)));
    match &statements[2] {
        Statement::Repeat(stmt) => assert_eq!(stmt.body.len(), 2),
        _ => panic!("Expected repeat statement"),
    }
}

#[test]
fn test_token_walk_is_lossless() {
    let source = "program Q; { komentar }
        konstanta K = -2;
        variabel a: larik[1..5] dari boolean; i: integer;
        prosedur cetak(variabel n: integer); mulai writeln('n = ', n) selesai;
        mulai
          a[1] := benar;
          jika tidak a[1] atau (i mod 2 = 0) maka cetak(i);
        selesai.";

    let program = parse_ok(source);
    let lexed = Lexer::new(source, &Dfa::pascal_s())
        .tokenize()
        .expect("Lexing failed");

    let walked: Vec<String> = program.tokens().iter().map(|t| t.to_string()).collect();
    let expected: Vec<String> = lexed.iter().map(|t| t.to_string()).collect();
    assert_eq!(walked, expected);
}

#[test]
fn test_tree_printer_trace() {
    let program = parse_ok("program Hi; mulai selesai.");
    let trace = TreePrinter::default().print(&program);

    assert!(trace.starts_with("<program>"));
    assert!(trace.contains("KEYWORD(program)"));
    assert!(trace.contains("IDENTIFIER(Hi)"));
    assert!(trace.trim_end().ends_with("DOT(.)"));
}

#[test]
fn test_syntax_error_reports_position_and_context() {
    let err = syntax_error("program P;\nmulai\n  x := ;\nselesai.");

    assert_eq!(err.line, 3);
    assert_eq!(err.column, 8);
    assert_eq!(err.found, "SEMICOLON(;)");
    assert!(err.context.contains(":="));

    let message = err.to_string();
    assert!(message.starts_with("Syntax error at line 3, column 8"));
}

#[test]
fn test_missing_final_dot_and_trailing_tokens() {
    let err = syntax_error("program P; mulai selesai");
    assert_eq!(err.found, "end of input");

    let err = syntax_error("program P; mulai selesai. x");
    assert_eq!(err.found, "IDENTIFIER(x)");
}
