// Integration tests for the symbol table and scope checker

use pascal_s::lexer::Dfa;
use pascal_s::semantic::*;
use pascal_s::{compile, parse, CompileError};

fn compile_ok(source: &str) -> SymbolTable {
    let (_, table) = compile(source, &Dfa::pascal_s()).expect("Compilation failed");
    table
}

fn semantic_error(source: &str) -> SemanticError {
    match compile(source, &Dfa::pascal_s()) {
        Err(CompileError::Semantic(e)) => e,
        other => panic!("Expected semantic error, got {:?}", other.map(|_| ())),
    }
}

fn find<'a>(table: &'a SymbolTable, block: BlockId, name: &str) -> &'a TabEntry {
    table
        .block_entries(block)
        .map(|(_, entry)| entry)
        .find(|entry| entry.name == name)
        .unwrap_or_else(|| panic!("'{}' not in block {}", name, block))
}

#[test]
fn test_variables_get_consecutive_addresses() {
    let table = compile_ok("program P; variabel x, y: integer; mulai selesai.");

    let x = find(&table, GLOBAL_BLOCK, "x");
    let y = find(&table, GLOBAL_BLOCK, "y");
    for entry in [x, y] {
        assert_eq!(entry.kind, ObjectKind::Variable);
        assert_eq!(entry.typ, BaseType::Ints);
        assert_eq!(entry.level, 0);
    }
    assert_eq!(x.address, 0);
    assert_eq!(y.address, 1);
    assert_eq!(table.btab(GLOBAL_BLOCK).unwrap().vsize, 2);

    let program = find(&table, GLOBAL_BLOCK, "P");
    assert_eq!(program.kind, ObjectKind::Procedure);
    assert_eq!(program.reference, GLOBAL_BLOCK.index());
}

#[test]
fn test_duplicate_in_same_scope() {
    let err = semantic_error("program P; variabel x: integer; variabel x: real; mulai selesai.");
    assert_eq!(
        err,
        SemanticError::Duplicate {
            kind: ObjectKind::Variable,
            name: "x".to_string()
        }
    );
    assert!(err.to_string().contains("'x'"));

    // Lookup is case-insensitive, so a differently cased name still clashes.
    let err = semantic_error("program P; variabel Total: integer; total: real; mulai selesai.");
    assert!(matches!(err, SemanticError::Duplicate { .. }));
}

#[test]
fn test_shadowing_across_scopes() {
    let table = compile_ok(
        "program P;
         variabel x: integer;
         prosedur q;
           variabel x: real;
         mulai x := 1.5 selesai;
         mulai x := 1 selesai.",
    );

    let outer = find(&table, GLOBAL_BLOCK, "x");
    assert_eq!((outer.typ, outer.level), (BaseType::Ints, 0));

    let q = find(&table, GLOBAL_BLOCK, "q");
    let inner = find(&table, BlockId(q.reference), "x");
    assert_eq!((inner.typ, inner.level), (BaseType::Reals, 1));
}

#[test]
fn test_locals_are_invisible_after_pop() {
    let mut table = SymbolTable::new();
    table
        .insert("g", ObjectKind::Variable, BaseType::Ints, 0, true, 0)
        .unwrap();

    table.push_scope();
    let local = table
        .insert("lokal", ObjectKind::Variable, BaseType::Chars, 0, true, 0)
        .unwrap();
    assert_eq!(table.lookup("lokal"), Some(local));
    assert!(table.lookup("g").is_some());

    table.pop_scope();
    assert_eq!(table.lookup("lokal"), None);
    assert!(table.lookup("g").is_some());
}

#[test]
fn test_subprogram_bodies_see_deeper_levels() {
    let table = compile_ok(
        "program P;
         variabel g: integer;
         prosedur luar(a: integer);
           variabel b: integer;
           fungsi dalam(c: char): boolean;
             variabel d: integer;
           mulai dalam := benar; d := a selesai;
         mulai b := a selesai;
         mulai g := 0 selesai.",
    );

    let luar = find(&table, GLOBAL_BLOCK, "luar");
    let luar_block = BlockId(luar.reference);
    for name in ["a", "b"] {
        assert_eq!(find(&table, luar_block, name).level, 1);
    }

    let dalam = find(&table, luar_block, "dalam");
    assert_eq!(dalam.kind, ObjectKind::Function);
    assert_eq!(dalam.typ, BaseType::Bools);
    let dalam_block = BlockId(dalam.reference);
    for name in ["c", "d"] {
        assert_eq!(find(&table, dalam_block, name).level, 2);
    }

    assert!(find(&table, GLOBAL_BLOCK, "g").level < find(&table, luar_block, "a").level);
    assert_eq!(table.level(), 0);
}

#[test]
fn test_sibling_subprograms_reuse_display_level() {
    let table = compile_ok(
        "program P;
         prosedur satu; variabel x: integer; mulai x := 1 selesai;
         prosedur dua; variabel x: char; mulai x := 'a' selesai;
         mulai satu; dua selesai.",
    );

    let satu = find(&table, GLOBAL_BLOCK, "satu");
    let dua = find(&table, GLOBAL_BLOCK, "dua");
    assert_ne!(satu.reference, dua.reference);
    assert_eq!(find(&table, BlockId(satu.reference), "x").level, 1);
    assert_eq!(find(&table, BlockId(dua.reference), "x").level, 1);
}

#[test]
fn test_block_chains_link_backwards() {
    let table = compile_ok(
        "program P;
         konstanta K = 1;
         tipe T = larik[1..4] dari char;
         variabel a: T; b: integer;
         prosedur r(variabel z: T); mulai selesai;
         mulai selesai.",
    );

    for block in 1..table.btab_len() {
        let mut previous = usize::MAX;
        for (id, entry) in table.block_entries(BlockId(block)) {
            assert!(id.index() < previous);
            assert!(entry.link.index() < id.index());
            previous = id.index();
        }
    }

    let r = find(&table, GLOBAL_BLOCK, "r");
    let block = table.btab(BlockId(r.reference)).unwrap();
    assert_eq!(block.psize, 1);
    assert_eq!(table.tab(block.lastpar).unwrap().name, "z");
    assert!(!table.tab(block.lastpar).unwrap().normal);

    assert_eq!(find(&table, GLOBAL_BLOCK, "b").address, 4);
}

#[test]
fn test_builtins_register_on_first_use() {
    let table = compile_ok("program P; variabel s: integer; mulai readln(s); writeln(s) selesai.");

    let names: Vec<&str> = table
        .block_entries(GLOBAL_BLOCK)
        .map(|(_, entry)| entry.name.as_str())
        .collect();
    assert!(names.contains(&"readln"));
    assert!(names.contains(&"writeln"));
    assert!(!names.contains(&"write"));
}

#[test]
fn test_unknown_type_and_undeclared_name() {
    assert_eq!(
        semantic_error("program P; variabel x: Angka; mulai selesai."),
        SemanticError::UnknownType {
            name: "Angka".to_string()
        }
    );
    assert_eq!(
        semantic_error("program P; mulai jika z > 0 maka writeln selesai."),
        SemanticError::Undeclared {
            name: "z".to_string()
        }
    );
}

#[test]
fn test_table_errors_surface_as_semantic_errors() {
    let program = parse("program P; mulai selesai.", &Dfa::pascal_s()).expect("Parsing failed");
    let mut table = SymbolTable::new();
    check_program(&program, &mut table).expect("Check failed");

    // A second pass over the same table collides with the program entry.
    let err = check_program(&program, &mut table).unwrap_err();
    assert!(matches!(
        err,
        SemanticError::Duplicate {
            kind: ObjectKind::Procedure,
            ..
        }
    ));

    assert!(matches!(
        table.tab(EntryId::NONE),
        Err(SymbolTableError::SentinelAccess { table: "tab" })
    ));
}

#[test]
fn test_extreme_bounds_report_errors() {
    let err = semantic_error(
        "program P; variabel v: larik[-9223372036854775807..9223372036854775807] dari integer; mulai selesai.",
    );
    assert!(matches!(
        err,
        SemanticError::Table(SymbolTableError::ArrayTooLarge { .. })
    ));

    let err = semantic_error("program P; variabel v: larik[1..99999999999999999999] dari char; mulai selesai.");
    assert_eq!(
        err,
        SemanticError::IntegerOutOfRange {
            text: "99999999999999999999".to_string()
        }
    );

    let err = semantic_error(
        "program P;
         tipe Besar = larik[0..8999999999999999999] dari boolean;
         prosedur q(a, b, c: Besar); mulai selesai;
         mulai selesai.",
    );
    assert_eq!(
        err,
        SemanticError::StorageOverflow {
            name: "c".to_string()
        }
    );
}

#[test]
fn test_oversized_integer_constant() {
    let err = semantic_error("program P; konstanta C = 99999999999999999999; mulai selesai.");
    assert!(matches!(err, SemanticError::IntegerOutOfRange { .. }));
    assert!(err.to_string().contains("99999999999999999999"));
}

#[test]
fn test_semantic_message_has_single_prefix() {
    let err = compile("program P; mulai y := 1 selesai.", &Dfa::pascal_s()).unwrap_err();
    let message = err.to_string();

    assert_eq!(message, "Semantic error: undeclared identifier 'y'");
    assert_eq!(message.matches("Semantic error").count(), 1);
}
