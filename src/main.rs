// pascals: Pascal-S lexer, parser and scope checker

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser as CliParser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pascal_s::lexer::{Dfa, Lexer};
use pascal_s::parser::TreePrinter;
use pascal_s::semantic::{check_program, SymbolTable};
use pascal_s::{parse, CompileError};

#[derive(CliParser, Debug)]
#[command(name = "pascals")]
#[command(about = "Lex, parse and check a Pascal-S program", long_about = None)]
struct Cli {
    /// Source file to process
    #[arg(required_unless_present = "emit_dfa")]
    source: Option<PathBuf>,

    /// DFA description to use instead of the built-in one (.json or .txt)
    #[arg(long, value_name = "PATH")]
    dfa: Option<PathBuf>,

    /// Print the token stream and stop after lexing
    #[arg(long)]
    tokens: bool,

    /// Print the parse tree
    #[arg(long)]
    tree: bool,

    /// Print the symbol tables after checking
    #[arg(long)]
    symbols: bool,

    /// Print the active DFA in the given format and exit
    #[arg(long, value_enum, value_name = "FORMAT")]
    emit_dfa: Option<DfaFormat>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DfaFormat {
    Json,
    Txt,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let dfa = match &cli.dfa {
        Some(path) => Dfa::load(path)
            .with_context(|| format!("failed to load DFA from {}", path.display()))?,
        None => Dfa::pascal_s(),
    };

    if let Some(format) = cli.emit_dfa {
        match format {
            DfaFormat::Json => println!("{}", dfa.to_json()?),
            DfaFormat::Txt => print!("{}", dfa.to_text()),
        }
        return Ok(());
    }

    let Some(path) = &cli.source else {
        anyhow::bail!("no source file given");
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if cli.tokens {
        let output = Lexer::new(&source, &dfa).scan();
        for token in &output.tokens {
            println!("{}", token);
        }
        if !output.diagnostics.is_empty() {
            for diagnostic in &output.diagnostics {
                eprintln!("Lexical error at {}", diagnostic);
            }
            std::process::exit(1);
        }
        return Ok(());
    }

    let program = match parse(&source, &dfa) {
        Ok(program) => program,
        Err(e) => fail(e),
    };

    if cli.tree {
        print!("{}", TreePrinter::default().print(&program));
    }

    let mut table = SymbolTable::new();
    if let Err(e) = check_program(&program, &mut table) {
        fail(CompileError::from(e));
    }

    if cli.symbols {
        print!("{}", table);
    }

    eprintln!("{}: no errors", path.display());
    Ok(())
}

/// Print a pipeline error verbatim and exit with status 1.
fn fail(error: CompileError) -> ! {
    eprintln!("{}", error);
    std::process::exit(1);
}
