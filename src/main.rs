use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;

use noocrush::diagnostics::Diagnostic;
use noocrush::interpreter::{Interpreter, StdConsole, Value};
use noocrush::parser::{tokenize, Parser, SourceFile};

/// Run NooCrush programs
#[derive(ClapParser)]
#[command(name = "noocrush", version, about)]
struct Cli {
    /// Script to run
    file: PathBuf,

    /// Print the token stream and exit
    #[arg(long)]
    tokens: bool,

    /// Print the parsed AST as JSON and exit
    #[arg(long)]
    ast: bool,

    /// Report errors as JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let content = match fs::read_to_string(&cli.file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", cli.file.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let name = cli.file.display().to_string();
    let source = SourceFile::new(name, content.as_str());

    let tokens = match tokenize(&source) {
        Ok(t) => t,
        Err(diag) => return report(&diag, &content, cli.json),
    };

    if cli.tokens {
        for token in &tokens {
            println!("{:?} @ {}:{}", token.kind, token.span.line, token.span.col);
        }
        return ExitCode::SUCCESS;
    }

    let program = match Parser::new(tokens).parse_program() {
        Ok(p) => p,
        Err(diag) => return report(&diag, &content, cli.json),
    };

    if cli.ast {
        match serde_json::to_string_pretty(&program) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: cannot serialize AST: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    let mut interpreter = Interpreter::new(Box::new(StdConsole));
    match interpreter.run(&program) {
        Ok(Value::Unit) => ExitCode::SUCCESS,
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Err(e) => report(&e.to_diagnostic(), &content, cli.json),
    }
}

fn report(diag: &Diagnostic, source: &str, json: bool) -> ExitCode {
    if json {
        eprintln!("{}", diag.to_json());
    } else {
        eprintln!("{}", diag.to_human_readable(source));
    }
    ExitCode::FAILURE
}
