//! The thin driver spec.md §1 calls "out of scope": read source text from
//! stdin, dispatch between execute mode and `--ast` mode, own process exit
//! codes and logging setup. Everything it delegates to (`coffee_parser`,
//! `coffee_interpreter`) is the actual engineering content of this repo.

use std::io::{self, Read, Write};

use clap::Parser;
use coffee_ast::tree;
use coffee_interpreter::Evaluator;

/// A tree-walking interpreter for a small Java-like language.
#[derive(Parser)]
#[command(name = "coffee", version, about)]
struct Cli {
    /// Emit the parsed program as a structured AST record instead of running it.
    #[arg(long)]
    ast: bool,
}

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let mut source = String::new();
    if io::stdin().read_to_string(&mut source).is_err() {
        println!("Error: failed to read input");
        return;
    }

    if cli.ast {
        run_ast_mode(&source);
    } else {
        run_execute_mode(&source);
    }
}

/// Execute mode (spec.md §6): run the program to completion, writing its
/// output to stdout. Any failure is swallowed into an `Error: <message>`
/// line and the process still exits successfully — the parser has no error
/// recovery (spec.md §1), so there is nothing partial to salvage.
fn run_execute_mode(source: &str) {
    match coffee_parser::parse(source) {
        Ok(program) => {
            let stdout = io::stdout();
            let mut eval = Evaluator::new(&program, stdout.lock());
            if let Err(err) = eval.run(&program) {
                // Flush whatever the program already printed before the error line.
                let _ = io::stdout().flush();
                println!("Error: {err}");
            }
        }
        Err(err) => println!("Error: {err}"),
    }
}

/// `--ast` mode (spec.md §6): emit the serialized tree shape, or a single
/// `Error` record on failure.
fn run_ast_mode(source: &str) {
    match coffee_parser::parse(source) {
        Ok(program) => print!("{}", tree::program_tree(&program)),
        Err(err) => print!("{}", coffee_ast::TreeNode::error(err.to_string())),
    }
}
