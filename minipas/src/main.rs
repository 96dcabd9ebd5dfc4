//! Command-line interface of minipas.
//!
//! Reads a program, checks it in two passes and writes the python
//! translation into `--out-dir`.

use anyhow::Context;
use cfglr::{Grammar, Validator};
use clap::Parser;
use minipas::{language, lexer};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Checks minipas programs and compiles them to python")]
struct Args {
    /// Program to compile
    source: PathBuf,

    /// Grammar file to use instead of the built-in one
    #[arg(short, long)]
    grammar: Option<PathBuf>,

    /// Directory the python file is written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Stop once the program is validated
    #[arg(long)]
    check: bool,

    /// Print the action and goto tables of the first pass
    #[arg(long)]
    print_table: bool,

    /// Write the program's words, comments removed, to this file
    #[arg(long, value_name = "FILE")]
    dump_words: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let grammar = match &args.grammar {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("can't read grammar {}", path.display()))?;
            Grammar::parse(&text)?
        }
        None => language::grammar()?,
    };
    log::debug!("grammar:\n{}", grammar);

    let validator = Validator::new(grammar, language::conventions());
    if args.print_table {
        validator.table().print_tables();
    }

    let source = fs::read_to_string(&args.source)
        .with_context(|| format!("can't read {}", args.source.display()))?;

    if let Some(path) = &args.dump_words {
        let words = lexer::tokenize(&source);
        fs::write(path, lexer::render(&lexer::lines(&source, &words)))
            .with_context(|| format!("can't write {}", path.display()))?;
    }

    if args.check {
        minipas::check(&validator, &source)?;
        println!("{}: ok", args.source.display());
        return Ok(());
    }

    let program = minipas::compile(&validator, &source)?;
    let path = args.out_dir.join(program.file_name());
    fs::write(&path, program.to_string())
        .with_context(|| format!("can't write {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}
