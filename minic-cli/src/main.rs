use anyhow::{Context, Result};
use clap::Parser;
use minic_compiler::{compile_to_ir, parse, tokenize, LexicalError};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "minic")]
#[command(about = "A front-end compiler for a small C subset, emitting basic-block IR")]
struct Args {
    /// Path to the source file to compile (defaults to a built-in sample)
    file: Option<PathBuf>,

    /// Dump the token stream with byte spans
    #[arg(long)]
    tokens: bool,

    /// Print the parsed AST
    #[arg(long)]
    ast: bool,

    /// Print the lowered IR. Implied when neither --tokens nor --ast is given.
    #[arg(long)]
    ir: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let src = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading '{}'", path.display()))?,
        None => DEFAULT_SAMPLE.trim().to_string(),
    };

    let want_ir = args.ir || !(args.tokens || args.ast);

    if args.tokens {
        for item in tokenize(&src) {
            match item {
                Ok((start, tok, end)) => println!("{start:>5}..{end:<5} {tok:?}"),
                Err(e) => println!("{:>5}..      <error: {}>", e.location, e.kind),
            }
        }
        println!();
    }

    if args.ast {
        let parsed = parse(&src)?;
        report(&parsed.diagnostics);
        println!("{:#?}", parsed.program);
        println!();
    }

    if want_ir {
        let compilation = compile_to_ir(&src)?;
        // --ast already reported the same diagnostics
        if !args.ast {
            report(&compilation.diagnostics);
        }
        print!("{}", compilation.module);
    }

    Ok(())
}

fn report(diagnostics: &[LexicalError]) {
    for d in diagnostics {
        eprintln!("warning: {d}");
    }
}

const DEFAULT_SAMPLE: &str = r#"
int main() {
    int total = 0;
    float scale = 2.5;

    for (int x = 5; x < 10; x = x + 1)
        total = total + x;

    while (total > 0 && scale < 100.0) {
        scale = scale * 2;
        total = total - 7;
    }

    if (total == 0) total = 1; else total = total % 3;
}
"#;
