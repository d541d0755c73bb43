use clap::Parser;
use std::io::Read;
use std::process;

use sigil::codegen::Codegen;
use sigil::error::SigilError;
use sigil::lexer::Lexer;
use sigil::parser::Parser as SigilParser;

#[derive(Parser)]
#[command(name = "sigil")]
#[command(about = "Compiler for the Sigil transaction-approval language", long_about = None)]
struct Cli {
    /// Source file to compile; reads stdin when omitted.
    file: Option<String>,

    /// Write the assembly listing here instead of stdout.
    #[arg(short, long)]
    output: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let (source, origin) = match &cli.file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(s) => (s, path.as_str()),
            Err(e) => {
                eprintln!("error reading '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => (read_stdin(), "<stdin>"),
    };

    let listing = match compile(&source) {
        Ok(listing) => listing,
        Err(errors) => {
            for e in &errors {
                eprintln!("{}: {}", origin, e);
            }
            process::exit(1);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, listing) {
                eprintln!("error writing '{}': {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", listing),
    }
}

fn read_stdin() -> String {
    let mut s = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut s) {
        eprintln!("error reading stdin: {}", e);
        process::exit(1);
    }
    s
}

fn compile(source: &str) -> Result<String, Vec<SigilError>> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize().map_err(|e| vec![e])?;

    let program = SigilParser::new(tokens).parse()?;

    let compiled = Codegen::new().compile(&program)?;
    Ok(compiled.source())
}
