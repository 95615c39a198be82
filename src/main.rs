use anyhow::{bail, Context, Result};
use arara::{
    interpreter::{Interpreter, Options, StdinInput},
    lexer::tokenize,
    Parser,
};
use argh::FromArgs;
use std::fs::{self, File};
use std::io::{prelude::*, stdin, stdout, BufReader, Stdout};
use std::path::Path;

#[derive(FromArgs, Debug)]
/// Interpreter for the arara teaching language. Built with Rust.
struct Args {
    /// source file
    #[argh(positional)]
    source_file: Option<String>,
    /// print every token before running
    #[argh(switch)]
    tokens: bool,
    /// print the parsed program before running
    #[argh(switch)]
    ast: bool,
    /// write the parsed program as a Graphviz graph to this file
    #[argh(option)]
    dot: Option<String>,
    /// report each executed step on stderr
    #[argh(switch)]
    trace: bool,
    /// reject `leia` on undeclared variables
    #[argh(switch)]
    strict_reads: bool,
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    let options = Options {
        trace: args.trace,
        strict_reads: args.strict_reads,
    };
    let mut interpreter = Interpreter::with_options(StdinInput, stdout(), options);

    // If a path was provided, we will process a file
    // otherwise, we will go to a prompt.
    if let Some(path) = &args.source_file {
        let path = Path::new(path);
        let file = File::open(path)
            .with_context(|| format!("Could not open source file {}.", path.display()))?;
        let mut source = String::new();
        BufReader::new(file)
            .read_to_string(&mut source)
            .with_context(|| "Could not read file.".to_string())?;
        run(&args, &mut interpreter, &source)?;
    } else {
        run_prompt(&args, &mut interpreter)?;
    }

    Ok(())
}

fn run_prompt(args: &Args, interpreter: &mut Interpreter<StdinInput, Stdout>) -> Result<()> {
    println!("Running prompt...");
    loop {
        print!("> ");
        stdout().flush()?;
        let mut input = String::new();
        stdin()
            .read_line(&mut input)
            .with_context(|| "Error reading input.".to_string())?;
        if input.trim().is_empty() {
            println!("Exiting...");
            break;
        }
        // Print error but continue session
        if let Err(error) = run(args, interpreter, &input) {
            eprintln!("Error: {}", error);
        }
    }

    Ok(())
}

fn run(
    args: &Args,
    interpreter: &mut Interpreter<StdinInput, Stdout>,
    source: &str,
) -> Result<()> {
    if args.tokens {
        let (tokens, _) = tokenize(source);
        for token in &tokens {
            println!(
                "<{}, {}, line {}, column {}>",
                token.token.kind(),
                token.lexeme,
                token.pos.line,
                token.pos.column
            );
        }
    }

    let program = match arara::parser::parse(&mut Parser::new(source)) {
        Ok(program) => program,
        Err(errors) => {
            for error in &errors {
                eprintln!("{}", error);
            }
            bail!("{} syntax error(s), nothing was run.", errors.len());
        }
    };
    if args.ast {
        println!("{:#?}", program);
    }
    if let Some(path) = &args.dot {
        fs::write(path, program.dot().to_string())
            .with_context(|| format!("Could not write {}.", path))?;
    }

    interpreter.interpret(&program)?;
    Ok(())
}
