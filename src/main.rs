use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use simpletron::io::{ConsoleInput, ConsoleOutput};
use simpletron::{Program, StdSimpletron};

/// Loads a program into the Simpletron and runs it.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Program file with whitespace separated words. Entered interactively if omitted
    path: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Do not print registers and memory after the run
    #[arg(long)]
    no_dump: bool,
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    let args = Args::parse();
    SimpleLogger::new().with_level(level(args.verbose)).init()?; // logging

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let program = match &args.path {
        Some(path) => Program::from_file(path)?,
        None => Program::read_interactive(&mut input, &mut io::stdout())?,
    };

    let mut machine = StdSimpletron::new();
    println!("Parsing...");
    machine.parse(&program).wrap_err("Program is invalid")?;
    println!("Program is valid.");

    println!("Loading program into memory...");
    println!("Running...");
    let result = machine.run(
        &program,
        ConsoleInput::new(input, io::stdout()),
        ConsoleOutput::new(io::stdout()),
    );

    println!("\n*** Program finished ***");
    if !args.no_dump {
        println!("{}", machine.dump());
    }

    result.wrap_err("Program did not run to completion")?;
    Ok(())
}
