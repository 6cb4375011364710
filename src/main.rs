//! Cellflow - A minimal grid with dependency-tracked formulas

mod config;
mod error;
mod session;

use anyhow::{Context, bail};
use cellflow_core::Document;
use log::debug;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use session::Session;

fn print_usage() {
    eprintln!("Usage: cellflow [OPTIONS]");
    eprintln!();
    eprintln!("Reads commands from stdin, one per line, unless -c is given.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <CMD>       Run a command (can be repeated)");
    eprintln!("                            Exits 1 on the first failing command");
    eprintln!("  --config <FILE>           Load grid settings from a TOML file");
    eprintln!("  --rows <N>                Number of rows (overrides config)");
    eprintln!("  --cols <N>                Number of columns (overrides config)");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  <CELL> <TEXT>             Commit a literal or =formula (e.g. B1 =A1+1)");
    eprintln!("  <CELL>                    Clear a cell");
    eprintln!("  get|raw|deps <CELL>       Show display value, raw text or dependents");
    eprintln!("  formulas                  List formula cells");
    eprintln!("  eval <EXPR>               Evaluate a constant expression");
    eprintln!("  show                      Print the grid");
}

struct Args {
    commands: Vec<String>,
    config_file: Option<PathBuf>,
    rows: Option<usize>,
    cols: Option<usize>,
}

fn parse_count(flag: &str, value: Option<&String>) -> anyhow::Result<usize> {
    let Some(value) = value else {
        bail!("{} requires a value", flag);
    };
    value
        .parse::<usize>()
        .with_context(|| format!("{} expects a number, got '{}'", flag, value))
}

fn parse_args(args: &[String]) -> anyhow::Result<Option<Args>> {
    let mut parsed = Args {
        commands: Vec::new(),
        config_file: None,
        rows: None,
        cols: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(None),
            "-c" | "--command" => {
                i += 1;
                let Some(command) = args.get(i) else {
                    bail!("--command requires a value");
                };
                parsed.commands.push(command.clone());
            }
            "--config" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--config requires a file path");
                };
                parsed.config_file = Some(PathBuf::from(path));
            }
            "--rows" => {
                i += 1;
                parsed.rows = Some(parse_count("--rows", args.get(i))?);
            }
            "--cols" => {
                i += 1;
                parsed.cols = Some(parse_count("--cols", args.get(i))?);
            }
            arg => bail!("Unexpected argument: {}", arg),
        }
        i += 1;
    }
    Ok(Some(parsed))
}

/// Returns false if any command failed.
fn run(args: Args) -> anyhow::Result<bool> {
    let (mut grid, warnings) = config::load_config(args.config_file.as_ref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    if let Some(rows) = args.rows {
        grid.rows = rows;
    }
    if let Some(cols) = args.cols {
        grid.cols = cols;
    }

    debug!("starting with a {}x{} grid", grid.rows, grid.cols);
    let doc = Document::with_config(grid).context("Invalid grid configuration")?;
    let mut session = Session::new(doc);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !args.commands.is_empty() {
        for command in &args.commands {
            session
                .execute(command, &mut out)
                .with_context(|| format!("Command '{}' failed", command))?;
        }
        out.flush()?;
        return Ok(true);
    }

    let mut ok = true;
    for line in io::stdin().lock().lines() {
        let line = line?;
        if let Err(e) = session.execute(&line, &mut out) {
            eprintln!("Error: {}", e);
            ok = false;
        }
        out.flush()?;
    }
    Ok(ok)
}

fn main() {
    env_logger::init();

    let argv: Vec<String> = env::args().collect();
    let args = match parse_args(&argv) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
