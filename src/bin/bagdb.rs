//! # bagdb CLI Entry Point
//!
//! Binary entry point for the bagdb command-line interface.
//!
//! ## Usage
//!
//! ```bash
//! # Open or create a bag file
//! bagdb ./words.bag
//!
//! # Work on an in-memory copy; the file is never modified
//! bagdb -t ./words.bag
//!
//! # Show version
//! bagdb --version
//! ```
//!
//! Diagnostics are logged to stderr; set `BAGDB_LOG=debug` to see every
//! allocation.

use std::env;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use bagdb::cli::{run_batch, Repl};
use bagdb::config::{DEFAULT_LOG_FILTER, LOG_ENV_VAR};
use bagdb::Bag;
use eyre::{bail, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let mut transient = false;
    let mut bag_path: Option<PathBuf> = None;

    for arg in &args[1..] {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("bagdb {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--transient" | "-t" => {
                transient = true;
            }
            arg if arg.starts_with('-') => {
                bail!("Unknown option: {}", arg);
            }
            path => {
                if bag_path.is_some() {
                    bail!("Multiple bag files specified");
                }
                bag_path = Some(PathBuf::from(path));
            }
        }
    }

    let Some(bag_path) = bag_path else {
        print_usage();
        return Ok(());
    };

    let mut bag = Bag::builder()
        .path(&bag_path)
        .transient(transient)
        .open()?;

    if io::stdin().is_terminal() {
        let mut repl = Repl::new(bag)?;
        repl.run()
    } else {
        let stdin = io::stdin();
        let mut stdout = io::stdout().lock();
        let mut stderr = io::stderr();
        run_batch(&mut bag, stdin.lock(), &mut stdout, &mut stderr)
    }
}

fn print_usage() {
    println!("bagdb - a persistent bag of strings");
    println!();
    println!("USAGE:");
    println!("    bagdb [OPTIONS] <BAG_FILE>");
    println!();
    println!("ARGS:");
    println!("    <BAG_FILE>         Path to the bag file (created if missing)");
    println!();
    println!("OPTIONS:");
    println!("    -t, --transient    Apply commands to an in-memory copy; never write the file");
    println!("    -h, --help         Print help information");
    println!("    -v, --version      Print version information");
    println!();
    println!("COMMANDS (one per line on stdin):");
    println!("    a STRING           Add STRING");
    println!("    d STRING           Remove STRING");
    println!("    l                  List all strings");
    println!();
    println!("ENVIRONMENT:");
    println!("    BAGDB_LOG          Log filter, e.g. debug (default: warn)");
    println!("    BAGDB_HISTORY      REPL history file; empty disables history");
}
