//! Chart Resolution CLI
//!
//! Usage:
//!   chart-resolution [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>  Engine configuration (TOML format)
//!   -d, --debug          Print the resolution report to stderr as well
//!   -h, --help           Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;

use chart_resolution::report::describe;
use chart_resolution::{build_with_config, EngineConfig};

#[derive(Parser)]
#[command(name = "chart-resolution")]
#[command(about = "Resolve shared scales and axes of a composed chart specification")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Engine configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Debug mode: print the resolution report to stderr
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    // Read input
    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let config = config.with_debug(cli.debug);
    match build_with_config(&source, &config) {
        Ok(tree) => {
            print!("{}", describe(&tree));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
