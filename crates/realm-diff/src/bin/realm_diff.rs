//! `realm-diff` command-line entry point: diff, patch and partially export
//! realm configuration files.
//!
//! Usage:
//!   realm-diff [OPTIONS] diff <file1> <file2>
//!   realm-diff [OPTIONS] patch <file1> <file2.patch.json>
//!   realm-diff [OPTIONS] partial <file1> <file2.patch.json>
//!
//! The result is printed to stdout as 4-space indented JSON. Exit status is
//! 1 for usage and input errors and 2 when a patch fails to apply.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use realm_diff::cli::{
    apply_failure_report, run_diff, run_partial, run_patch, to_pretty_json, CliError,
};
use realm_diff::config::NoiseFilterConfig;
use realm_diff::logging;

#[derive(Debug, Parser)]
#[command(name = "realm-diff", version)]
#[command(
    about = "Order-insensitive diff and patch for realm configuration exports",
    long_about = None
)]
struct Cli {
    /// Raise log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML file overriding the noise filter lists
    #[arg(long, value_name = "FILE", global = true)]
    noise_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print an invertible patch turning file1 into file2
    Diff {
        file1: PathBuf,
        file2: PathBuf,
        /// Diff every field, including environment-specific ones
        #[arg(long)]
        keep_noise: bool,
    },
    /// Apply a patch to file1 and print the full result
    Patch { file1: PathBuf, file2: PathBuf },
    /// Apply a patch to file1 and print only the touched records
    Partial { file1: PathBuf, file2: PathBuf },
}

fn noise_config(path: Option<&Path>) -> Result<NoiseFilterConfig, CliError> {
    match path {
        Some(path) => Ok(NoiseFilterConfig::load(path)?),
        None => Ok(NoiseFilterConfig::default()),
    }
}

fn run(cli: &Cli) -> Result<serde_json::Value, CliError> {
    match &cli.command {
        Commands::Diff { file1, file2, keep_noise } => {
            let config = noise_config(cli.noise_config.as_deref())?;
            run_diff(file1, file2, (!keep_noise).then_some(&config))
        }
        Commands::Patch { file1, file2 } => run_patch(file1, file2),
        Commands::Partial { file1, file2 } => run_partial(file1, file2),
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };
    logging::init(cli.verbose);

    let output = run(&cli).and_then(|value| to_pretty_json(&value));
    match output {
        Ok(text) => {
            let mut stdout = io::stdout().lock();
            if writeln!(stdout, "{text}").is_err() {
                process::exit(1);
            }
        }
        Err(CliError::Apply(failure)) => {
            match apply_failure_report(&failure) {
                Ok(report) => eprintln!("{report}"),
                Err(_) => eprintln!("error: {failure}"),
            }
            process::exit(2);
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
