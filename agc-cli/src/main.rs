use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Commands};
use agc_core::AgcError;

fn main() {
    let cli = Cli::parse();

    // AGC_LOG sets the base level, -v/-vv raise it; RUST_LOG wins over both
    let log_level = match cli.verbose {
        0 => std::env::var("AGC_LOG").unwrap_or_else(|_| "warn".to_string()),
        1 => "info".to_string(),
        _ => "debug".to_string(),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<AgcError>() {
        Some(AgcError::Configuration(_))
        | Some(AgcError::InvalidInput(_))
        | Some(AgcError::InputNotFound(_))
        | Some(AgcError::InputIsDirectory(_)) => 2,
        Some(AgcError::Io(_)) => 3,
        Some(AgcError::MalformedSequenceFile(_)) => 4,
        Some(err) if err.is_internal() => 5,
        _ => 1,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let num_threads = if cli.threads == 0 {
        num_cpus::get()
    } else {
        cli.threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;

    tracing::debug!("Using {} threads", num_threads);

    match cli.command {
        Commands::Cluster(args) => crate::cli::commands::cluster::run(args),
        Commands::Dereplicate(args) => crate::cli::commands::dereplicate::run(args),
    }
}
