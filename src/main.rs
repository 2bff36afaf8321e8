mod cli;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let args = cli::Args::parse();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level())))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match args.config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:?}");
            return ExitCode::FAILURE;
        },
    };
    tracing::debug!(?config, "Resolved configuration");

    match modeldump_pipeline::run(&config) {
        Ok(summary) => {
            if config.convert {
                println!("Dumped {} models, converted {}", summary.extracted, summary.converted);
            } else {
                println!("Dumped {} models", summary.extracted);
            }
            if summary.is_complete() {
                ExitCode::SUCCESS
            } else {
                tracing::error!(failed = ?summary.failures, "Some models failed");
                eprintln!("Error: {} models failed", summary.failures.len());
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}
