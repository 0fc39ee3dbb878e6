//! Quoteboard - Telegram-first quote collector.
//!
//! Save a replied-to message as a quote; get a random one back as a
//! rendered card with avatar and nickname.

use clap::Parser;
use std::process::ExitCode;

mod avatar;
mod cli;
mod config;
mod error;
mod logging;
mod mention;
mod render;
mod store;
mod telegram;

use cli::Commands;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging; the guard keeps the file appender alive.
    let _guard = match logging::init() {
        Ok((guard, _log_dir)) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Parse command line arguments
    let args = Commands::parse();

    // Run the command
    match args.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
