mod auth;
mod cli;
mod config;
mod error;
mod output;
mod providers;
mod report;

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use cli::Cli;
use error::SnapshotError;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting devops-snapshot");

    match cli.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(SnapshotError::Config(message)) = err.downcast_ref::<SnapshotError>() {
                eprintln!("{} {message}", output::failure("error:"));
                eprintln!("\n{}", Cli::command().render_usage());
                return ExitCode::from(2);
            }

            error!("{err:#}");
            eprintln!("{} {err:#}", output::failure("error:"));
            ExitCode::FAILURE
        }
    }
}
