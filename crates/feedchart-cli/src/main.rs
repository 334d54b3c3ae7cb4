//! `feedchart` entry point.

use std::process::ExitCode;

use clap::Parser;
use feedchart_cli::{Cli, CliError, Commands, handlers, init_logging};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads FEEDCHART_*
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Watch(args) => handlers::watch::execute(args).await,
        Commands::Replay(args) => handlers::replay::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Command failed");
            eprintln!("Error: {err:#}");
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}
