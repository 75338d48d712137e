//! `harbor` entry point.

use std::process::ExitCode;

use clap::Parser;

use harbor_cli::{Cli, CliError, Commands, handlers, logging};

/// Exit code of `harbor status` when nothing is running.
const NOT_RUNNING: u8 = 4;

fn main() -> ExitCode {
    // A .env file is optional.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: {e:#}");
        return ExitCode::from(CliError::from(e).exit_code());
    }

    let result = match &cli.command {
        Commands::Start(args) => handlers::start::execute(args, cli.verbose, cli.log_file.as_deref()),
        Commands::Stop { pid_file, timeout } => handlers::stop::execute(pid_file, *timeout),
        Commands::Status(pid_file) => {
            return if handlers::status::execute(pid_file) {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(NOT_RUNNING)
            };
        }
        Commands::Reload(pid_file) => handlers::reload::execute(pid_file),
        Commands::Manager => handlers::role::manager(),
        Commands::Worker => handlers::role::worker(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let err = CliError::from(e);
            tracing::debug!(exit_code = err.exit_code(), "command failed");
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
