//! `pokedex` binary entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use pokedex_cli::commands::Cli;
use pokedex_cli::error::AppError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    pokedex_cli::init_tracing(cli.quiet);

    let json = cli.json;
    match pokedex_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(code = err.code.as_str(), "Command failed");
            report(&err, json);
            ExitCode::from(err.code.exit_code())
        }
    }
}

fn report(err: &AppError, json: bool) {
    if json {
        match serde_json::to_string(err) {
            Ok(body) => println!("{}", body),
            Err(_) => eprintln!("{}", err),
        }
        return;
    }

    eprintln!("{}", err);
    if err.retryable {
        eprintln!("(the command can be retried)");
    }
}
