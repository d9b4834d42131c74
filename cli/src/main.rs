//! noteomatic-deploy - provision nginx and HTTPS for the note server

use std::process::ExitCode;

use clap::Parser;

use noteomatic_deploy::cli::Cli;
use noteomatic_deploy::domain::error_code;
use noteomatic_deploy::output::json::format_error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    noteomatic_deploy::telemetry::init();

    let json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{e:#}");
            match format_error(&message, error_code(&e)) {
                Ok(obj) if json => println!("{obj}"),
                _ => eprintln!("Error: {message}"),
            }
            ExitCode::FAILURE
        }
    }
}
