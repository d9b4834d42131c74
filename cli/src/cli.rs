//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Provision nginx and HTTPS for the noteomatic note server
#[derive(Parser)]
#[command(name = "noteomatic-deploy", version, propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Defaults to `provision` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install nginx and certbot, obtain a certificate, enable HTTPS
    Provision,

    /// Check that the required ports are free
    Preflight,

    /// Show the active site, certificate and port state
    Status,

    /// Print a rendered site configuration
    Render(commands::render::RenderArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            no_color,
            quiet,
            json,
        });

        match command.unwrap_or(Command::Provision) {
            Command::Provision => commands::provision::run(&app).await,
            Command::Preflight => commands::preflight::run(&app).await,
            Command::Status => commands::status::run(&app).await,
            Command::Render(args) => commands::render::run(&app, &args),
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
