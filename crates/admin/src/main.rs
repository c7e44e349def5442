//! `scf-admin`: the operator command-line for the membership system.
//!
//! Every mutating subcommand is recorded as a job before anything
//! happens, so the queue is the audit trail whether the work ran here
//! or waited for approval.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod cli;
mod commands;

use app::App;
use cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "scf_admin=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("scf-admin: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let app = App::init(&cli).await?;
    match cli.command {
        Command::Member(command) => commands::member::run(&app, command).await,
        Command::Society(command) => commands::society::run(&app, command).await,
        Command::Vhost(command) => commands::vhost::run(&app, command).await,
        Command::List(command) => commands::list::run(&app, command).await,
        Command::Database(command) => commands::database::run(&app, command).await,
        Command::Job(command) => commands::job::run(&app, command).await,
    }
}
