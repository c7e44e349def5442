//! `scf-admin database` subcommands.

use std::process::ExitCode;

use scf_jobs::spec::{CreateDatabaseArgs, DropDatabaseArgs, ResetDatabasePasswordArgs};
use scf_jobs::JobSpec;

use super::{confirm, submit_and_run, EXIT_NOT_RUN};
use crate::app::App;
use crate::cli::DatabaseCommand;

pub async fn run(app: &App, command: DatabaseCommand) -> anyhow::Result<ExitCode> {
    match command {
        DatabaseCommand::Create {
            owner,
            engine,
            suffix,
        } => {
            let owner = owner.owner()?;
            submit_and_run(
                app,
                JobSpec::CreateDatabase(CreateDatabaseArgs {
                    owner,
                    engine,
                    suffix,
                }),
            )
            .await
        }
        DatabaseCommand::Drop {
            owner,
            engine,
            suffix,
        } => {
            let owner = owner.owner()?;
            let name = match &suffix {
                Some(suffix) => format!("{}/{suffix}", owner.name),
                None => owner.name.clone(),
            };
            let prompt = format!(
                "Drop the {} database {name} and delete its contents?",
                engine.as_str()
            );
            if !confirm(app, &prompt)? {
                println!("aborted");
                return Ok(ExitCode::from(EXIT_NOT_RUN));
            }
            submit_and_run(
                app,
                JobSpec::DropDatabase(DropDatabaseArgs {
                    owner,
                    engine,
                    suffix,
                }),
            )
            .await
        }
        DatabaseCommand::List { owner, engine } => {
            let owner = owner.owner()?;
            let cluster = app.cluster(engine)?;
            let databases = cluster.list_databases(&owner.name).await?;
            if databases.is_empty() {
                println!("no {} databases for {owner}", engine.as_str());
            }
            for name in &databases {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }
        DatabaseCommand::ResetPassword { owner, engine } => {
            let owner = owner.owner()?;
            submit_and_run(
                app,
                JobSpec::ResetDatabasePassword(ResetDatabasePasswordArgs { owner, engine }),
            )
            .await
        }
    }
}
