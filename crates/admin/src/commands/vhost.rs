//! `scf-admin vhost` subcommands.

use std::process::ExitCode;

use scf_db::repositories::DomainRepo;
use scf_jobs::spec::{AddVhostArgs, ChangeVhostDocrootArgs, RemoveVhostArgs};
use scf_jobs::JobSpec;

use super::{confirm, submit_and_run, EXIT_NOT_RUN};
use crate::app::App;
use crate::cli::VhostCommand;

pub async fn run(app: &App, command: VhostCommand) -> anyhow::Result<ExitCode> {
    match command {
        VhostCommand::Add {
            owner,
            domain,
            docroot,
        } => {
            let owner = owner.owner()?;
            submit_and_run(
                app,
                JobSpec::AddVhost(AddVhostArgs {
                    owner,
                    domain,
                    docroot,
                }),
            )
            .await
        }
        VhostCommand::SetDocroot {
            owner,
            domain,
            docroot,
        } => {
            let owner = owner.owner()?;
            submit_and_run(
                app,
                JobSpec::ChangeVhostDocroot(ChangeVhostDocrootArgs {
                    owner,
                    domain,
                    docroot,
                }),
            )
            .await
        }
        VhostCommand::Remove { owner, domain } => {
            let owner = owner.owner()?;
            let prompt = format!("Stop serving {domain} for {owner}?");
            if !confirm(app, &prompt)? {
                println!("aborted");
                return Ok(ExitCode::from(EXIT_NOT_RUN));
            }
            submit_and_run(app, JobSpec::RemoveVhost(RemoveVhostArgs { owner, domain })).await
        }
        VhostCommand::List { owner } => {
            let owner = owner.owner()?;
            let domains =
                DomainRepo::list_by_owner(&app.pool, owner.kind.as_str(), &owner.name).await?;
            if domains.is_empty() {
                println!("no custom domains for {owner}");
            }
            for d in &domains {
                println!(
                    "{} -> {}",
                    d.domain,
                    d.docroot.as_deref().unwrap_or("default root")
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
