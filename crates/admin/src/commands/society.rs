//! `scf-admin society` subcommands.

use std::process::ExitCode;

use anyhow::Context;

use scf_core::Owner;
use scf_db::repositories::{DomainRepo, GrantRepo, SocietyRepo};
use scf_jobs::spec::{
    CreateSocietyArgs, RenameSocietyArgs, SocietyAdminArgs, UpdateSocietyDescriptionArgs,
    UpdateSocietyRoleEmailArgs,
};
use scf_jobs::JobSpec;

use super::{confirm, status_name, submit_and_run, EXIT_NOT_RUN};
use crate::app::App;
use crate::cli::SocietyCommand;

pub async fn run(app: &App, command: SocietyCommand) -> anyhow::Result<ExitCode> {
    match command {
        SocietyCommand::Create {
            name,
            description,
            admins,
        } => {
            submit_and_run(
                app,
                JobSpec::CreateSociety(CreateSocietyArgs {
                    name,
                    description,
                    admins,
                }),
            )
            .await
        }
        SocietyCommand::Describe { name, description } => {
            submit_and_run(
                app,
                JobSpec::UpdateSocietyDescription(UpdateSocietyDescriptionArgs {
                    society: name,
                    description,
                }),
            )
            .await
        }
        SocietyCommand::RoleEmail { name, email } => {
            submit_and_run(
                app,
                JobSpec::UpdateSocietyRoleEmail(UpdateSocietyRoleEmailArgs {
                    society: name,
                    email,
                }),
            )
            .await
        }
        SocietyCommand::AddAdmin { name, crsid } => {
            submit_and_run(
                app,
                JobSpec::AddSocietyAdmin(SocietyAdminArgs {
                    society: name,
                    target_crsid: crsid,
                }),
            )
            .await
        }
        SocietyCommand::RemoveAdmin { name, crsid } => {
            submit_and_run(
                app,
                JobSpec::RemoveSocietyAdmin(SocietyAdminArgs {
                    society: name,
                    target_crsid: crsid,
                }),
            )
            .await
        }
        SocietyCommand::Rename { name, new_name } => {
            let prompt = format!(
                "Rename {name} to {new_name}? The UNIX account, group and home move with it."
            );
            if !confirm(app, &prompt)? {
                println!("aborted");
                return Ok(ExitCode::from(EXIT_NOT_RUN));
            }
            submit_and_run(
                app,
                JobSpec::RenameSociety(RenameSocietyArgs {
                    society: name,
                    new_name,
                }),
            )
            .await
        }
        SocietyCommand::Show { name } => show(app, &name).await,
    }
}

async fn show(app: &App, name: &str) -> anyhow::Result<ExitCode> {
    let society = SocietyRepo::find_by_name(&app.pool, name)
        .await?
        .with_context(|| format!("no society {name}"))?;

    println!("name:        {}", society.name);
    println!("description: {}", society.description);
    println!(
        "role email:  {}",
        society.role_email.as_deref().unwrap_or("(none)")
    );
    println!("status:      {}", status_name(society.status_id));
    println!("danger:      {}", society.danger);
    match (society.uid, society.gid) {
        (Some(uid), Some(gid)) => println!("uid/gid:     {uid}/{gid}"),
        _ => println!("uid/gid:     not provisioned"),
    }

    let admins = SocietyRepo::admins(&app.pool, name).await?;
    println!(
        "admins:      {}",
        if admins.is_empty() {
            "(none)".to_string()
        } else {
            admins.join(", ")
        }
    );

    let owner = Owner::society(name);
    let domains = DomainRepo::list_by_owner(&app.pool, owner.kind.as_str(), &owner.name).await?;
    for d in &domains {
        println!(
            "domain:      {} -> {}",
            d.domain,
            d.docroot.as_deref().unwrap_or("default root")
        );
    }
    let grants =
        GrantRepo::list_by_owner(&app.pool, owner.kind.as_str(), &owner.name, None).await?;
    for g in &grants {
        println!("database:    {} ({})", g.database_name, g.engine);
    }

    Ok(ExitCode::SUCCESS)
}
