//! `scf-admin member` subcommands.

use std::process::ExitCode;

use anyhow::Context;

use scf_core::Owner;
use scf_db::repositories::{DomainRepo, GrantRepo, MemberRepo, SocietyRepo};
use scf_jobs::spec::{
    MemberArgs, ReactivateArgs, SignupArgs, UpdateEmailArgs, UpdateMailHandlerArgs, UpdateNameArgs,
};
use scf_jobs::JobSpec;

use super::{confirm, status_name, submit_and_run, EXIT_NOT_RUN};
use crate::app::App;
use crate::cli::MemberCommand;

pub async fn run(app: &App, command: MemberCommand) -> anyhow::Result<ExitCode> {
    match command {
        MemberCommand::Signup {
            crsid,
            preferred_name,
            surname,
            email,
            mail_handler,
            social,
        } => {
            submit_and_run(
                app,
                JobSpec::Signup(SignupArgs {
                    crsid,
                    preferred_name,
                    surname,
                    email,
                    mail_handler,
                    social,
                }),
            )
            .await
        }
        MemberCommand::Reactivate { crsid, email } => {
            submit_and_run(app, JobSpec::Reactivate(ReactivateArgs { crsid, email })).await
        }
        MemberCommand::Cancel { crsid } => {
            let prompt = format!(
                "Cancel {crsid}? Their login will be disabled and sessions ended."
            );
            if !confirm(app, &prompt)? {
                println!("aborted");
                return Ok(ExitCode::from(EXIT_NOT_RUN));
            }
            submit_and_run(app, JobSpec::CancelMember(MemberArgs { crsid })).await
        }
        MemberCommand::Passwd { crsid } => {
            submit_and_run(app, JobSpec::ResetUserPassword(MemberArgs { crsid })).await
        }
        MemberCommand::SetName {
            crsid,
            preferred_name,
            surname,
        } => {
            submit_and_run(
                app,
                JobSpec::UpdateName(UpdateNameArgs {
                    crsid,
                    preferred_name,
                    surname,
                }),
            )
            .await
        }
        MemberCommand::SetEmail { crsid, email } => {
            submit_and_run(
                app,
                JobSpec::UpdateEmailAddress(UpdateEmailArgs { crsid, email }),
            )
            .await
        }
        MemberCommand::SetMailHandler {
            crsid,
            mail_handler,
        } => {
            submit_and_run(
                app,
                JobSpec::UpdateMailHandler(UpdateMailHandlerArgs {
                    crsid,
                    mail_handler,
                }),
            )
            .await
        }
        MemberCommand::Show { crsid } => show(app, &crsid).await,
    }
}

async fn show(app: &App, crsid: &str) -> anyhow::Result<ExitCode> {
    let member = MemberRepo::find_by_crsid(&app.pool, crsid)
        .await?
        .with_context(|| format!("no member {crsid}"))?;

    println!("crsid:        {}", member.crsid);
    println!("name:         {}", member.display_name());
    println!("email:        {}", member.email);
    println!("mail handler: {}", member.mail_handler);
    println!("status:       {}", status_name(member.status_id));
    println!("danger:       {}", member.danger);
    match (member.uid, member.gid) {
        (Some(uid), Some(gid)) => println!("uid/gid:      {uid}/{gid}"),
        _ => println!("uid/gid:      not provisioned"),
    }
    println!("joined:       {}", member.joined_at.format("%Y-%m-%d"));
    if !member.notes.is_empty() {
        println!("notes:        {}", member.notes);
    }

    let societies = SocietyRepo::administered_by(&app.pool, crsid).await?;
    if !societies.is_empty() {
        println!("admin of:     {}", societies.join(", "));
    }

    let owner = Owner::member(crsid);
    let domains = DomainRepo::list_by_owner(&app.pool, owner.kind.as_str(), &owner.name).await?;
    for d in &domains {
        println!(
            "domain:       {} -> {}",
            d.domain,
            d.docroot.as_deref().unwrap_or("default root")
        );
    }
    let grants =
        GrantRepo::list_by_owner(&app.pool, owner.kind.as_str(), &owner.name, None).await?;
    for g in &grants {
        println!("database:     {} ({})", g.database_name, g.engine);
    }

    Ok(ExitCode::SUCCESS)
}
