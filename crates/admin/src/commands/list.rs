//! `scf-admin list` subcommands.

use std::process::ExitCode;

use scf_jobs::spec::ListArgs;
use scf_jobs::JobSpec;

use super::submit_and_run;
use crate::app::App;
use crate::cli::ListCommand;

pub async fn run(app: &App, command: ListCommand) -> anyhow::Result<ExitCode> {
    match command {
        ListCommand::Create { owner, suffix } => {
            let owner = owner.owner()?;
            submit_and_run(app, JobSpec::CreateMailingList(ListArgs { owner, suffix })).await
        }
        ListCommand::ResetPassword { owner, suffix } => {
            let owner = owner.owner()?;
            submit_and_run(
                app,
                JobSpec::ResetMailingListPassword(ListArgs { owner, suffix }),
            )
            .await
        }
    }
}
