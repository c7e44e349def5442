//! Subcommand implementations.
//!
//! Mutating commands share one path: submit the job, and unless it was
//! held for approval, run it immediately and report the outcome. Exit
//! codes are scriptable: 0 done, 1 failed, 2 precondition violated,
//! 3 held for approval (or withdrawn before it could run).

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use scf_db::models::status::{JobState, LogLevel, MemberStatus, StatusId};
use scf_db::repositories::JobRepo;
use scf_jobs::{JobOutcome, JobSpec};

use crate::app::App;

pub mod database;
pub mod job;
pub mod list;
pub mod member;
pub mod society;
pub mod vhost;

pub const EXIT_DONE: u8 = 0;
pub const EXIT_FAILED: u8 = 1;
pub const EXIT_PRECONDITION: u8 = 2;
pub const EXIT_NOT_RUN: u8 = 3;

/// Submit a job and, when it queues, run it straight away.
pub async fn submit_and_run(app: &App, spec: JobSpec) -> anyhow::Result<ExitCode> {
    let job = scf_jobs::submit(
        &app.pool,
        &*app.backend,
        &*app.notifier,
        &spec,
        app.actor.as_deref(),
        &app.environment,
    )
    .await?;

    if job.state_id == JobState::Unapproved.id() {
        println!(
            "job {} held for sysadmin approval; release it with `scf-admin job approve {}`",
            job.id, job.id
        );
        return Ok(ExitCode::from(EXIT_NOT_RUN));
    }

    let outcome = app.runner.run_job(job.id).await?;
    report(app, job.id, outcome).await
}

/// Print a finished job's state message and map its outcome to an exit
/// code.
pub async fn report(app: &App, job_id: i64, outcome: JobOutcome) -> anyhow::Result<ExitCode> {
    let message = JobRepo::find_by_id(&app.pool, job_id)
        .await?
        .and_then(|j| j.state_message);

    let code = match outcome {
        JobOutcome::Done => {
            println!(
                "job {job_id} done: {}",
                message.as_deref().unwrap_or("ok")
            );
            EXIT_DONE
        }
        JobOutcome::PreconditionFailed => {
            println!(
                "job {job_id} not applicable: {}",
                message.as_deref().unwrap_or("precondition violated")
            );
            EXIT_PRECONDITION
        }
        JobOutcome::Failed => {
            println!(
                "job {job_id} FAILED: {}",
                message.as_deref().unwrap_or("unknown error")
            );
            println!("inspect it with `scf-admin job logs {job_id}`");
            EXIT_FAILED
        }
    };
    Ok(ExitCode::from(code))
}

/// Ask before an action that is hard to undo. `--yes` skips the prompt.
pub fn confirm(app: &App, prompt: &str) -> anyhow::Result<bool> {
    if app.assume_yes {
        return Ok(true);
    }
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

pub fn state_name(state_id: StatusId) -> &'static str {
    match state_id {
        id if id == JobState::Unapproved.id() => "unapproved",
        id if id == JobState::Queued.id() => "queued",
        id if id == JobState::Running.id() => "running",
        id if id == JobState::Done.id() => "done",
        id if id == JobState::Failed.id() => "failed",
        id if id == JobState::Withdrawn.id() => "withdrawn",
        _ => "unknown",
    }
}

pub fn status_name(status_id: StatusId) -> &'static str {
    match status_id {
        id if id == MemberStatus::New.id() => "new",
        id if id == MemberStatus::Normal.id() => "normal",
        id if id == MemberStatus::Cancelled.id() => "cancelled",
        _ => "unknown",
    }
}

pub fn level_name(level_id: StatusId) -> &'static str {
    match level_id {
        id if id == LogLevel::Debug.id() => "debug",
        id if id == LogLevel::Info.id() => "info",
        id if id == LogLevel::Warning.id() => "warning",
        id if id == LogLevel::Error.id() => "error",
        _ => "unknown",
    }
}
