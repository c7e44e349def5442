//! `scf-admin job` subcommands: queue inspection and control.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use scf_db::models::job::JobListQuery;
use scf_db::models::status::JobState;
use scf_db::repositories::JobRepo;

use super::{level_name, report, state_name, EXIT_FAILED};
use crate::app::App;
use crate::cli::JobCommand;

pub async fn run(app: &App, command: JobCommand) -> anyhow::Result<ExitCode> {
    match command {
        JobCommand::Show { id } => show(app, id).await,
        JobCommand::Logs { id } => logs(app, id).await,
        JobCommand::List {
            state,
            actor,
            limit,
        } => list(app, state.as_deref(), actor, limit).await,
        JobCommand::Approve { id } => {
            if JobRepo::approve(&app.pool, id).await? {
                println!("job {id} queued");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("job {id} is not awaiting approval");
                Ok(ExitCode::from(EXIT_FAILED))
            }
        }
        JobCommand::Withdraw { id } => {
            if JobRepo::withdraw(&app.pool, id).await? {
                println!("job {id} withdrawn");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("job {id} has already started or finished; it cannot be withdrawn");
                Ok(ExitCode::from(EXIT_FAILED))
            }
        }
        JobCommand::Run { id } => {
            let outcome = app.runner.run_job(id).await?;
            report(app, id, outcome).await
        }
        JobCommand::Queue { interval } => queue(app, interval).await,
    }
}

async fn show(app: &App, id: i64) -> anyhow::Result<ExitCode> {
    let job = JobRepo::find_by_id(&app.pool, id)
        .await?
        .with_context(|| format!("no job {id}"))?;

    println!("id:          {}", job.id);
    println!("kind:        {}", job.kind);
    println!("state:       {}", state_name(job.state_id));
    println!(
        "actor:       {}",
        job.actor_crsid.as_deref().unwrap_or("self-service")
    );
    println!("environment: {}", job.environment);
    println!("args:        {}", job.args);
    println!("created:     {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(claimed) = job.claimed_at {
        println!("claimed:     {}", claimed.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(completed) = job.completed_at {
        println!("completed:   {}", completed.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(message) = &job.state_message {
        println!("message:     {message}");
    }
    Ok(ExitCode::SUCCESS)
}

async fn logs(app: &App, id: i64) -> anyhow::Result<ExitCode> {
    let entries = JobRepo::logs(&app.pool, id).await?;
    if entries.is_empty() {
        println!("no log entries for job {id}");
        return Ok(ExitCode::SUCCESS);
    }
    for entry in entries {
        println!(
            "{} [{}] {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            level_name(entry.level_id),
            entry.message
        );
        if let Some(detail) = &entry.detail {
            for line in detail.lines() {
                println!("    {line}");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_state(name: &str) -> anyhow::Result<JobState> {
    match name {
        "unapproved" => Ok(JobState::Unapproved),
        "queued" => Ok(JobState::Queued),
        "running" => Ok(JobState::Running),
        "done" => Ok(JobState::Done),
        "failed" => Ok(JobState::Failed),
        "withdrawn" => Ok(JobState::Withdrawn),
        other => anyhow::bail!("unknown job state: {other}"),
    }
}

async fn list(
    app: &App,
    state: Option<&str>,
    actor: Option<String>,
    limit: Option<i64>,
) -> anyhow::Result<ExitCode> {
    let query = JobListQuery {
        state_id: state.map(parse_state).transpose()?.map(|s| s.id()),
        actor_crsid: actor,
        limit,
        offset: None,
    };
    let jobs = JobRepo::list(&app.pool, &query).await?;
    for job in jobs {
        println!(
            "{:>6}  {:<10}  {:<28}  {}  {}",
            job.id,
            state_name(job.state_id),
            job.kind,
            job.created_at.format("%Y-%m-%d %H:%M"),
            job.actor_crsid.as_deref().unwrap_or("self-service"),
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Poll the queue until interrupted. ctrl-c finishes the job in hand
/// and stops cleanly.
async fn queue(app: &App, interval: u64) -> anyhow::Result<ExitCode> {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    app.runner
        .run_queue(Duration::from_secs(interval), cancel)
        .await?;
    Ok(ExitCode::SUCCESS)
}
