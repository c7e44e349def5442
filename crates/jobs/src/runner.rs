//! The job runner.
//!
//! Claims queued jobs and executes their steps. Each run follows the
//! same shape:
//!
//! 1. claim the job (`queued -> running`, guarded in SQL)
//! 2. open a transaction on the membership database
//! 3. run the kind's steps: precondition checks, then ordered effects
//! 4. on success, mark the job `done` and persist the buffered audit
//!    log inside the same transaction, then commit
//! 5. send queued notifications best-effort after the commit
//!
//! On any step error the transaction is dropped, so entity mutations
//! vanish, and the job is marked `failed` through the pool with the
//! causing error and the buffered log. Host and cluster effects that
//! already ran are not undone; steps are written so a re-run skips or
//! repeats them safely.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgConnection;
use tokio_util::sync::CancellationToken;

use scf_core::types::DbId;
use scf_db::models::job::Job;
use scf_db::models::status::LogLevel;
use scf_db::repositories::JobRepo;
use scf_db::DbPool;
use scf_mail::{Notifier, Outgoing};
use scf_provision::DbCluster;
use scf_system::SystemBackend;

use crate::error::JobError;
use crate::spec::{Engine, JobSpec};
use crate::steps;

/// How a finished run ended, for operator exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// All effects completed; the job is `done`.
    Done,
    /// An effect raised; the job is `failed` with the error recorded.
    Failed,
    /// The subject was already in a conflicting state; the job is
    /// `failed` with a precondition message and no effect was executed.
    PreconditionFailed,
}

/// One buffered audit-log line, persisted when the run settles.
pub(crate) struct BufferedLog {
    pub(crate) level: LogLevel,
    pub(crate) message: String,
    pub(crate) detail: Option<String>,
}

/// Everything a job's steps may touch besides the transaction itself.
///
/// Log lines and notifications are buffered here rather than written
/// eagerly: logs are persisted whatever the outcome, notifications are
/// sent only after the transaction commits.
pub(crate) struct RunCtx<'r> {
    pub(crate) backend: &'r dyn SystemBackend,
    mysql: Option<&'r dyn DbCluster>,
    postgres: Option<&'r dyn DbCluster>,
    logs: Vec<BufferedLog>,
    mail: Vec<Outgoing>,
}

impl<'r> RunCtx<'r> {
    fn new(
        backend: &'r dyn SystemBackend,
        mysql: Option<&'r dyn DbCluster>,
        postgres: Option<&'r dyn DbCluster>,
    ) -> Self {
        Self {
            backend,
            mysql,
            postgres,
            logs: Vec::new(),
            mail: Vec::new(),
        }
    }

    /// The cluster for an engine, or an error recorded on the job when
    /// this deployment has none configured.
    pub(crate) fn cluster(&self, engine: Engine) -> Result<&'r dyn DbCluster, JobError> {
        let cluster = match engine {
            Engine::Mysql => self.mysql,
            Engine::Postgres => self.postgres,
        };
        cluster.ok_or_else(|| {
            JobError::Unavailable(format!("no {} cluster configured", engine.as_str()))
        })
    }

    pub(crate) fn info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message, None);
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message, None);
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message, None);
    }

    pub(crate) fn log(
        &mut self,
        level: LogLevel,
        message: impl Into<String>,
        detail: Option<String>,
    ) {
        self.logs.push(BufferedLog {
            level,
            message: message.into(),
            detail,
        });
    }

    /// Queue a notification for delivery after the commit.
    pub(crate) fn notify(&mut self, message: Outgoing) {
        self.mail.push(message);
    }

    fn take_logs(&mut self) -> Vec<BufferedLog> {
        std::mem::take(&mut self.logs)
    }

    fn take_mail(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.mail)
    }
}

/// Claims and executes jobs against one membership database.
pub struct Runner {
    pool: DbPool,
    backend: Arc<dyn SystemBackend>,
    notifier: Arc<dyn Notifier>,
    mysql: Option<Arc<dyn DbCluster>>,
    postgres: Option<Arc<dyn DbCluster>>,
}

impl Runner {
    pub fn new(pool: DbPool, backend: Arc<dyn SystemBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            pool,
            backend,
            notifier,
            mysql: None,
            postgres: None,
        }
    }

    /// Attach the MySQL cluster used by database provisioning jobs.
    pub fn with_mysql(mut self, cluster: Arc<dyn DbCluster>) -> Self {
        self.mysql = Some(cluster);
        self
    }

    /// Attach the PostgreSQL cluster used by database provisioning jobs.
    pub fn with_postgres(mut self, cluster: Arc<dyn DbCluster>) -> Self {
        self.postgres = Some(cluster);
        self
    }

    /// Run one specific job. Errors if the job is not queued: an
    /// unapproved job must be approved first, and a terminal job is
    /// never revisited.
    pub async fn run_job(&self, id: DbId) -> Result<JobOutcome, JobError> {
        let Some(job) = JobRepo::claim(&self.pool, id).await? else {
            return Err(JobError::State(format!("job {id} is not queued")));
        };
        self.execute(job).await
    }

    /// Claim and run the oldest queued job, if there is one.
    pub async fn run_next(&self) -> Result<Option<JobOutcome>, JobError> {
        match JobRepo::claim_next(&self.pool).await? {
            Some(job) => Ok(Some(self.execute(job).await?)),
            None => Ok(None),
        }
    }

    /// Claim and run jobs until the queue is empty. Returns the number
    /// of jobs run.
    pub async fn run_pending(&self) -> Result<usize, JobError> {
        let mut count = 0;
        while self.run_next().await?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    /// Poll the queue until cancelled. Jobs that fail are recorded and
    /// left for the operator; only infrastructure errors (the
    /// membership database going away) end the loop.
    pub async fn run_queue(
        &self,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) -> Result<(), JobError> {
        tracing::info!(interval_secs = poll_interval.as_secs(), "Queue runner started");
        loop {
            self.run_pending().await?;
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Queue runner stopping");
                    return Ok(());
                }
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }
    }

    async fn execute(&self, job: Job) -> Result<JobOutcome, JobError> {
        tracing::info!(job_id = job.id, kind = %job.kind, "Job claimed");
        let mut ctx = RunCtx::new(
            &*self.backend,
            self.mysql.as_deref(),
            self.postgres.as_deref(),
        );

        match self.run_steps(&job, &mut ctx).await {
            Ok(summary) => {
                tracing::info!(job_id = job.id, %summary, "Job done");
                self.deliver(job.id, ctx.take_mail()).await;
                Ok(JobOutcome::Done)
            }
            Err(err) => {
                let outcome = if err.is_precondition() {
                    JobOutcome::PreconditionFailed
                } else {
                    JobOutcome::Failed
                };
                tracing::warn!(job_id = job.id, error = %err, "Job failed");
                let error_text = err.to_string();
                ctx.error(error_text.clone());
                self.persist_logs(job.id, ctx.take_logs()).await?;
                JobRepo::fail(&self.pool, job.id, &error_text).await?;
                Ok(outcome)
            }
        }
    }

    /// Execute the job's steps inside a transaction and commit the
    /// terminal state with the entity mutations. On `Err` the
    /// transaction is dropped and nothing it wrote survives.
    async fn run_steps(&self, job: &Job, ctx: &mut RunCtx<'_>) -> Result<String, JobError> {
        let spec = JobSpec::from_job(job)?;
        ctx.info(format!("Running: {}", spec.describe()));

        let mut tx = self.pool.begin().await?;
        let summary = steps::execute(&mut tx, ctx, &spec).await?;
        ctx.info(format!("Job complete: {summary}"));

        if !JobRepo::complete(&mut *tx, job.id, Some(&summary)).await? {
            return Err(JobError::State(format!(
                "job {} left the running state mid-run",
                job.id
            )));
        }
        for log in ctx.take_logs() {
            JobRepo::append_log(&mut *tx, job.id, log.level, &log.message, log.detail.as_deref())
                .await?;
        }
        tx.commit().await?;
        Ok(summary)
    }

    /// Send queued notifications. Best-effort by contract: a failed
    /// send is logged against the job and never changes its outcome.
    async fn deliver(&self, job_id: DbId, mail: Vec<Outgoing>) {
        for message in mail {
            if let Err(err) = self.notifier.send(&message).await {
                tracing::warn!(job_id, error = %err, subject = %message.subject, "Notification send failed");
                let note = format!("Notification failed ({}): {err}", message.subject);
                if let Err(db_err) =
                    JobRepo::append_log(&self.pool, job_id, LogLevel::Warning, &note, None).await
                {
                    tracing::warn!(job_id, error = %db_err, "Could not record notification failure");
                }
            }
        }
    }

    async fn persist_logs(&self, job_id: DbId, logs: Vec<BufferedLog>) -> Result<(), JobError> {
        let mut conn = self.pool.acquire().await?;
        let conn: &mut PgConnection = &mut conn;
        for log in logs {
            JobRepo::append_log(&mut *conn, job_id, log.level, &log.message, log.detail.as_deref())
                .await?;
        }
        Ok(())
    }
}
