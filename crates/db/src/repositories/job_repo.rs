//! Repository for the `jobs` and `job_log` tables.
//!
//! State transitions are one-directional and enforced in SQL: every
//! UPDATE is guarded by the expected current state, so a job that has
//! already moved on is simply not matched. No transition is ever
//! retried by this layer.

use sqlx::{PgExecutor, PgPool};

use scf_core::types::DbId;

use crate::models::job::{Job, JobListQuery, SubmitJob};
use crate::models::job_log::JobLogEntry;
use crate::models::status::{JobState, LogLevel, StatusId};

/// Column list for `jobs` queries.
const COLUMNS: &str = "id, kind, state_id, actor_crsid, args, environment, state_message, \
                       created_at, claimed_at, completed_at, updated_at";

/// Column list for `job_log` queries.
const LOG_COLUMNS: &str = "id, job_id, level_id, message, detail, created_at";

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

/// Unstarted states: the only states a job may be withdrawn from.
const UNSTARTED_STATES: [StatusId; 2] = [
    JobState::Unapproved as StatusId,
    JobState::Queued as StatusId,
];

/// Provides lifecycle operations for jobs and their audit trail.
pub struct JobRepo;

impl JobRepo {
    /// Create a new job. Jobs needing approval start `unapproved`,
    /// everything else starts `queued`.
    pub async fn submit(exec: impl PgExecutor<'_>, input: &SubmitJob) -> Result<Job, sqlx::Error> {
        let state = if input.requires_approval {
            JobState::Unapproved
        } else {
            JobState::Queued
        };
        let query = format!(
            "INSERT INTO jobs (kind, state_id, actor_crsid, args, environment) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(&input.kind)
            .bind(state.id())
            .bind(&input.actor_crsid)
            .bind(&input.args)
            .bind(&input.environment)
            .fetch_one(exec)
            .await
    }

    /// Find a job by its ID.
    pub async fn find_by_id(
        exec: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(exec)
            .await
    }

    /// List jobs with optional state/actor filters and pagination,
    /// newest first.
    pub async fn list(
        exec: impl PgExecutor<'_>,
        params: &JobListQuery,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if params.state_id.is_some() {
            conditions.push(format!("state_id = ${bind_idx}"));
            bind_idx += 1;
        }

        if params.actor_crsid.is_some() {
            conditions.push(format!("actor_crsid = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Job>(&query);

        if let Some(sid) = params.state_id {
            q = q.bind(sid);
        }
        if let Some(actor) = &params.actor_crsid {
            q = q.bind(actor);
        }

        q = q.bind(limit).bind(offset);

        q.fetch_all(exec).await
    }

    /// Approve a held job (`unapproved -> queued`). Returns `true` if
    /// the job transitioned.
    pub async fn approve(exec: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs SET state_id = $2, updated_at = NOW() \
             WHERE id = $1 AND state_id = $3",
        )
        .bind(id)
        .bind(JobState::Queued.id())
        .bind(JobState::Unapproved.id())
        .execute(exec)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Withdraw an unstarted job. Returns `true` if the job
    /// transitioned; `false` means it had already been claimed or
    /// finished and cannot be withdrawn.
    pub async fn withdraw(exec: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs \
             SET state_id = $2, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND state_id = ANY($3)",
        )
        .bind(id)
        .bind(JobState::Withdrawn.id())
        .bind(&UNSTARTED_STATES[..])
        .execute(exec)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomically claim the oldest queued job (`queued -> running`).
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so independent queue runners
    /// never double-claim a job.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET state_id = $1, claimed_at = NOW(), updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM jobs \
                 WHERE state_id = $2 \
                 ORDER BY created_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobState::Running.id())
            .bind(JobState::Queued.id())
            .fetch_optional(pool)
            .await
    }

    /// Claim one specific queued job (`queued -> running`). Returns
    /// `None` if it was not queued, so a withdrawn or already-running
    /// job is never run.
    pub async fn claim(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET state_id = $2, claimed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND state_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(JobState::Running.id())
            .bind(JobState::Queued.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a running job `done`. Takes an executor so the terminal
    /// state commits in the same transaction as the entity mutations
    /// the job made. Returns `true` if the job transitioned.
    pub async fn complete(
        exec: impl PgExecutor<'_>,
        id: DbId,
        message: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs \
             SET state_id = $2, state_message = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND state_id = $4",
        )
        .bind(id)
        .bind(JobState::Done.id())
        .bind(message)
        .bind(JobState::Running.id())
        .execute(exec)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a running job `failed`, preserving the causing error.
    ///
    /// Takes the pool, not an executor: failure is recorded after the
    /// job's transaction has been rolled back. Returns `true` if the
    /// job transitioned.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs \
             SET state_id = $2, state_message = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND state_id = $4",
        )
        .bind(id)
        .bind(JobState::Failed.id())
        .bind(error)
        .bind(JobState::Running.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Audit trail
    // -----------------------------------------------------------------------

    /// Append one log entry to a job's audit trail.
    pub async fn append_log(
        exec: impl PgExecutor<'_>,
        job_id: DbId,
        level: LogLevel,
        message: &str,
        detail: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO job_log (job_id, level_id, message, detail) VALUES ($1, $2, $3, $4)")
            .bind(job_id)
            .bind(level.id())
            .bind(message)
            .bind(detail)
            .execute(exec)
            .await?;
        Ok(())
    }

    /// Fetch a job's audit trail in insertion order.
    pub async fn logs(
        exec: impl PgExecutor<'_>,
        job_id: DbId,
    ) -> Result<Vec<JobLogEntry>, sqlx::Error> {
        let query = format!("SELECT {LOG_COLUMNS} FROM job_log WHERE job_id = $1 ORDER BY id");
        sqlx::query_as::<_, JobLogEntry>(&query)
            .bind(job_id)
            .fetch_all(exec)
            .await
    }
}
