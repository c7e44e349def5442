//! Job entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use scf_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `jobs` table: one recorded administrative action.
///
/// `args` holds the kind-specific arguments as JSON; `scf-jobs` owns the
/// mapping between `kind` strings and typed argument structs. Once a job
/// reaches a terminal state the row is never written again.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub kind: String,
    pub state_id: StatusId,
    /// Requesting member; NULL for self-service signup applications.
    pub actor_crsid: Option<String>,
    pub args: serde_json::Value,
    /// Deployment tag recorded at submission, e.g. `live` or `test`.
    pub environment: String,
    /// Terminal detail: error text for failed jobs, summary otherwise.
    pub state_message: Option<String>,
    pub created_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// DTO for submitting a new job.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitJob {
    pub kind: String,
    pub actor_crsid: Option<String>,
    pub args: serde_json::Value,
    pub environment: String,
    /// When true the job is created `unapproved` and held for sysadmin
    /// approval; otherwise it is created `queued`.
    pub requires_approval: bool,
}

/// Query parameters for job listings.
#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    pub state_id: Option<StatusId>,
    pub actor_crsid: Option<String>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
