//! Job audit-trail entries. Immutable once created (no updated_at).

use serde::Serialize;
use sqlx::FromRow;

use scf_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A single job log entry from the `job_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobLogEntry {
    pub id: DbId,
    pub job_id: DbId,
    pub level_id: StatusId,
    pub message: String,
    /// Raw output captured from a host command, when there was any.
    pub detail: Option<String>,
    pub created_at: Timestamp,
}
