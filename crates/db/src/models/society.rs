//! Society entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use scf_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// Full society row from the `societies` table.
///
/// Admin membership lives in the `society_admins` join table and is
/// fetched separately.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Society {
    /// Short name; primary key and UNIX account name.
    pub name: String,
    /// Human-readable society title, e.g. "Chess Club".
    pub description: String,
    /// Shared contact address used instead of individual admin addresses
    /// when set.
    pub role_email: Option<String>,
    pub status_id: StatusId,
    /// Dangerous-account flag: jobs touching this society require
    /// sysadmin approval before they run.
    pub danger: bool,
    pub uid: Option<DbId>,
    pub gid: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new society row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSociety {
    pub name: String,
    pub description: String,
    pub role_email: Option<String>,
}

/// DTO for updating an existing society. Only non-`None` fields apply.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSociety {
    pub description: Option<String>,
    pub role_email: Option<String>,
    pub danger: Option<bool>,
}
