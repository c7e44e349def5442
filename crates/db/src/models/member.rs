//! Member entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use scf_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// Full member row from the `members` table.
///
/// `uid`/`gid` are NULL until the UNIX account is provisioned by a
/// signup (or reactivation of a pre-UNIX record).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Member {
    pub crsid: String,
    pub preferred_name: String,
    pub surname: String,
    pub email: String,
    /// Delivery option for the facility address; see `scf_core::MailHandler`.
    pub mail_handler: String,
    pub status_id: StatusId,
    /// Whether the member consented to facility announcements.
    pub contactable: bool,
    /// Dangerous-account flag: jobs touching this member require
    /// sysadmin approval before they run.
    pub danger: bool,
    pub uid: Option<DbId>,
    pub gid: Option<DbId>,
    pub notes: String,
    pub joined_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Member {
    /// Name used in salutations and account records.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.preferred_name, self.surname)
    }
}

/// DTO for inserting a new member row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMember {
    pub crsid: String,
    pub preferred_name: String,
    pub surname: String,
    pub email: String,
    pub mail_handler: String,
}

/// DTO for updating an existing member. Only non-`None` fields apply.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMember {
    pub preferred_name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub mail_handler: Option<String>,
    pub contactable: Option<bool>,
    pub danger: Option<bool>,
    pub notes: Option<String>,
}

/// Query parameters for member listings.
#[derive(Debug, Default, Deserialize)]
pub struct MemberListQuery {
    pub status_id: Option<StatusId>,
    /// Maximum number of results. Defaults to 50, capped at 500.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
