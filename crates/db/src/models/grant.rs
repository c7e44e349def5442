//! Database grant records.
//!
//! One row per database provisioned on an external cluster for a member
//! or society. The membership schema records only that the database
//! exists and who owns it; credentials live nowhere.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use scf_core::types::{DbId, Timestamp};

/// Cluster engine discriminator values for `database_grants.engine`.
pub const ENGINE_MYSQL: &str = "mysql";
pub const ENGINE_POSTGRES: &str = "postgres";

/// A provisioned-database record from the `database_grants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DatabaseGrant {
    pub id: DbId,
    /// `"member"` or `"society"`; see `scf_core::OwnerKind`.
    pub owner_kind: String,
    pub owner_name: String,
    /// `"mysql"` or `"postgres"`.
    pub engine: String,
    pub database_name: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a new grant row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGrant {
    pub owner_kind: String,
    pub owner_name: String,
    pub engine: String,
    pub database_name: String,
}
