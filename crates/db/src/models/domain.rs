//! Web hosting entity models: custom domains and their certificates.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use scf_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// A custom domain served for a member's or society's site.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Domain {
    pub id: DbId,
    /// `"member"` or `"society"`; see `scf_core::OwnerKind`.
    pub owner_kind: String,
    pub owner_name: String,
    pub domain: String,
    /// Path under the owner's web tree, when not the default docroot.
    pub docroot: Option<String>,
    pub wildcard: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new domain row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDomain {
    pub owner_kind: String,
    pub owner_name: String,
    pub domain: String,
    pub docroot: Option<String>,
    pub wildcard: bool,
}

// ---------------------------------------------------------------------------
// HTTPS certificate
// ---------------------------------------------------------------------------

/// A certificate issued for a hosted domain. Rows are created and
/// removed alongside the domain they cover, never updated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HttpsCert {
    pub id: DbId,
    pub domain: String,
    pub created_at: Timestamp,
}
