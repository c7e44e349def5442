//! Repository for the `domains` table.

use sqlx::PgExecutor;

use crate::models::domain::{CreateDomain, Domain};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, owner_kind, owner_name, domain, docroot, wildcard, created_at, updated_at";

/// Provides CRUD operations for hosted domains.
pub struct DomainRepo;

impl DomainRepo {
    /// Insert a new domain row, returning it.
    pub async fn create(
        exec: impl PgExecutor<'_>,
        input: &CreateDomain,
    ) -> Result<Domain, sqlx::Error> {
        let query = format!(
            "INSERT INTO domains (owner_kind, owner_name, domain, docroot, wildcard) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Domain>(&query)
            .bind(&input.owner_kind)
            .bind(&input.owner_name)
            .bind(&input.domain)
            .bind(&input.docroot)
            .bind(input.wildcard)
            .fetch_one(exec)
            .await
    }

    /// Find a domain row by hostname.
    pub async fn find_by_domain(
        exec: impl PgExecutor<'_>,
        domain: &str,
    ) -> Result<Option<Domain>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM domains WHERE domain = $1");
        sqlx::query_as::<_, Domain>(&query)
            .bind(domain)
            .fetch_optional(exec)
            .await
    }

    /// List an owner's domains ordered by hostname.
    pub async fn list_by_owner(
        exec: impl PgExecutor<'_>,
        owner_kind: &str,
        owner_name: &str,
    ) -> Result<Vec<Domain>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM domains \
             WHERE owner_kind = $1 AND owner_name = $2 ORDER BY domain"
        );
        sqlx::query_as::<_, Domain>(&query)
            .bind(owner_kind)
            .bind(owner_name)
            .fetch_all(exec)
            .await
    }

    /// Change a domain's docroot. Returns `false` when the domain is
    /// unknown.
    pub async fn set_docroot(
        exec: impl PgExecutor<'_>,
        domain: &str,
        docroot: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE domains SET docroot = $2, updated_at = NOW() WHERE domain = $1",
        )
        .bind(domain)
        .bind(docroot)
        .execute(exec)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a domain row. Returns `false` when the domain is unknown.
    pub async fn remove(exec: impl PgExecutor<'_>, domain: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM domains WHERE domain = $1")
            .bind(domain)
            .execute(exec)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
