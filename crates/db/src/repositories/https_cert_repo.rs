//! Repository for the `https_certs` table.

use sqlx::PgExecutor;

use crate::models::domain::HttpsCert;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, domain, created_at";

/// Provides create/remove operations for per-domain certificates.
pub struct HttpsCertRepo;

impl HttpsCertRepo {
    /// Record a certificate for a domain, returning the row. Repeated
    /// calls for the same domain return the existing row.
    pub async fn create(
        exec: impl PgExecutor<'_>,
        domain: &str,
    ) -> Result<HttpsCert, sqlx::Error> {
        let query = format!(
            "INSERT INTO https_certs (domain) VALUES ($1) \
             ON CONFLICT (domain) DO UPDATE SET domain = EXCLUDED.domain \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HttpsCert>(&query)
            .bind(domain)
            .fetch_one(exec)
            .await
    }

    /// Find the certificate record for a domain.
    pub async fn find_by_domain(
        exec: impl PgExecutor<'_>,
        domain: &str,
    ) -> Result<Option<HttpsCert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM https_certs WHERE domain = $1");
        sqlx::query_as::<_, HttpsCert>(&query)
            .bind(domain)
            .fetch_optional(exec)
            .await
    }

    /// Delete the certificate record for a domain. Returns `false` when
    /// none exists.
    pub async fn remove(exec: impl PgExecutor<'_>, domain: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM https_certs WHERE domain = $1")
            .bind(domain)
            .execute(exec)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
