//! Repository for the `database_grants` table.

use sqlx::PgExecutor;

use crate::models::grant::{CreateGrant, DatabaseGrant};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_kind, owner_name, engine, database_name, created_at";

/// Provides operations for provisioned-database records.
pub struct GrantRepo;

impl GrantRepo {
    /// Record a provisioned database, returning the row.
    pub async fn create(
        exec: impl PgExecutor<'_>,
        input: &CreateGrant,
    ) -> Result<DatabaseGrant, sqlx::Error> {
        let query = format!(
            "INSERT INTO database_grants (owner_kind, owner_name, engine, database_name) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DatabaseGrant>(&query)
            .bind(&input.owner_kind)
            .bind(&input.owner_name)
            .bind(&input.engine)
            .bind(&input.database_name)
            .fetch_one(exec)
            .await
    }

    /// Whether a database of this name is already recorded on an engine.
    pub async fn exists(
        exec: impl PgExecutor<'_>,
        engine: &str,
        database_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM database_grants WHERE engine = $1 AND database_name = $2",
        )
        .bind(engine)
        .bind(database_name)
        .fetch_one(exec)
        .await?;
        Ok(row.0 > 0)
    }

    /// Delete a database record, reporting whether a row existed.
    pub async fn remove(
        exec: impl PgExecutor<'_>,
        engine: &str,
        database_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM database_grants WHERE engine = $1 AND database_name = $2")
                .bind(engine)
                .bind(database_name)
                .execute(exec)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List an owner's databases, optionally restricted to one engine.
    pub async fn list_by_owner(
        exec: impl PgExecutor<'_>,
        owner_kind: &str,
        owner_name: &str,
        engine: Option<&str>,
    ) -> Result<Vec<DatabaseGrant>, sqlx::Error> {
        let query = if engine.is_some() {
            format!(
                "SELECT {COLUMNS} FROM database_grants \
                 WHERE owner_kind = $1 AND owner_name = $2 AND engine = $3 \
                 ORDER BY engine, database_name"
            )
        } else {
            format!(
                "SELECT {COLUMNS} FROM database_grants \
                 WHERE owner_kind = $1 AND owner_name = $2 \
                 ORDER BY engine, database_name"
            )
        };

        let mut q = sqlx::query_as::<_, DatabaseGrant>(&query)
            .bind(owner_kind)
            .bind(owner_name);
        if let Some(engine) = engine {
            q = q.bind(engine);
        }
        q.fetch_all(exec).await
    }
}
