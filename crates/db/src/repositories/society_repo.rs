//! Repository for the `societies` and `society_admins` tables.

use sqlx::{PgConnection, PgExecutor};

use scf_core::types::DbId;

use crate::models::society::{CreateSociety, Society, UpdateSociety};
use crate::models::status::{MemberStatus, StatusId};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "name, description, role_email, status_id, danger, uid, gid, created_at, updated_at";

/// Provides CRUD operations for societies and their admin sets.
pub struct SocietyRepo;

impl SocietyRepo {
    /// Insert a new society row in the given status, returning it.
    pub async fn create(
        exec: impl PgExecutor<'_>,
        input: &CreateSociety,
        status: MemberStatus,
    ) -> Result<Society, sqlx::Error> {
        let query = format!(
            "INSERT INTO societies (name, description, role_email, status_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Society>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.role_email)
            .bind(status.id())
            .fetch_one(exec)
            .await
    }

    /// Find a society by short name.
    pub async fn find_by_name(
        exec: impl PgExecutor<'_>,
        name: &str,
    ) -> Result<Option<Society>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM societies WHERE name = $1");
        sqlx::query_as::<_, Society>(&query)
            .bind(name)
            .fetch_optional(exec)
            .await
    }

    /// List all societies ordered by name.
    pub async fn list(exec: impl PgExecutor<'_>) -> Result<Vec<Society>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM societies ORDER BY name");
        sqlx::query_as::<_, Society>(&query).fetch_all(exec).await
    }

    /// Update a society. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given name exists.
    pub async fn update(
        exec: impl PgExecutor<'_>,
        name: &str,
        input: &UpdateSociety,
    ) -> Result<Option<Society>, sqlx::Error> {
        let query = format!(
            "UPDATE societies SET \
                description = COALESCE($2, description), \
                role_email = COALESCE($3, role_email), \
                danger = COALESCE($4, danger), \
                updated_at = NOW() \
             WHERE name = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Society>(&query)
            .bind(name)
            .bind(&input.description)
            .bind(&input.role_email)
            .bind(input.danger)
            .fetch_optional(exec)
            .await
    }

    /// Set or clear a society's role address. Separate from [`update`]
    /// because COALESCE cannot express clearing to NULL.
    ///
    /// Returns `false` when no row with the given name exists.
    ///
    /// [`update`]: SocietyRepo::update
    pub async fn set_role_email(
        exec: impl PgExecutor<'_>,
        name: &str,
        role_email: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE societies SET role_email = $2, updated_at = NOW() WHERE name = $1",
        )
        .bind(name)
        .bind(role_email)
        .execute(exec)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a society between statuses, guarded by the expected current
    /// statuses. Returns `true` if the row transitioned.
    pub async fn set_status(
        exec: impl PgExecutor<'_>,
        name: &str,
        from: &[MemberStatus],
        to: MemberStatus,
    ) -> Result<bool, sqlx::Error> {
        let from_ids: Vec<StatusId> = from.iter().map(|s| s.id()).collect();
        let result = sqlx::query(
            "UPDATE societies SET status_id = $3, updated_at = NOW() \
             WHERE name = $1 AND status_id = ANY($2)",
        )
        .bind(name)
        .bind(from_ids)
        .bind(to.id())
        .execute(exec)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Assign uid/gid from the society sequence if not already assigned.
    ///
    /// Always consumes a sequence value; gaps in the sequence are
    /// harmless.
    pub async fn allocate_ids(
        exec: impl PgExecutor<'_>,
        name: &str,
    ) -> Result<(DbId, DbId), sqlx::Error> {
        sqlx::query_as::<_, (DbId, DbId)>(
            "WITH alloc AS (SELECT nextval('society_uid_seq') AS next_uid) \
             UPDATE societies \
                SET uid = COALESCE(societies.uid, alloc.next_uid), \
                    gid = COALESCE(societies.gid, societies.uid, alloc.next_uid), \
                    updated_at = NOW() \
               FROM alloc \
              WHERE name = $1 \
             RETURNING uid, gid",
        )
        .bind(name)
        .fetch_one(exec)
        .await
    }

    /// Rename a society's primary identifier and rewrite dependent rows.
    ///
    /// Runs several statements; call inside the job transaction. The
    /// `society_admins` FK cascades on its own; polymorphic owner rows
    /// (domains, grants) are rewritten here. Returns `false` when no
    /// society named `old` exists.
    pub async fn rename(
        conn: &mut PgConnection,
        old: &str,
        new: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE societies SET name = $2, updated_at = NOW() WHERE name = $1",
        )
        .bind(old)
        .bind(new)
        .execute(&mut *conn)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE domains SET owner_name = $2, updated_at = NOW() \
             WHERE owner_kind = 'society' AND owner_name = $1",
        )
        .bind(old)
        .bind(new)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            "UPDATE database_grants SET owner_name = $2 \
             WHERE owner_kind = 'society' AND owner_name = $1",
        )
        .bind(old)
        .bind(new)
        .execute(&mut *conn)
        .await?;

        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Admin set
    // -----------------------------------------------------------------------

    /// Add a member to a society's admin set. Returns `false` if they
    /// were already an admin.
    pub async fn add_admin(
        exec: impl PgExecutor<'_>,
        name: &str,
        crsid: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO society_admins (society_name, crsid) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(name)
        .bind(crsid)
        .execute(exec)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a member from a society's admin set. Returns `false` if
    /// they were not an admin.
    pub async fn remove_admin(
        exec: impl PgExecutor<'_>,
        name: &str,
        crsid: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM society_admins WHERE society_name = $1 AND crsid = $2")
                .bind(name)
                .bind(crsid)
                .execute(exec)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the crsids administering a society, ordered for stable output.
    pub async fn admins(
        exec: impl PgExecutor<'_>,
        name: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT crsid FROM society_admins WHERE society_name = $1 ORDER BY crsid",
        )
        .bind(name)
        .fetch_all(exec)
        .await?;
        Ok(rows.into_iter().map(|(crsid,)| crsid).collect())
    }

    /// List the societies a member administers.
    pub async fn administered_by(
        exec: impl PgExecutor<'_>,
        crsid: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT society_name FROM society_admins WHERE crsid = $1 ORDER BY society_name",
        )
        .bind(crsid)
        .fetch_all(exec)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Whether a member administers a society.
    pub async fn is_admin(
        exec: impl PgExecutor<'_>,
        name: &str,
        crsid: &str,
    ) -> Result<bool, sqlx::Error> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM society_admins WHERE society_name = $1 AND crsid = $2",
        )
        .bind(name)
        .bind(crsid)
        .fetch_one(exec)
        .await?;
        Ok(row.0 > 0)
    }
}
