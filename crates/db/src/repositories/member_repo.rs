//! Repository for the `members` table.

use sqlx::PgExecutor;

use scf_core::types::DbId;

use crate::models::member::{CreateMember, Member, MemberListQuery, UpdateMember};
use crate::models::status::{MemberStatus, StatusId};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "crsid, preferred_name, surname, email, mail_handler, status_id, \
                       contactable, danger, uid, gid, notes, joined_at, created_at, updated_at";

/// Maximum page size for member listing.
const MAX_LIMIT: i64 = 500;

/// Default page size for member listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for members.
pub struct MemberRepo;

impl MemberRepo {
    /// Insert a new member row in the given status, returning it.
    pub async fn create(
        exec: impl PgExecutor<'_>,
        input: &CreateMember,
        status: MemberStatus,
    ) -> Result<Member, sqlx::Error> {
        let query = format!(
            "INSERT INTO members (crsid, preferred_name, surname, email, mail_handler, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(&input.crsid)
            .bind(&input.preferred_name)
            .bind(&input.surname)
            .bind(&input.email)
            .bind(&input.mail_handler)
            .bind(status.id())
            .fetch_one(exec)
            .await
    }

    /// Find a member by crsid.
    pub async fn find_by_crsid(
        exec: impl PgExecutor<'_>,
        crsid: &str,
    ) -> Result<Option<Member>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM members WHERE crsid = $1");
        sqlx::query_as::<_, Member>(&query)
            .bind(crsid)
            .fetch_optional(exec)
            .await
    }

    /// List members with optional status filter and pagination.
    pub async fn list(
        exec: impl PgExecutor<'_>,
        params: &MemberListQuery,
    ) -> Result<Vec<Member>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let query = if params.status_id.is_some() {
            format!(
                "SELECT {COLUMNS} FROM members WHERE status_id = $1 \
                 ORDER BY crsid LIMIT $2 OFFSET $3"
            )
        } else {
            format!("SELECT {COLUMNS} FROM members ORDER BY crsid LIMIT $1 OFFSET $2")
        };

        let mut q = sqlx::query_as::<_, Member>(&query);
        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        q.bind(limit).bind(offset).fetch_all(exec).await
    }

    /// Update a member. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given crsid exists.
    pub async fn update(
        exec: impl PgExecutor<'_>,
        crsid: &str,
        input: &UpdateMember,
    ) -> Result<Option<Member>, sqlx::Error> {
        let query = format!(
            "UPDATE members SET \
                preferred_name = COALESCE($2, preferred_name), \
                surname = COALESCE($3, surname), \
                email = COALESCE($4, email), \
                mail_handler = COALESCE($5, mail_handler), \
                contactable = COALESCE($6, contactable), \
                danger = COALESCE($7, danger), \
                notes = COALESCE($8, notes), \
                updated_at = NOW() \
             WHERE crsid = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(crsid)
            .bind(&input.preferred_name)
            .bind(&input.surname)
            .bind(&input.email)
            .bind(&input.mail_handler)
            .bind(input.contactable)
            .bind(input.danger)
            .bind(&input.notes)
            .fetch_optional(exec)
            .await
    }

    /// Move a member between statuses, guarded by the expected current
    /// statuses. Returns `true` if the row transitioned.
    pub async fn set_status(
        exec: impl PgExecutor<'_>,
        crsid: &str,
        from: &[MemberStatus],
        to: MemberStatus,
    ) -> Result<bool, sqlx::Error> {
        let from_ids: Vec<StatusId> = from.iter().map(|s| s.id()).collect();
        let result = sqlx::query(
            "UPDATE members SET status_id = $3, updated_at = NOW() \
             WHERE crsid = $1 AND status_id = ANY($2)",
        )
        .bind(crsid)
        .bind(from_ids)
        .bind(to.id())
        .execute(exec)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Assign uid/gid from the member sequence if not already assigned.
    ///
    /// Members get matching uid and gid. Always consumes a sequence
    /// value; gaps in the sequence are harmless.
    pub async fn allocate_ids(
        exec: impl PgExecutor<'_>,
        crsid: &str,
    ) -> Result<(DbId, DbId), sqlx::Error> {
        sqlx::query_as::<_, (DbId, DbId)>(
            "WITH alloc AS (SELECT nextval('member_uid_seq') AS next_uid) \
             UPDATE members \
                SET uid = COALESCE(members.uid, alloc.next_uid), \
                    gid = COALESCE(members.gid, members.uid, alloc.next_uid), \
                    updated_at = NOW() \
               FROM alloc \
              WHERE crsid = $1 \
             RETURNING uid, gid",
        )
        .bind(crsid)
        .fetch_one(exec)
        .await
    }
}
