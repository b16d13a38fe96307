/*
 * Responsibility
 * - SQLx access to the `contacts` table (contact form submissions)
 * - Filtered/paginated listing, statistics, read/replied bookkeeping, bulk operations
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct ContactRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
    pub is_read: bool,
    pub replied: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
}

/// `None` means "do not filter on this column".
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    pub is_read: Option<bool>,
    pub service: Option<String>,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct ContactStats {
    pub total: i64,
    pub unread: i64,
    pub read: i64,
    pub replied: i64,
    pub this_month: i64,
}

/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub is_read: Option<bool>,
    pub replied: Option<bool>,
    pub notes: Option<String>,
}

pub async fn create(db: &PgPool, c: &NewContact) -> RepoResult<ContactRow> {
    let row = sqlx::query_as::<_, ContactRow>(
        r#"
        INSERT INTO contacts (first_name, last_name, email, phone, service, message)
        VALUES ($1, $2, lower($3), $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&c.first_name)
    .bind(&c.last_name)
    .bind(&c.email)
    .bind(&c.phone)
    .bind(&c.service)
    .bind(&c.message)
    .fetch_one(db)
    .await?;

    Ok(row)
}

/// One page of contacts (newest first) plus the number of rows matching the filter.
pub async fn list(
    db: &PgPool,
    filter: &ContactFilter,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<ContactRow>, i64)> {
    let rows = sqlx::query_as::<_, ContactRow>(
        r#"
        SELECT *
        FROM contacts
        WHERE ($1::bool IS NULL OR is_read = $1)
          AND ($2::text IS NULL OR service = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(filter.is_read)
    .bind(filter.service.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM contacts
        WHERE ($1::bool IS NULL OR is_read = $1)
          AND ($2::text IS NULL OR service = $2)
        "#,
    )
    .bind(filter.is_read)
    .bind(filter.service.as_deref())
    .fetch_one(db)
    .await?;

    Ok((rows, total))
}

pub async fn recent(db: &PgPool, limit: i64) -> RepoResult<Vec<ContactRow>> {
    let rows = sqlx::query_as::<_, ContactRow>(
        r#"
        SELECT *
        FROM contacts
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn stats(db: &PgPool) -> RepoResult<ContactStats> {
    let stats = sqlx::query_as::<_, ContactStats>(
        r#"
        SELECT
            COUNT(*)                                                    AS total,
            COUNT(*) FILTER (WHERE NOT is_read)                         AS unread,
            COUNT(*) FILTER (WHERE is_read)                             AS read,
            COUNT(*) FILTER (WHERE replied)                             AS replied,
            COUNT(*) FILTER (WHERE created_at >= date_trunc('month', now())) AS this_month
        FROM contacts
        "#,
    )
    .fetch_one(db)
    .await?;

    Ok(stats)
}

/// Fetch and flag as read in one statement (viewing a message marks it read).
pub async fn get_and_mark_read(db: &PgPool, id: i64) -> RepoResult<Option<ContactRow>> {
    let row = sqlx::query_as::<_, ContactRow>(
        r#"
        UPDATE contacts
        SET is_read = true,
            updated_at = CASE WHEN is_read THEN updated_at ELSE now() END
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn update(db: &PgPool, id: i64, patch: &ContactPatch) -> RepoResult<Option<ContactRow>> {
    let row = sqlx::query_as::<_, ContactRow>(
        r#"
        UPDATE contacts
        SET is_read = COALESCE($2, is_read),
            replied = COALESCE($3, replied),
            notes = COALESCE($4, notes),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(patch.is_read)
    .bind(patch.replied)
    .bind(patch.notes.as_deref())
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(r#"DELETE FROM contacts WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn mark_read_many(db: &PgPool, ids: &[i64]) -> RepoResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE contacts
        SET is_read = true, updated_at = now()
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_many(db: &PgPool, ids: &[i64]) -> RepoResult<u64> {
    let result = sqlx::query(r#"DELETE FROM contacts WHERE id = ANY($1)"#)
        .bind(ids)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}
