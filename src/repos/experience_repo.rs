/*
 * Responsibility
 * - SQLx CRUD for the `experiences` table
 * - Ordering: sort_order ascending, most recent start first
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct ExperienceRow {
    pub id: i64,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ExperienceFields {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

pub async fn list_active(db: &PgPool) -> RepoResult<Vec<ExperienceRow>> {
    let rows = sqlx::query_as::<_, ExperienceRow>(
        r#"
        SELECT *
        FROM experiences
        WHERE is_active
        ORDER BY sort_order ASC, start_date DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn list_all(db: &PgPool) -> RepoResult<Vec<ExperienceRow>> {
    let rows = sqlx::query_as::<_, ExperienceRow>(
        r#"
        SELECT *
        FROM experiences
        ORDER BY sort_order ASC, start_date DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> RepoResult<Option<ExperienceRow>> {
    let row = sqlx::query_as::<_, ExperienceRow>(r#"SELECT * FROM experiences WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, f: &ExperienceFields) -> RepoResult<ExperienceRow> {
    let row = sqlx::query_as::<_, ExperienceRow>(
        r#"
        INSERT INTO experiences
            (job_title, company, location, start_date, end_date, description, sort_order, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&f.job_title)
    .bind(&f.company)
    .bind(&f.location)
    .bind(&f.start_date)
    .bind(&f.end_date)
    .bind(&f.description)
    .bind(f.sort_order)
    .bind(f.is_active)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: i64,
    f: &ExperienceFields,
) -> RepoResult<Option<ExperienceRow>> {
    let row = sqlx::query_as::<_, ExperienceRow>(
        r#"
        UPDATE experiences
        SET job_title = $2, company = $3, location = $4, start_date = $5, end_date = $6,
            description = $7, sort_order = $8, is_active = $9, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&f.job_title)
    .bind(&f.company)
    .bind(&f.location)
    .bind(&f.start_date)
    .bind(&f.end_date)
    .bind(&f.description)
    .bind(f.sort_order)
    .bind(f.is_active)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(r#"DELETE FROM experiences WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
