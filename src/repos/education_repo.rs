/*
 * Responsibility
 * - SQLx CRUD for the `education` table
 * - Ordering: sort_order ascending, latest end year first
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct EducationRow {
    pub id: i64,
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_year: String,
    pub end_year: String,
    pub grade: Option<String>,
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EducationFields {
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_year: String,
    pub end_year: String,
    pub grade: Option<String>,
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

pub async fn list_active(db: &PgPool) -> RepoResult<Vec<EducationRow>> {
    let rows = sqlx::query_as::<_, EducationRow>(
        r#"
        SELECT *
        FROM education
        WHERE is_active
        ORDER BY sort_order ASC, end_year DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn list_all(db: &PgPool) -> RepoResult<Vec<EducationRow>> {
    let rows = sqlx::query_as::<_, EducationRow>(
        r#"
        SELECT *
        FROM education
        ORDER BY sort_order ASC, end_year DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> RepoResult<Option<EducationRow>> {
    let row = sqlx::query_as::<_, EducationRow>(r#"SELECT * FROM education WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, f: &EducationFields) -> RepoResult<EducationRow> {
    let row = sqlx::query_as::<_, EducationRow>(
        r#"
        INSERT INTO education
            (degree, institution, location, start_year, end_year, grade, description,
             sort_order, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(&f.degree)
    .bind(&f.institution)
    .bind(&f.location)
    .bind(&f.start_year)
    .bind(&f.end_year)
    .bind(&f.grade)
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
    f: &EducationFields,
) -> RepoResult<Option<EducationRow>> {
    let row = sqlx::query_as::<_, EducationRow>(
        r#"
        UPDATE education
        SET degree = $2, institution = $3, location = $4, start_year = $5, end_year = $6,
            grade = $7, description = $8, sort_order = $9, is_active = $10,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&f.degree)
    .bind(&f.institution)
    .bind(&f.location)
    .bind(&f.start_year)
    .bind(&f.end_year)
    .bind(&f.grade)
    .bind(&f.description)
    .bind(f.sort_order)
    .bind(f.is_active)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(r#"DELETE FROM education WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
