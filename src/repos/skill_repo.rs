/*
 * Responsibility
 * - SQLx CRUD for the `skills` table
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct SkillRow {
    pub id: i64,
    pub name: String,
    pub percentage: i32,
    pub icon: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SkillFields {
    pub name: String,
    pub percentage: i32,
    pub icon: String,
    pub sort_order: i32,
    pub is_active: bool,
}

pub async fn list_active(db: &PgPool) -> RepoResult<Vec<SkillRow>> {
    let rows = sqlx::query_as::<_, SkillRow>(
        r#"
        SELECT *
        FROM skills
        WHERE is_active
        ORDER BY sort_order ASC, created_at ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn list_all(db: &PgPool) -> RepoResult<Vec<SkillRow>> {
    let rows = sqlx::query_as::<_, SkillRow>(
        r#"
        SELECT *
        FROM skills
        ORDER BY sort_order ASC, created_at ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> RepoResult<Option<SkillRow>> {
    let row = sqlx::query_as::<_, SkillRow>(r#"SELECT * FROM skills WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, f: &SkillFields) -> RepoResult<SkillRow> {
    let row = sqlx::query_as::<_, SkillRow>(
        r#"
        INSERT INTO skills (name, percentage, icon, sort_order, is_active)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&f.name)
    .bind(f.percentage)
    .bind(&f.icon)
    .bind(f.sort_order)
    .bind(f.is_active)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn update(db: &PgPool, id: i64, f: &SkillFields) -> RepoResult<Option<SkillRow>> {
    let row = sqlx::query_as::<_, SkillRow>(
        r#"
        UPDATE skills
        SET name = $2, percentage = $3, icon = $4, sort_order = $5, is_active = $6,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&f.name)
    .bind(f.percentage)
    .bind(&f.icon)
    .bind(f.sort_order)
    .bind(f.is_active)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, id: i64) -> RepoResult<Option<SkillRow>> {
    let row = sqlx::query_as::<_, SkillRow>(r#"DELETE FROM skills WHERE id = $1 RETURNING *"#)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}
