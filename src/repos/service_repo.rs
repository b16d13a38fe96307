/*
 * Responsibility
 * - SQLx CRUD for the `services` table
 * - Public listing: active only, (sort_order, created_at) ascending
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct ServiceRow {
    pub id: i64,
    pub number: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ServiceFields {
    pub number: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

pub async fn list_active(db: &PgPool) -> RepoResult<Vec<ServiceRow>> {
    let rows = sqlx::query_as::<_, ServiceRow>(
        r#"
        SELECT *
        FROM services
        WHERE is_active
        ORDER BY sort_order ASC, created_at ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn list_all(db: &PgPool) -> RepoResult<Vec<ServiceRow>> {
    let rows = sqlx::query_as::<_, ServiceRow>(
        r#"
        SELECT *
        FROM services
        ORDER BY sort_order ASC, created_at ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> RepoResult<Option<ServiceRow>> {
    let row = sqlx::query_as::<_, ServiceRow>(
        r#"
        SELECT *
        FROM services
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, f: &ServiceFields) -> RepoResult<ServiceRow> {
    let row = sqlx::query_as::<_, ServiceRow>(
        r#"
        INSERT INTO services (number, title, description, icon, sort_order, is_active)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&f.number)
    .bind(&f.title)
    .bind(&f.description)
    .bind(&f.icon)
    .bind(f.sort_order)
    .bind(f.is_active)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn update(db: &PgPool, id: i64, f: &ServiceFields) -> RepoResult<Option<ServiceRow>> {
    let row = sqlx::query_as::<_, ServiceRow>(
        r#"
        UPDATE services
        SET number = $2, title = $3, description = $4, icon = $5,
            sort_order = $6, is_active = $7, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&f.number)
    .bind(&f.title)
    .bind(&f.description)
    .bind(&f.icon)
    .bind(f.sort_order)
    .bind(f.is_active)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, id: i64) -> RepoResult<Option<ServiceRow>> {
    let row = sqlx::query_as::<_, ServiceRow>(
        r#"
        DELETE FROM services
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
