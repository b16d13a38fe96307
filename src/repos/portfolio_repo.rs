/*
 * Responsibility
 * - SQLx CRUD for the `portfolios` table (gallery images as TEXT[])
 * - Navigation candidates for the detail page (active items)
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;
use crate::services::navigator::Orderable;

#[derive(Debug, Clone, FromRow)]
pub struct PortfolioRow {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub gallery_images: Vec<String>,
    pub short_description: String,
    pub long_description: String,
    pub category: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Orderable for PortfolioRow {
    type Key = i64;

    fn order(&self) -> i32 {
        self.sort_order
    }

    fn key(&self) -> i64 {
        self.id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

#[derive(Debug, Clone)]
pub struct PortfolioFields {
    pub title: String,
    pub image: String,
    pub gallery_images: Vec<String>,
    pub short_description: String,
    pub long_description: String,
    pub category: String,
    pub sort_order: i32,
    pub is_active: bool,
}

impl From<&PortfolioRow> for PortfolioFields {
    fn from(row: &PortfolioRow) -> Self {
        Self {
            title: row.title.clone(),
            image: row.image.clone(),
            gallery_images: row.gallery_images.clone(),
            short_description: row.short_description.clone(),
            long_description: row.long_description.clone(),
            category: row.category.clone(),
            sort_order: row.sort_order,
            is_active: row.is_active,
        }
    }
}

pub async fn list_active(db: &PgPool) -> RepoResult<Vec<PortfolioRow>> {
    let rows = sqlx::query_as::<_, PortfolioRow>(
        r#"
        SELECT *
        FROM portfolios
        WHERE is_active
        ORDER BY sort_order ASC, created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn list_all(db: &PgPool) -> RepoResult<Vec<PortfolioRow>> {
    let rows = sqlx::query_as::<_, PortfolioRow>(
        r#"
        SELECT *
        FROM portfolios
        ORDER BY sort_order ASC, created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn count(db: &PgPool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM portfolios"#)
        .fetch_one(db)
        .await?;

    Ok(n)
}

pub async fn get(db: &PgPool, id: i64) -> RepoResult<Option<PortfolioRow>> {
    let row = sqlx::query_as::<_, PortfolioRow>(
        r#"
        SELECT *
        FROM portfolios
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, f: &PortfolioFields) -> RepoResult<PortfolioRow> {
    let row = sqlx::query_as::<_, PortfolioRow>(
        r#"
        INSERT INTO portfolios
            (title, image, gallery_images, short_description, long_description,
             category, sort_order, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&f.title)
    .bind(&f.image)
    .bind(&f.gallery_images)
    .bind(&f.short_description)
    .bind(&f.long_description)
    .bind(&f.category)
    .bind(f.sort_order)
    .bind(f.is_active)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: i64,
    f: &PortfolioFields,
) -> RepoResult<Option<PortfolioRow>> {
    let row = sqlx::query_as::<_, PortfolioRow>(
        r#"
        UPDATE portfolios
        SET title = $2, image = $3, gallery_images = $4, short_description = $5,
            long_description = $6, category = $7, sort_order = $8, is_active = $9,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&f.title)
    .bind(&f.image)
    .bind(&f.gallery_images)
    .bind(&f.short_description)
    .bind(&f.long_description)
    .bind(&f.category)
    .bind(f.sort_order)
    .bind(f.is_active)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, id: i64) -> RepoResult<Option<PortfolioRow>> {
    let row = sqlx::query_as::<_, PortfolioRow>(
        r#"
        DELETE FROM portfolios
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
