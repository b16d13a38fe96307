/*
 * Responsibility
 * - SQLx CRUD for the `testimonials` table
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct TestimonialRow {
    pub id: i64,
    pub client_name: String,
    pub designation: String,
    pub company: String,
    pub testimonial_text: String,
    pub client_image: String,
    pub company_logo: String,
    pub rating: i32,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TestimonialFields {
    pub client_name: String,
    pub designation: String,
    pub company: String,
    pub testimonial_text: String,
    pub client_image: String,
    pub company_logo: String,
    pub rating: i32,
    pub sort_order: i32,
    pub is_active: bool,
}

pub async fn list_active(db: &PgPool) -> RepoResult<Vec<TestimonialRow>> {
    let rows = sqlx::query_as::<_, TestimonialRow>(
        r#"
        SELECT *
        FROM testimonials
        WHERE is_active
        ORDER BY sort_order ASC, created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn list_all(db: &PgPool) -> RepoResult<Vec<TestimonialRow>> {
    let rows = sqlx::query_as::<_, TestimonialRow>(
        r#"
        SELECT *
        FROM testimonials
        ORDER BY sort_order ASC, created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> RepoResult<Option<TestimonialRow>> {
    let row = sqlx::query_as::<_, TestimonialRow>(r#"SELECT * FROM testimonials WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, f: &TestimonialFields) -> RepoResult<TestimonialRow> {
    let row = sqlx::query_as::<_, TestimonialRow>(
        r#"
        INSERT INTO testimonials
            (client_name, designation, company, testimonial_text, client_image,
             company_logo, rating, sort_order, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(&f.client_name)
    .bind(&f.designation)
    .bind(&f.company)
    .bind(&f.testimonial_text)
    .bind(&f.client_image)
    .bind(&f.company_logo)
    .bind(f.rating)
    .bind(f.sort_order)
    .bind(f.is_active)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: i64,
    f: &TestimonialFields,
) -> RepoResult<Option<TestimonialRow>> {
    let row = sqlx::query_as::<_, TestimonialRow>(
        r#"
        UPDATE testimonials
        SET client_name = $2, designation = $3, company = $4, testimonial_text = $5,
            client_image = $6, company_logo = $7, rating = $8, sort_order = $9,
            is_active = $10, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&f.client_name)
    .bind(&f.designation)
    .bind(&f.company)
    .bind(&f.testimonial_text)
    .bind(&f.client_image)
    .bind(&f.company_logo)
    .bind(f.rating)
    .bind(f.sort_order)
    .bind(f.is_active)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, id: i64) -> RepoResult<Option<TestimonialRow>> {
    let row = sqlx::query_as::<_, TestimonialRow>(
        r#"DELETE FROM testimonials WHERE id = $1 RETURNING *"#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
