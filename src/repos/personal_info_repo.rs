/*
 * Responsibility
 * - SQLx access to the single `personal_info` row (site owner profile)
 * - social_links is JSONB
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, types::Json};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct PersonalInfoRow {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub logo: String,
    pub profile_image: String,
    pub cv_file: String,
    pub years_of_experience: i32,
    pub projects_completed: i32,
    pub happy_clients: i32,
    pub social_links: Json<Vec<SocialLink>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct PersonalInfoFields {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub logo: String,
    pub profile_image: String,
    pub cv_file: String,
    pub years_of_experience: i32,
    pub projects_completed: i32,
    pub happy_clients: i32,
    pub social_links: Vec<SocialLink>,
}

impl From<&PersonalInfoRow> for PersonalInfoFields {
    fn from(row: &PersonalInfoRow) -> Self {
        Self {
            name: row.name.clone(),
            title: row.title.clone(),
            bio: row.bio.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            address: row.address.clone(),
            logo: row.logo.clone(),
            profile_image: row.profile_image.clone(),
            cv_file: row.cv_file.clone(),
            years_of_experience: row.years_of_experience,
            projects_completed: row.projects_completed,
            happy_clients: row.happy_clients,
            social_links: row.social_links.0.clone(),
        }
    }
}

pub async fn get(db: &PgPool) -> RepoResult<Option<PersonalInfoRow>> {
    let row = sqlx::query_as::<_, PersonalInfoRow>(
        r#"
        SELECT *
        FROM personal_info
        ORDER BY id ASC
        LIMIT 1
        "#,
    )
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, f: &PersonalInfoFields) -> RepoResult<PersonalInfoRow> {
    let row = sqlx::query_as::<_, PersonalInfoRow>(
        r#"
        INSERT INTO personal_info
            (name, title, bio, email, phone, address, logo, profile_image, cv_file,
             years_of_experience, projects_completed, happy_clients, social_links)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(&f.name)
    .bind(&f.title)
    .bind(&f.bio)
    .bind(&f.email)
    .bind(&f.phone)
    .bind(&f.address)
    .bind(&f.logo)
    .bind(&f.profile_image)
    .bind(&f.cv_file)
    .bind(f.years_of_experience)
    .bind(f.projects_completed)
    .bind(f.happy_clients)
    .bind(Json(&f.social_links))
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: i64,
    f: &PersonalInfoFields,
) -> RepoResult<Option<PersonalInfoRow>> {
    let row = sqlx::query_as::<_, PersonalInfoRow>(
        r#"
        UPDATE personal_info
        SET name = $2, title = $3, bio = $4, email = $5, phone = $6, address = $7,
            logo = $8, profile_image = $9, cv_file = $10, years_of_experience = $11,
            projects_completed = $12, happy_clients = $13, social_links = $14,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&f.name)
    .bind(&f.title)
    .bind(&f.bio)
    .bind(&f.email)
    .bind(&f.phone)
    .bind(&f.address)
    .bind(&f.logo)
    .bind(&f.profile_image)
    .bind(&f.cv_file)
    .bind(f.years_of_experience)
    .bind(f.projects_completed)
    .bind(f.happy_clients)
    .bind(Json(&f.social_links))
    .fetch_optional(db)
    .await?;

    Ok(row)
}
