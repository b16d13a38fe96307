/*
 * Responsibility
 * - GET /api/home: everything the public landing page shows, active items only
 */
use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::home::{DEFAULT_SITE_NAME, HomeQuery, HomeResponse};
use crate::api::dto::personal_info::PersonalInfoResponse;
use crate::api::dto::{FromRecord, from_records};
use crate::error::AppError;
use crate::repos::{
    education_repo, experience_repo, personal_info_repo, portfolio_repo, service_repo,
    skill_repo, testimonial_repo,
};
use crate::state::AppState;

pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> Result<Json<HomeResponse>, AppError> {
    let db = &state.db;
    let (personal_info, services, portfolios, experiences, education, skills, testimonials) = tokio::try_join!(
        personal_info_repo::get(db),
        service_repo::list_active(db),
        portfolio_repo::list_active(db),
        experience_repo::list_active(db),
        education_repo::list_active(db),
        skill_repo::list_active(db),
        testimonial_repo::list_active(db),
    )?;

    let codec = &state.id_codec;
    let site_name = personal_info
        .as_ref()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string());

    Ok(Json(HomeResponse {
        site_name,
        personal_info: personal_info
            .map(|p| PersonalInfoResponse::from_record(codec, p))
            .transpose()?,
        services: from_records(codec, services)?,
        portfolios: from_records(codec, portfolios)?,
        experiences: from_records(codec, experiences)?,
        education: from_records(codec, education)?,
        skills: from_records(codec, skills)?,
        testimonials: from_records(codec, testimonials)?,
        contact: query.notice(),
    }))
}
