/*
 * Responsibility
 * - Site-owner profile (singleton): public read, admin view, upsert
 * - Logo / profile image / CV / social icon uploads
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;

use crate::api::dto::home::OutcomeQuery;
use crate::api::dto::personal_info::{
    PersonalInfoRequest, PersonalInfoResponse, PersonalInfoUpdate, PersonalInfoUploads,
};
use crate::api::dto::{FromRecord, invalid};
use crate::api::negotiate::{ResponseFormat, respond};
use crate::api::payload::{Payload, SavedFiles};
use crate::error::AppError;
use crate::repos::personal_info_repo;
use crate::services::upload::UploadTarget;
use crate::state::AppState;

const BACK_TO: &str = "/admin/personal-info";
const UPLOAD_TARGETS: [UploadTarget; 4] = [
    UploadTarget::Logo,
    UploadTarget::ProfileImage,
    UploadTarget::Cv,
    UploadTarget::SocialIcon(0),
];

fn uploads_of(files: &SavedFiles) -> PersonalInfoUploads {
    PersonalInfoUploads {
        logo: files.first(UploadTarget::Logo),
        profile_image: files.first(UploadTarget::ProfileImage),
        cv_file: files.first(UploadTarget::Cv),
        social_icons: files.social_icons(),
    }
}

pub async fn get_personal_info(
    State(state): State<AppState>,
) -> Result<Json<PersonalInfoResponse>, AppError> {
    let row = personal_info_repo::get(&state.db)
        .await?
        .ok_or(AppError::not_found("Personal info"))?;
    Ok(Json(PersonalInfoResponse::from_record(&state.id_codec, row)?))
}

#[derive(Debug, Serialize)]
pub struct AdminPersonalInfo {
    pub record: Option<PersonalInfoResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn admin_personal_info(
    State(state): State<AppState>,
    Query(outcome): Query<OutcomeQuery>,
) -> Result<Json<AdminPersonalInfo>, AppError> {
    let record = personal_info_repo::get(&state.db)
        .await?
        .map(|row| PersonalInfoResponse::from_record(&state.id_codec, row))
        .transpose()?;
    Ok(Json(AdminPersonalInfo {
        record,
        success: outcome.success,
        error: outcome.error,
    }))
}

/// First save creates the profile (201 / `success=created`), later ones update it.
pub async fn save_personal_info(
    State(state): State<AppState>,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    match save(&state, payload).await {
        Ok((body, true)) => respond(format, BACK_TO, "created", StatusCode::CREATED, Ok(body)),
        Ok((body, false)) => respond(format, BACK_TO, "updated", StatusCode::OK, Ok(body)),
        Err(e) => respond::<PersonalInfoResponse>(format, BACK_TO, "updated", StatusCode::OK, Err(e)),
    }
}

async fn save(state: &AppState, payload: Payload) -> Result<(PersonalInfoResponse, bool), AppError> {
    let existing = personal_info_repo::get(&state.db).await?;
    let req: PersonalInfoRequest = payload.parse()?;
    let files = payload.save_files(&state.uploads, &UPLOAD_TARGETS).await?;

    let result = async {
        let PersonalInfoUpdate { fields, orphaned } = req
            .merge_into(existing.as_ref(), uploads_of(&files))
            .map_err(invalid)?;
        let row = match &existing {
            Some(current) => personal_info_repo::update(&state.db, current.id, &fields)
                .await?
                .ok_or(AppError::not_found("Personal info"))?,
            None => personal_info_repo::create(&state.db, &fields).await?,
        };
        Ok::<_, AppError>((row, orphaned))
    }
    .await;

    let (row, orphaned) = files.settle(&state.uploads, result).await?;
    state.uploads.remove_many(&orphaned).await;

    let created = existing.is_none();
    tracing::info!(id = row.id, created, removed_files = orphaned.len(), "personal info saved");
    Ok((PersonalInfoResponse::from_record(&state.id_codec, row)?, created))
}
