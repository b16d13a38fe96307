/*
 * Responsibility
 * - Skills: public list/detail, edit view, admin CRUD
 * - Icon is an uploaded image or a typed value (path / class name)
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};

use crate::api::dto::home::{AdminList, OutcomeQuery};
use crate::api::dto::skills::{SkillRequest, SkillResponse};
use crate::api::dto::{FromRecord, from_records, invalid};
use crate::api::extractors::public_id::PublicSkillId;
use crate::api::negotiate::{MessageResponse, ResponseFormat, respond};
use crate::api::payload::Payload;
use crate::error::AppError;
use crate::repos::skill_repo;
use crate::services::upload::UploadTarget;
use crate::state::AppState;

const BACK_TO: &str = "/admin/skills";

pub async fn list_skills(
    State(state): State<AppState>,
) -> Result<Json<Vec<SkillResponse>>, AppError> {
    let rows = skill_repo::list_active(&state.db).await?;
    Ok(Json(from_records(&state.id_codec, rows)?))
}

pub async fn get_skill(
    State(state): State<AppState>,
    id: PublicSkillId,
) -> Result<Json<SkillResponse>, AppError> {
    let row = skill_repo::get(&state.db, id.id)
        .await?
        .ok_or(AppError::not_found("Skill"))?;
    Ok(Json(SkillResponse::from_record(&state.id_codec, row)?))
}

pub async fn admin_skills(
    State(state): State<AppState>,
    Query(outcome): Query<OutcomeQuery>,
) -> Result<Json<AdminList<SkillResponse>>, AppError> {
    let rows = skill_repo::list_all(&state.db).await?;
    Ok(Json(AdminList::new(from_records(&state.id_codec, rows)?, outcome)))
}

pub async fn create_skill(
    State(state): State<AppState>,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = create(&state, payload).await;
    respond(format, BACK_TO, "created", StatusCode::CREATED, result)
}

async fn create(state: &AppState, payload: Payload) -> Result<SkillResponse, AppError> {
    let req: SkillRequest = payload.parse()?;
    let files = payload
        .save_files(&state.uploads, &[UploadTarget::SkillIcon])
        .await?;

    let result = async {
        let fields = req
            .into_fields(files.first(UploadTarget::SkillIcon), None)
            .map_err(invalid)?;
        let row = skill_repo::create(&state.db, &fields).await?;
        tracing::info!(id = row.id, name = %row.name, "skill created");
        SkillResponse::from_record(&state.id_codec, row)
    }
    .await;

    files.settle(&state.uploads, result).await
}

pub async fn update_skill(
    State(state): State<AppState>,
    id: PublicSkillId,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = update(&state, id.id, payload).await;
    respond(format, BACK_TO, "updated", StatusCode::OK, result)
}

async fn update(state: &AppState, id: i64, payload: Payload) -> Result<SkillResponse, AppError> {
    let existing = skill_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found("Skill"))?;
    let req: SkillRequest = payload.parse()?;
    let files = payload
        .save_files(&state.uploads, &[UploadTarget::SkillIcon])
        .await?;

    let result = async {
        let fields = req
            .into_fields(files.first(UploadTarget::SkillIcon), Some(existing.icon.as_str()))
            .map_err(invalid)?;
        let row = skill_repo::update(&state.db, id, &fields)
            .await?
            .ok_or(AppError::not_found("Skill"))?;
        Ok::<_, AppError>(row)
    }
    .await;

    let row = files.settle(&state.uploads, result).await?;
    if row.icon != existing.icon {
        state.uploads.remove_many(std::slice::from_ref(&existing.icon)).await;
    }
    tracing::info!(id = row.id, "skill updated");
    SkillResponse::from_record(&state.id_codec, row)
}

pub async fn delete_skill(
    State(state): State<AppState>,
    id: PublicSkillId,
    format: ResponseFormat,
) -> Response {
    let result = delete(&state, id.id).await;
    respond(format, BACK_TO, "deleted", StatusCode::OK, result)
}

async fn delete(state: &AppState, id: i64) -> Result<MessageResponse, AppError> {
    let row = skill_repo::delete(&state.db, id)
        .await?
        .ok_or(AppError::not_found("Skill"))?;
    state.uploads.remove_many(std::slice::from_ref(&row.icon)).await;
    tracing::info!(id = row.id, "skill deleted");
    Ok(MessageResponse::new("Skill deleted successfully"))
}
