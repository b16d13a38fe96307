/*
 * Responsibility
 * - Work experience entries: public list/detail, edit view, admin CRUD
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};

use crate::api::dto::experience::{ExperienceRequest, ExperienceResponse};
use crate::api::dto::home::{AdminList, OutcomeQuery};
use crate::api::dto::{FromRecord, from_records, invalid};
use crate::api::extractors::public_id::PublicExperienceId;
use crate::api::negotiate::{MessageResponse, ResponseFormat, respond};
use crate::api::payload::Payload;
use crate::error::AppError;
use crate::repos::experience_repo;
use crate::state::AppState;

const BACK_TO: &str = "/admin/experience";

pub async fn list_experiences(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExperienceResponse>>, AppError> {
    let rows = experience_repo::list_active(&state.db).await?;
    Ok(Json(from_records(&state.id_codec, rows)?))
}

/// Also serves the `/edit` view; the edit form needs the same record.
pub async fn get_experience(
    State(state): State<AppState>,
    id: PublicExperienceId,
) -> Result<Json<ExperienceResponse>, AppError> {
    let row = experience_repo::get(&state.db, id.id)
        .await?
        .ok_or(AppError::not_found("Experience"))?;
    Ok(Json(ExperienceResponse::from_record(&state.id_codec, row)?))
}

pub async fn admin_experiences(
    State(state): State<AppState>,
    Query(outcome): Query<OutcomeQuery>,
) -> Result<Json<AdminList<ExperienceResponse>>, AppError> {
    let rows = experience_repo::list_all(&state.db).await?;
    Ok(Json(AdminList::new(from_records(&state.id_codec, rows)?, outcome)))
}

fn parse(payload: &Payload) -> Result<experience_repo::ExperienceFields, AppError> {
    payload.no_files()?;
    payload
        .parse::<ExperienceRequest>()?
        .into_fields()
        .map_err(invalid)
}

pub async fn create_experience(
    State(state): State<AppState>,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = async {
        let fields = parse(&payload)?;
        let row = experience_repo::create(&state.db, &fields).await?;
        tracing::info!(id = row.id, company = %row.company, "experience created");
        ExperienceResponse::from_record(&state.id_codec, row)
    }
    .await;
    respond(format, BACK_TO, "created", StatusCode::CREATED, result)
}

pub async fn update_experience(
    State(state): State<AppState>,
    id: PublicExperienceId,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = async {
        let fields = parse(&payload)?;
        let row = experience_repo::update(&state.db, id.id, &fields)
            .await?
            .ok_or(AppError::not_found("Experience"))?;
        tracing::info!(id = row.id, "experience updated");
        ExperienceResponse::from_record(&state.id_codec, row)
    }
    .await;
    respond(format, BACK_TO, "updated", StatusCode::OK, result)
}

pub async fn delete_experience(
    State(state): State<AppState>,
    id: PublicExperienceId,
    format: ResponseFormat,
) -> Response {
    let result = match experience_repo::delete(&state.db, id.id).await {
        Ok(true) => {
            tracing::info!(id = id.id, "experience deleted");
            Ok(MessageResponse::new("Experience deleted successfully"))
        }
        Ok(false) => Err(AppError::not_found("Experience")),
        Err(e) => Err(e.into()),
    };
    respond(format, BACK_TO, "deleted", StatusCode::OK, result)
}
