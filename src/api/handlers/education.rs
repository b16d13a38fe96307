/*
 * Responsibility
 * - Education entries: public list/detail, edit view, admin CRUD
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};

use crate::api::dto::education::{EducationRequest, EducationResponse};
use crate::api::dto::home::{AdminList, OutcomeQuery};
use crate::api::dto::{FromRecord, from_records, invalid};
use crate::api::extractors::public_id::PublicEducationId;
use crate::api::negotiate::{MessageResponse, ResponseFormat, respond};
use crate::api::payload::Payload;
use crate::error::AppError;
use crate::repos::education_repo;
use crate::state::AppState;

const BACK_TO: &str = "/admin/education";

pub async fn list_education(
    State(state): State<AppState>,
) -> Result<Json<Vec<EducationResponse>>, AppError> {
    let rows = education_repo::list_active(&state.db).await?;
    Ok(Json(from_records(&state.id_codec, rows)?))
}

/// Also serves the `/edit` view; the edit form needs the same record.
pub async fn get_education(
    State(state): State<AppState>,
    id: PublicEducationId,
) -> Result<Json<EducationResponse>, AppError> {
    let row = education_repo::get(&state.db, id.id)
        .await?
        .ok_or(AppError::not_found("Education"))?;
    Ok(Json(EducationResponse::from_record(&state.id_codec, row)?))
}

pub async fn admin_education(
    State(state): State<AppState>,
    Query(outcome): Query<OutcomeQuery>,
) -> Result<Json<AdminList<EducationResponse>>, AppError> {
    let rows = education_repo::list_all(&state.db).await?;
    Ok(Json(AdminList::new(from_records(&state.id_codec, rows)?, outcome)))
}

fn parse(payload: &Payload) -> Result<education_repo::EducationFields, AppError> {
    payload.no_files()?;
    payload
        .parse::<EducationRequest>()?
        .into_fields()
        .map_err(invalid)
}

pub async fn create_education(
    State(state): State<AppState>,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = async {
        let fields = parse(&payload)?;
        let row = education_repo::create(&state.db, &fields).await?;
        tracing::info!(id = row.id, institution = %row.institution, "education created");
        EducationResponse::from_record(&state.id_codec, row)
    }
    .await;
    respond(format, BACK_TO, "created", StatusCode::CREATED, result)
}

pub async fn update_education(
    State(state): State<AppState>,
    id: PublicEducationId,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = async {
        let fields = parse(&payload)?;
        let row = education_repo::update(&state.db, id.id, &fields)
            .await?
            .ok_or(AppError::not_found("Education"))?;
        tracing::info!(id = row.id, "education updated");
        EducationResponse::from_record(&state.id_codec, row)
    }
    .await;
    respond(format, BACK_TO, "updated", StatusCode::OK, result)
}

pub async fn delete_education(
    State(state): State<AppState>,
    id: PublicEducationId,
    format: ResponseFormat,
) -> Response {
    let result = match education_repo::delete(&state.db, id.id).await {
        Ok(true) => {
            tracing::info!(id = id.id, "education deleted");
            Ok(MessageResponse::new("Education deleted successfully"))
        }
        Ok(false) => Err(AppError::not_found("Education")),
        Err(e) => Err(e.into()),
    };
    respond(format, BACK_TO, "deleted", StatusCode::OK, result)
}
