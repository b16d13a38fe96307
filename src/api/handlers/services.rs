/*
 * Responsibility
 * - Services: public list/detail, admin list, create/update/delete
 * - Mutations answer JSON or redirect to /admin/services (ResponseFormat)
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};

use crate::api::dto::home::{AdminList, OutcomeQuery};
use crate::api::dto::services::{ServiceRequest, ServiceResponse};
use crate::api::dto::{FromRecord, from_records, invalid};
use crate::api::extractors::public_id::PublicServiceId;
use crate::api::negotiate::{MessageResponse, ResponseFormat, respond};
use crate::api::payload::Payload;
use crate::error::AppError;
use crate::repos::service_repo;
use crate::state::AppState;

const BACK_TO: &str = "/admin/services";

pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceResponse>>, AppError> {
    let rows = service_repo::list_active(&state.db).await?;
    Ok(Json(from_records(&state.id_codec, rows)?))
}

pub async fn get_service(
    State(state): State<AppState>,
    id: PublicServiceId,
) -> Result<Json<ServiceResponse>, AppError> {
    let row = service_repo::get(&state.db, id.id)
        .await?
        .ok_or(AppError::not_found("Service"))?;
    Ok(Json(ServiceResponse::from_record(&state.id_codec, row)?))
}

pub async fn admin_services(
    State(state): State<AppState>,
    Query(outcome): Query<OutcomeQuery>,
) -> Result<Json<AdminList<ServiceResponse>>, AppError> {
    let rows = service_repo::list_all(&state.db).await?;
    let items = from_records(&state.id_codec, rows)?;
    Ok(Json(AdminList::new(items, outcome)))
}

pub async fn create_service(
    State(state): State<AppState>,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = create(&state, payload).await;
    respond(format, BACK_TO, "created", StatusCode::CREATED, result)
}

async fn create(state: &AppState, payload: Payload) -> Result<ServiceResponse, AppError> {
    payload.no_files()?;
    let fields = payload
        .parse::<ServiceRequest>()?
        .into_fields()
        .map_err(invalid)?;

    let row = service_repo::create(&state.db, &fields).await?;
    tracing::info!(id = row.id, title = %row.title, "service created");
    ServiceResponse::from_record(&state.id_codec, row)
}

pub async fn update_service(
    State(state): State<AppState>,
    id: PublicServiceId,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = update(&state, id.id, payload).await;
    respond(format, BACK_TO, "updated", StatusCode::OK, result)
}

async fn update(state: &AppState, id: i64, payload: Payload) -> Result<ServiceResponse, AppError> {
    payload.no_files()?;
    let fields = payload
        .parse::<ServiceRequest>()?
        .into_fields()
        .map_err(invalid)?;

    let row = service_repo::update(&state.db, id, &fields)
        .await?
        .ok_or(AppError::not_found("Service"))?;
    tracing::info!(id = row.id, "service updated");
    ServiceResponse::from_record(&state.id_codec, row)
}

pub async fn delete_service(
    State(state): State<AppState>,
    id: PublicServiceId,
    format: ResponseFormat,
) -> Response {
    let result = service_repo::delete(&state.db, id.id)
        .await
        .map_err(AppError::from)
        .and_then(|row| row.ok_or(AppError::not_found("Service")))
        .map(|row| {
            tracing::info!(id = row.id, "service deleted");
            MessageResponse::new("Service deleted successfully")
        });
    respond(format, BACK_TO, "deleted", StatusCode::OK, result)
}
