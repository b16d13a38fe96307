/*
 * Responsibility
 * - Portfolio: public gallery, detail page with cyclic next/prev, admin CRUD
 * - Main image + gallery uploads; replaced/removed/deleted images are removed from disk
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};

use crate::api::dto::home::{AdminList, OutcomeQuery};
use crate::api::dto::portfolio::{
    PortfolioDetailResponse, PortfolioRequest, PortfolioResponse, PortfolioUpdate,
    PortfolioUploads,
};
use crate::api::dto::{FromRecord, from_records, invalid};
use crate::api::extractors::public_id::PublicPortfolioId;
use crate::api::negotiate::{MessageResponse, ResponseFormat, respond};
use crate::api::payload::{Payload, SavedFiles};
use crate::error::AppError;
use crate::repos::portfolio_repo;
use crate::services::navigator;
use crate::services::upload::UploadTarget;
use crate::state::AppState;

const BACK_TO: &str = "/admin/portfolio";
const UPLOAD_TARGETS: [UploadTarget; 2] = [UploadTarget::PortfolioImage, UploadTarget::GalleryImage];

fn uploads_of(files: &SavedFiles) -> PortfolioUploads {
    PortfolioUploads {
        image: files.first(UploadTarget::PortfolioImage),
        gallery: files.all(UploadTarget::GalleryImage),
    }
}

pub async fn list_portfolios(
    State(state): State<AppState>,
) -> Result<Json<Vec<PortfolioResponse>>, AppError> {
    let rows = portfolio_repo::list_active(&state.db).await?;
    Ok(Json(from_records(&state.id_codec, rows)?))
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    id: PublicPortfolioId,
) -> Result<Json<PortfolioDetailResponse>, AppError> {
    let pivot = portfolio_repo::get(&state.db, id.id)
        .await?
        .ok_or(AppError::not_found("Portfolio"))?;

    // ranked by (sort_order, id) inside the navigator, not by the listing order
    let candidates = portfolio_repo::list_active(&state.db).await?;
    let around = navigator::neighbors(&pivot, &candidates);
    let next = around.next.cloned();
    let previous = around.previous.cloned();

    let codec = &state.id_codec;
    Ok(Json(PortfolioDetailResponse {
        portfolio: PortfolioResponse::from_record(codec, pivot)?,
        next_portfolio: next.map(|p| PortfolioResponse::from_record(codec, p)).transpose()?,
        prev_portfolio: previous
            .map(|p| PortfolioResponse::from_record(codec, p))
            .transpose()?,
    }))
}

pub async fn admin_portfolios(
    State(state): State<AppState>,
    Query(outcome): Query<OutcomeQuery>,
) -> Result<Json<AdminList<PortfolioResponse>>, AppError> {
    let rows = portfolio_repo::list_all(&state.db).await?;
    let items = from_records(&state.id_codec, rows)?;
    Ok(Json(AdminList::new(items, outcome)))
}

pub async fn create_portfolio(
    State(state): State<AppState>,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = create(&state, payload).await;
    respond(format, BACK_TO, "created", StatusCode::CREATED, result)
}

async fn create(state: &AppState, payload: Payload) -> Result<PortfolioResponse, AppError> {
    let req: PortfolioRequest = payload.parse()?;
    let files = payload.save_files(&state.uploads, &UPLOAD_TARGETS).await?;

    let result = async {
        let fields = req.into_new(uploads_of(&files)).map_err(invalid)?;
        let row = portfolio_repo::create(&state.db, &fields).await?;
        tracing::info!(id = row.id, title = %row.title, "portfolio created");
        PortfolioResponse::from_record(&state.id_codec, row)
    }
    .await;

    files.settle(&state.uploads, result).await
}

pub async fn update_portfolio(
    State(state): State<AppState>,
    id: PublicPortfolioId,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = update(&state, id.id, payload).await;
    respond(format, BACK_TO, "updated", StatusCode::OK, result)
}

async fn update(
    state: &AppState,
    id: i64,
    payload: Payload,
) -> Result<PortfolioResponse, AppError> {
    let existing = portfolio_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found("Portfolio"))?;
    let req: PortfolioRequest = payload.parse()?;
    let files = payload.save_files(&state.uploads, &UPLOAD_TARGETS).await?;

    let result = async {
        let PortfolioUpdate { fields, orphaned } =
            req.merge_into(&existing, uploads_of(&files)).map_err(invalid)?;
        let row = portfolio_repo::update(&state.db, id, &fields)
            .await?
            .ok_or(AppError::not_found("Portfolio"))?;
        Ok::<_, AppError>((row, orphaned))
    }
    .await;

    let (row, orphaned) = files.settle(&state.uploads, result).await?;
    state.uploads.remove_many(&orphaned).await;
    tracing::info!(id = row.id, removed_files = orphaned.len(), "portfolio updated");
    PortfolioResponse::from_record(&state.id_codec, row)
}

pub async fn delete_portfolio(
    State(state): State<AppState>,
    id: PublicPortfolioId,
    format: ResponseFormat,
) -> Response {
    let result = delete(&state, id.id).await;
    respond(format, BACK_TO, "deleted", StatusCode::OK, result)
}

async fn delete(state: &AppState, id: i64) -> Result<MessageResponse, AppError> {
    let row = portfolio_repo::delete(&state.db, id)
        .await?
        .ok_or(AppError::not_found("Portfolio"))?;

    let mut files = vec![row.image.clone()];
    files.extend(row.gallery_images.iter().cloned());
    state.uploads.remove_many(&files).await;
    tracing::info!(id = row.id, "portfolio deleted");
    Ok(MessageResponse::new("Portfolio deleted successfully"))
}
