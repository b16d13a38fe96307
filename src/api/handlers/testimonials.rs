/*
 * Responsibility
 * - Testimonials: public list/detail, edit view, admin CRUD
 * - Optional client photo and company logo uploads
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};

use crate::api::dto::home::{AdminList, OutcomeQuery};
use crate::api::dto::testimonials::{TestimonialImages, TestimonialRequest, TestimonialResponse};
use crate::api::dto::{FromRecord, from_records, invalid};
use crate::api::extractors::public_id::PublicTestimonialId;
use crate::api::negotiate::{MessageResponse, ResponseFormat, respond};
use crate::api::payload::{Payload, SavedFiles};
use crate::error::AppError;
use crate::repos::testimonial_repo::{self, TestimonialRow};
use crate::services::upload::UploadTarget;
use crate::state::AppState;

const BACK_TO: &str = "/admin/testimonials";
const UPLOAD_TARGETS: [UploadTarget; 2] = [UploadTarget::ClientImage, UploadTarget::CompanyLogo];

fn images(files: &SavedFiles, existing: Option<&TestimonialRow>) -> TestimonialImages {
    TestimonialImages {
        client_image: files
            .first(UploadTarget::ClientImage)
            .or_else(|| existing.map(|r| r.client_image.clone()))
            .unwrap_or_default(),
        company_logo: files
            .first(UploadTarget::CompanyLogo)
            .or_else(|| existing.map(|r| r.company_logo.clone()))
            .unwrap_or_default(),
    }
}

pub async fn list_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<TestimonialResponse>>, AppError> {
    let rows = testimonial_repo::list_active(&state.db).await?;
    Ok(Json(from_records(&state.id_codec, rows)?))
}

pub async fn get_testimonial(
    State(state): State<AppState>,
    id: PublicTestimonialId,
) -> Result<Json<TestimonialResponse>, AppError> {
    let row = testimonial_repo::get(&state.db, id.id)
        .await?
        .ok_or(AppError::not_found("Testimonial"))?;
    Ok(Json(TestimonialResponse::from_record(&state.id_codec, row)?))
}

pub async fn admin_testimonials(
    State(state): State<AppState>,
    Query(outcome): Query<OutcomeQuery>,
) -> Result<Json<AdminList<TestimonialResponse>>, AppError> {
    let rows = testimonial_repo::list_all(&state.db).await?;
    Ok(Json(AdminList::new(from_records(&state.id_codec, rows)?, outcome)))
}

pub async fn create_testimonial(
    State(state): State<AppState>,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = create(&state, payload).await;
    respond(format, BACK_TO, "created", StatusCode::CREATED, result)
}

async fn create(state: &AppState, payload: Payload) -> Result<TestimonialResponse, AppError> {
    let req: TestimonialRequest = payload.parse()?;
    let files = payload.save_files(&state.uploads, &UPLOAD_TARGETS).await?;

    let result = async {
        let fields = req.into_fields(images(&files, None)).map_err(invalid)?;
        let row = testimonial_repo::create(&state.db, &fields).await?;
        tracing::info!(id = row.id, client = %row.client_name, "testimonial created");
        TestimonialResponse::from_record(&state.id_codec, row)
    }
    .await;

    files.settle(&state.uploads, result).await
}

pub async fn update_testimonial(
    State(state): State<AppState>,
    id: PublicTestimonialId,
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
) -> Result<TestimonialResponse, AppError> {
    let existing = testimonial_repo::get(&state.db, id)
        .await?
        .ok_or(AppError::not_found("Testimonial"))?;
    let req: TestimonialRequest = payload.parse()?;
    let files = payload.save_files(&state.uploads, &UPLOAD_TARGETS).await?;

    let result = async {
        let fields = req
            .into_fields(images(&files, Some(&existing)))
            .map_err(invalid)?;
        let row = testimonial_repo::update(&state.db, id, &fields)
            .await?
            .ok_or(AppError::not_found("Testimonial"))?;
        Ok::<_, AppError>(row)
    }
    .await;

    let row = files.settle(&state.uploads, result).await?;
    let replaced: Vec<String> = [
        (&existing.client_image, &row.client_image),
        (&existing.company_logo, &row.company_logo),
    ]
    .into_iter()
    .filter(|(old, new)| old != new)
    .map(|(old, _)| old.clone())
    .collect();
    state.uploads.remove_many(&replaced).await;

    tracing::info!(id = row.id, "testimonial updated");
    TestimonialResponse::from_record(&state.id_codec, row)
}

pub async fn delete_testimonial(
    State(state): State<AppState>,
    id: PublicTestimonialId,
    format: ResponseFormat,
) -> Response {
    let result = delete(&state, id.id).await;
    respond(format, BACK_TO, "deleted", StatusCode::OK, result)
}

async fn delete(state: &AppState, id: i64) -> Result<MessageResponse, AppError> {
    let row = testimonial_repo::delete(&state.db, id)
        .await?
        .ok_or(AppError::not_found("Testimonial"))?;
    let files = [row.client_image.clone(), row.company_logo.clone()];
    state.uploads.remove_many(&files).await;
    tracing::info!(id = row.id, "testimonial deleted");
    Ok(MessageResponse::new("Testimonial deleted successfully"))
}
