/*
 * Responsibility
 * - Public contact form (POST /contact, POST /api/contacts)
 * - Admin inbox: filtered/paginated list, stats, read/replied/notes, bulk actions
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::dto::contacts::{
    BulkResult, ContactForm, ContactIdsRequest, ContactListQuery, ContactPage, ContactResponse,
    ContactStatsResponse, ContactUpdateRequest,
};
use crate::api::dto::{FromRecord, from_records, invalid};
use crate::api::extractors::public_id::PublicContactId;
use crate::api::negotiate::{MessageResponse, ResponseFormat, redirect, respond};
use crate::api::payload::Payload;
use crate::error::AppError;
use crate::repos::contact_repo::{self, ContactPatch};
use crate::state::AppState;

const BACK_TO: &str = "/admin/contacts";
const THANK_YOU: &str = "Thank you for your message! We will get back to you soon.";

pub async fn submit_contact(
    State(state): State<AppState>,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = submit(&state, payload).await;

    match (format, result) {
        (ResponseFormat::Json, Ok(())) => {
            (StatusCode::CREATED, Json(MessageResponse::new(THANK_YOU))).into_response()
        }
        (ResponseFormat::Json, Err(e)) => e.into_response(),
        (ResponseFormat::Html, Ok(())) => redirect("/", Some(("contact", "success"))),
        (ResponseFormat::Html, Err(_)) => redirect("/", Some(("contact", "error"))),
    }
}

async fn submit(state: &AppState, payload: Payload) -> Result<(), AppError> {
    payload.no_files()?;
    let contact = payload
        .parse::<ContactForm>()?
        .into_new_contact()
        .map_err(|m| {
            tracing::warn!(reason = m, "contact form rejected");
            invalid(m)
        })?;

    let row = contact_repo::create(&state.db, &contact).await?;
    tracing::info!(id = row.id, service = %row.service, "contact message received");
    Ok(())
}

pub async fn list_contacts(
    State(state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<ContactPage>, AppError> {
    let (page, limit) = (query.page(), query.limit());
    let (rows, total) =
        contact_repo::list(&state.db, &query.filter(), limit, query.offset()).await?;
    let contacts = from_records(&state.id_codec, rows)?;
    Ok(Json(ContactPage::new(contacts, total, page, limit)))
}

pub async fn contact_stats(
    State(state): State<AppState>,
) -> Result<Json<ContactStatsResponse>, AppError> {
    let stats = contact_repo::stats(&state.db).await?;
    Ok(Json(stats.into()))
}

/// Opening a message marks it read.
pub async fn get_contact(
    State(state): State<AppState>,
    id: PublicContactId,
) -> Result<Json<ContactResponse>, AppError> {
    let row = contact_repo::get_and_mark_read(&state.db, id.id)
        .await?
        .ok_or(AppError::not_found("Contact"))?;
    Ok(Json(ContactResponse::from_record(&state.id_codec, row)?))
}

pub async fn update_contact(
    State(state): State<AppState>,
    id: PublicContactId,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = async {
        payload.no_files()?;
        let patch: ContactPatch = payload.parse::<ContactUpdateRequest>()?.into();
        let row = contact_repo::update(&state.db, id.id, &patch)
            .await?
            .ok_or(AppError::not_found("Contact"))?;
        tracing::info!(id = row.id, is_read = row.is_read, replied = row.replied, "contact updated");
        ContactResponse::from_record(&state.id_codec, row)
    }
    .await;
    respond(format, BACK_TO, "updated", StatusCode::OK, result)
}

pub async fn delete_contact(
    State(state): State<AppState>,
    id: PublicContactId,
    format: ResponseFormat,
) -> Response {
    let result = match contact_repo::delete(&state.db, id.id).await {
        Ok(true) => {
            tracing::info!(id = id.id, "contact deleted");
            Ok(MessageResponse::new("Contact deleted successfully"))
        }
        Ok(false) => Err(AppError::not_found("Contact")),
        Err(e) => Err(e.into()),
    };
    respond(format, BACK_TO, "deleted", StatusCode::OK, result)
}

fn bulk_ids(state: &AppState, payload: &Payload) -> Result<Vec<i64>, AppError> {
    let req: ContactIdsRequest = payload.parse()?;
    if req.contact_ids.is_empty() {
        return Err(invalid("Contact IDs are required"));
    }
    Ok(state.id_codec.decode_many(&req.contact_ids)?)
}

pub async fn mark_contacts_read(
    State(state): State<AppState>,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = async {
        let ids = bulk_ids(&state, &payload)?;
        let affected = contact_repo::mark_read_many(&state.db, &ids).await?;
        tracing::info!(requested = ids.len(), affected, "contacts marked read");
        Ok::<_, AppError>(BulkResult {
            message: format!("{affected} contacts marked as read"),
            affected,
        })
    }
    .await;
    respond(format, BACK_TO, "updated", StatusCode::OK, result)
}

pub async fn bulk_delete_contacts(
    State(state): State<AppState>,
    format: ResponseFormat,
    payload: Payload,
) -> Response {
    let result = async {
        let ids = bulk_ids(&state, &payload)?;
        let affected = contact_repo::delete_many(&state.db, &ids).await?;
        tracing::info!(requested = ids.len(), affected, "contacts bulk deleted");
        Ok::<_, AppError>(BulkResult {
            message: format!("{affected} contacts deleted successfully"),
            affected,
        })
    }
    .await;
    respond(format, BACK_TO, "deleted", StatusCode::OK, result)
}
