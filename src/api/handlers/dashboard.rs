/*
 * Responsibility
 * - Admin dashboard view-model (session at /admin/dashboard, bearer token at /api/dashboard)
 */
use axum::{Json, extract::State};

use crate::api::dto::from_records;
use crate::api::dto::home::{DashboardResponse, DashboardStats};
use crate::api::extractors::AuthCtxExtractor;
use crate::error::AppError;
use crate::repos::{contact_repo, portfolio_repo};
use crate::state::AppState;

const RECENT_CONTACTS: i64 = 5;

pub async fn dashboard(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<DashboardResponse>, AppError> {
    let (contacts, projects, recent) = tokio::try_join!(
        contact_repo::stats(&state.db),
        portfolio_repo::count(&state.db),
        contact_repo::recent(&state.db, RECENT_CONTACTS),
    )?;

    tracing::debug!(user_id = %ctx.identity.id, channel = ?ctx.channel, "dashboard loaded");

    Ok(Json(DashboardResponse {
        admin: ctx.identity,
        stats: DashboardStats {
            total_contacts: contacts.total,
            unread_contacts: contacts.unread,
            total_projects: projects,
        },
        recent_contacts: from_records(&state.id_codec, recent)?,
    }))
}
