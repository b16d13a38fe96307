/*
 * Responsibility
 * - URL structure of the whole site (public JSON API, admin surface, auth endpoints)
 * - Which guard protects which routes: one route_layer per group, groups merged
 *   (a path can mix public GET with guarded mutations)
 */
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use crate::api::handlers::{
    auth, contacts, dashboard, education, experience, health::health, home::home,
    personal_info, portfolio, services, skills, testimonials,
};
use crate::middleware::auth::{require_hybrid, require_session, require_token};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(hybrid_routes().route_layer(from_fn_with_state(state.clone(), require_hybrid)))
        .merge(token_routes().route_layer(from_fn_with_state(state.clone(), require_token)))
        .merge(admin_entry_routes())
        .merge(admin_routes().route_layer(from_fn_with_state(state, require_session)))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/home", get(home))
        .route("/api/personal-info", get(personal_info::get_personal_info))
        .route("/api/services", get(services::list_services))
        .route("/api/services/{id}", get(services::get_service))
        .route("/api/portfolio", get(portfolio::list_portfolios))
        .route("/api/portfolio/{id}", get(portfolio::get_portfolio))
        .route("/api/experience", get(experience::list_experiences))
        .route("/api/experience/{id}", get(experience::get_experience))
        .route("/api/experience/{id}/edit", get(experience::get_experience))
        .route("/api/education", get(education::list_education))
        .route("/api/education/{id}", get(education::get_education))
        .route("/api/education/{id}/edit", get(education::get_education))
        .route("/api/skills", get(skills::list_skills))
        .route("/api/skills/{id}", get(skills::get_skill))
        .route("/api/skills/{id}/edit", get(skills::get_skill))
        .route("/api/testimonials", get(testimonials::list_testimonials))
        .route("/api/testimonials/{id}", get(testimonials::get_testimonial))
        .route("/api/testimonials/{id}/edit", get(testimonials::get_testimonial))
        .route("/api/contacts", post(contacts::submit_contact))
        .route("/contact", post(contacts::submit_contact))
        .route("/api/login", post(auth::api_login))
        .route("/api/register", post(auth::api_register))
}

/// Session cookie or bearer token.
fn hybrid_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/personal-info",
            put(personal_info::save_personal_info),
        )
        .route("/api/services", post(services::create_service))
        .route(
            "/api/services/{id}",
            put(services::update_service).delete(services::delete_service),
        )
        .route("/api/portfolio", post(portfolio::create_portfolio))
        .route(
            "/api/portfolio/{id}",
            put(portfolio::update_portfolio).delete(portfolio::delete_portfolio),
        )
        .route("/api/experience", post(experience::create_experience))
        .route(
            "/api/experience/{id}",
            put(experience::update_experience).delete(experience::delete_experience),
        )
        .route("/api/education", post(education::create_education))
        .route(
            "/api/education/{id}",
            put(education::update_education).delete(education::delete_education),
        )
        .route("/api/skills", post(skills::create_skill))
        .route(
            "/api/skills/{id}",
            put(skills::update_skill).delete(skills::delete_skill),
        )
        .route("/api/testimonials", post(testimonials::create_testimonial))
        .route(
            "/api/testimonials/{id}",
            put(testimonials::update_testimonial).delete(testimonials::delete_testimonial),
        )
        .route("/api/contacts", get(contacts::list_contacts))
        .route("/api/contacts/stats", get(contacts::contact_stats))
        .route(
            "/api/contacts/{id}",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
}

fn token_routes() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(dashboard::dashboard))
}

/// Reachable without a session.
fn admin_entry_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(auth::admin_root))
        .route("/admin/login", get(auth::login_page).post(auth::login))
        .route("/admin/logout", get(auth::logout))
        .route("/admin/register", post(auth::register))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(dashboard::dashboard))
        .route(
            "/admin/personal-info",
            get(personal_info::admin_personal_info).post(personal_info::save_personal_info),
        )
        .route(
            "/admin/services",
            get(services::admin_services).post(services::create_service),
        )
        .route("/admin/services/{id}/update", post(services::update_service))
        .route("/admin/services/{id}/delete", post(services::delete_service))
        .route(
            "/admin/portfolio",
            get(portfolio::admin_portfolios).post(portfolio::create_portfolio),
        )
        .route("/admin/portfolio/{id}/update", post(portfolio::update_portfolio))
        .route("/admin/portfolio/{id}/delete", post(portfolio::delete_portfolio))
        .route(
            "/admin/experience",
            get(experience::admin_experiences).post(experience::create_experience),
        )
        .route("/admin/experience/{id}/update", post(experience::update_experience))
        .route("/admin/experience/{id}/delete", post(experience::delete_experience))
        .route(
            "/admin/education",
            get(education::admin_education).post(education::create_education),
        )
        .route("/admin/education/{id}/update", post(education::update_education))
        .route("/admin/education/{id}/delete", post(education::delete_education))
        .route(
            "/admin/skills",
            get(skills::admin_skills).post(skills::create_skill),
        )
        .route("/admin/skills/{id}/update", post(skills::update_skill))
        .route("/admin/skills/{id}/delete", post(skills::delete_skill))
        .route(
            "/admin/testimonials",
            get(testimonials::admin_testimonials).post(testimonials::create_testimonial),
        )
        .route("/admin/testimonials/{id}/update", post(testimonials::update_testimonial))
        .route("/admin/testimonials/{id}/delete", post(testimonials::delete_testimonial))
        .route("/admin/contacts", get(contacts::list_contacts))
        .route("/admin/contacts/mark-read", post(contacts::mark_contacts_read))
        .route("/admin/contacts/bulk-delete", post(contacts::bulk_delete_contacts))
        .route("/admin/contacts/{id}", get(contacts::get_contact))
        .route("/admin/contacts/{id}/update", post(contacts::update_contact))
        .route("/admin/contacts/{id}/delete", post(contacts::delete_contact))
}

#[cfg(test)]
mod tests {
    use axum::handler::Handler;

    use super::*;

    fn routable<H, T>(_: H)
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
    }

    // Handlers that delete stored files must stay Send across the removal await.
    #[test]
    fn file_removing_handlers_are_routable() {
        routable(portfolio::update_portfolio);
        routable(portfolio::delete_portfolio);
        routable(testimonials::update_testimonial);
        routable(testimonials::delete_testimonial);
        routable(skills::update_skill);
        routable(skills::delete_skill);
        routable(personal_info::save_personal_info);
    }
}
