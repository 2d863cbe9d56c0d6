pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::dashboard;
use crate::profile::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile graph + completion
        .route("/api/v1/profile", get(handlers::handle_get_profile))
        .route(
            "/api/v1/profile/completion",
            get(handlers::handle_get_completion),
        )
        // Profile sections
        .route(
            "/api/v1/profile/personal-info",
            put(handlers::handle_update_personal_info),
        )
        .route("/api/v1/profile/links", put(handlers::handle_update_links))
        .route(
            "/api/v1/profile/summary",
            put(handlers::handle_update_summary),
        )
        .route(
            "/api/v1/profile/skills",
            put(handlers::handle_update_skills),
        )
        // Work experience
        .route(
            "/api/v1/profile/experiences",
            post(handlers::handle_create_experience),
        )
        .route(
            "/api/v1/profile/experiences/:id",
            put(handlers::handle_update_experience).delete(handlers::handle_delete_experience),
        )
        // Education
        .route(
            "/api/v1/profile/educations",
            post(handlers::handle_create_education),
        )
        .route(
            "/api/v1/profile/educations/:id",
            put(handlers::handle_update_education).delete(handlers::handle_delete_education),
        )
        // Certifications
        .route(
            "/api/v1/profile/certifications",
            post(handlers::handle_create_certification),
        )
        .route(
            "/api/v1/profile/certifications/:id",
            put(handlers::handle_update_certification)
                .delete(handlers::handle_delete_certification),
        )
        // CV document
        .route("/api/v1/profile/cv", post(handlers::handle_upload_cv))
        // Dashboard
        .route("/api/v1/dashboard", get(dashboard::handle_get_dashboard))
        .with_state(state)
}
