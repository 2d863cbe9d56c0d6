//! Applicant dashboard: application status counts and the most recent
//! applications. Read-only; derived metrics are never recomputed here.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::RecentApplicationRow;
use crate::models::profile::ApplicantProfileRow;
use crate::profile::completion::{compute_completion, CompletionReport};
use crate::profile::handlers::UserIdQuery;
use crate::profile::store;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DashboardStats {
    pub total_applications: i64,
    pub pending_applications: i64,
    pub reviewing_applications: i64,
    pub shortlisted_applications: i64,
    pub rejected_applications: i64,
    pub hired_applications: i64,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub profile: ApplicantProfileRow,
    pub completion: CompletionReport,
    pub stats: DashboardStats,
    pub recent_applications: Vec<RecentApplicationRow>,
}

/// GET /api/v1/dashboard
pub async fn handle_get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let graph = store::get_or_create_graph(&state.db, params.user_id).await?;
    let completion = compute_completion(&graph);
    let stats = application_stats(&state.db, params.user_id).await?;
    let recent_applications = recent_applications(&state.db, params.user_id).await?;

    Ok(Json(DashboardResponse {
        profile: graph.profile,
        completion,
        stats,
        recent_applications,
    }))
}

async fn application_stats(pool: &PgPool, user_id: Uuid) -> Result<DashboardStats, AppError> {
    let stats: DashboardStats = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) AS total_applications,
            COUNT(*) FILTER (WHERE status = 'PENDING') AS pending_applications,
            COUNT(*) FILTER (WHERE status = 'REVIEWING') AS reviewing_applications,
            COUNT(*) FILTER (WHERE status = 'SHORTLISTED') AS shortlisted_applications,
            COUNT(*) FILTER (WHERE status = 'REJECTED') AS rejected_applications,
            COUNT(*) FILTER (WHERE status = 'HIRED') AS hired_applications
        FROM applications
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(stats)
}

async fn recent_applications(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<RecentApplicationRow>, AppError> {
    let rows: Vec<RecentApplicationRow> = sqlx::query_as(
        r#"
        SELECT a.id, a.status, a.applied_at,
               j.title AS job_title, j.company AS job_company, j.location AS job_location
        FROM applications a
        JOIN jobs j ON j.id = a.job_id
        WHERE a.user_id = $1
        ORDER BY a.applied_at DESC
        LIMIT 3
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
