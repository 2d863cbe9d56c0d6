use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An application joined with its job, flattened for the dashboard listing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecentApplicationRow {
    pub id: Uuid,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub job_title: String,
    pub job_company: String,
    pub job_location: Option<String>,
}
