use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::profile::recompute::ProfileRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Storage seam for the recomputation policy. Production wires
    /// `PgProfileRepository`; tests substitute an in-memory fake.
    pub repo: Arc<dyn ProfileRepository>,
}
