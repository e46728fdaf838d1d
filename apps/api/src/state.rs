use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::jobs::jsearch::JobSearch;
use crate::llm_client::ChatModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    /// Production: `LlmClient`. Tests swap in scripted models.
    pub llm: Arc<dyn ChatModel>,
    /// Production: JSearch behind the Redis card cache.
    pub jobs: Arc<dyn JobSearch>,
    pub config: Config,
}
