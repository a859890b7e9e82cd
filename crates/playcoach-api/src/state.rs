//! Application state.

use std::sync::Arc;

use tracing::{info, warn};

use playcoach_gemini::{GeminiClient, GeminiConfig};
use playcoach_storage::{BlobStore, KeyValueStore, MemoryKvStore, R2Client, RedisKvStore, ResultStore};

use crate::config::AppConfig;
use crate::error::ApiResult;
use crate::pipeline::AnalysisPipeline;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pipeline: Arc<AnalysisPipeline>,
    pub results: ResultStore,
    pub blobs: Option<Arc<dyn BlobStore>>,
}

impl AppState {
    /// Create application state from configuration, connecting the
    /// optional R2 and Redis bindings when they are configured.
    pub fn new(config: AppConfig, gemini_config: GeminiConfig) -> ApiResult<Self> {
        let gemini = GeminiClient::new(gemini_config)?;

        let blobs: Option<Arc<dyn BlobStore>> = match R2Client::from_env() {
            Ok(client) => {
                info!(bucket = %client.bucket(), "Video storage: R2");
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!("R2 not configured ({}), raw videos will not be stored", e);
                None
            }
        };

        let kv: Arc<dyn KeyValueStore> = match &config.redis_url {
            Some(url) => {
                info!(prefix = %config.kv_key_prefix, "Result store: Redis");
                Arc::new(RedisKvStore::new(url, config.kv_key_prefix.clone())?)
            }
            None => {
                warn!("REDIS_URL not set, analyses are kept in memory only");
                Arc::new(MemoryKvStore::new())
            }
        };

        Ok(Self::from_parts(config, gemini, blobs, kv))
    }

    /// Assemble state from already constructed clients.
    pub fn from_parts(
        config: AppConfig,
        gemini: GeminiClient,
        blobs: Option<Arc<dyn BlobStore>>,
        kv: Arc<dyn KeyValueStore>,
    ) -> Self {
        let results = ResultStore::new(kv);
        let pipeline = AnalysisPipeline::new(Arc::new(gemini), blobs.clone(), results.clone());

        Self {
            config,
            pipeline: Arc::new(pipeline),
            results,
            blobs,
        }
    }
}
