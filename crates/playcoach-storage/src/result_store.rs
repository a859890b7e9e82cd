//! Persistence of completed analyses.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use playcoach_models::{AnalysisDocument, VideoName};

use crate::error::{StorageError, StorageResult};
use crate::kv::KeyValueStore;

/// Stores one [`AnalysisDocument`] per video, keyed by video name.
#[derive(Clone)]
pub struct ResultStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ResultStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Serialize `document` and write it under `name`, replacing any
    /// previous record.
    pub async fn put(&self, name: &VideoName, document: &AnalysisDocument) -> StorageResult<()> {
        let json = document
            .to_json_string()
            .map_err(|e| StorageError::persistence_failed(name.as_str(), e))?;

        self.kv
            .put(name.as_str(), &json)
            .await
            .map_err(|e| StorageError::persistence_failed(name.as_str(), e))?;

        info!(video_name = %name, bytes = json.len(), "Stored analysis");
        Ok(())
    }

    /// Load the analysis stored under `name`.
    pub async fn get(&self, name: &str) -> StorageResult<Option<AnalysisDocument>> {
        let Some(raw) = self.kv.get(name).await? else {
            return Ok(None);
        };

        AnalysisDocument::from_json_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::corrupt_record(name, e))
    }

    /// All stored video names, in backend order.
    ///
    /// A Redis SCAN may return a key on more than one page; each name is
    /// reported once, at its first position.
    pub async fn list_keys(&self) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .kv
                .list_page(cursor.as_deref())
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;

            for key in page.keys {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }

            match page.cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(count = keys.len(), "Listed stored analyses");
        Ok(keys)
    }

    pub async fn ping(&self) -> StorageResult<()> {
        self.kv.ping().await
    }
}
