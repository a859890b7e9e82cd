//! Key-value persistence backends.
//!
//! Keys handed to a [`KeyValueStore`] are logical names; a backend may
//! namespace them internally but always returns them without the namespace.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StorageResult;

/// Default namespace for analysis records in Redis.
pub const DEFAULT_KEY_PREFIX: &str = "playcoach:analysis:";

/// One page of a key listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvPage {
    pub keys: Vec<String>,
    /// Cursor for the next page; `None` once the listing is exhausted
    pub cursor: Option<String>,
}

/// String key-value store with cursor-based listing.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Write `value` under `key`. Last write wins.
    async fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// List one page of keys starting at `cursor` (`None` for the first page).
    async fn list_page(&self, cursor: Option<&str>) -> StorageResult<KvPage>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> StorageResult<()>;
}

/// Redis-backed store.
pub struct RedisKvStore {
    client: redis::Client,
    prefix: String,
    scan_count: usize,
}

impl RedisKvStore {
    /// Create a store for `redis_url`, namespacing keys with `prefix`.
    pub fn new(redis_url: &str, prefix: impl Into<String>) -> StorageResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            prefix: prefix.into(),
            scan_count: 100,
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn match_pattern(&self) -> String {
        format!("{}*", escape_glob(&self.prefix))
    }
}

#[async_trait]
impl KeyValueStore for RedisKvStore {
    async fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(self.namespaced(key), value).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(self.namespaced(key)).await?;
        Ok(value)
    }

    async fn list_page(&self, cursor: Option<&str>) -> StorageResult<KvPage> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (next, raw_keys): (String, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor.unwrap_or("0"))
            .arg("MATCH")
            .arg(self.match_pattern())
            .arg("COUNT")
            .arg(self.scan_count)
            .query_async(&mut conn)
            .await?;

        debug!(cursor = %next, keys = raw_keys.len(), "Scanned analysis keys");

        let keys = raw_keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(self.prefix.as_str()).map(str::to_string))
            .collect();

        Ok(KvPage {
            keys,
            cursor: (next != "0").then_some(next),
        })
    }

    async fn ping(&self) -> StorageResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<()>(&mut conn).await?;
        Ok(())
    }
}

/// Escape Redis glob metacharacters so the prefix matches literally.
fn escape_glob(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// In-process ordered store. The cursor is the last key of the previous page.
#[derive(Debug)]
pub struct MemoryKvStore {
    entries: RwLock<BTreeMap<String, String>>,
    page_size: usize,
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::with_page_size(100)
    }
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn list_page(&self, cursor: Option<&str>) -> StorageResult<KvPage> {
        let entries = self.entries.read().await;
        let lower = match cursor {
            Some(after) => Bound::Excluded(after.to_string()),
            None => Bound::Unbounded,
        };

        let mut range = entries.range((lower, Bound::Unbounded)).map(|(k, _)| k.clone());
        let keys: Vec<String> = range.by_ref().take(self.page_size).collect();
        let more = range.next().is_some();

        Ok(KvPage {
            cursor: if more { keys.last().cloned() } else { None },
            keys,
        })
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}
