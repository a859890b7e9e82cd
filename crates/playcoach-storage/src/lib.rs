//! Storage for gameplay videos and their analyses.
//!
//! This crate provides:
//! - Raw video upload to Cloudflare R2 (or an in-memory stand-in)
//! - A key-value abstraction over Redis (or an in-memory map)
//! - The result store persisting one analysis document per video

pub mod blob;
pub mod error;
pub mod kv;
pub mod result_store;

pub use blob::{BlobStore, MemoryBlobStore, R2Client, R2Config, StoredObject};
pub use error::{StorageError, StorageResult};
pub use kv::{KeyValueStore, KvPage, MemoryKvStore, RedisKvStore, DEFAULT_KEY_PREFIX};
pub use result_store::ResultStore;
