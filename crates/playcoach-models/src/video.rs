//! Stored video naming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Most recent millisecond value handed out by [`VideoName::generate`].
static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Name of an uploaded video, used as the key of its stored analysis.
///
/// Generated from the request arrival time as `video_<unix millis>.mp4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoName(pub String);

impl VideoName {
    /// Generate a name for a video received now.
    ///
    /// Names are unique within the process: when two videos arrive in the
    /// same millisecond the later one is stamped with the next free
    /// millisecond, so it cannot overwrite the earlier analysis.
    pub fn generate() -> Self {
        let now = Utc::now().timestamp_millis();
        let previous = LAST_ISSUED_MILLIS
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        Self::from_millis(now.max(previous + 1))
    }

    /// Generate the name for a video received at `received_at`.
    pub fn at(received_at: DateTime<Utc>) -> Self {
        Self::from_millis(received_at.timestamp_millis())
    }

    fn from_millis(millis: i64) -> Self {
        Self(format!("video_{}.mp4", millis))
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Object key of the raw video bytes in the blob store.
    pub fn blob_key(&self) -> String {
        format!("videos/{}", self.0)
    }
}

impl fmt::Display for VideoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_name_from_arrival_time() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let name = VideoName::at(at);

        assert_eq!(name.as_str(), "video_1700000000123.mp4");
        assert_eq!(name.blob_key(), "videos/video_1700000000123.mp4");
    }

    #[test]
    fn test_generated_names_are_unique() {
        let names: Vec<VideoName> = (0..500).map(|_| VideoName::generate()).collect();
        let distinct: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(distinct.len(), names.len());

        for name in &names {
            let millis = name
                .as_str()
                .strip_prefix("video_")
                .and_then(|s| s.strip_suffix(".mp4"))
                .unwrap();
            assert!(millis.parse::<i64>().is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let name = VideoName::from("video_1.mp4");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"video_1.mp4\"");
    }
}
