//! Lifecycle state of a file uploaded to the remote AI service.

use serde::{Deserialize, Serialize};

/// Processing state reported by the remote file API.
///
/// The remote service reports `PROCESSING` while the upload is being
/// prepared. Any state it may add later is treated as still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum FileState {
    #[default]
    Pending,
    Active,
    Failed,
}

impl From<String> for FileState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "ACTIVE" => FileState::Active,
            "FAILED" => FileState::Failed,
            _ => FileState::Pending,
        }
    }
}

impl FileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileState::Pending => "pending",
            FileState::Active => "active",
            FileState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for FileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_states_deserialize() {
        let parse = |s: &str| serde_json::from_str::<FileState>(&format!("\"{}\"", s)).unwrap();

        assert_eq!(parse("PROCESSING"), FileState::Pending);
        assert_eq!(parse("ACTIVE"), FileState::Active);
        assert_eq!(parse("FAILED"), FileState::Failed);
        assert_eq!(parse("SOMETHING_NEW"), FileState::Pending);
    }
}
