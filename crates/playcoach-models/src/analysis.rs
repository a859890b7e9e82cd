//! Gameplay mistake analysis document.
//!
//! This is the JSON shape the model is instructed to return and the value
//! persisted for every analyzed video. Every field is required: a document
//! missing any of them is rejected instead of being filled with defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};

/// Structured mistake-focused breakdown of one gameplay video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisDocument {
    /// Game the video was analyzed for
    pub game: String,
    /// Factors the model considered most critical, in its order
    pub key_focus_areas: Vec<String>,
    /// Individual mistakes with timestamps
    pub mistakes: Vec<Mistake>,
    /// Recurring mistake patterns
    pub repeated_errors: Vec<RepeatedError>,
    /// Moments where a better action was available
    pub missed_opportunities: Vec<MissedOpportunity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mistake {
    pub timestamp: String,
    pub description: String,
    pub why_incorrect: String,
    pub better_alternative: String,
    pub expected_benefit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatedError {
    pub pattern: String,
    /// Timestamps at which the pattern was observed
    pub occurrences: Vec<String>,
    pub fix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedOpportunity {
    pub timestamp: String,
    pub missed_action: String,
    pub expected_outcome: String,
}

impl AnalysisDocument {
    /// Convert an already-parsed JSON value into a document.
    ///
    /// Fails with [`ModelError::IncompleteDocument`] when any field is
    /// missing or has the wrong type.
    pub fn from_value(value: Value) -> ModelResult<Self> {
        serde_json::from_value(value).map_err(|e| ModelError::incomplete(e.to_string()))
    }

    /// Parse a serialized document (as stored in the result store).
    pub fn from_json_str(text: &str) -> ModelResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Serialize to the stored JSON representation.
    pub fn to_json_string(&self) -> ModelResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_value() -> Value {
        json!({
            "game": "Chess",
            "key_focus_areas": ["Openings", "Tempo"],
            "mistakes": [{
                "timestamp": "00:01:10",
                "description": "Moved the queen early",
                "why_incorrect": "Loses tempo",
                "better_alternative": "Develop a knight",
                "expected_benefit": "Faster development"
            }],
            "repeated_errors": [{
                "pattern": "Ignoring king safety",
                "occurrences": ["00:02:00", "00:05:30"],
                "fix": "Castle early"
            }],
            "missed_opportunities": [{
                "timestamp": "00:03:45",
                "missed_action": "Fork on e6",
                "expected_outcome": "Win the exchange"
            }]
        })
    }

    #[test]
    fn test_from_value_complete() {
        let doc = AnalysisDocument::from_value(sample_value()).unwrap();
        assert_eq!(doc.game, "Chess");
        assert_eq!(doc.mistakes.len(), 1);
        assert_eq!(doc.repeated_errors[0].occurrences.len(), 2);
    }

    #[test]
    fn test_missing_array_is_rejected() {
        let mut value = sample_value();
        value.as_object_mut().unwrap().remove("missed_opportunities");

        let err = AnalysisDocument::from_value(value).unwrap_err();
        assert!(matches!(err, ModelError::IncompleteDocument(_)));
        assert!(err.to_string().contains("missed_opportunities"));
    }

    #[test]
    fn test_missing_nested_field_is_rejected() {
        let mut value = sample_value();
        value["mistakes"][0].as_object_mut().unwrap().remove("why_incorrect");

        assert!(AnalysisDocument::from_value(value).is_err());
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let mut value = sample_value();
        value["confidence"] = json!(0.9);

        assert!(AnalysisDocument::from_value(value).is_ok());
    }

    #[test]
    fn test_json_string_roundtrip() {
        let doc = AnalysisDocument::from_value(sample_value()).unwrap();
        let text = doc.to_json_string().unwrap();
        assert_eq!(AnalysisDocument::from_json_str(&text).unwrap(), doc);
    }

    #[test]
    fn test_from_json_str_rejects_garbage() {
        let err = AnalysisDocument::from_json_str("not json").unwrap_err();
        assert!(matches!(err, ModelError::Json(_)));
    }
}
