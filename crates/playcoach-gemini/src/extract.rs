//! JSON extraction from free-form model output.
//!
//! Models often wrap the requested JSON in prose or markdown fences. The
//! first `{` starts the candidate object and a depth-aware scan finds its
//! matching `}`; braces inside string literals are not counted.

use serde_json::Value;

use crate::error::{GeminiError, GeminiResult};

/// Extract and parse the first JSON object embedded in `text`.
///
/// Fails with [`GeminiError::NoJsonFound`] when `text` contains no `{`, and
/// with [`GeminiError::MalformedJson`] when the candidate does not parse.
pub fn extract_json(text: &str) -> GeminiResult<Value> {
    let start = text.find('{').ok_or(GeminiError::NoJsonFound)?;
    let candidate = balanced_object(&text[start..]);

    serde_json::from_str(candidate).map_err(GeminiError::MalformedJson)
}

/// Prefix of `text` (which starts with `{`) up to the matching `}`.
///
/// An unbalanced object yields the whole remainder so the parser can
/// report what is wrong with it.
fn balanced_object(text: &str) -> &str {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    // Delimiters are ASCII, so byte offsets are always char boundaries.
    for (i, byte) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &text[..=i];
                }
            }
            _ => {}
        }
    }

    text
}
