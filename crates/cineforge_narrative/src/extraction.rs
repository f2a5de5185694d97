//! Utilities for pulling JSON out of free-form model responses.
//!
//! Responses often wrap JSON in markdown code fences or surround it with
//! explanatory prose. Extraction is a separate step from parsing so each
//! failure mode has its own error.

use cineforge_error::{CineforgeResult, ExtractionError, ExtractionErrorKind, JsonError};

/// Extract the first balanced-brace JSON object from `text`.
///
/// Braces inside string literals (including escaped quotes) are ignored
/// while balancing. Only the first object is considered; anything after it
/// is left alone.
///
/// # Errors
///
/// Returns [`ExtractionErrorKind::NoJson`] when the text holds no `{`, and
/// [`ExtractionErrorKind::Truncated`] when the first object never closes.
///
/// # Examples
///
/// ```
/// use cineforge_narrative::extract_json_object;
///
/// let response = r#"Report: {"isValid": true, "errors": []} and {"other": 1}"#;
/// assert_eq!(
///     extract_json_object(response).unwrap(),
///     r#"{"isValid": true, "errors": []}"#
/// );
/// assert!(extract_json_object("no braces here").is_err());
/// ```
pub fn extract_json_object(text: &str) -> Result<String, ExtractionError> {
    let start = text
        .find('{')
        .ok_or_else(|| ExtractionError::new(ExtractionErrorKind::NoJson))?;
    extract_balanced(text, start, '{', '}')
        .ok_or_else(|| ExtractionError::new(ExtractionErrorKind::Truncated(start)))
}

/// Extract JSON (object or array) from a response that may contain markdown or extra text.
///
/// Strategies, in order:
/// 1. Markdown code fences: ```json ... ``` or bare ``` ... ```
/// 2. Whichever of `{` or `[` appears first, balanced
/// 3. The other delimiter, balanced
///
/// # Errors
///
/// Returns an extraction error if no JSON is found.
///
/// # Examples
///
/// ```
/// use cineforge_narrative::extract_json;
///
/// let response = "Here you go:\n```json\n[{\"name\": \"Ava\"}]\n```\n";
/// assert_eq!(extract_json(response).unwrap(), "[{\"name\": \"Ava\"}]");
/// ```
pub fn extract_json(text: &str) -> Result<String, ExtractionError> {
    if let Some(json) = extract_from_code_block(text) {
        return Ok(json);
    }

    let brace = text.find('{');
    let bracket = text.find('[');

    let order: &[(char, char)] = match (brace, bracket) {
        (Some(b), Some(k)) if k < b => &[('[', ']'), ('{', '}')],
        (None, Some(_)) => &[('[', ']')],
        (None, None) => {
            tracing::warn!(response_length = text.len(), "No JSON found in response");
            return Err(ExtractionError::new(ExtractionErrorKind::NoJson));
        }
        _ => &[('{', '}'), ('[', ']')],
    };

    let mut first_start = None;
    for &(open, close) in order {
        if let Some(start) = text.find(open) {
            first_start.get_or_insert(start);
            if let Some(json) = extract_balanced(text, start, open, close) {
                return Ok(json);
            }
        }
    }

    tracing::warn!(response_length = text.len(), "JSON in response is truncated");
    Err(ExtractionError::new(ExtractionErrorKind::Truncated(
        first_start.unwrap_or_default(),
    )))
}

/// Content of the first markdown code fence whose body looks like JSON.
fn extract_from_code_block(text: &str) -> Option<String> {
    let start = text.find("```")?;
    let after_fence = start + 3;
    let body_start = text[after_fence..]
        .find('\n')
        .map(|n| after_fence + n + 1)
        .unwrap_or(after_fence);
    let body = match text[body_start..].find("```") {
        Some(end) => &text[body_start..body_start + end],
        None => &text[body_start..],
    };
    let body = body.trim();
    if body.starts_with('{') || body.starts_with('[') {
        Some(body.to_string())
    } else {
        None
    }
}

/// Slice from `start` up to the delimiter that balances it.
fn extract_balanced(text: &str, start: usize, open: char, close: char) -> Option<String> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(text[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse JSON into a specific type.
///
/// # Errors
///
/// Returns a JSON error if the string cannot be parsed into `T`.
///
/// # Examples
///
/// ```
/// use cineforge_narrative::parse_json;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Shot {
///     angle: String,
/// }
///
/// let shot: Shot = parse_json(r#"{"angle": "Low angle"}"#).unwrap();
/// assert_eq!(shot.angle, "Low angle");
/// ```
pub fn parse_json<T>(json: &str) -> CineforgeResult<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(json).map_err(|e| {
        let preview = json.chars().take(100).collect::<String>();
        tracing::warn!(error = %e, json_preview = %preview, "JSON parsing failed");
        JsonError::new(format!("Failed to parse JSON: {} (JSON: {}...)", e, preview)).into()
    })
}
