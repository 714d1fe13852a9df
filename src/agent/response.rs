//! Structured assistant response and its two validators.
//!
//! The model answers with a JSON object `{"message": "..."}`. While the
//! answer streams in, [`validate_partial`] accepts any prefix that can be
//! closed off into such an object. Once the stream ends, [`validate_final`]
//! requires the whole output to be one.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::partial_json;
use crate::error::{ValidationFailure, ValidationStage};

/// The assistant's answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StructuredResponse {
    /// Answer in markdown, or plain conversation with the user.
    #[serde(default)]
    pub message: String,
}

impl StructuredResponse {
    /// Creates a response with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Markdown shown to the user.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        self.message.clone()
    }
}

/// Removes a markdown code fence around the output, even an unterminated one.
///
/// The fence's language tag (`json`, `JSON`, ...) is dropped whatever its case.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let tag_len = rest.find(['\n', '{']).unwrap_or(rest.len());
    let is_tag = rest[..tag_len]
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    let body = if is_tag { &rest[tag_len..] } else { rest };
    body.trim().trim_end_matches("```").trim()
}

fn failure(stage: ValidationStage, message: impl Into<String>) -> ValidationFailure {
    ValidationFailure {
        stage,
        message: message.into(),
    }
}

/// Leniently validates an incomplete output.
///
/// # Errors
///
/// Returns a [`ValidationFailure`] when no completion of the text is a JSON
/// object, or when `message` is present but not a string.
pub fn validate_partial(text: &str) -> Result<StructuredResponse, ValidationFailure> {
    let json = strip_code_fence(text);
    if json.is_empty() {
        return Err(failure(ValidationStage::Partial, "no output yet"));
    }

    for candidate in partial_json::completions(json) {
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str(&candidate) else {
            continue;
        };
        return match map.get("message") {
            None => Ok(StructuredResponse::default()),
            Some(serde_json::Value::String(message)) => Ok(StructuredResponse::new(message.clone())),
            Some(other) => Err(failure(
                ValidationStage::Partial,
                format!("`message` must be a string, got {other}"),
            )),
        };
    }
    Err(failure(
        ValidationStage::Partial,
        "output is not the beginning of a JSON object",
    ))
}

/// Strictly validates a completed output.
///
/// # Errors
///
/// Returns a [`ValidationFailure`] when the output is not a JSON object
/// matching [`StructuredResponse`].
pub fn validate_final(text: &str) -> Result<StructuredResponse, ValidationFailure> {
    serde_json::from_str::<StructuredResponse>(strip_code_fence(text))
        .map_err(|e| failure(ValidationStage::Final, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("{\"message\": \"Q3 roadmap is" => "Q3 roadmap is"; "open string")]
    #[test_case("{\"message\": \"done\"}" => "done"; "complete")]
    #[test_case("{" => ""; "bare brace")]
    #[test_case("```json\n{\"message\": \"fenced" => "fenced"; "code fence")]
    #[test_case("  {\"message\": \"a\\nb" => "a\nb"; "escaped newline")]
    fn test_partial_accepts(text: &str) -> String {
        validate_partial(text)
            .map(|r| r.message)
            .unwrap_or_else(|e| e.to_string())
    }

    #[test_case(""; "empty")]
    #[test_case("Sure, here is"; "plain text")]
    #[test_case("{\"message\": 42"; "wrong type")]
    fn test_partial_rejects(text: &str) {
        let err = validate_partial(text).err();
        assert_eq!(err.map(|e| e.stage), Some(ValidationStage::Partial));
    }

    #[test]
    fn test_final_accepts_complete_object() {
        let response = validate_final("{\"message\": \"The Q3 roadmap focuses on search.\"}");
        assert_eq!(
            response,
            Ok(StructuredResponse::new("The Q3 roadmap focuses on search."))
        );
    }

    #[test]
    fn test_final_defaults_missing_message() {
        assert_eq!(validate_final("{}"), Ok(StructuredResponse::default()));
    }

    #[test]
    fn test_final_strips_fence() {
        let response = validate_final("```json\n{\"message\": \"hi\"}\n```");
        assert_eq!(response.map(|r| r.message), Ok("hi".to_string()));
    }

    #[test_case("```JSON\n{\"message\": \"hi\"}\n```"; "upper case tag")]
    #[test_case("```Json {\"message\": \"hi\"}```"; "tag on same line")]
    #[test_case("```\n{\"message\": \"hi\"}\n```"; "no tag")]
    #[test_case("  {\"message\": \"hi\"}  "; "no fence")]
    fn test_final_strips_any_fence(text: &str) {
        assert_eq!(validate_final(text).map(|r| r.message), Ok("hi".to_string()));
    }

    #[test]
    fn test_partial_strips_upper_case_fence() {
        let response = validate_partial("```JSON\n{\"message\": \"stream");
        assert_eq!(response.map(|r| r.message), Ok("stream".to_string()));
        assert!(validate_partial("```JSON").is_err());
    }

    #[test_case("{\"message\": \"unterminated"; "truncated")]
    #[test_case("The roadmap is on the wiki."; "plain text")]
    #[test_case("{\"message\": [1]}"; "wrong type")]
    fn test_final_rejects(text: &str) {
        let err = validate_final(text).err();
        assert_eq!(err.as_ref().map(|e| e.stage), Some(ValidationStage::Final));
        assert!(err.is_some_and(|e| e.to_string().starts_with("final output validation failed")));
    }

    #[test]
    fn test_to_markdown_is_message() {
        assert_eq!(StructuredResponse::new("**bold**").to_markdown(), "**bold**");
    }
}
