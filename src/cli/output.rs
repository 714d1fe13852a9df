//! Output formatting for CLI commands.

use serde::Serialize;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable markdown.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name; unknown names fall back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes `value` as pretty JSON.
    #[must_use]
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| {
            serde_json::json!({ "error": format!("serialization failed: {e}") }).to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("json" => OutputFormat::Json)]
    #[test_case("JSON" => OutputFormat::Json)]
    #[test_case("text" => OutputFormat::Text)]
    #[test_case("yaml" => OutputFormat::Text)]
    fn test_parse(s: &str) -> OutputFormat {
        OutputFormat::parse(s)
    }

    #[test]
    fn test_to_json_is_pretty() {
        let out = OutputFormat::Json.to_json(&serde_json::json!({"a": 1}));
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }
}
