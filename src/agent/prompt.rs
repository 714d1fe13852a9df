//! System prompt and retry prompt for the assistant.
//!
//! The system prompt can be replaced with a markdown file; the compiled-in
//! prompt is used when no file is configured or it cannot be read.

use std::path::Path;

use tracing::warn;

/// Built-in system prompt.
pub const SYSTEM_PROMPT: &str = r#"You are a helpful assistant for people who use Outline, the knowledge base where the company writes, shares and maintains its documentation.

## Tools

1. `get_doc_by_url`: fetch a full document when you have its URL or path.
2. `get_current_page_url`: get the URL of the page the user currently has open. Use it when the user refers to "this page" or "this document", then fetch that document.
3. `search_docs`: search for documents relevant to a question or topic. Send several keywords at once: exact terms, synonyms and paraphrases, in both Persian and English.

## Rules

- Ground answers in the documents you retrieved. Link the documents you used.
- If a tool returns an error message, take it into account; retry with other keywords or tell the user what could not be found.
- Do not invent document contents, titles or links.
- Answer in the user's language.

## Output Format (JSON)

Always answer with a single JSON object and nothing else:
```json
{"message": "<your answer in markdown>"}
```
"#;

/// Builds the user message sent back when the final output was invalid.
#[must_use]
pub fn build_retry_prompt(error: &str) -> String {
    format!(
        "Your previous answer could not be validated: {error}\n\n\
         Reply again with only a JSON object of the form {{\"message\": \"<answer in markdown>\"}}."
    )
}

/// Loads the system prompt from `path`, falling back to [`SYSTEM_PROMPT`].
#[must_use]
pub fn load_system_prompt(path: Option<&Path>) -> String {
    path.and_then(|p| match std::fs::read_to_string(p) {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            warn!(path = %p.display(), "system prompt file is empty, using built-in prompt");
            None
        }
        Err(e) => {
            warn!(path = %p.display(), error = %e, "cannot read system prompt file, using built-in prompt");
            None
        }
    })
    .unwrap_or_else(|| SYSTEM_PROMPT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_every_tool() {
        for name in ["get_doc_by_url", "get_current_page_url", "search_docs"] {
            assert!(SYSTEM_PROMPT.contains(name), "missing {name}");
        }
        assert!(SYSTEM_PROMPT.contains(r#"{"message":"#));
    }

    #[test]
    fn test_retry_prompt_includes_error() {
        let prompt = build_retry_prompt("expected value at line 1 column 1");
        assert!(prompt.contains("expected value at line 1 column 1"));
        assert!(prompt.contains("\"message\""));
    }

    #[test]
    fn test_load_falls_back_to_default() {
        assert_eq!(load_system_prompt(None), SYSTEM_PROMPT);
        assert_eq!(
            load_system_prompt(Some(Path::new("/nonexistent/prompt.md"))),
            SYSTEM_PROMPT
        );
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("outline-prompt-{}.md", std::process::id()));
        std::fs::write(&path, "Custom prompt").unwrap_or_default();
        assert_eq!(load_system_prompt(Some(&path)), "Custom prompt");
        let _ = std::fs::remove_file(&path);
    }
}
