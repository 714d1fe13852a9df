//! Completion of truncated JSON text.
//!
//! A streamed JSON object is usually cut off in the middle of a string,
//! a number or a key. [`completions`] scans the text once and returns
//! closed-off variants to try, best first:
//!
//! 1. the text as-is with an open value string terminated and all open
//!    containers closed;
//! 2. the text cut back to the last point where a value was complete,
//!    with the containers open at that point closed.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object { expect_key: bool },
    Array,
}

fn closers(stack: &[Frame]) -> String {
    stack
        .iter()
        .rev()
        .map(|f| match f {
            Frame::Object { .. } => '}',
            Frame::Array => ']',
        })
        .collect()
}

/// Returns candidate completions of `text`, best first.
///
/// The candidates are not guaranteed to parse; the caller tries each.
#[must_use]
pub fn completions(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut stack: Vec<Frame> = Vec::new();
    let mut end = bytes.len();

    let mut in_string = false;
    let mut string_is_key = false;
    // Byte index of a backslash whose escape is not finished yet.
    let mut escape_start: Option<usize> = None;
    let mut unicode_digits = 0_u8;
    let mut is_unicode = false;
    // Start of a trailing high surrogate escape still waiting for its pair.
    let mut pending_high: Option<usize> = None;

    let mut safe: Option<(usize, String)> = None;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if let Some(start) = escape_start {
                if is_unicode {
                    if b.is_ascii_hexdigit() {
                        unicode_digits += 1;
                        if unicode_digits == 4 {
                            let code = text
                                .get(start + 2..=i)
                                .and_then(|hex| u16::from_str_radix(hex, 16).ok())
                                .unwrap_or(0);
                            escape_start = None;
                            is_unicode = false;
                            pending_high = (0xD800..0xDC00).contains(&code).then_some(start);
                        }
                        continue;
                    }
                    escape_start = None;
                    is_unicode = false;
                } else if b == b'u' {
                    is_unicode = true;
                    unicode_digits = 0;
                    continue;
                } else {
                    escape_start = None;
                    pending_high = None;
                    continue;
                }
            }
            match b {
                b'\\' => escape_start = Some(i),
                b'"' => {
                    in_string = false;
                    pending_high = None;
                    if !string_is_key {
                        safe = Some((i + 1, closers(&stack)));
                    }
                }
                _ => pending_high = None,
            }
            continue;
        }

        match b {
            b'{' => {
                stack.push(Frame::Object { expect_key: true });
                safe = Some((i + 1, closers(&stack)));
            }
            b'[' => {
                stack.push(Frame::Array);
                safe = Some((i + 1, closers(&stack)));
            }
            b'}' | b']' => {
                stack.pop();
                safe = Some((i + 1, closers(&stack)));
                if stack.is_empty() {
                    end = i + 1;
                    break;
                }
            }
            b'"' => {
                in_string = true;
                string_is_key = matches!(stack.last(), Some(Frame::Object { expect_key: true }));
            }
            b':' => {
                if let Some(Frame::Object { expect_key }) = stack.last_mut() {
                    *expect_key = false;
                }
            }
            b',' => {
                safe = Some((i, closers(&stack)));
                if let Some(Frame::Object { expect_key }) = stack.last_mut() {
                    *expect_key = true;
                }
            }
            _ => {}
        }
    }

    let mut candidates = Vec::with_capacity(2);
    let open = closers(&stack);
    if in_string {
        if !string_is_key {
            let cut = [escape_start, pending_high]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(end);
            if let Some(prefix) = text.get(..cut) {
                candidates.push(format!("{prefix}\"{open}"));
            }
        }
    } else if let Some(prefix) = text.get(..end) {
        candidates.push(format!("{prefix}{open}"));
    }
    if let Some((idx, closing)) = safe
        && let Some(prefix) = text.get(..idx)
    {
        let candidate = format!("{prefix}{closing}");
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn first_parsable(text: &str) -> Option<serde_json::Value> {
        completions(text)
            .iter()
            .find_map(|c| serde_json::from_str(c).ok())
    }

    #[test_case(r#"{"message": "Hel"# => Some(serde_json::json!({"message": "Hel"})); "open value string")]
    #[test_case(r#"{"mess"# => Some(serde_json::json!({})); "open key")]
    #[test_case(r#"{"message":"#  => Some(serde_json::json!({})); "missing value")]
    #[test_case(r#"{"message": "a\"# => Some(serde_json::json!({"message": "a"})); "dangling backslash")]
    #[test_case(r#"{"message": "a\u00"# => Some(serde_json::json!({"message": "a"})); "partial unicode escape")]
    #[test_case(r#"{"message": "a\ud83d"# => Some(serde_json::json!({"message": "a"})); "lone high surrogate")]
    #[test_case(r#"{"message": "done"}"# => Some(serde_json::json!({"message": "done"})); "complete")]
    #[test_case(r#"{"message": "x", "n": 12"# => Some(serde_json::json!({"message": "x", "n": 12})); "trailing number")]
    #[test_case(r#"{"message": "x", "ok": tr"# => Some(serde_json::json!({"message": "x"})); "partial literal")]
    #[test_case(r#"{"items": [1, 2"# => Some(serde_json::json!({"items": [1, 2]})); "open array")]
    fn test_completion(text: &str) -> Option<serde_json::Value> {
        first_parsable(text)
    }

    #[test]
    fn test_trailing_text_after_object_is_ignored() {
        let value = first_parsable("{\"message\": \"hi\"}\n```");
        assert_eq!(value, Some(serde_json::json!({"message": "hi"})));
    }

    #[test]
    fn test_multibyte_text_is_kept() {
        let value = first_parsable(r#"{"message": "نقشه راه"#);
        assert_eq!(value, Some(serde_json::json!({"message": "نقشه راه"})));
    }

    #[test]
    fn test_no_candidates_for_empty_text() {
        assert_eq!(completions(""), vec![String::new()]);
        assert!(first_parsable("").is_none());
    }
}
