// src/utils.rs
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::core::error::PipelineError;

/// Remove a surrounding markdown code fence (```json or bare ```) from a model reply
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Skip the language tag on the opening line
    let body = match rest.find('\n') {
        Some(newline) if rest[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse a model reply as JSON. Anything unparsable is an upstream shape error.
pub fn parse_model_json<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T> {
    let body = strip_code_fences(raw);
    serde_json::from_str(body)
        .map_err(|e| PipelineError::UpstreamMalformed(format!("{}: {}", what, e)))
        .with_context(|| format!("Reply preview: {}", truncate_chars(body, 200)))
}

/// First `max` characters, never splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Trimmed, non-empty entries only
pub fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```\n"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  [3]  "), "[3]");
        assert_eq!(strip_code_fences("```json[4]```"), "[4]");
    }

    #[test]
    fn test_parse_model_json_marks_upstream_errors() {
        let parsed: Vec<u32> = parse_model_json("```json\n[1]\n```", "numbers").unwrap();
        assert_eq!(parsed, vec![1]);

        let err = parse_model_json::<Vec<u32>>("not json", "numbers").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UpstreamMalformed(_))
        ));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_clean_list() {
        let items = vec![" Rust ".to_string(), "".to_string(), "  ".to_string(), "Go".to_string()];
        assert_eq!(clean_list(&items), vec!["Rust", "Go"]);
    }
}
