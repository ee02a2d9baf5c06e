//! Provider response parsing.
//!
//! Models frequently wrap JSON answers in markdown code fences despite
//! instructions not to. Fences are stripped before parsing; a payload
//! that still fails to parse is a hard failure for that provider and
//! triggers fallback.

use curio_core::{Error, Result, UNCATEGORIZED};

/// Maximum payload length echoed into error messages.
const ERROR_SNIPPET_LEN: usize = 120;

/// Strip a leading markdown code fence (```` ```json ```` or plain
/// ```` ``` ````) and its closing fence, if present.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if let Some(body) = fenced_body(trimmed, "```json") {
        return body;
    }
    if let Some(body) = fenced_body(trimmed, "```") {
        return body;
    }
    trimmed
}

fn fenced_body<'a>(content: &'a str, marker: &str) -> Option<&'a str> {
    let (_, after) = content.split_once(marker)?;
    let body = match after.split_once("```") {
        Some((body, _)) => body,
        None => after,
    };
    Some(body.trim())
}

/// Parse a classification response into a category list.
///
/// - JSON array of strings → the categories.
/// - Valid JSON that is not an array → coerced to `["Uncategorized"]`
///   (treated as a definitive "no result", not a provider failure).
/// - Anything else → `ProviderResponse` error (fallback or terminal).
pub fn parse_category_list(content: &str) -> Result<Vec<String>> {
    let body = strip_code_fences(content);
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|_| Error::ProviderResponse(format!("not valid JSON: {}", snippet(body))))?;

    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => Ok(s),
                other => Err(Error::ProviderResponse(format!(
                    "non-string category entry: {}",
                    other
                ))),
            })
            .collect(),
        _ => Ok(vec![UNCATEGORIZED.to_string()]),
    }
}

/// Parse a reorg suggestion response into its mapping set.
pub fn parse_reorg_suggestions(content: &str) -> Result<curio_core::ReorgSuggestions> {
    let body = strip_code_fences(content);
    serde_json::from_str(body)
        .map_err(|_| Error::ProviderResponse(format!("not a suggestion object: {}", snippet(body))))
}

fn snippet(body: &str) -> String {
    if body.len() <= ERROR_SNIPPET_LEN {
        return body.to_string();
    }
    let mut end = ERROR_SNIPPET_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array() {
        let categories = parse_category_list(r#"["Technology", "AI"]"#).unwrap();
        assert_eq!(categories, vec!["Technology", "AI"]);
    }

    #[test]
    fn test_json_fenced_array() {
        let content = "```json\n[\"Technology\", \"AI\"]\n```";
        let categories = parse_category_list(content).unwrap();
        assert_eq!(categories, vec!["Technology", "AI"]);
    }

    #[test]
    fn test_plain_fenced_array() {
        let content = "```\n[\"Gaming\"]\n```";
        assert_eq!(parse_category_list(content).unwrap(), vec!["Gaming"]);
    }

    #[test]
    fn test_unterminated_fence() {
        let content = "```json\n[\"Gaming\"]";
        assert_eq!(parse_category_list(content).unwrap(), vec!["Gaming"]);
    }

    #[test]
    fn test_prose_around_fence() {
        let content = "Here you go:\n```json\n[\"Music\"]\n```\nHope that helps!";
        assert_eq!(parse_category_list(content).unwrap(), vec!["Music"]);
    }

    #[test]
    fn test_non_array_json_coerces_to_uncategorized() {
        let categories = parse_category_list(r#"{"category": "Technology"}"#).unwrap();
        assert_eq!(categories, vec![UNCATEGORIZED.to_string()]);
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(parse_category_list("[]").unwrap().is_empty());
    }

    #[test]
    fn test_unparseable_is_hard_failure() {
        let err = parse_category_list("I think this is about technology").unwrap_err();
        assert!(matches!(err, curio_core::Error::ProviderResponse(_)));
    }

    #[test]
    fn test_non_string_entries_are_hard_failure() {
        let err = parse_category_list(r#"["Tech", 42]"#).unwrap_err();
        assert!(matches!(err, curio_core::Error::ProviderResponse(_)));
    }

    #[test]
    fn test_reorg_suggestions_fenced() {
        let content = "```json\n{\"suggestions\": [{\"from\": \"Tech\", \"to\": \"Technology\"}], \"notes\": \"merged\"}\n```";
        let parsed = parse_reorg_suggestions(content).unwrap();
        assert_eq!(parsed.suggestions.len(), 1);
        assert_eq!(parsed.notes.as_deref(), Some("merged"));
    }

    #[test]
    fn test_reorg_suggestions_array_payload_is_failure() {
        assert!(parse_reorg_suggestions(r#"["Tech"]"#).is_err());
    }

    #[test]
    fn test_long_payload_truncated_in_error() {
        let long = "x".repeat(500);
        let err = parse_category_list(&long).unwrap_err();
        assert!(err.to_string().len() < 250);
    }
}
