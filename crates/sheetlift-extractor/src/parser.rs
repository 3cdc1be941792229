//! Clean up model output and decode it as JSON

use crate::error::ExtractorError;
use crate::types::ExtractedRecord;

/// Opening fence models like to wrap JSON answers in
const FENCE_OPEN: &str = "```json";

/// Closing fence
const FENCE_CLOSE: &str = "```";

/// Strip surrounding whitespace and a ```` ```json ```` / ```` ``` ```` wrapper
///
/// Purely positional: only a prefix and a suffix are ever removed, fences in
/// the middle of the text are left alone, and an opening fence does not need
/// a matching closing one. The strip is repeated until nothing changes, so
/// `sanitize(sanitize(x)) == sanitize(x)` for every input.
pub fn sanitize(raw: &str) -> &str {
    let mut current = raw.trim();
    loop {
        let unfenced = current.strip_prefix(FENCE_OPEN).unwrap_or(current);
        let unfenced = unfenced.strip_suffix(FENCE_CLOSE).unwrap_or(unfenced).trim();
        if unfenced.len() == current.len() {
            return current;
        }
        current = unfenced;
    }
}

/// Sanitize a raw model response and decode it as JSON
pub fn parse_response(raw: &str) -> Result<ExtractedRecord, ExtractorError> {
    let text = sanitize(raw);

    serde_json::from_str(text).map_err(|source| ExtractorError::ResponseParse {
        source,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_fenced_json() {
        let raw = "```json\n{\"a\":1}\n```";
        let cleaned = sanitize(raw);
        assert_eq!(cleaned, "{\"a\":1}");

        let value: serde_json::Value = serde_json::from_str(cleaned).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_sanitize_unfenced_is_trim_only() {
        let raw = "  {\"a\": 1}\n\n";
        assert_eq!(sanitize(raw), raw.trim());
        assert_eq!(sanitize("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_sanitize_surrounding_whitespace_before_fence() {
        let raw = "\n   ```json\n[1, 2]\n```   \n";
        assert_eq!(sanitize(raw), "[1, 2]");
    }

    #[test]
    fn test_sanitize_opening_fence_only() {
        assert_eq!(sanitize("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_sanitize_closing_fence_only() {
        assert_eq!(sanitize("{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_sanitize_plain_fence_keeps_language_free_opening() {
        // Only the ```json marker is recognised as an opening fence
        assert_eq!(sanitize("```\n{}\n```"), "```\n{}");
    }

    #[test]
    fn test_sanitize_leaves_inner_fences() {
        let raw = "{\"code\": \"```json x```\"}";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn test_sanitize_degenerate_inputs() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   "), "");
        assert_eq!(sanitize("```json"), "");
        assert_eq!(sanitize("``````"), "");
        assert_eq!(sanitize("```json\n```"), "");
    }

    #[test]
    fn test_parse_response_decodes_fenced_object() {
        let raw = "```json\n{\"type\":\"resistor\",\"value\":\"10kΩ\"}\n```";
        let record = parse_response(raw).unwrap();
        assert_eq!(record, json!({"type": "resistor", "value": "10kΩ"}));
    }

    #[test]
    fn test_parse_response_decodes_array() {
        let record = parse_response("[{\"node\": 1}, {\"node\": 2}]").unwrap();
        assert_eq!(record.as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_parse_response_keeps_key_order() {
        let record = parse_response("{\"z\": 1, \"a\": 2, \"m\": 3}").unwrap();
        let keys: Vec<_> = record.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_parse_response_invalid_json_carries_text() {
        match parse_response("  not json \n") {
            Err(ExtractorError::ResponseParse { text, .. }) => assert_eq!(text, "not json"),
            other => panic!("Expected ResponseParse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_response_empty_is_error() {
        assert!(matches!(
            parse_response("```json\n```"),
            Err(ExtractorError::ResponseParse { .. })
        ));
    }
}
