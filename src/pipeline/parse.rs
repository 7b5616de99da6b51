//! Pull the JSON object out of the model's text reply.
//!
//! Models asked for "valid JSON" still wrap the object in a ```json fence
//! more often than not. The contract here: if a fence is present its
//! interior is the candidate — a malformed fence interior fails the page
//! rather than falling back to the surrounding prose, which would only
//! ever parse by accident. Without a fence, the whole trimmed reply is the
//! candidate.

use crate::output::ExtractionResult;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\n(.*?)\n```").expect("valid regex"));

/// Parse the model's raw reply into an [`ExtractionResult`].
///
/// Returns `Err` when no JSON object can be recovered; the caller decides
/// whether that degrades to an empty page (the HTTP path does) or is
/// surfaced as a failure.
pub fn parse_extraction(raw: &str) -> Result<ExtractionResult, serde_json::Error> {
    let candidate = match RE_JSON_FENCE.captures(raw) {
        Some(caps) => caps[1].trim().to_string(),
        None => raw.trim().to_string(),
    };

    serde_json::from_str(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_reply_parses() {
        let raw = "```json\n{\"key_value_pairs\": {}, \"extracted_tests\": {\"hemoglobin\": \"13.5 g/dL\"}}\n```";
        let result = parse_extraction(raw).unwrap();
        assert!(result.key_value_pairs.is_empty());
        assert_eq!(result.extracted_tests["hemoglobin"], json!("13.5 g/dL"));
    }

    #[test]
    fn bare_json_parses() {
        let raw = "  {\"key_value_pairs\": {\"Patient\": \"A. Smith\"}, \"extracted_tests\": {}}  ";
        let result = parse_extraction(raw).unwrap();
        assert_eq!(result.key_value_pairs["Patient"], json!("A. Smith"));
    }

    #[test]
    fn fence_with_surrounding_prose_parses() {
        let raw = "Here is the extracted data:\n```json\n{\"extracted_tests\": {\"tsh\": 2.1}}\n```\nLet me know if you need anything else.";
        let result = parse_extraction(raw).unwrap();
        assert_eq!(result.extracted_tests["tsh"], json!(2.1));
    }

    #[test]
    fn prose_reply_is_an_error() {
        let raw = "I could not find any medical data in this image.";
        assert!(parse_extraction(raw).is_err());
    }

    #[test]
    fn malformed_fence_interior_is_an_error() {
        // The fence interior is the candidate; prose outside it must not
        // be re-tried.
        let raw = "{}\n```json\nnot json at all\n```";
        assert!(parse_extraction(raw).is_err());
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let result = parse_extraction("{}").unwrap();
        assert!(result.is_empty());
    }
}
