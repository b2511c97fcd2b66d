//! Embedded player configuration extraction.
//!
//! Rendered player pages assign their media configuration in an inline script:
//!
//! ```text
//! config.media = {"metadata":{...},"streams":[...]};
//!
//! config.analytics = ...
//! ```
//!
//! ### Scan
//! - Find the first `config.media =` marker.
//! - Skip the marker and the one separator character after it, whatever it is.
//! - The payload ends at the first blank line (`\n\n`) after that point, minus
//!   the one character before it (the statement's `;`).
//!
//! The result is a lexical substring. It is not parsed or validated as JSON.

/// Marker preceding the embedded configuration object.
pub const CONFIG_MARKER: &str = "config.media =";

/// Terminator after the assignment statement.
pub const PAYLOAD_TERMINATOR: &str = "\n\n";

/// Returned when no configuration can be located: a JSON string holding `{}`.
pub const EMPTY_PAYLOAD: &str = "\"{}\"";

/// Extract the embedded configuration from rendered markup.
///
/// Returns [`EMPTY_PAYLOAD`] when the marker is absent. When the marker is
/// present but the payload region is empty or unterminated, the result is an
/// empty string.
pub fn extract_payload(document: &str) -> String {
    let Some(marker_at) = document.find(CONFIG_MARKER) else {
        return EMPTY_PAYLOAD.to_string();
    };

    let mut after_marker = document[marker_at + CONFIG_MARKER.len()..].chars();
    if after_marker.next().is_none() {
        tracing::debug!("config marker at {} ends the document", marker_at);
        return String::new();
    }
    let rest = after_marker.as_str();

    let Some(end) = rest.find(PAYLOAD_TERMINATOR) else {
        tracing::debug!("config payload at {} is not followed by a blank line", marker_at);
        return String::new();
    };

    let mut payload = &rest[..end];
    if let Some((last, _)) = payload.char_indices().next_back() {
        payload = &payload[..last];
    }

    payload.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER_PAGE: &str = "<html><head><script>\nvar config = {};\n\
        config.media = {\"metadata\":{\"id\":\"G6NQ5DWZ6\"},\"streams\":[{\"format\":\"adaptive_hls\"}]};\n\n\
        config.analytics = {};\n</script></head><body></body></html>";

    #[test]
    fn test_constants() {
        assert_eq!(CONFIG_MARKER.len(), 14);
        assert_eq!(EMPTY_PAYLOAD, r#""{}""#);
    }

    #[test]
    fn test_extract_payload() {
        assert_eq!(
            extract_payload(PLAYER_PAGE),
            r#"{"metadata":{"id":"G6NQ5DWZ6"},"streams":[{"format":"adaptive_hls"}]}"#
        );
    }

    #[test]
    fn test_extract_is_idempotent() {
        assert_eq!(extract_payload(PLAYER_PAGE), extract_payload(PLAYER_PAGE));
    }

    #[test]
    fn test_marker_missing_returns_sentinel() {
        assert_eq!(extract_payload("<html><body>no player here</body></html>"), EMPTY_PAYLOAD);
        assert_eq!(extract_payload(""), EMPTY_PAYLOAD);
    }

    #[test]
    fn test_uses_first_marker() {
        let doc = "config.media = {\"a\":1};\n\nconfig.media = {\"b\":2};\n\n";
        assert_eq!(extract_payload(doc), r#"{"a":1}"#);
    }

    #[test]
    fn test_stops_at_first_blank_line() {
        let doc = "config.media = {\"a\":\n1};\n\n{\"more\":true}\n\n";
        assert_eq!(extract_payload(doc), "{\"a\":\n1}");
    }

    #[test]
    fn test_no_terminator_yields_empty() {
        assert_eq!(extract_payload("config.media = {\"a\":1};</script>"), "");
    }

    #[test]
    fn test_marker_at_end_of_document() {
        assert_eq!(extract_payload("prefix config.media ="), "");
        assert_eq!(extract_payload("config.media = "), "");
    }

    #[test]
    fn test_terminator_immediately_after_separator() {
        assert_eq!(extract_payload("config.media = \n\n"), "");
    }

    #[test]
    fn test_separator_is_skipped_without_inspection() {
        // The character after the marker is dropped whatever it is.
        assert_eq!(extract_payload("config.media ={\"a\":1};\n\n"), "\"a\":1}");
    }

    #[test]
    fn test_multibyte_characters() {
        let doc = "config.media = {\"title\":\"Ünïcödé\"}é\n\n";
        assert_eq!(extract_payload(doc), "{\"title\":\"Ünïcödé\"}");
    }

    #[test]
    fn test_multibyte_separator_is_one_character() {
        assert_eq!(extract_payload("config.media =é{}\n\n"), "{");
        assert_eq!(extract_payload("config.media =é{\"a\":1};\n\n"), "{\"a\":1}");
    }
}
