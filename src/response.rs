use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Marker wrapping the detected span inside annotated text.
pub const SPAN_MARKER: &str = "**";

/// Placeholder used when the completion service returns nothing usable.
pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "[empty response]";

/// A detected date: the submitted text with the date expression wrapped in
/// markers, the resolved calendar date, and the byte span of the expression
/// in the plain (unannotated) text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub annotated: String,
    pub date: NaiveDate,
    pub start: usize,
    pub end: usize,
}

/// The completion text is the rewrite. An absent or empty completion is
/// replaced with a visible placeholder instead of failing the request.
pub fn parse_rewrite(raw: Option<String>) -> String {
    match raw {
        Some(text) if !text.is_empty() => text,
        _ => EMPTY_RESPONSE_PLACEHOLDER.to_string(),
    }
}

#[derive(Deserialize)]
struct RawExtraction {
    annotated: String,
    date: String,
}

/// Best-effort decode of a completion into an `Extraction`. One attempt, no
/// retry; any shape mismatch means "no date detected" (`None`), never an
/// error. Validates that the marker appears exactly twice and that removing
/// it restores the submitted text byte-for-byte.
pub fn parse_extraction(raw: &str, source_text: &str) -> Option<Extraction> {
    let parsed: RawExtraction = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(e) => {
            debug!("completion is not a detection object: {}", e);
            return None;
        }
    };

    let date = match NaiveDate::parse_from_str(&parsed.date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(e) => {
            debug!("detection date {:?} does not parse: {}", parsed.date, e);
            return None;
        }
    };

    if parsed.annotated.matches(SPAN_MARKER).count() != 2 {
        debug!("annotated text does not contain exactly one marked span");
        return None;
    }
    let open = parsed.annotated.find(SPAN_MARKER)?;
    let close = parsed.annotated.rfind(SPAN_MARKER)?;

    if parsed.annotated.replacen(SPAN_MARKER, "", 2) != source_text {
        debug!("annotated text does not reproduce the submitted text");
        return None;
    }

    Some(Extraction {
        start: open,
        end: close - SPAN_MARKER.len(),
        annotated: parsed.annotated,
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_passes_completion_text_through() {
        assert_eq!(
            parse_rewrite(Some("Hello, world!".to_string())),
            "Hello, world!"
        );
    }

    #[test]
    fn rewrite_substitutes_placeholder_for_missing_completion() {
        assert_eq!(parse_rewrite(None), EMPTY_RESPONSE_PLACEHOLDER);
        assert_eq!(parse_rewrite(Some(String::new())), EMPTY_RESPONSE_PLACEHOLDER);
    }

    #[test]
    fn extraction_accepts_a_marked_span_and_date() {
        let source = "Remind me to take out the trash on Tuesday.";
        let raw = r#"{"annotated": "Remind me to take out the trash on **Tuesday**.", "date": "2023-05-10"}"#;
        let extraction = parse_extraction(raw, source).unwrap();
        assert_eq!(
            extraction.annotated,
            "Remind me to take out the trash on **Tuesday**."
        );
        assert_eq!(
            extraction.date,
            NaiveDate::from_ymd_opt(2023, 5, 10).unwrap()
        );
        assert_eq!(&source[extraction.start..extraction.end], "Tuesday");
        assert_eq!(
            extraction.annotated.replacen(SPAN_MARKER, "", 2),
            source
        );
    }

    #[test]
    fn extraction_rejects_non_json() {
        assert_eq!(parse_extraction("not json", "not json"), None);
    }

    #[test]
    fn extraction_rejects_null_completion() {
        assert_eq!(parse_extraction("null", "lunch tomorrow"), None);
    }

    #[test]
    fn extraction_rejects_missing_fields() {
        let raw = r#"{"annotated": "see you **Friday**"}"#;
        assert_eq!(parse_extraction(raw, "see you Friday"), None);
    }

    #[test]
    fn extraction_rejects_unparseable_date() {
        let raw = r#"{"annotated": "see you **Friday**", "date": "next week"}"#;
        assert_eq!(parse_extraction(raw, "see you Friday"), None);
    }

    #[test]
    fn extraction_rejects_wrong_marker_count() {
        let raw = r#"{"annotated": "see you **Friday", "date": "2023-05-12"}"#;
        assert_eq!(parse_extraction(raw, "see you Friday"), None);
    }

    #[test]
    fn extraction_rejects_annotation_that_alters_the_text() {
        let raw = r#"{"annotated": "see you on **Friday**", "date": "2023-05-12"}"#;
        assert_eq!(parse_extraction(raw, "see you Friday"), None);
    }
}
