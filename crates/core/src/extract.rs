//! Recovery of slide records from free-form generator output.
//!
//! Generators are asked for a bare JSON array but routinely wrap it in prose
//! or code fences. The extractor first tries the text as-is, then the greedy
//! span from the first `[` to the last `]`.

use crate::error::{Error, Result};
use crate::sanitize::TextSanitizer;
use crate::types::{fallback_records, SlideRecord, TARGET_SLIDE_COUNT};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Greedy bracket span across the whole text, newlines included.
static ARRAY_SPAN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

/// Decode the whole text as JSON, accepting a bare record array, an object
/// wrapping one under `slides`, or a single record object.
fn parse_payload(text: &str) -> Option<Vec<SlideRecord>> {
    let value: Value = serde_json::from_str(text).ok()?;
    match value {
        Value::Array(_) => serde_json::from_value(value).ok(),
        Value::Object(mut map) => {
            if let Some(slides) = map.remove("slides") {
                serde_json::from_value(slides).ok()
            } else if map.contains_key("title") {
                serde_json::from_value(Value::Object(map)).ok().map(|record| vec![record])
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Extract at most [`TARGET_SLIDE_COUNT`] sanitized records from generator text.
///
/// Fails with [`Error::ExtractionError`] when neither the whole text nor its
/// bracketed span is a JSON array of records.
pub fn extract_records(text: &str) -> Result<Vec<SlideRecord>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::ExtractionError("empty text from generator".to_string()));
    }

    let records = match parse_payload(trimmed) {
        Some(records) => records,
        None => {
            log::debug!("Generator text is not bare JSON, searching for an array");
            let span = ARRAY_SPAN_REGEX.find(trimmed).ok_or_else(|| {
                Error::ExtractionError("no JSON array found in generator text".to_string())
            })?;
            serde_json::from_str::<Vec<SlideRecord>>(span.as_str()).map_err(|e| {
                Error::ExtractionError(format!("bracketed span is not a slide array: {}", e))
            })?
        }
    };

    let sanitizer = TextSanitizer::new();
    Ok(records
        .into_iter()
        .take(TARGET_SLIDE_COUNT)
        .map(|record| sanitizer.clean_record(record))
        .collect())
}

/// Extract records, substituting the placeholder deck on failure.
///
/// The deck must render even when generation produced garbage, so the
/// failure is logged and swallowed here.
pub fn records_or_fallback(text: &str) -> Vec<SlideRecord> {
    match extract_records(text) {
        Ok(records) if !records.is_empty() => records,
        Ok(_) => {
            log::warn!("Generator returned an empty slide list, using fallback deck");
            fallback_records()
        }
        Err(e) => {
            log::warn!("{}, using fallback deck", e);
            fallback_records()
        }
    }
}
