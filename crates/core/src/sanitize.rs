//! Text sanitation for generated slide content.
//!
//! Generator output ends up inside XML text nodes, so anything XML 1.0 cannot
//! carry has to go before it reaches the package writer.

use crate::types::{SlideRecord, MAX_HIGHLIGHTS};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse runs of horizontal whitespace into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());

/// Whether a character may appear in an XML 1.0 document.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Cleans generator text so it is safe and tidy inside slide XML.
#[derive(Debug, Clone)]
pub struct TextSanitizer {
    /// Whether embedded line breaks survive (otherwise they become spaces).
    preserve_line_breaks: bool,
}

impl Default for TextSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSanitizer {
    /// Create a sanitizer that keeps line breaks.
    pub fn new() -> Self {
        Self {
            preserve_line_breaks: true,
        }
    }

    /// Set whether to preserve embedded line breaks.
    pub fn with_preserve_line_breaks(mut self, preserve: bool) -> Self {
        self.preserve_line_breaks = preserve;
        self
    }

    /// Clean a single piece of text.
    ///
    /// - Normalizes line endings to `\n`
    /// - Drops characters XML 1.0 forbids (most C0 controls, U+FFFE/U+FFFF)
    /// - Applies Unicode NFC composition
    /// - Collapses horizontal whitespace runs and trims every line
    pub fn clean(&self, text: &str) -> String {
        let unified = text.replace("\r\n", "\n").replace('\r', "\n");

        let composed: String = unified.nfc().filter(|&c| is_xml_char(c)).collect();

        if self.preserve_line_breaks {
            composed
                .lines()
                .map(|line| WHITESPACE_COLLAPSE_REGEX.replace_all(line, " ").trim().to_string())
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        } else {
            let flat = composed.replace('\n', " ");
            WHITESPACE_COLLAPSE_REGEX
                .replace_all(&flat, " ")
                .trim()
                .to_string()
        }
    }

    /// Clean every field of a record and enforce the highlight limit.
    ///
    /// Titles, highlights and bullets are single-line; speaker notes keep
    /// their line breaks. Blank highlights and bullets are dropped.
    pub fn clean_record(&self, record: SlideRecord) -> SlideRecord {
        let single_line = self.clone().with_preserve_line_breaks(false);
        let clean_list = |items: Vec<String>| -> Vec<String> {
            items
                .iter()
                .map(|item| single_line.clean(item))
                .filter(|item| !item.is_empty())
                .collect()
        };

        let mut highlights = clean_list(record.highlights);
        highlights.truncate(MAX_HIGHLIGHTS);

        SlideRecord {
            title: single_line.clean(&record.title),
            subtitle: record
                .subtitle
                .map(|s| single_line.clean(&s))
                .filter(|s| !s.is_empty()),
            highlights,
            bullets: clean_list(record.bullets),
            details: record
                .details
                .map(|d| self.clean(&d))
                .filter(|d| !d.is_empty()),
        }
    }
}
