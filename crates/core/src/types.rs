//! Domain types for generated slide content.

use serde::{Deserialize, Deserializer, Serialize};

/// Number of slides every generated deck is forced to.
pub const TARGET_SLIDE_COUNT: usize = 5;

/// Maximum number of highlight phrases kept per slide.
pub const MAX_HIGHLIGHTS: usize = 3;

/// File name the rendered deck is offered under.
pub const OUTPUT_FILENAME: &str = "generated_presentation.pptx";

/// Content of one generated slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// Slide title. May be empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Optional subtitle. Carried through but not rendered.
    #[serde(default)]
    pub subtitle: Option<String>,

    /// Short emphasized phrases, rendered before the bullets.
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlights: Vec<String>,

    /// Body bullets.
    #[serde(default, deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,

    /// Speaker notes.
    #[serde(default)]
    pub details: Option<String>,
}

impl SlideRecord {
    /// Create a record with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Add a highlight phrase.
    pub fn with_highlight(mut self, text: impl Into<String>) -> Self {
        self.highlights.push(text.into());
        self
    }

    /// Add a bullet.
    pub fn with_bullet(mut self, text: impl Into<String>) -> Self {
        self.bullets.push(text.into());
        self
    }

    /// Set the speaker notes.
    pub fn with_details(mut self, text: impl Into<String>) -> Self {
        self.details = Some(text.into());
        self
    }

    /// Speaker notes, if present and not blank.
    pub fn notes(&self) -> Option<&str> {
        self.details
            .as_deref()
            .filter(|d| !d.trim().is_empty())
    }
}

/// Generators sometimes emit `null` where a list or string is expected.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The deck used whenever generator output cannot be turned into records.
pub fn fallback_records() -> Vec<SlideRecord> {
    (1..=TARGET_SLIDE_COUNT)
        .map(|n| SlideRecord::new(format!("Demo Slide {}", n)).with_bullet(format!("Fallback bullet {}", n)))
        .collect()
}

/// The format of an uploaded template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary). Recognized only to reject it clearly.
    Ppt,
}

impl PresentationFormat {
    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::Ppt);
        }

        None
    }
}
