//! Boundary to the external content generator.
//!
//! The network call itself lives with the caller. This module owns the
//! request validation, the instruction prompt, and the best-effort policy
//! that turns any generator failure into the placeholder deck.

use crate::error::{Error, Result};
use crate::extract::records_or_fallback;
use crate::types::{fallback_records, SlideRecord, TARGET_SLIDE_COUNT};

/// A single deck-generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    input_text: String,
    guidance: String,
}

impl GenerationRequest {
    /// Build a request, rejecting empty input before any work starts.
    pub fn new(input_text: &str, guidance: &str) -> Result<Self> {
        let input_text = input_text.trim();
        if input_text.is_empty() {
            return Err(Error::UnrenderableInput("input text required".to_string()));
        }
        Ok(Self {
            input_text: input_text.to_string(),
            guidance: guidance.trim().to_string(),
        })
    }

    /// Render the instruction prompt sent to the generator.
    pub fn prompt(&self) -> String {
        let guidance = if self.guidance.is_empty() {
            "No special guidance"
        } else {
            self.guidance.as_str()
        };

        format!(
            "Turn the following into a {count}-slide PowerPoint presentation.\n\
             Return JSON array only, no extra text.\n\
             \n\
             Each slide must have:\n\
             - \"title\": string\n\
             - \"subtitle\": optional string\n\
             - \"highlights\": optional list of 1-3 short phrases\n\
             - \"bullets\": list of concise bullets\n\
             - \"details\": optional speaker notes\n\
             \n\
             Input:\n\
             {input}\n\
             \n\
             Guidance:\n\
             {guidance}\n",
            count = TARGET_SLIDE_COUNT,
            input = self.input_text,
            guidance = guidance,
        )
    }
}

/// Something that answers a generation request with raw text.
///
/// Implementations are expected to bound their own blocking time.
pub trait ContentGenerator {
    /// Produce raw generator output for the request.
    fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Ask the generator for slides, never failing.
///
/// A generator error or unusable output both yield the placeholder deck.
pub fn generate_records<G: ContentGenerator + ?Sized>(
    generator: &G,
    request: &GenerationRequest,
) -> Vec<SlideRecord> {
    match generator.generate(request) {
        Ok(text) => records_or_fallback(&text),
        Err(e) => {
            log::warn!("Content generation failed ({}), using fallback deck", e);
            fallback_records()
        }
    }
}
