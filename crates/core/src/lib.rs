//! Core domain types, generator-output extraction and text sanitation
//! for fixed-length deck generation.

pub mod error;
pub mod extract;
pub mod generate;
pub mod sanitize;
pub mod types;

pub use error::{Error, Result};
pub use extract::{extract_records, records_or_fallback};
pub use generate::{generate_records, ContentGenerator, GenerationRequest};
pub use sanitize::TextSanitizer;
pub use types::{
    fallback_records, PresentationFormat, SlideRecord, MAX_HIGHLIGHTS, OUTPUT_FILENAME,
    TARGET_SLIDE_COUNT,
};
