//! Request-level rendering: template editing or synthesis, then serialization.

use crate::injector::{self, ClearReport, InjectionReport};
use crate::normalizer::{self, NormalizeReport};
use crate::package::SlidePackage;
use crate::synthesizer;
use deck_core::{Error, PresentationFormat, Result, SlideRecord, TARGET_SLIDE_COUNT};
use serde::Serialize;

/// Where the slides of a rendered deck came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeckSource {
    Template,
    Synthesized,
}

/// A serialized deck and what it took to produce it.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedDeck {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub slide_count: usize,
    pub source: DeckSource,
    /// Present for template decks.
    pub normalize: Option<NormalizeReport>,
    /// Present for template decks.
    pub cleared: Option<ClearReport>,
    /// One entry per record written into a template slide.
    pub injections: Vec<InjectionReport>,
}

impl RenderedDeck {
    /// Number of shapes that refused text, across clearing and injection.
    pub fn skipped_shapes(&self) -> usize {
        self.cleared.as_ref().map_or(0, |c| c.skipped.len())
            + self.injections.iter().map(|r| r.skipped().count()).sum::<usize>()
    }
}

/// Check that uploaded template bytes are a zip container.
fn check_template_format(bytes: &[u8]) -> Result<()> {
    match PresentationFormat::from_magic(bytes) {
        Some(PresentationFormat::Pptx) => Ok(()),
        Some(PresentationFormat::Ppt) => Err(Error::UnsupportedFormat(
            "Legacy binary .ppt templates are not supported, save as .pptx".to_string(),
        )),
        None => Err(Error::UnsupportedFormat(
            "Template is not a PPTX file".to_string(),
        )),
    }
}

/// Render records into a deck.
///
/// With a template: normalize it to the target slide count, clear every
/// text frame, then write record `i` into slide `i`. Without one: synthesize
/// a deck from the records.
pub fn render_deck(records: &[SlideRecord], template: Option<&[u8]>) -> Result<RenderedDeck> {
    let Some(template) = template else {
        let pkg = synthesizer::synthesize(records)?;
        return Ok(RenderedDeck {
            bytes: pkg.to_bytes()?,
            slide_count: pkg.slide_count(),
            source: DeckSource::Synthesized,
            normalize: None,
            cleared: None,
            injections: Vec::new(),
        });
    };

    check_template_format(template)?;
    let mut pkg = SlidePackage::from_bytes(template)?;
    let normalize = normalizer::normalize(&mut pkg, TARGET_SLIDE_COUNT)?;
    let cleared = pkg.clear_all_text();

    let mut injections = Vec::with_capacity(records.len().min(pkg.slide_count()));
    for (index, record) in records.iter().take(pkg.slide_count()).enumerate() {
        injections.push(injector::inject(&mut pkg, index, record)?);
    }

    log::info!(
        "Rendered {} records into template with {} slides",
        injections.len(),
        pkg.slide_count()
    );

    Ok(RenderedDeck {
        bytes: pkg.to_bytes()?,
        slide_count: pkg.slide_count(),
        source: DeckSource::Template,
        normalize: Some(normalize),
        cleared: Some(cleared),
        injections,
    })
}
