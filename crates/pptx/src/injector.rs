//! Writes slide records into template slides.
//!
//! Text goes into the placeholders that play the title and body roles; every
//! other property of the slide (positions, fills, pictures, the layout
//! itself) is left as the template had it.

use crate::layout::Layout;
use crate::package::SlidePackage;
use crate::placeholder::PlaceholderRole;
use crate::slide::{SkipReason, Slide};
use crate::text::{Paragraph, RgbColor, TextStyle};
use deck_core::{Result, SlideRecord};
use serde::Serialize;

pub const TITLE_STYLE: TextStyle = TextStyle::new(32.0, true, RgbColor(0x00, 0x33, 0x66));
pub const HIGHLIGHT_STYLE: TextStyle = TextStyle::new(20.0, true, RgbColor(0x00, 0x66, 0xCC));
pub const BULLET_STYLE: TextStyle = TextStyle::new(18.0, false, RgbColor(0x3C, 0x3C, 0x3C));
pub const BULLET_LEVEL: u8 = 1;

/// A shape that refused a text edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeWriteSkip {
    pub shape_index: usize,
    pub shape_name: String,
    pub reason: SkipReason,
}

/// Result of writing one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleWrite {
    /// Index of the shape that took the text, if any did.
    pub written: Option<usize>,
    /// Shapes with the role tried first and skipped.
    pub skipped: Vec<ShapeWriteSkip>,
}

/// What [`inject`] did to one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InjectionReport {
    pub title: RoleWrite,
    pub body: RoleWrite,
    pub notes_written: bool,
}

impl InjectionReport {
    pub fn skipped(&self) -> impl Iterator<Item = &ShapeWriteSkip> {
        self.title.skipped.iter().chain(self.body.skipped.iter())
    }
}

/// What [`clear_text`] did to one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    /// Shapes whose text was removed.
    pub cleared: usize,
    pub skipped: Vec<ShapeWriteSkip>,
}

impl ClearReport {
    fn merge(&mut self, other: ClearReport) {
        self.cleared += other.cleared;
        self.skipped.extend(other.skipped);
    }
}

/// The title paragraph of a record.
pub fn title_paragraphs(record: &SlideRecord) -> Vec<Paragraph> {
    vec![Paragraph::new(record.title.as_str(), TITLE_STYLE)]
}

/// Highlights first, then bullets.
pub fn body_paragraphs(record: &SlideRecord) -> Vec<Paragraph> {
    record
        .highlights
        .iter()
        .map(|h| Paragraph::new(h.as_str(), HIGHLIGHT_STYLE))
        .chain(
            record
                .bullets
                .iter()
                .map(|b| Paragraph::new(b.as_str(), BULLET_STYLE).with_level(BULLET_LEVEL)),
        )
        .collect()
}

fn skip_of(slide: &Slide, index: usize, reason: SkipReason) -> ShapeWriteSkip {
    let shape_name = slide
        .shape(index)
        .map(|s| s.name().to_string())
        .unwrap_or_default();
    log::debug!(
        "Skipping shape {} '{}' on '{}': {}",
        index,
        shape_name,
        slide.part_name(),
        reason
    );
    ShapeWriteSkip {
        shape_index: index,
        shape_name,
        reason,
    }
}

/// Clear the text of every shape on a slide. Shapes that refuse edits keep
/// their text and are reported.
pub fn clear_text(slide: &mut Slide) -> ClearReport {
    let mut report = ClearReport::default();
    for index in 0..slide.shape_count() {
        let has_text_body = slide
            .shape(index)
            .is_some_and(|s| s.text_body().is_some());
        if !has_text_body {
            continue;
        }
        match slide.clear_shape_text(index) {
            Ok(true) => report.cleared += 1,
            Ok(false) => {}
            Err(reason) => report.skipped.push(skip_of(slide, index, reason)),
        }
    }
    report
}

impl SlidePackage {
    /// Clear the text of every shape on every slide.
    pub fn clear_all_text(&mut self) -> ClearReport {
        let mut report = ClearReport::default();
        for index in 0..self.slide_count() {
            if let Some(slide) = self.slide_mut(index) {
                report.merge(clear_text(slide));
            }
        }
        log::debug!(
            "Cleared {} text frames ({} locked or unsupported)",
            report.cleared,
            report.skipped.len()
        );
        report
    }
}

/// Write `content` into the first shape with `role` that accepts it.
fn write_role(
    slide: &mut Slide,
    layout: Option<&Layout>,
    role: PlaceholderRole,
    content: &[Paragraph],
) -> RoleWrite {
    let candidates: Vec<usize> = slide
        .shapes()
        .iter()
        .filter(|s| s.role(layout) == role)
        .map(|s| s.index())
        .collect();

    let mut result = RoleWrite::default();
    for index in candidates {
        match slide.write_shape_paragraphs(index, content) {
            Ok(()) => {
                result.written = Some(index);
                break;
            }
            Err(reason) => result.skipped.push(skip_of(slide, index, reason)),
        }
    }
    if result.written.is_none() {
        log::debug!("No writable {:?} shape on '{}'", role, slide.part_name());
    }
    result
}

/// Write a record's title and body text into one slide.
///
/// Notes are not touched here; see [`inject`].
pub fn inject_slide(slide: &mut Slide, layout: Option<&Layout>, record: &SlideRecord) -> InjectionReport {
    InjectionReport {
        title: write_role(slide, layout, PlaceholderRole::Title, &title_paragraphs(record)),
        body: write_role(slide, layout, PlaceholderRole::Body, &body_paragraphs(record)),
        notes_written: false,
    }
}

/// Write a record into the slide at `index`, including its speaker notes.
///
/// Non-blank `details` replace the slide's notes, creating a notes page
/// when the slide has none. Otherwise existing notes are kept.
pub fn inject(pkg: &mut SlidePackage, index: usize, record: &SlideRecord) -> Result<InjectionReport> {
    if let Some(notes) = record.notes() {
        pkg.ensure_notes_slide(index)?;
        if let Some(page) = pkg.slide_mut(index).and_then(Slide::notes_mut) {
            page.set_text(notes);
        }
    }

    let Some((slide, layout)) = pkg.slide_and_layout_mut(index) else {
        return Err(deck_core::Error::InvalidPackage(format!("No slide at index {}", index)));
    };
    let mut report = inject_slide(slide, layout, record);
    report.notes_written = record.notes().is_some();
    Ok(report)
}
