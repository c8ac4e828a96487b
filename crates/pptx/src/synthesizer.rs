//! Builds a complete styled deck when no template was uploaded.

use crate::package::SlidePackage;
use crate::template::{WIDESCREEN_CX, WIDESCREEN_CY};
use crate::text::{Paragraph, RgbColor, TextStyle};
use deck_core::{Error, Result, SlideRecord, TARGET_SLIDE_COUNT};

/// Background colors, cycled per slide.
pub const PALETTE: [RgbColor; 5] = [
    RgbColor(0x0A, 0x19, 0x40),
    RgbColor(0x06, 0x39, 0x70),
    RgbColor(0x3A, 0x02, 0x56),
    RgbColor(0x7D, 0x1F, 0x3A),
    RgbColor(0x06, 0x4D, 0x53),
];

const SYNTH_TITLE_STYLE: TextStyle = TextStyle::new(38.0, true, RgbColor::WHITE);
const SYNTH_HIGHLIGHT_STYLE: TextStyle = TextStyle::new(22.0, true, RgbColor(0xFF, 0xD7, 0x00));
const SYNTH_BULLET_STYLE: TextStyle = TextStyle::new(20.0, false, RgbColor(0xF5, 0xF5, 0xF5));

const EMU_PER_INCH: f64 = 914_400.0;

/// Inches to EMU.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH).round() as i64
}

/// Top edge, in inches, of the `k`th highlight box.
fn highlight_top(k: usize) -> f64 {
    2.0 + 0.7 * k as f64
}

/// A fresh widescreen deck with one Blank-layout slide per record (at most
/// five), each on a palette background with title, highlight and body text
/// boxes.
pub fn synthesize(records: &[SlideRecord]) -> Result<SlidePackage> {
    let mut pkg = SlidePackage::new_blank(WIDESCREEN_CX, WIDESCREEN_CY)?;
    let layout_part = pkg
        .layouts()
        .first()
        .map(|l| l.part_name().to_string())
        .ok_or_else(|| Error::InvalidPackage("Built-in package has no layout".to_string()))?;

    for (i, record) in records.iter().take(TARGET_SLIDE_COUNT).enumerate() {
        let index = pkg.add_slide(&layout_part)?;
        if let Some(notes) = record.notes() {
            pkg.ensure_notes_slide(index)?;
            if let Some(page) = pkg.slide_mut(index).and_then(|s| s.notes_mut()) {
                page.set_text(notes);
            }
        }

        let Some(slide) = pkg.slide_mut(index) else {
            continue;
        };
        slide.set_background(PALETTE[i % PALETTE.len()]);
        slide.add_text_box(
            "Title",
            (inches(0.8), inches(0.6)),
            (inches(11.0), inches(1.4)),
            &[Paragraph::new(record.title.as_str(), SYNTH_TITLE_STYLE)],
        );

        for (k, highlight) in record.highlights.iter().enumerate() {
            slide.add_text_box(
                &format!("Highlight {}", k + 1),
                (inches(1.0), inches(highlight_top(k))),
                (inches(11.0), inches(0.6)),
                &[Paragraph::new(highlight.as_str(), SYNTH_HIGHLIGHT_STYLE)],
            );
        }
        let y = highlight_top(record.highlights.len());

        let bullets: Vec<Paragraph> = record
            .bullets
            .iter()
            .map(|b| Paragraph::new(b.as_str(), SYNTH_BULLET_STYLE).with_level(1))
            .collect();
        slide.add_text_box("Body", (inches(1.0), inches(y)), (inches(11.0), inches(3.0)), &bullets);
    }

    log::info!("Synthesized deck with {} slides", pkg.slide_count());
    Ok(pkg)
}
