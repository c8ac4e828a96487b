//! The slide package: a loaded presentation owning its slides, layouts,
//! relationship tables and every other part of the container.
//!
//! The slide sequence (`p:sldIdLst`) and the presentation relationship table
//! only change together, through [`SlidePackage::add_slide`] and
//! [`SlidePackage::remove_slide`]. Parts the engine does not model (media,
//! masters, themes, properties) are carried through as raw bytes.

use crate::layout::Layout;
use crate::opc::{
    self, content_type, rel_type, rels_part_for, ContentTypes, PartMap, Relationships,
    CONTENT_TYPES_PART,
};
use crate::slide::{NotesSlide, Slide};
use crate::template;
use crate::xml::{self, Element};
use deck_core::{Error, PresentationFormat, Result};
use serde::Serialize;
use std::io::{Cursor, Read, Seek};

/// Slide ids start above this value.
const MIN_SLIDE_ID: u32 = 255;

/// Presentation children that precede `p:sldIdLst`.
const SLIDE_LIST_PREDECESSORS: [&str; 3] = ["sldMasterIdLst", "notesMasterIdLst", "handoutMasterIdLst"];

/// A structural inconsistency found and worked around while loading or
/// mutating a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuralMutationWarning {
    /// `p:sldId/@id` of the affected slide entry.
    pub slide_id: u32,
    /// Relationship id the entry pointed at.
    pub rel_id: String,
    pub message: String,
}

/// What [`SlidePackage::remove_slide`] took out of the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideRemoval {
    pub slide_id: u32,
    pub part_name: String,
    /// False when the slide's relationship entry was already gone.
    pub relationship_found: bool,
}

/// One entry of the slide sequence.
#[derive(Debug, Clone)]
struct SlideEntry {
    id: u32,
    rel_id: String,
    slide: Slide,
}

/// An editable presentation package.
#[derive(Debug, Clone)]
pub struct SlidePackage {
    /// Parts not modeled below, keyed by part name.
    parts: PartMap,
    content_types: ContentTypes,
    presentation_part: String,
    presentation: Element,
    pres_rels: Relationships,
    slides: Vec<SlideEntry>,
    layouts: Vec<Layout>,
    warnings: Vec<StructuralMutationWarning>,
}

impl SlidePackage {
    /// Load a package from the bytes of a `.pptx` file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if PresentationFormat::from_magic(bytes) == Some(PresentationFormat::Ppt) {
            return Err(Error::UnsupportedFormat(
                "Legacy binary .ppt templates are not supported, save as .pptx".to_string(),
            ));
        }
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_parts(opc::read_parts(reader)?)
    }

    /// Build a package from raw parts.
    ///
    /// Slide entries whose relationship or part is missing are dropped and
    /// recorded in [`SlidePackage::warnings`].
    pub fn from_parts(mut parts: PartMap) -> Result<Self> {
        let content_types = ContentTypes::parse(
            opc::part_text(&parts, CONTENT_TYPES_PART)
                .map_err(|_| Error::InvalidPackage("Missing [Content_Types].xml".to_string()))?,
        )?;
        parts.remove(CONTENT_TYPES_PART);

        let root_rels = match parts.get(&rels_part_for("")) {
            Some(_) => Relationships::parse("", opc::part_text(&parts, &rels_part_for(""))?)?,
            None => Relationships::new(""),
        };
        let presentation_part = root_rels
            .target_part_of_type(rel_type::OFFICE_DOCUMENT)
            .ok_or_else(|| Error::InvalidPackage("No main document relationship".to_string()))?;

        match content_types.get(&presentation_part) {
            Some(ct) if ct.contains("presentationml") && ct.ends_with("main+xml") => {}
            other => {
                return Err(Error::UnsupportedFormat(format!(
                    "Main part '{}' is not a presentation ({})",
                    presentation_part,
                    other.unwrap_or("no content type")
                )))
            }
        }

        let mut presentation = xml::parse(opc::part_text(&parts, &presentation_part)?)?;
        parts.remove(&presentation_part);

        let pres_rels_part = rels_part_for(&presentation_part);
        let mut pres_rels = match parts.remove(&pres_rels_part) {
            Some(data) => Relationships::parse(&presentation_part, &utf8(&pres_rels_part, &data)?)?,
            None => Relationships::new(&presentation_part),
        };

        let layouts = load_layouts(&parts, &content_types, &presentation, &pres_rels)?;

        let mut warnings = Vec::new();
        let mut slides = Vec::new();
        let entries = presentation
            .child("sldIdLst")
            .map(|list| {
                list.children_named("sldId")
                    .map(|e| {
                        (
                            e.attr("id").and_then(|id| id.parse::<u32>().ok()).unwrap_or(0),
                            e.attr("r:id").unwrap_or("").to_string(),
                        )
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        for (id, rel_id) in entries {
            let Some(part_name) = pres_rels.target_part(&rel_id) else {
                warnings.push(warn_entry(id, &rel_id, "slide entry has no relationship, dropped"));
                continue;
            };
            let Some(data) = parts.remove(&part_name) else {
                // A relationship shared with an entry already loaded stays.
                if !slides.iter().any(|entry: &SlideEntry| entry.rel_id == rel_id) {
                    pres_rels.remove(&rel_id);
                }
                warnings.push(warn_entry(id, &rel_id, &format!("slide part '{}' is missing, dropped", part_name)));
                continue;
            };
            let slide = load_slide(&mut parts, &part_name, &data)?;
            slides.push(SlideEntry { id, rel_id, slide });
        }

        if !warnings.is_empty() {
            let loaded: Vec<String> = slides.iter().map(|entry| entry.id.to_string()).collect();
            presentation.retain_descendants(&mut |e| {
                let stale_show_ref =
                    e.is("sld") && e.attr("r:id").is_some_and(|rid| pres_rels.get(rid).is_none());
                let stale_section_ref =
                    e.is("sldId") && e.attr("id").is_some_and(|id| !loaded.iter().any(|l| l == id));
                !(stale_show_ref || stale_section_ref)
            });
        }

        log::debug!(
            "Loaded package '{}' with {} slides and {} layouts",
            presentation_part,
            slides.len(),
            layouts.len()
        );

        Ok(Self {
            parts,
            content_types,
            presentation_part,
            presentation,
            pres_rels,
            slides,
            layouts,
            warnings,
        })
    }

    /// A package with no slides, one master, the Blank layout and one theme.
    pub fn new_blank(cx: i64, cy: i64) -> Result<Self> {
        let pres_part = "ppt/presentation.xml";
        let master_part = "ppt/slideMasters/slideMaster1.xml";
        let layout_part = "ppt/slideLayouts/slideLayout1.xml";
        let theme_part = "ppt/theme/theme1.xml";
        let props_part = "ppt/presProps.xml";

        let mut types = ContentTypes::new();
        types.set_override(pres_part, content_type::PRESENTATION);
        types.set_override(master_part, content_type::SLIDE_MASTER);
        types.set_override(layout_part, content_type::SLIDE_LAYOUT);
        types.set_override(theme_part, content_type::THEME);
        types.set_override(props_part, template::PRES_PROPS_CONTENT_TYPE);

        let mut root_rels = Relationships::new("");
        root_rels.add(rel_type::OFFICE_DOCUMENT, pres_part);

        let mut pres_rels = Relationships::new(pres_part);
        let master_rid = pres_rels.add(rel_type::SLIDE_MASTER, master_part);
        pres_rels.add(template::PRES_PROPS_REL_TYPE, props_part);
        pres_rels.add(rel_type::THEME, theme_part);

        let mut master_rels = Relationships::new(master_part);
        master_rels.add(rel_type::SLIDE_LAYOUT, layout_part);
        master_rels.add(rel_type::THEME, theme_part);

        let mut layout_rels = Relationships::new(layout_part);
        layout_rels.add(rel_type::SLIDE_MASTER, master_part);

        let presentation = template::PML_NAMESPACES
            .iter()
            .fold(Element::new("p:presentation"), |el, (k, v)| el.with_attr(*k, *v))
            .with_attr("saveSubsetFonts", "1")
            .with_child(
                Element::new("p:sldMasterIdLst").with_child(
                    Element::new("p:sldMasterId")
                        .with_attr("id", "2147483648")
                        .with_attr("r:id", master_rid),
                ),
            )
            .with_child(
                Element::new("p:sldSz")
                    .with_attr("cx", cx.to_string())
                    .with_attr("cy", cy.to_string()),
            )
            .with_child(
                Element::new("p:notesSz")
                    .with_attr("cx", template::NOTES_CX.to_string())
                    .with_attr("cy", template::NOTES_CY.to_string()),
            );

        let mut parts = PartMap::new();
        parts.insert(CONTENT_TYPES_PART.to_string(), types.to_xml().into_bytes());
        parts.insert(rels_part_for(""), root_rels.to_xml().into_bytes());
        parts.insert(pres_part.to_string(), presentation.to_document().into_bytes());
        parts.insert(rels_part_for(pres_part), pres_rels.to_xml().into_bytes());
        parts.insert(master_part.to_string(), template::SLIDE_MASTER_XML.as_bytes().to_vec());
        parts.insert(rels_part_for(master_part), master_rels.to_xml().into_bytes());
        parts.insert(layout_part.to_string(), template::BLANK_LAYOUT_XML.as_bytes().to_vec());
        parts.insert(rels_part_for(layout_part), layout_rels.to_xml().into_bytes());
        parts.insert(theme_part.to_string(), template::THEME_XML.as_bytes().to_vec());
        parts.insert(props_part.to_string(), template::PRES_PROPS_XML.as_bytes().to_vec());

        Self::from_parts(parts)
    }

    /// Serialize the package into `.pptx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut parts = self.parts.clone();

        let mut presentation = self.presentation.clone();
        presentation.remove_children("sldIdLst");
        if !self.slides.is_empty() {
            let mut list = Element::new("p:sldIdLst");
            for entry in &self.slides {
                list.push(
                    Element::new("p:sldId")
                        .with_attr("id", entry.id.to_string())
                        .with_attr("r:id", entry.rel_id.as_str()),
                );
            }
            presentation.insert_after(&SLIDE_LIST_PREDECESSORS, list);
        }
        parts.insert(self.presentation_part.clone(), presentation.to_document().into_bytes());
        parts.insert(
            rels_part_for(&self.presentation_part),
            self.pres_rels.to_xml().into_bytes(),
        );

        for entry in &self.slides {
            let slide = &entry.slide;
            parts.insert(slide.part_name().to_string(), slide.root().to_document().into_bytes());
            parts.insert(rels_part_for(slide.part_name()), slide.rels().to_xml().into_bytes());
            if let Some(notes) = slide.notes() {
                parts.insert(notes.part_name().to_string(), notes.root().to_document().into_bytes());
                parts.insert(rels_part_for(notes.part_name()), notes.rels().to_xml().into_bytes());
            }
        }

        let mut content_types = self.content_types.clone();
        content_types.retain_overrides(|name| parts.contains_key(name));
        parts.insert(CONTENT_TYPES_PART.to_string(), content_types.to_xml().into_bytes());

        log::debug!("Writing package with {} parts", parts.len());
        opc::write_parts(&parts)
    }

    /// Number of slides in the sequence.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slides in sequence order.
    pub fn slides(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter().map(|entry| &entry.slide)
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index).map(|entry| &entry.slide)
    }

    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index).map(|entry| &mut entry.slide)
    }

    /// `p:sldId/@id` values in sequence order.
    pub fn slide_ids(&self) -> Vec<u32> {
        self.slides.iter().map(|entry| entry.id).collect()
    }

    /// A slide together with its layout, for role resolution while editing.
    pub fn slide_and_layout_mut(&mut self, index: usize) -> Option<(&mut Slide, Option<&Layout>)> {
        let layouts = &self.layouts;
        let slide = &mut self.slides.get_mut(index)?.slide;
        let layout = slide
            .layout_part()
            .and_then(|part| layouts.iter().find(|l| l.part_name() == part));
        Some((slide, layout))
    }

    /// Layouts in presentation order.
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    pub fn layout(&self, part_name: &str) -> Option<&Layout> {
        self.layouts.iter().find(|l| l.part_name() == part_name)
    }

    /// Layout used by a slide.
    pub fn layout_of(&self, slide: &Slide) -> Option<&Layout> {
        slide.layout_part().and_then(|part| self.layout(part))
    }

    /// Inconsistencies repaired so far.
    pub fn warnings(&self) -> &[StructuralMutationWarning] {
        &self.warnings
    }

    /// Drain the repaired inconsistencies.
    pub fn take_warnings(&mut self) -> Vec<StructuralMutationWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Every part name the package would write, sorted.
    pub fn part_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.parts.keys().cloned().collect();
        names.push(CONTENT_TYPES_PART.to_string());
        names.push(self.presentation_part.clone());
        names.push(rels_part_for(&self.presentation_part));
        for slide in self.slides() {
            names.push(slide.part_name().to_string());
            names.push(rels_part_for(slide.part_name()));
            if let Some(notes) = slide.notes() {
                names.push(notes.part_name().to_string());
                names.push(rels_part_for(notes.part_name()));
            }
        }
        names.sort();
        names.dedup();
        names
    }

    fn part_exists(&self, name: &str) -> bool {
        name == self.presentation_part
            || self.parts.contains_key(name)
            || self.slides().any(|s| {
                s.part_name() == name || s.notes().is_some_and(|n| n.part_name() == name)
            })
    }

    /// First free `{prefix}{n}{suffix}` part name.
    fn next_part_name(&self, prefix: &str, suffix: &str) -> String {
        (1..)
            .map(|n| format!("{}{}{}", prefix, n, suffix))
            .find(|name| !self.part_exists(name))
            .unwrap_or_default()
    }

    fn next_slide_id(&self) -> u32 {
        self.slides
            .iter()
            .map(|entry| entry.id)
            .max()
            .unwrap_or(MIN_SLIDE_ID)
            .max(MIN_SLIDE_ID)
            + 1
    }

    /// Append a new slide built on `layout_part`. Returns its index.
    ///
    /// The slide gets a fresh part, id and relationship, a relationship to
    /// its layout and a content type override.
    pub fn add_slide(&mut self, layout_part: &str) -> Result<usize> {
        let part_name = self.next_part_name("ppt/slides/slide", ".xml");
        let id = self.next_slide_id();

        let layout = self
            .layout(layout_part)
            .ok_or_else(|| Error::InvalidPackage(format!("Unknown layout '{}'", layout_part)))?;
        let mut rels = Relationships::new(&part_name);
        rels.add(rel_type::SLIDE_LAYOUT, layout.part_name());
        let slide = Slide::from_layout(&part_name, layout, rels);

        let rel_id = self.pres_rels.add(rel_type::SLIDE, &part_name);
        self.content_types.set_override(&part_name, content_type::SLIDE);
        self.slides.push(SlideEntry { id, rel_id, slide });

        log::debug!("Added slide '{}' (id {}) on layout '{}'", part_name, id, layout_part);
        Ok(self.slides.len() - 1)
    }

    /// Remove the slide at `index` with its relationship, notes page and
    /// content type overrides. Links to it from the remaining slides and
    /// their notes pages are dropped and reported as warnings.
    ///
    /// A missing relationship entry does not stop the removal; it is
    /// recorded as a warning.
    pub fn remove_slide(&mut self, index: usize) -> Option<SlideRemoval> {
        if index >= self.slides.len() {
            return None;
        }
        let SlideEntry { id, rel_id, mut slide } = self.slides.remove(index);

        let relationship_found = self.pres_rels.remove(&rel_id).is_some();
        if !relationship_found {
            let warning = warn_entry(id, &rel_id, "relationship already missing during removal");
            self.warnings.push(warning);
        }

        let id_text = id.to_string();
        self.presentation.retain_descendants(&mut |e| {
            let custom_show_ref = e.is("sld") && e.attr("r:id") == Some(rel_id.as_str());
            let section_ref = e.is("sldId") && e.attr("id") == Some(id_text.as_str());
            !(custom_show_ref || section_ref)
        });

        let removed_part = slide.part_name().to_string();
        for entry in &mut self.slides {
            let mut dropped = entry.slide.unlink_part(&removed_part);
            if let Some(notes) = entry.slide.notes_mut() {
                dropped.extend(notes.unlink_part(&removed_part));
            }
            for link in dropped {
                let message = format!("link to removed slide '{}' dropped", removed_part);
                self.warnings.push(warn_entry(entry.id, &link, &message));
            }
        }

        self.content_types.remove_override(slide.part_name());
        if let Some(notes) = slide.take_notes() {
            self.content_types.remove_override(notes.part_name());
        }

        log::debug!("Removed slide '{}' (id {})", slide.part_name(), id);
        Some(SlideRemoval {
            slide_id: id,
            part_name: slide.part_name().to_string(),
            relationship_found,
        })
    }

    /// Part name of the notes master, creating it (with its own theme)
    /// when the package has none.
    pub fn ensure_notes_master(&mut self) -> Result<String> {
        if let Some(existing) = self.pres_rels.target_part_of_type(rel_type::NOTES_MASTER) {
            return Ok(existing);
        }

        let master_part = self.next_part_name("ppt/notesMasters/notesMaster", ".xml");
        let theme_part = self.next_part_name("ppt/theme/theme", ".xml");

        let mut master_rels = Relationships::new(&master_part);
        master_rels.add(rel_type::THEME, &theme_part);

        self.parts
            .insert(master_part.clone(), template::NOTES_MASTER_XML.as_bytes().to_vec());
        self.parts
            .insert(rels_part_for(&master_part), master_rels.to_xml().into_bytes());
        self.parts
            .insert(theme_part.clone(), template::THEME_XML.as_bytes().to_vec());
        self.content_types
            .set_override(&master_part, content_type::NOTES_MASTER);
        self.content_types.set_override(&theme_part, content_type::THEME);

        let rid = self.pres_rels.add(rel_type::NOTES_MASTER, &master_part);
        self.presentation.remove_children("notesMasterIdLst");
        self.presentation.insert_after(
            &["sldMasterIdLst"],
            Element::new("p:notesMasterIdLst")
                .with_child(Element::new("p:notesMasterId").with_attr("r:id", rid)),
        );
        if self.presentation.child("notesSz").is_none() {
            self.presentation.insert_after(
                &["sldSz"],
                Element::new("p:notesSz")
                    .with_attr("cx", template::NOTES_CX.to_string())
                    .with_attr("cy", template::NOTES_CY.to_string()),
            );
        }

        log::debug!("Created notes master '{}'", master_part);
        Ok(master_part)
    }

    /// Make sure the slide at `index` has a notes page.
    pub fn ensure_notes_slide(&mut self, index: usize) -> Result<()> {
        let slide_part = match self.slide(index) {
            Some(slide) if slide.notes().is_some() => return Ok(()),
            Some(slide) => slide.part_name().to_string(),
            None => {
                return Err(Error::InvalidPackage(format!("No slide at index {}", index)));
            }
        };

        let master_part = self.ensure_notes_master()?;
        let notes_part = self.next_part_name("ppt/notesSlides/notesSlide", ".xml");

        let mut rels = Relationships::new(&notes_part);
        rels.add(rel_type::NOTES_MASTER, &master_part);
        rels.add(rel_type::SLIDE, &slide_part);
        let notes = NotesSlide::new(&notes_part, rels);

        self.content_types
            .set_override(&notes_part, content_type::NOTES_SLIDE);
        if let Some(slide) = self.slide_mut(index) {
            slide.rels_mut().add(rel_type::NOTES_SLIDE, &notes_part);
            slide.set_notes(notes);
        }

        log::debug!("Attached notes '{}' to '{}'", notes_part, slide_part);
        Ok(())
    }
}

fn warn_entry(slide_id: u32, rel_id: &str, message: &str) -> StructuralMutationWarning {
    log::warn!("Slide {} ({}): {}", slide_id, rel_id, message);
    StructuralMutationWarning {
        slide_id,
        rel_id: rel_id.to_string(),
        message: message.to_string(),
    }
}

fn utf8(name: &str, data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec())
        .map_err(|e| Error::CorruptedFile(format!("'{}' is not UTF-8: {}", name, e)))
}

/// Take a part's relationships out of the map, or an empty table.
fn take_rels(parts: &mut PartMap, part_name: &str) -> Result<Relationships> {
    let rels_part = rels_part_for(part_name);
    match parts.remove(&rels_part) {
        Some(data) => Relationships::parse(part_name, &utf8(&rels_part, &data)?),
        None => Ok(Relationships::new(part_name)),
    }
}

/// Parse a slide and move it, its relationships and its notes page out of
/// the opaque part map.
fn load_slide(parts: &mut PartMap, part_name: &str, data: &[u8]) -> Result<Slide> {
    let rels = take_rels(parts, part_name)?;
    let mut slide = Slide::parse(part_name, &utf8(part_name, data)?, rels)?;

    if let Some(notes_part) = slide.rels().target_part_of_type(rel_type::NOTES_SLIDE) {
        match parts.remove(&notes_part) {
            Some(notes_data) => {
                let notes_rels = take_rels(parts, &notes_part)?;
                slide.set_notes(NotesSlide::parse(
                    &notes_part,
                    &utf8(&notes_part, &notes_data)?,
                    notes_rels,
                )?);
            }
            None => log::warn!("Notes part '{}' of '{}' is missing", notes_part, part_name),
        }
    }
    Ok(slide)
}

/// Layouts in master order, then any others by part name.
fn load_layouts(
    parts: &PartMap,
    content_types: &ContentTypes,
    presentation: &Element,
    pres_rels: &Relationships,
) -> Result<Vec<Layout>> {
    let mut ordered: Vec<String> = Vec::new();

    let master_rel_ids: Vec<&str> = presentation
        .child("sldMasterIdLst")
        .map(|list| list.children_named("sldMasterId").filter_map(|e| e.attr("r:id")).collect())
        .unwrap_or_default();

    for master_part in master_rel_ids.iter().filter_map(|rid| pres_rels.target_part(rid)) {
        let Ok(master_text) = opc::part_text(parts, &master_part) else {
            log::warn!("Slide master '{}' is missing", master_part);
            continue;
        };
        let master = xml::parse(master_text)?;
        let rels_part = rels_part_for(&master_part);
        let master_rels = match parts.get(&rels_part) {
            Some(_) => Relationships::parse(&master_part, opc::part_text(parts, &rels_part)?)?,
            None => continue,
        };
        if let Some(list) = master.child("sldLayoutIdLst") {
            for layout_part in list
                .children_named("sldLayoutId")
                .filter_map(|e| e.attr("r:id"))
                .filter_map(|rid| master_rels.target_part(rid))
            {
                if !ordered.contains(&layout_part) {
                    ordered.push(layout_part);
                }
            }
        }
    }

    for part in content_types.parts_of_type(content_type::SLIDE_LAYOUT) {
        if !ordered.iter().any(|p| p == part) {
            ordered.push(part.to_string());
        }
    }

    let mut layouts = Vec::with_capacity(ordered.len());
    for part in ordered {
        match opc::part_text(parts, &part) {
            Ok(text) => layouts.push(Layout::parse(&part, text)?),
            Err(_) => log::warn!("Layout part '{}' is missing", part),
        }
    }
    Ok(layouts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{WIDESCREEN_CX, WIDESCREEN_CY};

    #[test]
    fn test_blank_package() {
        let pkg = SlidePackage::new_blank(WIDESCREEN_CX, WIDESCREEN_CY).unwrap();
        assert_eq!(pkg.slide_count(), 0);
        let size = pkg.presentation.child("sldSz").unwrap();
        assert_eq!(size.attr("cx"), Some(WIDESCREEN_CX.to_string().as_str()));
        assert_eq!(size.attr("cy"), Some(WIDESCREEN_CY.to_string().as_str()));
        assert_eq!(pkg.layouts().len(), 1);
        assert_eq!(pkg.layouts()[0].name(), "Blank");
        assert!(pkg.warnings().is_empty());
    }

    #[test]
    fn test_add_and_remove_keep_sequence_and_rels_paired() {
        let mut pkg = SlidePackage::new_blank(WIDESCREEN_CX, WIDESCREEN_CY).unwrap();
        let layout = pkg.layouts()[0].part_name().to_string();

        for _ in 0..3 {
            pkg.add_slide(&layout).unwrap();
        }
        assert_eq!(pkg.slide_ids(), vec![256, 257, 258]);
        let parts: Vec<_> = pkg.slides().map(|s| s.part_name().to_string()).collect();
        assert_eq!(
            parts,
            vec!["ppt/slides/slide1.xml", "ppt/slides/slide2.xml", "ppt/slides/slide3.xml"]
        );

        let removal = pkg.remove_slide(1).unwrap();
        assert_eq!(removal.part_name, "ppt/slides/slide2.xml");
        assert!(removal.relationship_found);
        assert!(pkg.remove_slide(5).is_none());

        // Freed part names and ids are not reused for ids, but part names are.
        let index = pkg.add_slide(&layout).unwrap();
        assert_eq!(index, 2);
        assert_eq!(pkg.slide(2).unwrap().part_name(), "ppt/slides/slide2.xml");
        assert_eq!(pkg.slide_ids(), vec![256, 258, 259]);
    }

    #[test]
    fn test_remove_drops_links_from_remaining_slides() {
        let mut pkg = SlidePackage::new_blank(WIDESCREEN_CX, WIDESCREEN_CY).unwrap();
        let layout = pkg.layouts()[0].part_name().to_string();
        for _ in 0..3 {
            pkg.add_slide(&layout).unwrap();
        }
        let jump = pkg
            .slide_mut(0)
            .unwrap()
            .rels_mut()
            .add(rel_type::SLIDE, "ppt/slides/slide3.xml");
        pkg.ensure_notes_slide(1).unwrap();
        let notes_jump = pkg
            .slide_mut(1)
            .unwrap()
            .notes_mut()
            .unwrap()
            .rels_mut()
            .add(rel_type::SLIDE, "ppt/slides/slide3.xml");

        pkg.remove_slide(2).unwrap();

        assert!(pkg.slide(0).unwrap().rels().get(&jump).is_none());
        let notes = pkg.slide(1).unwrap().notes().unwrap();
        assert!(notes.rels().get(&notes_jump).is_none());
        assert_eq!(notes.rels().target_part_of_type(rel_type::SLIDE).as_deref(), Some("ppt/slides/slide2.xml"));

        let warnings = pkg.take_warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!((warnings[0].slide_id, warnings[0].rel_id.as_str()), (256, jump.as_str()));
        assert_eq!(warnings[1].slide_id, 257);
    }

    #[test]
    fn test_add_slide_rejects_unknown_layout() {
        let mut pkg = SlidePackage::new_blank(WIDESCREEN_CX, WIDESCREEN_CY).unwrap();
        assert!(matches!(
            pkg.add_slide("ppt/slideLayouts/nope.xml"),
            Err(Error::InvalidPackage(_))
        ));
        assert_eq!(pkg.slide_count(), 0);
    }

    #[test]
    fn test_round_trip_preserves_slides() {
        let mut pkg = SlidePackage::new_blank(WIDESCREEN_CX, WIDESCREEN_CY).unwrap();
        let layout = pkg.layouts()[0].part_name().to_string();
        pkg.add_slide(&layout).unwrap();
        pkg.add_slide(&layout).unwrap();

        let bytes = pkg.to_bytes().unwrap();
        let reloaded = SlidePackage::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.slide_count(), 2);
        assert_eq!(reloaded.slide_ids(), vec![256, 257]);
        assert_eq!(reloaded.part_names(), pkg.part_names());
        assert!(reloaded.warnings().is_empty());
        assert_eq!(
            reloaded.slide(0).unwrap().layout_part(),
            Some("ppt/slideLayouts/slideLayout1.xml")
        );
    }

    #[test]
    fn test_notes_slide_creation() {
        let mut pkg = SlidePackage::new_blank(WIDESCREEN_CX, WIDESCREEN_CY).unwrap();
        let layout = pkg.layouts()[0].part_name().to_string();
        pkg.add_slide(&layout).unwrap();

        pkg.ensure_notes_slide(0).unwrap();
        pkg.ensure_notes_slide(0).unwrap();
        pkg.slide_mut(0).unwrap().notes_mut().unwrap().set_text("Talk slowly");

        let names = pkg.part_names();
        assert!(names.contains(&"ppt/notesMasters/notesMaster1.xml".to_string()));
        assert!(names.contains(&"ppt/notesSlides/notesSlide1.xml".to_string()));
        assert!(names.contains(&"ppt/theme/theme2.xml".to_string()));

        let reloaded = SlidePackage::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.slide(0).unwrap().notes_text(), "Talk slowly");

        let mut reloaded = reloaded;
        reloaded.remove_slide(0).unwrap();
        let names = reloaded.part_names();
        assert!(!names.contains(&"ppt/notesSlides/notesSlide1.xml".to_string()));
        assert!(names.contains(&"ppt/notesMasters/notesMaster1.xml".to_string()));
    }

    #[test]
    fn test_rejects_legacy_and_garbage() {
        let ole = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0];
        assert!(matches!(SlidePackage::from_bytes(&ole), Err(Error::UnsupportedFormat(_))));
        assert!(matches!(SlidePackage::from_bytes(b"not a zip"), Err(Error::ZipError(_))));
    }
}
