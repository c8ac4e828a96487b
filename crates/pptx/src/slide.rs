//! Slides, their shapes, and their notes pages.

use crate::layout::Layout;
use crate::opc::Relationships;
use crate::placeholder::{self, PlaceholderInfo, PlaceholderRole};
use crate::template::PML_NAMESPACES;
use crate::text::{self, solid_fill, Paragraph, RgbColor};
use crate::xml::{self, Element};
use deck_core::Result;
use serde::Serialize;
use thiserror::Error;

/// Shape-tree children that are tree properties rather than shapes.
const NON_SHAPE_CHILDREN: [&str; 3] = ["nvGrpSpPr", "grpSpPr", "extLst"];

/// Why a shape refused a text edit.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    #[error("shape cannot hold text")]
    NotTextCapable,

    #[error("shape text is locked")]
    TextLocked,

    #[error("no shape at this index")]
    Missing,
}

/// Read-only view of one shape of a slide.
#[derive(Debug, Clone, Copy)]
pub struct Shape<'a> {
    index: usize,
    element: &'a Element,
}

impl<'a> Shape<'a> {
    /// Position among the slide's shapes.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Element kind: `sp`, `pic`, `graphicFrame`, `grpSp`, `cxnSp`, ...
    pub fn kind(&self) -> &'a str {
        self.element.local_name()
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Shape id (`cNvPr/@id`).
    pub fn id(&self) -> Option<u32> {
        self.non_visual_props()
            .and_then(|c| c.attr("id"))
            .and_then(|id| id.parse().ok())
    }

    /// Shape name (`cNvPr/@name`).
    pub fn name(&self) -> &'a str {
        self.non_visual_props()
            .and_then(|c| c.attr("name"))
            .unwrap_or("")
    }

    fn non_visual_props(&self) -> Option<&'a Element> {
        self.element
            .elements()
            .find(|e| e.local_name().starts_with("nv"))
            .and_then(|nv| nv.child("cNvPr"))
    }

    pub fn placeholder(&self) -> Option<PlaceholderInfo> {
        PlaceholderInfo::of_shape(self.element)
    }

    /// Placeholder role, resolving untyped placeholders through `layout`.
    pub fn role(&self, layout: Option<&Layout>) -> PlaceholderRole {
        placeholder::shape_role(self.element, layout)
    }

    /// Only `p:sp` shapes carry a text frame.
    pub fn is_text_capable(&self) -> bool {
        self.element.is("sp")
    }

    /// Whether `a:spLocks/@noTextEdit` forbids editing the text.
    pub fn is_text_locked(&self) -> bool {
        self.element
            .find(&["nvSpPr", "cNvSpPr", "spLocks"])
            .and_then(|locks| locks.attr("noTextEdit"))
            .is_some_and(|v| v == "1" || v == "true")
    }

    /// Check that the shape accepts text edits.
    pub fn writable(&self) -> std::result::Result<(), SkipReason> {
        if !self.is_text_capable() {
            Err(SkipReason::NotTextCapable)
        } else if self.is_text_locked() {
            Err(SkipReason::TextLocked)
        } else {
            Ok(())
        }
    }

    pub fn text_body(&self) -> Option<&'a Element> {
        self.element.child("txBody")
    }

    pub fn paragraphs(&self) -> Vec<Paragraph> {
        self.text_body().map(text::paragraphs).unwrap_or_default()
    }

    /// Paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs()
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn shape_elements(tree: &Element) -> impl Iterator<Item = &Element> {
    tree.elements()
        .filter(|e| !NON_SHAPE_CHILDREN.contains(&e.local_name()))
}

fn shape_tree(root: &Element) -> Option<&Element> {
    root.find(&["cSld", "spTree"])
}

fn shape_tree_mut(root: &mut Element) -> Option<&mut Element> {
    root.find_mut(&["cSld", "spTree"])
}

/// Largest `cNvPr/@id` anywhere in the tree plus one.
fn next_shape_id(root: &Element) -> u32 {
    root.descendants()
        .into_iter()
        .filter(|e| e.is("cNvPr"))
        .filter_map(|e| e.attr("id").and_then(|id| id.parse::<u32>().ok()))
        .max()
        .unwrap_or(1)
        + 1
}

/// Root element of a PresentationML part with the standard namespaces.
fn pml_root(name: &str) -> Element {
    PML_NAMESPACES
        .iter()
        .fold(Element::new(name), |el, (k, v)| el.with_attr(*k, *v))
}

/// Empty `p:spTree` with its group properties.
fn empty_shape_tree() -> Element {
    Element::new("p:spTree")
        .with_child(
            Element::new("p:nvGrpSpPr")
                .with_child(Element::new("p:cNvPr").with_attr("id", "1").with_attr("name", ""))
                .with_child(Element::new("p:cNvGrpSpPr"))
                .with_child(Element::new("p:nvPr")),
        )
        .with_child(
            Element::new("p:grpSpPr").with_child(
                Element::new("a:xfrm")
                    .with_child(Element::new("a:off").with_attr("x", "0").with_attr("y", "0"))
                    .with_child(Element::new("a:ext").with_attr("cx", "0").with_attr("cy", "0"))
                    .with_child(Element::new("a:chOff").with_attr("x", "0").with_attr("y", "0"))
                    .with_child(Element::new("a:chExt").with_attr("cx", "0").with_attr("cy", "0")),
            ),
        )
}

/// Drop relationships to `part_name` and the hyperlinks that use them.
/// Returns the removed relationship ids.
fn unlink(root: &mut Element, rels: &mut Relationships, part_name: &str) -> Vec<String> {
    let ids: Vec<String> = rels
        .remove_targeting(part_name)
        .into_iter()
        .map(|rel| rel.id)
        .collect();
    if !ids.is_empty() {
        root.retain_descendants(&mut |e| {
            let link = e.is("hlinkClick") || e.is("hlinkHover");
            !(link && e.attr("r:id").is_some_and(|id| ids.iter().any(|r| r == id)))
        });
    }
    ids
}

fn clr_map_override() -> Element {
    Element::new("p:clrMapOvr").with_child(Element::new("a:masterClrMapping"))
}

/// A notes page attached to one slide.
#[derive(Debug, Clone)]
pub struct NotesSlide {
    part_name: String,
    root: Element,
    rels: Relationships,
}

impl NotesSlide {
    pub fn parse(part_name: &str, content: &str, rels: Relationships) -> Result<Self> {
        Ok(Self {
            part_name: part_name.to_string(),
            root: xml::parse(content)?,
            rels,
        })
    }

    /// A notes page with the slide image and an empty notes body.
    ///
    /// `rels` must already point at the notes master and the slide.
    pub fn new(part_name: &str, rels: Relationships) -> Self {
        let mut tree = empty_shape_tree();
        tree.push(
            Element::new("p:sp")
                .with_child(
                    Element::new("p:nvSpPr")
                        .with_child(
                            Element::new("p:cNvPr")
                                .with_attr("id", "2")
                                .with_attr("name", "Slide Image Placeholder 1"),
                        )
                        .with_child(Element::new("p:cNvSpPr").with_child(
                            Element::new("a:spLocks")
                                .with_attr("noGrp", "1")
                                .with_attr("noRot", "1")
                                .with_attr("noChangeAspect", "1"),
                        ))
                        .with_child(
                            Element::new("p:nvPr")
                                .with_child(Element::new("p:ph").with_attr("type", "sldImg")),
                        ),
                )
                .with_child(Element::new("p:spPr")),
        );
        tree.push(
            Element::new("p:sp")
                .with_child(
                    Element::new("p:nvSpPr")
                        .with_child(
                            Element::new("p:cNvPr")
                                .with_attr("id", "3")
                                .with_attr("name", "Notes Placeholder 2"),
                        )
                        .with_child(
                            Element::new("p:cNvSpPr")
                                .with_child(Element::new("a:spLocks").with_attr("noGrp", "1")),
                        )
                        .with_child(Element::new("p:nvPr").with_child(
                            Element::new("p:ph").with_attr("type", "body").with_attr("idx", "1"),
                        )),
                )
                .with_child(Element::new("p:spPr"))
                .with_child(text::new_text_body(Element::new("a:bodyPr"), &[])),
        );

        let root = pml_root("p:notes")
            .with_child(Element::new("p:cSld").with_child(tree))
            .with_child(clr_map_override());

        Self {
            part_name: part_name.to_string(),
            root,
            rels,
        }
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    pub(crate) fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    pub(crate) fn unlink_part(&mut self, part_name: &str) -> Vec<String> {
        unlink(&mut self.root, &mut self.rels, part_name)
    }

    /// The notes body placeholder (`ph type="body"`).
    fn body(&self) -> Option<&Element> {
        shape_elements(shape_tree(&self.root)?).find(|shape| {
            PlaceholderInfo::of_shape(shape).is_some_and(|ph| ph.ph_type.as_deref() == Some("body"))
        })
    }

    fn body_mut(&mut self) -> Option<&mut Element> {
        shape_tree_mut(&mut self.root)?.elements_mut().find(|shape| {
            PlaceholderInfo::of_shape(shape).is_some_and(|ph| ph.ph_type.as_deref() == Some("body"))
        })
    }

    /// Notes text, paragraphs joined by newlines.
    pub fn text(&self) -> String {
        self.body()
            .and_then(|sp| sp.child("txBody"))
            .map(|tx| {
                text::paragraphs(tx)
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }

    /// Replace the notes text, one paragraph per line.
    ///
    /// A notes page without a body placeholder gets one.
    pub fn set_text(&mut self, notes: &str) {
        let content: Vec<Paragraph> = notes
            .lines()
            .map(|line| Paragraph::new(line, Default::default()))
            .collect();

        if self.body().is_none() {
            let id = next_shape_id(&self.root);
            if let Some(tree) = shape_tree_mut(&mut self.root) {
                tree.push(
                    Element::new("p:sp")
                        .with_child(
                            Element::new("p:nvSpPr")
                                .with_child(
                                    Element::new("p:cNvPr")
                                        .with_attr("id", id.to_string())
                                        .with_attr("name", format!("Notes Placeholder {}", id)),
                                )
                                .with_child(Element::new("p:cNvSpPr"))
                                .with_child(Element::new("p:nvPr").with_child(
                                    Element::new("p:ph").with_attr("type", "body").with_attr("idx", "1"),
                                )),
                        )
                        .with_child(Element::new("p:spPr")),
                );
            }
        }

        if let Some(body) = self.body_mut() {
            match body.child_mut("txBody") {
                Some(tx) => {
                    text::ensure_text_body_prefix(tx);
                    text::write_paragraphs(tx, &content);
                }
                None => body.push(text::new_text_body(Element::new("a:bodyPr"), &content)),
            }
        }
    }
}

/// One slide part with its relationships and optional notes page.
#[derive(Debug, Clone)]
pub struct Slide {
    part_name: String,
    root: Element,
    rels: Relationships,
    layout_part: Option<String>,
    notes: Option<NotesSlide>,
}

impl Slide {
    /// Build a slide from its part content and relationship table.
    pub fn parse(part_name: &str, content: &str, rels: Relationships) -> Result<Self> {
        let root = xml::parse(content)?;
        let layout_part = rels.target_part_of_type(crate::opc::rel_type::SLIDE_LAYOUT);
        Ok(Self {
            part_name: part_name.to_string(),
            root,
            rels,
            layout_part,
            notes: None,
        })
    }

    /// A new slide on `layout`, holding empty copies of the layout's
    /// content placeholders.
    ///
    /// `rels` must already relate the slide to the layout.
    pub fn from_layout(part_name: &str, layout: &Layout, rels: Relationships) -> Self {
        let mut tree = empty_shape_tree();
        for (n, ph) in layout.cloneable_placeholders().into_iter().enumerate() {
            let id = n as u32 + 2;
            let source_name = ph
                .shape
                .find(&["nvSpPr", "cNvPr"])
                .and_then(|c| c.attr("name"))
                .unwrap_or("Placeholder")
                .to_string();

            let mut ph_el = Element::new("p:ph");
            if let Some(source) = ph.shape.find(&["nvSpPr", "nvPr", "ph"]) {
                ph_el.attrs = source.attrs.clone();
            }

            let mut sp = Element::new("p:sp")
                .with_child(
                    Element::new("p:nvSpPr")
                        .with_child(
                            Element::new("p:cNvPr")
                                .with_attr("id", id.to_string())
                                .with_attr("name", source_name),
                        )
                        .with_child(
                            Element::new("p:cNvSpPr")
                                .with_child(Element::new("a:spLocks").with_attr("noGrp", "1")),
                        )
                        .with_child(Element::new("p:nvPr").with_child(ph_el)),
                )
                .with_child(Element::new("p:spPr"));

            if ph.shape.is("sp") {
                sp.push(text::new_text_body(Element::new("a:bodyPr"), &[]));
            }
            tree.push(sp);
        }

        let root = pml_root("p:sld")
            .with_child(Element::new("p:cSld").with_child(tree))
            .with_child(clr_map_override());

        Self {
            part_name: part_name.to_string(),
            root,
            rels,
            layout_part: Some(layout.part_name().to_string()),
            notes: None,
        }
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    pub(crate) fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Drop links from this slide to another part, such as a slide jump.
    pub(crate) fn unlink_part(&mut self, part_name: &str) -> Vec<String> {
        unlink(&mut self.root, &mut self.rels, part_name)
    }

    /// Part name of the slide's layout.
    pub fn layout_part(&self) -> Option<&str> {
        self.layout_part.as_deref()
    }

    pub fn notes(&self) -> Option<&NotesSlide> {
        self.notes.as_ref()
    }

    pub fn notes_mut(&mut self) -> Option<&mut NotesSlide> {
        self.notes.as_mut()
    }

    pub(crate) fn set_notes(&mut self, notes: NotesSlide) {
        self.notes = Some(notes);
    }

    pub(crate) fn take_notes(&mut self) -> Option<NotesSlide> {
        self.notes.take()
    }

    /// Speaker notes text, empty when the slide has no notes page.
    pub fn notes_text(&self) -> String {
        self.notes.as_ref().map(NotesSlide::text).unwrap_or_default()
    }

    /// Shapes of the slide in tree order.
    pub fn shapes(&self) -> Vec<Shape<'_>> {
        shape_tree(&self.root)
            .map(|tree| {
                shape_elements(tree)
                    .enumerate()
                    .map(|(index, element)| Shape { index, element })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn shape(&self, index: usize) -> Option<Shape<'_>> {
        self.shapes().into_iter().nth(index)
    }

    pub fn shape_count(&self) -> usize {
        shape_tree(&self.root).map_or(0, |tree| shape_elements(tree).count())
    }

    fn shape_element_mut(&mut self, index: usize) -> Option<&mut Element> {
        shape_tree_mut(&mut self.root)?
            .elements_mut()
            .filter(|e| !NON_SHAPE_CHILDREN.contains(&e.local_name()))
            .nth(index)
    }

    /// Whether the shape at `index` accepts text edits.
    fn check_writable(&self, index: usize) -> std::result::Result<(), SkipReason> {
        self.shape(index).ok_or(SkipReason::Missing)?.writable()
    }

    /// Clear the text of one shape. Returns whether anything changed.
    pub fn clear_shape_text(&mut self, index: usize) -> std::result::Result<bool, SkipReason> {
        self.check_writable(index)?;
        let shape = self.shape_element_mut(index).ok_or(SkipReason::Missing)?;
        Ok(shape
            .child_mut("txBody")
            .map(text::clear_text_body)
            .unwrap_or(false))
    }

    /// Replace the text of one shape with `content`, adding a text body if
    /// the shape has none.
    pub fn write_shape_paragraphs(
        &mut self,
        index: usize,
        content: &[Paragraph],
    ) -> std::result::Result<(), SkipReason> {
        self.check_writable(index)?;
        let shape = self.shape_element_mut(index).ok_or(SkipReason::Missing)?;
        match shape.child_mut("txBody") {
            Some(tx) => {
                text::ensure_text_body_prefix(tx);
                text::write_paragraphs(tx, content);
            }
            None => shape.insert_before(
                &["extLst"],
                text::new_text_body(Element::new("a:bodyPr"), content),
            ),
        }
        Ok(())
    }

    /// Next free shape id on this slide.
    pub fn next_shape_id(&self) -> u32 {
        next_shape_id(&self.root)
    }

    /// Give the slide a solid background color.
    pub fn set_background(&mut self, color: RgbColor) {
        let Some(c_sld) = self.root.child_mut("cSld") else {
            return;
        };
        c_sld.remove_children("bg");
        c_sld.children.insert(
            0,
            xml::Node::Element(
                Element::new("p:bg").with_child(
                    Element::new("p:bgPr")
                        .with_child(solid_fill(color))
                        .with_child(Element::new("a:effectLst")),
                ),
            ),
        );
    }

    /// Solid background color, if the slide sets one.
    pub fn background_color(&self) -> Option<RgbColor> {
        self.root
            .find(&["cSld", "bg", "bgPr", "solidFill", "srgbClr"])
            .and_then(|c| c.attr("val"))
            .and_then(RgbColor::from_hex)
    }

    /// Add an auto-fitting, unfilled text box. Positions and sizes are in EMU.
    /// Returns the new shape's id.
    pub fn add_text_box(
        &mut self,
        name: &str,
        (x, y): (i64, i64),
        (cx, cy): (i64, i64),
        content: &[Paragraph],
    ) -> u32 {
        let id = self.next_shape_id();
        let body_pr = Element::new("a:bodyPr")
            .with_attr("wrap", "square")
            .with_attr("rtlCol", "0")
            .with_child(Element::new("a:spAutoFit"));

        let sp = Element::new("p:sp")
            .with_child(
                Element::new("p:nvSpPr")
                    .with_child(
                        Element::new("p:cNvPr")
                            .with_attr("id", id.to_string())
                            .with_attr("name", name),
                    )
                    .with_child(Element::new("p:cNvSpPr").with_attr("txBox", "1"))
                    .with_child(Element::new("p:nvPr")),
            )
            .with_child(
                Element::new("p:spPr")
                    .with_child(
                        Element::new("a:xfrm")
                            .with_child(
                                Element::new("a:off")
                                    .with_attr("x", x.to_string())
                                    .with_attr("y", y.to_string()),
                            )
                            .with_child(
                                Element::new("a:ext")
                                    .with_attr("cx", cx.to_string())
                                    .with_attr("cy", cy.to_string()),
                            ),
                    )
                    .with_child(
                        Element::new("a:prstGeom")
                            .with_attr("prst", "rect")
                            .with_child(Element::new("a:avLst")),
                    )
                    .with_child(Element::new("a:noFill")),
            )
            .with_child(text::new_text_body(body_pr, content));

        if let Some(tree) = shape_tree_mut(&mut self.root) {
            tree.insert_before(&["extLst"], sp);
        }
        id
    }
}
