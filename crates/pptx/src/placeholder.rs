//! Placeholder classification: which shapes play the title and body roles,
//! and which layout offers both.

use crate::layout::Layout;
use crate::package::SlidePackage;
use crate::xml::Element;
use serde::Serialize;

/// Semantic role a placeholder plays on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlaceholderRole {
    Title,
    Body,
    None,
}

impl PlaceholderRole {
    /// Type code of the title role.
    pub const TITLE_CODE: u8 = 0;
    /// Type code of the body role.
    pub const BODY_CODE: u8 = 1;

    /// Classify a placeholder type code.
    pub fn from_code(code: u8) -> Self {
        match code {
            Self::TITLE_CODE => Self::Title,
            Self::BODY_CODE => Self::Body,
            _ => Self::None,
        }
    }

    /// Classify an OOXML placeholder type (`p:ph/@type`).
    ///
    /// An absent type means `obj`, the generic content placeholder, which
    /// takes body text.
    pub fn from_ph_type(ph_type: Option<&str>) -> Self {
        match ph_type.and_then(type_code) {
            Some(code) => Self::from_code(code),
            None if ph_type.is_none() => Self::Body,
            None => Self::None,
        }
    }
}

/// Map an OOXML placeholder type onto the title/body type codes.
fn type_code(ph_type: &str) -> Option<u8> {
    match ph_type {
        "title" | "ctrTitle" => Some(PlaceholderRole::TITLE_CODE),
        "body" | "obj" => Some(PlaceholderRole::BODY_CODE),
        _ => None,
    }
}

/// Placeholder metadata of a shape (`p:nvPr/p:ph`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderInfo {
    /// Declared type, `None` when the attribute is omitted.
    pub ph_type: Option<String>,
    /// Declared index, 0 when omitted.
    pub idx: u32,
}

impl PlaceholderInfo {
    /// Read placeholder metadata from a shape element, if it is a placeholder.
    pub fn of_shape(shape: &Element) -> Option<Self> {
        let nv = shape.elements().find(|e| e.local_name().starts_with("nv"))?;
        let ph = nv.find(&["nvPr", "ph"])?;
        Some(Self {
            ph_type: ph.attr("type").map(str::to_string),
            idx: ph.attr("idx").and_then(|i| i.parse().ok()).unwrap_or(0),
        })
    }

    /// Role of this placeholder, inheriting the type of the layout
    /// placeholder with the same index when no type is declared.
    pub fn role(&self, layout: Option<&Layout>) -> PlaceholderRole {
        if self.ph_type.is_some() {
            return PlaceholderRole::from_ph_type(self.ph_type.as_deref());
        }
        match layout.and_then(|l| l.placeholder_by_idx(self.idx)) {
            Some(inherited) => PlaceholderRole::from_ph_type(inherited.ph_type.as_deref()),
            None => PlaceholderRole::from_ph_type(None),
        }
    }
}

/// Role of a shape element: its placeholder role, or `None` for ordinary shapes.
pub fn shape_role(shape: &Element, layout: Option<&Layout>) -> PlaceholderRole {
    PlaceholderInfo::of_shape(shape)
        .map(|ph| ph.role(layout))
        .unwrap_or(PlaceholderRole::None)
}

/// First layout offering both a title and a body placeholder.
///
/// Falls back to the first layout, and to `None` only when the slice is empty.
pub fn best_layout_in(layouts: &[Layout]) -> Option<&Layout> {
    layouts
        .iter()
        .find(|layout| layout.has_role(PlaceholderRole::Title) && layout.has_role(PlaceholderRole::Body))
        .or_else(|| {
            if let Some(first) = layouts.first() {
                log::debug!(
                    "No title+body layout found, falling back to '{}'",
                    first.name()
                );
            }
            layouts.first()
        })
}

/// Best layout of a package for newly added slides.
pub fn best_layout(pkg: &SlidePackage) -> Option<&Layout> {
    best_layout_in(pkg.layouts())
}
