//! Slide layouts: the read-only templates new slides are built from.

use crate::placeholder::{PlaceholderInfo, PlaceholderRole};
use crate::xml::{self, Element};
use deck_core::Result;

/// Placeholder types a new slide does not inherit from its layout.
const NON_CLONED_PH_TYPES: [&str; 3] = ["dt", "ftr", "sldNum"];

/// A slide layout part.
#[derive(Debug, Clone)]
pub struct Layout {
    part_name: String,
    name: String,
    root: Element,
}

/// A placeholder declared on a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlaceholder {
    pub info: PlaceholderInfo,
    pub role: PlaceholderRole,
    /// Source shape element.
    pub shape: Element,
}

impl Layout {
    pub fn parse(part_name: &str, content: &str) -> Result<Self> {
        let root = xml::parse(content)?;
        let name = root
            .child("cSld")
            .and_then(|c| c.attr("name"))
            .unwrap_or("")
            .to_string();
        Ok(Self {
            part_name: part_name.to_string(),
            name,
            root,
        })
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    /// Display name (`p:cSld/@name`), empty when unnamed.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Placeholders in shape tree order.
    pub fn placeholders(&self) -> Vec<LayoutPlaceholder> {
        let Some(tree) = self.root.find(&["cSld", "spTree"]) else {
            return Vec::new();
        };
        tree.elements()
            .filter_map(|shape| {
                let info = PlaceholderInfo::of_shape(shape)?;
                let role = PlaceholderRole::from_ph_type(info.ph_type.as_deref());
                Some(LayoutPlaceholder {
                    info,
                    role,
                    shape: shape.clone(),
                })
            })
            .collect()
    }

    /// Layout placeholder with the given index.
    pub fn placeholder_by_idx(&self, idx: u32) -> Option<PlaceholderInfo> {
        self.placeholders()
            .into_iter()
            .map(|ph| ph.info)
            .find(|info| info.idx == idx)
    }

    /// Whether any placeholder of the layout plays `role`.
    pub fn has_role(&self, role: PlaceholderRole) -> bool {
        self.placeholders().iter().any(|ph| ph.role == role)
    }

    /// Placeholders a new slide on this layout starts with.
    pub fn cloneable_placeholders(&self) -> Vec<LayoutPlaceholder> {
        self.placeholders()
            .into_iter()
            .filter(|ph| {
                !ph.info
                    .ph_type
                    .as_deref()
                    .is_some_and(|t| NON_CLONED_PH_TYPES.contains(&t))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLE_AND_CONTENT: &str = r#"<p:sldLayout xmlns:a="a" xmlns:r="r" xmlns:p="p" type="obj"><p:cSld name="Title and Content"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Content Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp><p:sp><p:nvSpPr><p:cNvPr id="4" name="Date Placeholder 3"/><p:cNvSpPr/><p:nvPr><p:ph type="dt" sz="half" idx="10"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp><p:sp><p:nvSpPr><p:cNvPr id="5" name="Slide Number Placeholder 4"/><p:cNvSpPr/><p:nvPr><p:ph type="sldNum" sz="quarter" idx="12"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp></p:spTree></p:cSld></p:sldLayout>"#;

    #[test]
    fn test_layout_placeholders() {
        let layout = Layout::parse("ppt/slideLayouts/slideLayout2.xml", TITLE_AND_CONTENT).unwrap();
        assert_eq!(layout.name(), "Title and Content");
        assert_eq!(layout.part_name(), "ppt/slideLayouts/slideLayout2.xml");

        let roles: Vec<_> = layout.placeholders().iter().map(|ph| ph.role).collect();
        assert_eq!(
            roles,
            vec![
                PlaceholderRole::Title,
                PlaceholderRole::Body,
                PlaceholderRole::None,
                PlaceholderRole::None
            ]
        );
        assert!(layout.has_role(PlaceholderRole::Title));
        assert!(layout.has_role(PlaceholderRole::Body));
    }

    #[test]
    fn test_cloneable_placeholders_skip_footer_family() {
        let layout = Layout::parse("ppt/slideLayouts/slideLayout2.xml", TITLE_AND_CONTENT).unwrap();
        let names: Vec<_> = layout
            .cloneable_placeholders()
            .iter()
            .filter_map(|ph| ph.shape.find(&["nvSpPr", "cNvPr"]).and_then(|c| c.attr("name")).map(str::to_string))
            .collect();
        assert_eq!(names, vec!["Title 1", "Content Placeholder 2"]);
    }

    #[test]
    fn test_placeholder_by_idx() {
        let layout = Layout::parse("x.xml", TITLE_AND_CONTENT).unwrap();
        assert_eq!(layout.placeholder_by_idx(0).unwrap().ph_type.as_deref(), Some("title"));
        assert_eq!(layout.placeholder_by_idx(1).unwrap().ph_type, None);
        assert!(layout.placeholder_by_idx(99).is_none());
    }
}
