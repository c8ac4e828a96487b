//! Paragraph-level text model and the DrawingML text body edits built on it.

use crate::xml::{Element, Node};
use serde::Serialize;
use std::fmt;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RgbColor(pub u8, pub u8, pub u8);

impl RgbColor {
    pub const WHITE: RgbColor = RgbColor(0xFF, 0xFF, 0xFF);

    /// Parse a `RRGGBB` hex string as found in `a:srgbClr/@val`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Character formatting applied to a whole paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TextStyle {
    /// Font size in points.
    pub size: Option<f64>,
    pub bold: bool,
    pub color: Option<RgbColor>,
}

impl TextStyle {
    pub const fn new(size: f64, bold: bool, color: RgbColor) -> Self {
        Self {
            size: Some(size),
            bold,
            color: Some(color),
        }
    }
}

/// One paragraph of a text frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
    /// Indent level, 0 for top level.
    pub level: u8,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            level: 0,
        }
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    /// Build the `a:p` element on top of existing paragraph properties, so
    /// alignment and bullet settings of the frame carry over.
    pub fn to_element_with(&self, base_ppr: Option<&Element>) -> Element {
        let mut p = Element::new("a:p");
        let mut ppr = base_ppr.cloned().unwrap_or_else(|| Element::new("a:pPr"));
        if self.level > 0 {
            ppr.set_attr("lvl", self.level.to_string());
        } else {
            ppr.remove_attr("lvl");
        }
        if !ppr.attrs.is_empty() || !ppr.children.is_empty() {
            p.push(ppr);
        }

        let mut rpr = Element::new("a:rPr").with_attr("lang", "en-US");
        if let Some(size) = self.style.size {
            rpr.set_attr("sz", ((size * 100.0).round() as u32).to_string());
        }
        if self.style.bold {
            rpr.set_attr("b", "1");
        }
        rpr.set_attr("dirty", "0");
        if let Some(color) = self.style.color {
            rpr.push(solid_fill(color));
        }

        p.push(
            Element::new("a:r")
                .with_child(rpr)
                .with_child(Element::new("a:t").with_text(self.text.as_str())),
        );
        p
    }

    /// Read a paragraph back from an `a:p` element.
    ///
    /// Style comes from the first run; text concatenates every run, field and
    /// line break.
    pub fn from_element(p: &Element) -> Self {
        let level = p
            .child("pPr")
            .and_then(|ppr| ppr.attr("lvl"))
            .and_then(|lvl| lvl.parse().ok())
            .unwrap_or(0);

        let mut text = String::new();
        let mut style: Option<TextStyle> = None;
        for el in p.elements() {
            match el.local_name() {
                "r" | "fld" => {
                    if let Some(t) = el.child("t") {
                        text.push_str(&t.text());
                    }
                    if style.is_none() {
                        style = el.child("rPr").map(style_from_rpr);
                    }
                }
                "br" => text.push('\n'),
                _ => {}
            }
        }

        Self {
            text,
            style: style.unwrap_or_default(),
            level,
        }
    }
}

fn style_from_rpr(rpr: &Element) -> TextStyle {
    TextStyle {
        size: rpr
            .attr("sz")
            .and_then(|sz| sz.parse::<f64>().ok())
            .map(|sz| sz / 100.0),
        bold: matches!(rpr.attr("b"), Some("1") | Some("true")),
        color: rpr
            .find(&["solidFill", "srgbClr"])
            .and_then(|c| c.attr("val"))
            .and_then(RgbColor::from_hex),
    }
}

/// `a:solidFill` with a single sRGB color.
pub fn solid_fill(color: RgbColor) -> Element {
    Element::new("a:solidFill")
        .with_child(Element::new("a:srgbClr").with_attr("val", color.to_string()))
}

/// Paragraphs of a `p:txBody` element.
pub fn paragraphs(tx_body: &Element) -> Vec<Paragraph> {
    tx_body.children_named("p").map(Paragraph::from_element).collect()
}

/// Clear a text body down to one empty paragraph.
///
/// `a:bodyPr`, `a:lstStyle` and the first paragraph's `a:pPr` and
/// `a:endParaRPr` are kept so the frame keeps its formatting. Returns whether
/// anything was removed.
pub fn clear_text_body(tx_body: &mut Element) -> bool {
    let before = tx_body.clone();

    let mut first: Option<Element> = None;
    tx_body.children.retain(|node| match node {
        Node::Element(e) if e.is("p") => {
            if first.is_none() {
                first = Some(e.clone());
            }
            false
        }
        _ => true,
    });

    let mut kept = Element::new("a:p");
    if let Some(p) = first {
        kept.name = p.name.clone();
        for el in p.elements() {
            if el.is("pPr") || el.is("endParaRPr") {
                kept.push(el.clone());
            }
        }
    }
    tx_body.push(kept);

    *tx_body != before
}

/// Replace every paragraph of a text body.
///
/// New paragraphs inherit the first existing paragraph's `a:pPr`. An empty
/// `new_paragraphs` slice leaves one empty paragraph behind, since a text
/// body must contain at least one.
pub fn write_paragraphs(tx_body: &mut Element, new_paragraphs: &[Paragraph]) {
    if new_paragraphs.is_empty() {
        clear_text_body(tx_body);
        return;
    }
    let base_ppr = tx_body
        .child("p")
        .and_then(|p| p.child("pPr"))
        .cloned();
    tx_body.remove_children("p");
    for paragraph in new_paragraphs {
        tx_body.push(paragraph.to_element_with(base_ppr.as_ref()));
    }
}

/// A fresh `p:txBody` with the given body properties and paragraphs.
pub fn new_text_body(body_pr: Element, content: &[Paragraph]) -> Element {
    let mut tx_body = Element::new("p:txBody")
        .with_child(body_pr)
        .with_child(Element::new("a:lstStyle"))
        .with_child(Element::new("a:p"));
    write_paragraphs(&mut tx_body, content);
    tx_body
}

/// Keep `a:bodyPr` and `a:lstStyle` ahead of the paragraphs.
pub fn ensure_text_body_prefix(tx_body: &mut Element) {
    if tx_body.child("bodyPr").is_none() {
        tx_body.children.insert(0, Node::Element(Element::new("a:bodyPr")));
    }
    if tx_body.child("lstStyle").is_none() {
        tx_body.insert_after(&["bodyPr"], Element::new("a:lstStyle"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml;

    const ACCENT: RgbColor = RgbColor(0x00, 0x66, 0xCC);

    fn body(xml_text: &str) -> Element {
        xml::parse(xml_text).unwrap()
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(RgbColor(0x0A, 0x19, 0x40).to_string(), "0A1940");
        assert_eq!(RgbColor::from_hex("ffd700"), Some(RgbColor(0xFF, 0xD7, 0x00)));
        assert_eq!(RgbColor::from_hex("FFF"), None);
        assert_eq!(RgbColor::from_hex("GG0000"), None);
    }

    #[test]
    fn test_paragraph_roundtrip() {
        let para = Paragraph::new("Ship faster", TextStyle::new(20.0, true, ACCENT)).with_level(1);
        let back = Paragraph::from_element(&para.to_element_with(None));
        assert_eq!(back, para);
    }

    #[test]
    fn test_paragraph_escaping_survives_serialization() {
        let para = Paragraph::new("R&D <beta>", TextStyle::default());
        let mut out = String::new();
        para.to_element_with(None).write_to(&mut out);
        assert!(out.contains("R&amp;D &lt;beta&gt;"));
        let back = Paragraph::from_element(&xml::parse(&out).unwrap());
        assert_eq!(back.text, "R&D <beta>");
    }

    #[test]
    fn test_clear_keeps_body_properties() {
        let mut tx = body(
            r#"<p:txBody xmlns:p="p" xmlns:a="a"><a:bodyPr anchor="ctr"/><a:lstStyle/><a:p><a:pPr algn="ctr"/><a:r><a:t>Old title</a:t></a:r><a:endParaRPr lang="en-US"/></a:p><a:p><a:r><a:t>More</a:t></a:r></a:p></p:txBody>"#,
        );

        assert!(clear_text_body(&mut tx));
        assert!(paragraphs(&tx).iter().all(|p| p.text.is_empty()));
        assert_eq!(tx.child("bodyPr").unwrap().attr("anchor"), Some("ctr"));
        assert!(tx.child("lstStyle").is_some());

        let ps: Vec<_> = tx.children_named("p").collect();
        assert_eq!(ps.len(), 1);
        assert_eq!(ps[0].child("pPr").unwrap().attr("algn"), Some("ctr"));
        assert!(ps[0].child("endParaRPr").is_some());
        assert!(ps[0].child("r").is_none());

        // Clearing an already clear body changes nothing.
        assert!(!clear_text_body(&mut tx));
    }

    #[test]
    fn test_write_paragraphs_replaces_all() {
        let mut tx = body(
            r#"<p:txBody xmlns:p="p" xmlns:a="a"><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>x</a:t></a:r></a:p><a:p/></p:txBody>"#,
        );
        let content = [
            Paragraph::new("one", TextStyle::default()),
            Paragraph::new("two", TextStyle::default()).with_level(1),
        ];
        write_paragraphs(&mut tx, &content);

        let texts: Vec<_> = paragraphs(&tx).into_iter().map(|p| (p.text, p.level)).collect();
        assert_eq!(texts, vec![("one".to_string(), 0), ("two".to_string(), 1)]);
        assert!(tx.child("bodyPr").is_some());
    }

    #[test]
    fn test_write_inherits_first_paragraph_properties() {
        let mut tx = body(
            r#"<p:txBody xmlns:p="p" xmlns:a="a"><a:bodyPr/><a:lstStyle/><a:p><a:pPr algn="ctr" lvl="2"/></a:p></p:txBody>"#,
        );
        write_paragraphs(
            &mut tx,
            &[
                Paragraph::new("centered", TextStyle::default()),
                Paragraph::new("indented", TextStyle::default()).with_level(1),
            ],
        );

        let ps: Vec<_> = tx.children_named("p").collect();
        assert_eq!(ps[0].child("pPr").unwrap().attr("algn"), Some("ctr"));
        assert_eq!(ps[0].child("pPr").unwrap().attr("lvl"), None);
        assert_eq!(ps[1].child("pPr").unwrap().attr("lvl"), Some("1"));
    }

    #[test]
    fn test_write_nothing_leaves_one_empty_paragraph() {
        let mut tx = new_text_body(Element::new("a:bodyPr"), &[]);
        assert_eq!(tx.children_named("p").count(), 1);
        write_paragraphs(&mut tx, &[]);
        assert_eq!(tx.children_named("p").count(), 1);
        assert!(paragraphs(&tx).iter().all(|p| p.text.is_empty()));
    }

    #[test]
    fn test_ensure_prefix_orders_children() {
        let mut tx = Element::new("p:txBody").with_child(Element::new("a:p"));
        ensure_text_body_prefix(&mut tx);
        let order: Vec<_> = tx.elements().map(|e| e.local_name().to_string()).collect();
        assert_eq!(order, vec!["bodyPr", "lstStyle", "p"]);
    }

    #[test]
    fn test_reads_breaks_and_fields() {
        let p = body(
            r#"<a:p xmlns:a="a"><a:r><a:rPr sz="1800" b="1"><a:solidFill><a:srgbClr val="3C3C3C"/></a:solidFill></a:rPr><a:t>Page </a:t></a:r><a:br/><a:fld type="slidenum"><a:t>3</a:t></a:fld></a:p>"#,
        );
        let para = Paragraph::from_element(&p);
        assert_eq!(para.text, "Page \n3");
        assert_eq!(para.style, TextStyle::new(18.0, true, RgbColor(0x3C, 0x3C, 0x3C)));
    }
}
