//! In-memory template fixtures for package-level tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT: &str = "application/vnd.openxmlformats-officedocument";

const GROUP_PROPS: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

/// Bytes standing in for a picture.
pub const IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfixture";

/// Builds a small but complete template in the shape PowerPoint writes.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    slides: usize,
    layouts: bool,
    notes_on_first: bool,
    image_on_first: bool,
    lock_first_title: bool,
    dangling_slide_entry: bool,
    missing_slide_part: Option<usize>,
    jump_from_first_to: Option<usize>,
}

impl TemplateBuilder {
    pub fn new(slides: usize) -> Self {
        Self {
            slides,
            layouts: true,
            notes_on_first: false,
            image_on_first: false,
            lock_first_title: false,
            dangling_slide_entry: false,
            missing_slide_part: None,
            jump_from_first_to: None,
        }
    }

    /// Drop every slide layout from the package.
    pub fn without_layouts(mut self) -> Self {
        self.layouts = false;
        self
    }

    /// Give slide 1 a notes page reading "Original notes".
    pub fn with_notes_on_first(mut self) -> Self {
        self.notes_on_first = true;
        self
    }

    /// Put a picture on slide 1.
    pub fn with_image_on_first(mut self) -> Self {
        self.image_on_first = true;
        self
    }

    /// Lock the text of slide 1's title placeholder.
    pub fn with_locked_first_title(mut self) -> Self {
        self.lock_first_title = true;
        self
    }

    /// Add a slide list entry whose relationship does not exist.
    pub fn with_dangling_slide_entry(mut self) -> Self {
        self.dangling_slide_entry = true;
        self
    }

    /// Leave slide `n`'s part and relationships out of the container while
    /// keeping its slide list entry and presentation relationship.
    pub fn without_slide_part(mut self, n: usize) -> Self {
        self.missing_slide_part = Some(n);
        self
    }

    /// Give slide 1 a button that jumps to slide `n`.
    pub fn with_jump_from_first_to(mut self, n: usize) -> Self {
        self.jump_from_first_to = Some(n);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut parts: BTreeMap<String, String> = BTreeMap::new();
        let mut overrides: Vec<(String, String)> = vec![
            ("ppt/presentation.xml".into(), format!("{}.presentationml.presentation.main+xml", CT)),
            ("ppt/slideMasters/slideMaster1.xml".into(), format!("{}.presentationml.slideMaster+xml", CT)),
            ("ppt/theme/theme1.xml".into(), format!("{}.theme+xml", CT)),
        ];

        parts.insert(
            "_rels/.rels".into(),
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
        );

        // Master and layouts. "Title Only" is listed before "Title and Content".
        let mut master_rels = vec![("rId3", "theme", "../theme/theme1.xml")];
        let mut layout_ids = String::new();
        if self.layouts {
            master_rels.push(("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"));
            master_rels.push(("rId2", "slideLayout", "../slideLayouts/slideLayout2.xml"));
            layout_ids = r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst>"#.into();

            parts.insert(
                "ppt/slideLayouts/slideLayout1.xml".into(),
                layout("Title Only", &[placeholder(2, "Title 1", r#"type="title""#, None), placeholder(3, "Date Placeholder 2", r#"type="dt" idx="10""#, None)]),
            );
            parts.insert(
                "ppt/slideLayouts/slideLayout2.xml".into(),
                layout(
                    "Title and Content",
                    &[
                        placeholder(2, "Title 1", r#"type="title""#, None),
                        placeholder(3, "Content Placeholder 2", r#"idx="1""#, None),
                        placeholder(4, "Footer Placeholder 3", r#"type="ftr" idx="11""#, None),
                    ],
                ),
            );
            for n in 1..=2 {
                parts.insert(
                    format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", n),
                    rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
                );
                overrides.push((
                    format!("ppt/slideLayouts/slideLayout{}.xml", n),
                    format!("{}.presentationml.slideLayout+xml", CT),
                ));
            }
        }
        parts.insert(
            "ppt/slideMasters/slideMaster1.xml".into(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {}><p:cSld><p:spTree>{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>{}</p:sldMaster>"#,
                NS, GROUP_PROPS, layout_ids
            ),
        );
        parts.insert("ppt/slideMasters/_rels/slideMaster1.xml.rels".into(), rels(&master_rels));
        parts.insert(
            "ppt/theme/theme1.xml".into(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Fixture"><a:themeElements/></a:theme>"#.into(),
        );

        // Presentation relationships and slide list.
        let mut pres_rels: Vec<(String, &str, String)> = vec![
            ("rId1".into(), "slideMaster", "slideMasters/slideMaster1.xml".into()),
            ("rId2".into(), "theme", "theme/theme1.xml".into()),
        ];
        let mut slide_ids = String::new();
        let mut show_refs = String::new();
        for i in 1..=self.slides {
            let rid = format!("rId{}", 10 + i);
            pres_rels.push((rid.clone(), "slide", format!("slides/slide{}.xml", i)));
            slide_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 255 + i, rid));
            show_refs.push_str(&format!(r#"<p:sld r:id="{}"/>"#, rid));
            self.add_slide(&mut parts, &mut overrides, i);
        }
        if let Some(n) = self.missing_slide_part {
            parts.remove(&format!("ppt/slides/slide{}.xml", n));
            parts.remove(&format!("ppt/slides/_rels/slide{}.xml.rels", n));
        }
        if self.dangling_slide_entry {
            slide_ids.push_str(r#"<p:sldId id="999" r:id="rId99"/>"#);
        }

        let mut notes_master_list = String::new();
        if self.notes_on_first {
            pres_rels.push(("rId3".into(), "notesMaster", "notesMasters/notesMaster1.xml".into()));
            notes_master_list = r#"<p:notesMasterIdLst><p:notesMasterId r:id="rId3"/></p:notesMasterIdLst>"#.into();
            parts.insert(
                "ppt/notesMasters/notesMaster1.xml".into(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notesMaster {}><p:cSld><p:spTree>{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/></p:notesMaster>"#,
                    NS, GROUP_PROPS
                ),
            );
            parts.insert(
                "ppt/notesMasters/_rels/notesMaster1.xml.rels".into(),
                rels(&[("rId1", "theme", "../theme/theme1.xml")]),
            );
            overrides.push((
                "ppt/notesMasters/notesMaster1.xml".into(),
                format!("{}.presentationml.notesMaster+xml", CT),
            ));
        }

        let pres_rel_refs: Vec<(&str, &str, &str)> = pres_rels
            .iter()
            .map(|(id, t, target)| (id.as_str(), *t, target.as_str()))
            .collect();
        parts.insert("ppt/_rels/presentation.xml.rels".into(), rels(&pres_rel_refs));

        let slide_list = if slide_ids.is_empty() {
            String::new()
        } else {
            format!("<p:sldIdLst>{}</p:sldIdLst>", slide_ids)
        };
        let custom_shows = if show_refs.is_empty() {
            String::new()
        } else {
            format!(
                r#"<p:custShowLst><p:custShow name="All" id="0"><p:sldLst>{}</p:sldLst></p:custShow></p:custShowLst>"#,
                show_refs
            )
        };
        parts.insert(
            "ppt/presentation.xml".into(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{}{}<p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/>{}</p:presentation>"#,
                NS, notes_master_list, slide_list, custom_shows
            ),
        );

        let mut types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>"#,
        );
        for (name, ct) in &overrides {
            types.push_str(&format!(r#"<Override PartName="/{}" ContentType="{}"/>"#, name, ct));
        }
        types.push_str("</Types>");

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(types.as_bytes()).unwrap();
        for (name, content) in &parts {
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        if self.image_on_first && self.slides > 0 {
            writer.start_file("ppt/media/image1.png", options).unwrap();
            writer.write_all(IMAGE_BYTES).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn add_slide(&self, parts: &mut BTreeMap<String, String>, overrides: &mut Vec<(String, String)>, i: usize) {
        let first = i == 1;
        let title_locks = if first && self.lock_first_title {
            Some(r#"<a:spLocks noTextEdit="1"/>"#)
        } else {
            None
        };

        let mut shapes = vec![
            placeholder_with_text(2, "Title 1", r#"type="title""#, title_locks, &format!("Template title {}", i)),
            placeholder_with_text(3, "Content Placeholder 2", r#"idx="1""#, None, &format!("Template body {}", i)),
        ];
        let mut slide_rels = vec![("rId1".to_string(), "slideLayout", "../slideLayouts/slideLayout2.xml".to_string())];
        if !self.layouts {
            slide_rels.clear();
        }
        if first && self.image_on_first {
            shapes.push(
                r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="Logo"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/></p:blipFill><p:spPr/></p:pic>"#.to_string(),
            );
            slide_rels.push(("rId2".into(), "image", "../media/image1.png".into()));
        }
        if let (true, Some(target)) = (first, self.jump_from_first_to) {
            shapes.push(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="5" name="Jump"><a:hlinkClick r:id="rId7" action="ppaction://hlinksldjump"/></p:cNvPr><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#.to_string(),
            );
            slide_rels.push(("rId7".into(), "slide", format!("../slides/slide{}.xml", target)));
        }
        if first && self.notes_on_first {
            slide_rels.push(("rId3".into(), "notesSlide", "../notesSlides/notesSlide1.xml".into()));
            parts.insert(
                "ppt/notesSlides/notesSlide1.xml".into(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notes {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld></p:notes>"#,
                    NS,
                    GROUP_PROPS,
                    placeholder_with_text(3, "Notes Placeholder 2", r#"type="body" idx="1""#, None, "Original notes")
                ),
            );
            parts.insert(
                "ppt/notesSlides/_rels/notesSlide1.xml.rels".into(),
                rels(&[
                    ("rId1", "notesMaster", "../notesMasters/notesMaster1.xml"),
                    ("rId2", "slide", "../slides/slide1.xml"),
                ]),
            );
            overrides.push((
                "ppt/notesSlides/notesSlide1.xml".into(),
                format!("{}.presentationml.notesSlide+xml", CT),
            ));
        }

        parts.insert(
            format!("ppt/slides/slide{}.xml", i),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
                NS,
                GROUP_PROPS,
                shapes.concat()
            ),
        );
        let rel_refs: Vec<(&str, &str, &str)> = slide_rels
            .iter()
            .map(|(id, t, target)| (id.as_str(), *t, target.as_str()))
            .collect();
        parts.insert(format!("ppt/slides/_rels/slide{}.xml.rels", i), rels(&rel_refs));
        overrides.push((
            format!("ppt/slides/slide{}.xml", i),
            format!("{}.presentationml.slide+xml", CT),
        ));
    }
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut out = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}">"#,
        REL_NS
    );
    for (id, rel_type, target) in entries {
        out.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, REL, rel_type, target
        ));
    }
    out.push_str("</Relationships>");
    out
}

fn layout(name: &str, shapes: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {} preserve="1"><p:cSld name="{}"><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        NS,
        name,
        GROUP_PROPS,
        shapes.concat()
    )
}

fn placeholder(id: u32, name: &str, ph_attrs: &str, locks: Option<&str>) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr>{}</p:cNvSpPr><p:nvPr><p:ph {}/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#,
        id,
        name,
        locks.unwrap_or(""),
        ph_attrs
    )
}

fn placeholder_with_text(id: u32, name: &str, ph_attrs: &str, locks: Option<&str>, text: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr>{}</p:cNvSpPr><p:nvPr><p:ph {}/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:pPr algn="l"/><a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        id,
        name,
        locks.unwrap_or(""),
        ph_attrs,
        text
    )
}

/// Names of every entry in a zip container.
pub fn zip_entries(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// Text of one zip entry, if present.
pub fn zip_text(bytes: &[u8], name: &str) -> Option<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut text = String::new();
    file.read_to_string(&mut text).ok()?;
    Some(text)
}

/// Raw bytes of one zip entry, if present.
pub fn zip_bytes(bytes: &[u8], name: &str) -> Option<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut data = Vec::new();
    file.read_to_end(&mut data).ok()?;
    Some(data)
}
