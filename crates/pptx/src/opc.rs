//! Open Packaging Conventions plumbing: the zip container, relationship
//! parts and `[Content_Types].xml`.

use crate::xml::{self, Element};
use deck_core::{Error, Result};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Relationship type URIs.
pub mod rel_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
    pub const NOTES_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesMaster";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
}

/// Content type strings.
pub mod content_type {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const PRESENTATION: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
    pub const SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
    pub const NOTES_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";
    pub const NOTES_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.notesMaster+xml";
    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
}

/// Namespace URIs used when writing new parts.
pub mod namespace {
    pub const PACKAGE_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";
    pub const CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
}

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Directory portion of a part name (`ppt/slides/slide1.xml` -> `ppt/slides`).
pub fn part_dir(part_name: &str) -> &str {
    part_name.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Name of the relationships part belonging to `part_name`.
///
/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`,
/// and the package itself (empty name) -> `_rels/.rels`.
pub fn rels_part_for(part_name: &str) -> String {
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_name),
    }
}

/// Resolve a relationship target against the directory of its source part.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Express `part_name` as a target relative to the directory `base_dir`.
pub fn relative_target(base_dir: &str, part_name: &str) -> String {
    let base: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    let target: Vec<&str> = part_name.split('/').filter(|s| !s.is_empty()).collect();

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat("..").take(base.len() - common).collect();
    parts.extend(&target[common..]);
    parts.join("/")
}

/// One relationship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// The relationship table of one source part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// Directory of the source part; internal targets resolve against it.
    base_dir: String,
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Empty table for the source part `part_name`.
    pub fn new(part_name: &str) -> Self {
        Self {
            base_dir: part_dir(part_name).to_string(),
            entries: Vec::new(),
        }
    }

    /// Parse a `.rels` part belonging to `part_name`.
    pub fn parse(part_name: &str, content: &str) -> Result<Self> {
        let root = xml::parse(content)?;
        let mut rels = Self::new(part_name);
        for el in root.children_named("Relationship") {
            let (Some(id), Some(rel_type), Some(target)) =
                (el.attr("Id"), el.attr("Type"), el.attr("Target"))
            else {
                log::warn!("Skipping incomplete relationship in rels of '{}'", part_name);
                continue;
            };
            rels.entries.push(Relationship {
                id: id.to_string(),
                rel_type: rel_type.to_string(),
                target: target.to_string(),
                external: el.attr("TargetMode") == Some("External"),
            });
        }
        Ok(rels)
    }

    /// All entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by relationship id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// Resolved part name of an internal relationship.
    pub fn target_part(&self, id: &str) -> Option<String> {
        self.get(id)
            .filter(|r| !r.external)
            .map(|r| resolve_target(&self.base_dir, &r.target))
    }

    /// Resolved part name of the first internal relationship of a type.
    pub fn target_part_of_type(&self, rel_type: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|r| r.rel_type == rel_type && !r.external)
            .map(|r| resolve_target(&self.base_dir, &r.target))
    }

    /// Resolved part names of every internal relationship.
    pub fn internal_targets(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .filter(|r| !r.external)
            .map(|r| resolve_target(&self.base_dir, &r.target))
    }

    /// First `rIdN` not already in use.
    pub fn next_id(&self) -> String {
        let mut n = self.entries.len() + 1;
        loop {
            let candidate = format!("rId{}", n);
            if self.get(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Add an internal relationship to `part_name`, returning its id.
    pub fn add(&mut self, rel_type: &str, part_name: &str) -> String {
        let id = self.next_id();
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: relative_target(&self.base_dir, part_name),
            external: false,
        });
        id
    }

    /// Remove an entry by id.
    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let pos = self.entries.iter().position(|r| r.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Remove every internal entry resolving to `part_name`, returning them.
    pub fn remove_targeting(&mut self, part_name: &str) -> Vec<Relationship> {
        let base_dir = &self.base_dir;
        let (removed, kept): (Vec<Relationship>, Vec<Relationship>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|r| !r.external && resolve_target(base_dir, &r.target) == part_name);
        self.entries = kept;
        removed
    }

    /// Serialize as a `.rels` part.
    pub fn to_xml(&self) -> String {
        let mut root = Element::new("Relationships")
            .with_attr("xmlns", namespace::PACKAGE_RELATIONSHIPS);
        for rel in &self.entries {
            let mut el = Element::new("Relationship")
                .with_attr("Id", rel.id.as_str())
                .with_attr("Type", rel.rel_type.as_str())
                .with_attr("Target", rel.target.as_str());
            if rel.external {
                el.set_attr("TargetMode", "External");
            }
            root.push(el);
        }
        root.to_document()
    }
}

/// `[Content_Types].xml`: extension defaults plus per-part overrides.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    /// Content types with the `rels` and `xml` defaults every package needs.
    pub fn new() -> Self {
        let mut types = Self::default();
        types.add_default("rels", content_type::RELATIONSHIPS);
        types.add_default("xml", content_type::XML);
        types
    }

    /// Parse a `[Content_Types].xml` part.
    pub fn parse(content: &str) -> Result<Self> {
        let root = xml::parse(content)?;
        let mut types = Self::default();
        for el in root.elements() {
            match (el.local_name(), el.attr("ContentType")) {
                ("Default", Some(ct)) => {
                    if let Some(ext) = el.attr("Extension") {
                        types.add_default(ext, ct);
                    }
                }
                ("Override", Some(ct)) => {
                    if let Some(name) = el.attr("PartName") {
                        types.set_override(name.trim_start_matches('/'), ct);
                    }
                }
                _ => {}
            }
        }
        Ok(types)
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_ascii_lowercase(), content_type.to_string());
    }

    pub fn set_override(&mut self, part_name: &str, content_type: &str) {
        self.overrides
            .insert(part_name.to_string(), content_type.to_string());
    }

    pub fn remove_override(&mut self, part_name: &str) -> Option<String> {
        self.overrides.remove(part_name)
    }

    /// Content type of a part, from its override or its extension default.
    pub fn get(&self, part_name: &str) -> Option<&str> {
        self.overrides.get(part_name).map(String::as_str).or_else(|| {
            part_name
                .rsplit_once('.')
                .and_then(|(_, ext)| self.defaults.get(&ext.to_ascii_lowercase()))
                .map(String::as_str)
        })
    }

    /// Part names carrying an override of the given content type, sorted.
    pub fn parts_of_type<'a>(&'a self, content_type: &'a str) -> impl Iterator<Item = &'a str> {
        self.overrides
            .iter()
            .filter(move |(_, ct)| ct.as_str() == content_type)
            .map(|(name, _)| name.as_str())
    }

    /// Drop overrides whose part is no longer present.
    pub fn retain_overrides<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        self.overrides.retain(|name, _| keep(name));
    }

    pub fn to_xml(&self) -> String {
        let mut root = Element::new("Types").with_attr("xmlns", namespace::CONTENT_TYPES);
        for (ext, ct) in &self.defaults {
            root.push(
                Element::new("Default")
                    .with_attr("Extension", ext.as_str())
                    .with_attr("ContentType", ct.as_str()),
            );
        }
        for (name, ct) in &self.overrides {
            root.push(
                Element::new("Override")
                    .with_attr("PartName", format!("/{}", name))
                    .with_attr("ContentType", ct.as_str()),
            );
        }
        root.to_document()
    }
}

/// Raw parts of a package keyed by part name (no leading slash).
pub type PartMap = BTreeMap<String, Vec<u8>>;

/// Read every entry of a zip container into memory.
pub fn read_parts<R: Read + Seek>(reader: R) -> Result<PartMap> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

    let mut parts = PartMap::new();
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", i, e)))?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().trim_start_matches('/').to_string();
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
        parts.insert(name, data);
    }

    log::debug!("Read {} parts from package", parts.len());
    Ok(parts)
}

/// Write parts into a fresh zip container, `[Content_Types].xml` first.
pub fn write_parts(parts: &PartMap) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let ordered = parts
        .get_key_value(CONTENT_TYPES_PART)
        .into_iter()
        .chain(parts.iter().filter(|(name, _)| name.as_str() != CONTENT_TYPES_PART));

    for (name, data) in ordered {
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", name, e)))?;
        writer
            .write_all(data)
            .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", name, e)))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))?;
    Ok(cursor.into_inner())
}

/// Read a part as UTF-8 text.
pub fn part_text<'a>(parts: &'a PartMap, name: &str) -> Result<&'a str> {
    let data = parts
        .get(name)
        .ok_or_else(|| Error::PptxParseError(format!("File not found in archive '{}'", name)))?;
    std::str::from_utf8(data)
        .map_err(|e| Error::CorruptedFile(format!("'{}' is not UTF-8: {}", name, e)))
}
