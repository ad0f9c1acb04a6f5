//! ZIP container abstraction for OOXML packages.
//!
//! Reading goes through [`OoxmlContainer`], writing through [`PackageWriter`].
//! Relationship and content-type parts get their own small models because
//! adding a slide has to edit both.

use crate::error::{Error, Result};
use crate::pptx::xml::escape_xml;
use quick_xml::events::Event;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;

/// Name of the content types part.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Namespace of a relationships part.
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Namespace of the content types part.
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// XML declaration written at the top of every generated part.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A relationship entry from a .rels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

/// Ordered collection of relationships parsed from a .rels file.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
    by_id: HashMap<String, usize>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the XML of a relationships part.
    pub fn parse(content: &str) -> Result<Self> {
        let mut rels = Relationships::new();
        if content.trim().is_empty() {
            return Ok(rels);
        }

        let mut reader = quick_xml::Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = String::new();
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value()?.into_owned();
                        match attr.key.as_ref() {
                            b"Id" => id = value,
                            b"Type" => rel_type = value,
                            b"Target" => target = value,
                            b"TargetMode" => external = value.eq_ignore_ascii_case("external"),
                            _ => {}
                        }
                    }

                    if !id.is_empty() {
                        rels.add(Relationship {
                            id,
                            rel_type,
                            target,
                            external,
                        });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    /// Get relationships by type, in document order.
    pub fn get_by_type(&self, rel_type: &str) -> Vec<&Relationship> {
        self.items
            .iter()
            .filter(|r| r.rel_type == rel_type)
            .collect()
    }

    /// Iterate over all relationships in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a relationship, replacing any existing one with the same ID.
    pub fn add(&mut self, rel: Relationship) {
        match self.by_id.get(&rel.id) {
            Some(&i) => self.items[i] = rel,
            None => {
                self.by_id.insert(rel.id.clone(), self.items.len());
                self.items.push(rel);
            }
        }
    }

    /// First `rIdN` not used by any relationship in the collection.
    pub fn next_id(&self) -> String {
        (1..)
            .map(|n| format!("rId{}", n))
            .find(|id| !self.by_id.contains_key(id))
            .unwrap_or_default()
    }

    /// Add an internal relationship under a fresh ID and return that ID.
    ///
    /// An existing relationship with the same type and target is reused.
    pub fn add_internal(&mut self, rel_type: &str, target: &str) -> String {
        if let Some(existing) = self
            .items
            .iter()
            .find(|r| !r.external && r.rel_type == rel_type && r.target == target)
        {
            return existing.id.clone();
        }
        let id = self.next_id();
        self.add(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    /// Serialize the collection as a relationships part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(128 + self.items.len() * 160);
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        let _ = write!(xml, r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS);
        for rel in &self.items {
            let _ = write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape_xml(&rel.id),
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            );
            if rel.external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// The `[Content_Types].xml` part.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    /// Extension to content type, in document order.
    defaults: Vec<(String, String)>,
    /// Absolute part name to content type, in document order.
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Parse the content types part.
    pub fn parse(content: &str) -> Result<Self> {
        let mut types = ContentTypes::default();
        let mut reader = quick_xml::Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if matches!(e.local_name().as_ref(), b"Default" | b"Override") =>
                {
                    let is_default = e.local_name().as_ref() == b"Default";
                    let mut key = String::new();
                    let mut content_type = String::new();
                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value()?.into_owned();
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => key = value,
                            b"ContentType" => content_type = value,
                            _ => {}
                        }
                    }

                    if is_default {
                        types.defaults.push((key.to_ascii_lowercase(), content_type));
                    } else {
                        types.overrides.push((key, content_type));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Content type registered for a file extension.
    pub fn default_for(&self, extension: &str) -> Option<&str> {
        let extension = extension.to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, ct)| ct.as_str())
    }

    /// Content type override for a part, given without its leading slash.
    pub fn override_for(&self, part_name: &str) -> Option<&str> {
        let absolute = absolute_part_name(part_name);
        self.overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&absolute))
            .map(|(_, ct)| ct.as_str())
    }

    /// Register a default content type for an extension unless one exists.
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        if self.default_for(extension).is_none() {
            self.defaults
                .push((extension.to_ascii_lowercase(), content_type.to_string()));
        }
    }

    /// Register (or replace) the content type override for a part.
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        let absolute = absolute_part_name(part_name);
        match self
            .overrides
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&absolute))
        {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self.overrides.push((absolute, content_type.to_string())),
        }
    }

    /// Serialize the content types part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        let _ = write!(xml, r#"<Types xmlns="{}">"#, CONTENT_TYPES_NS);
        for (ext, ct) in &self.defaults {
            let _ = write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(ct)
            );
        }
        for (name, ct) in &self.overrides {
            let _ = write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(name),
                escape_xml(ct)
            );
        }
        xml.push_str("</Types>");
        xml
    }
}

fn absolute_part_name(part_name: &str) -> String {
    if part_name.starts_with('/') {
        part_name.to_string()
    } else {
        format!("/{}", part_name)
    }
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// Once UTF-16 XML has been decoded to a Rust String the declaration still
/// says UTF-16, which makes quick-xml misread the already-decoded text.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode XML bytes handling different encodings (UTF-8, UTF-16 LE/BE).
///
/// Parts written by PowerPoint are UTF-8, but templates that went through
/// other tools sometimes carry UTF-16 parts.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)));
    }

    if bytes.starts_with(&[0xFF, 0xFE]) {
        let content = decode_utf16(&bytes[2..], u16::from_le_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    if bytes.starts_with(&[0xFE, 0xFF]) {
        let content = decode_utf16(&bytes[2..], u16::from_be_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // UTF-16 without BOM: ASCII markup leaves every other byte zero
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                decode_utf16(bytes, u16::from_le_bytes)
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                decode_utf16(bytes, u16::from_be_bytes)
            } else {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// OOXML container abstraction over a ZIP archive.
///
/// Provides methods to read XML parts, binary parts and relationships
/// from an Office Open XML package.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open an OOXML container from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use slidepack::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("template.pptx")?;
    /// # Ok::<(), slidepack::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create an OOXML container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Create an OOXML container from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read an XML part from the archive as a string.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a binary part from the archive.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        let archive = self.archive.borrow();
        let found = archive.file_names().any(|n| n == path);
        found
    }

    /// List all parts in the archive, in archive order, skipping directories.
    pub fn list_files(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        let mut names: Vec<(usize, String)> = Vec::with_capacity(archive.len());
        for name in archive.file_names() {
            if name.ends_with('/') {
                continue;
            }
            let index = archive.index_for_name(name).unwrap_or(usize::MAX);
            names.push((index, name.to_string()));
        }
        names.sort();
        names.into_iter().map(|(_, name)| name).collect()
    }

    /// List parts matching a prefix.
    pub fn list_files_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.list_files()
            .into_iter()
            .filter(|n| n.starts_with(prefix))
            .collect()
    }

    /// Read and parse the relationships of a part.
    ///
    /// A part without a relationships part has an empty collection.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let rels_path = if part_path.is_empty() || part_path == "/" {
            "_rels/.rels".to_string()
        } else {
            rels_path_for(part_path)
        };

        match self.read_xml(&rels_path) {
            Ok(content) => Relationships::parse(&content),
            Err(Error::MissingComponent(_)) => Ok(Relationships::new()),
            Err(e) => Err(e),
        }
    }

    /// Read package-level relationships (_rels/.rels).
    pub fn read_package_relationships(&self) -> Result<Relationships> {
        self.read_relationships("")
    }

    /// Read and parse `[Content_Types].xml`.
    pub fn read_content_types(&self) -> Result<ContentTypes> {
        let xml = self.read_xml(CONTENT_TYPES_PART)?;
        ContentTypes::parse(&xml)
    }

    /// Resolve a relative path from a base path.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        if let Some(stripped) = relative.strip_prefix('/') {
            return stripped.to_string();
        }

        let base_path = Path::new(base);
        let base_dir = base_path.parent().unwrap_or(Path::new(""));

        let mut result = base_dir.to_path_buf();
        for component in Path::new(relative).components() {
            match component {
                std::path::Component::ParentDir => {
                    result.pop();
                }
                std::path::Component::Normal(c) => {
                    result.push(c);
                }
                _ => {}
            }
        }

        result.to_string_lossy().replace('\\', "/")
    }

    /// Relative reference from the part `from` to the part `to`.
    ///
    /// Inverse of [`OoxmlContainer::resolve_path`]:
    /// `relative_target("ppt/slides/slide1.xml", "ppt/media/image1.png")`
    /// is `"../media/image1.png"`.
    pub fn relative_target(from: &str, to: &str) -> String {
        let from_dir: Vec<&str> = match from.rfind('/') {
            Some(i) => from[..i].split('/').collect(),
            None => Vec::new(),
        };
        let to_parts: Vec<&str> = to.split('/').collect();
        let (to_dir, to_file) = to_parts.split_at(to_parts.len() - 1);

        let common = from_dir
            .iter()
            .zip(to_dir.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut segments: Vec<&str> = Vec::new();
        segments.extend(std::iter::repeat("..").take(from_dir.len() - common));
        segments.extend(&to_dir[common..]);
        segments.extend(to_file);
        segments.join("/")
    }
}

/// Path of the relationships part belonging to `part_path`.
///
/// `ppt/slides/slide1.xml` becomes `ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_path_for(part_path: &str) -> String {
    match part_path.rfind('/') {
        Some(last_slash) => {
            let dir = &part_path[..last_slash];
            let file = &part_path[last_slash + 1..];
            format!("{}/_rels/{}.rels", dir, file)
        }
        None => format!("_rels/{}.rels", part_path),
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.list_files().len())
            .finish()
    }
}

/// Writes a set of parts into a new OOXML package.
///
/// `[Content_Types].xml` always goes first; other parts keep the order in
/// which they were added.
#[derive(Debug, Default)]
pub struct PackageWriter {
    parts: Vec<(String, Vec<u8>)>,
}

impl PackageWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a part. A part with the same name replaces the earlier one.
    pub fn add_part(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        let name = name.into();
        let data = data.into();
        match self.parts.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = data,
            None => self.parts.push((name, data)),
        }
    }

    /// Number of parts queued for writing.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether no parts have been added.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Write the package into `writer` and return it.
    pub fn finish<W: Write + Seek>(mut self, writer: W) -> Result<W> {
        if let Some(pos) = self.parts.iter().position(|(n, _)| n == CONTENT_TYPES_PART) {
            let entry = self.parts.remove(pos);
            self.parts.insert(0, entry);
        } else {
            return Err(Error::MissingComponent(CONTENT_TYPES_PART.to_string()));
        }

        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let mut zip = zip::ZipWriter::new(writer);
        for (name, data) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        debug!(parts = self.parts.len(), "Package written");
        Ok(zip.finish()?)
    }

    /// Write the package into a byte vector.
    pub fn to_bytes(self) -> Result<Vec<u8>> {
        let cursor = self.finish(Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }
}
