//! Format detection for Office Open XML packages.
//!
//! Only presentations can serve as templates, but Word and Excel packages are
//! recognized too so that the error says what the file actually is.

use crate::container::{decode_xml_bytes, CONTENT_TYPES_PART};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Content type for DOCX main document part.
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Content type for XLSX workbook part.
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Content type for PPTX presentation part.
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Content type for POTX template presentation part.
const POTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";

/// Content type for PPTM macro-enabled presentation part.
const PPTM_CONTENT_TYPE: &str = "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";

/// Detected Office package format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// PowerPoint presentation (.pptx)
    Pptx,
    /// PowerPoint template (.potx)
    Potx,
    /// Macro-enabled PowerPoint presentation (.pptm)
    Pptm,
    /// Word document (.docx)
    Docx,
    /// Excel workbook (.xlsx)
    Xlsx,
}

impl FormatType {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Pptx => "pptx",
            FormatType::Potx => "potx",
            FormatType::Pptm => "pptm",
            FormatType::Docx => "docx",
            FormatType::Xlsx => "xlsx",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Pptx => "PowerPoint Presentation",
            FormatType::Potx => "PowerPoint Template",
            FormatType::Pptm => "PowerPoint Macro-Enabled Presentation",
            FormatType::Docx => "Word Document",
            FormatType::Xlsx => "Excel Workbook",
        }
    }

    /// Whether slides can be added to a package of this format.
    pub fn is_presentation(&self) -> bool {
        matches!(self, FormatType::Pptx | FormatType::Potx | FormatType::Pptm)
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the format type from a file path.
///
/// # Example
///
/// ```no_run
/// use slidepack::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("template.pptx")?;
/// println!("Detected format: {}", format);
/// # Ok::<(), slidepack::Error>(())
/// ```
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    detect_format_from_reader(reader)
}

/// Detect the format type from a byte slice.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }

    detect_format_from_reader(std::io::Cursor::new(data))
}

/// Detect the format type from a reader.
pub fn detect_format_from_reader<R: Read + Seek>(reader: R) -> Result<FormatType> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name(CONTENT_TYPES_PART) {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            decode_xml_bytes(&bytes)?
        }
        Err(_) => {
            return Err(Error::MissingComponent(CONTENT_TYPES_PART.to_string()));
        }
    };

    if content_types.contains(PPTX_CONTENT_TYPE) {
        Ok(FormatType::Pptx)
    } else if content_types.contains(POTX_CONTENT_TYPE) {
        Ok(FormatType::Potx)
    } else if content_types.contains(PPTM_CONTENT_TYPE) {
        Ok(FormatType::Pptm)
    } else if content_types.contains(DOCX_CONTENT_TYPE) {
        Ok(FormatType::Docx)
    } else if content_types.contains(XLSX_CONTENT_TYPE) {
        Ok(FormatType::Xlsx)
    } else {
        detect_by_folder_structure(&mut archive)
    }
}

/// Check that a package can be used as a slide template.
pub fn ensure_presentation(data: &[u8]) -> Result<FormatType> {
    let format = detect_format_from_bytes(data)?;
    if format.is_presentation() {
        Ok(format)
    } else {
        Err(Error::UnsupportedFormat(format!(
            "{} is not a presentation",
            format
        )))
    }
}

/// Fallback detection by checking folder structure.
fn detect_by_folder_structure<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<FormatType> {
    let names: Vec<String> = archive.file_names().map(String::from).collect();

    let has_word = names.iter().any(|n| n.starts_with("word/"));
    let has_xl = names.iter().any(|n| n.starts_with("xl/"));
    let has_ppt = names.iter().any(|n| n.starts_with("ppt/"));

    match (has_word, has_xl, has_ppt) {
        (false, false, true) => Ok(FormatType::Pptx),
        (true, false, false) => Ok(FormatType::Docx),
        (false, true, false) => Ok(FormatType::Xlsx),
        _ => Err(Error::UnknownFormat),
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}
