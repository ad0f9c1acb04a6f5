//! Error types for the slidepack library.

use std::io;
use thiserror::Error;

/// Result type alias for slidepack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, editing or saving a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format could not be determined.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but is not a presentation.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading or writing the ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing or writing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data in the package.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required package part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// No slide layout with the given name exists in the template.
    #[error("Slide layout not found: {0}")]
    LayoutNotFound(String),

    /// No slide with the given id exists in the presentation.
    #[error("Slide not found: {0}")]
    SlideNotFound(u32),

    /// The slide has no placeholder with the given idx.
    #[error("Placeholder not found: idx {0}")]
    PlaceholderNotFound(u32),

    /// A title was provided but the layout has no title placeholder.
    #[error("Title provided but no title placeholder exists")]
    TitleWithoutPlaceholder,

    /// More body texts were provided than the layout has body placeholders.
    #[error("Body: {provided} strings provided, {available} placeholders exist")]
    TooManyBodies { provided: usize, available: usize },

    /// More pictures were provided than the layout has picture placeholders.
    #[error("Pictures: {provided} provided, but {available} placeholders exist")]
    TooManyPictures { provided: usize, available: usize },

    /// A picture could not be read or measured.
    #[error("Image error: {0}")]
    Image(String),

    /// A deck plan is malformed.
    #[error("Deck plan error: {0}")]
    Plan(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownFormat;
        assert_eq!(err.to_string(), "Unknown file format");

        let err = Error::TooManyBodies {
            provided: 3,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Body: 3 strings provided, 2 placeholders exist"
        );

        let err = Error::LayoutNotFound("title_only".to_string());
        assert_eq!(err.to_string(), "Slide layout not found: title_only");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
