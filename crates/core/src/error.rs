//! Error types for deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a deck.
///
/// Only [`Error::UnrenderableInput`] is meant to reach the end user as a
/// failed request. [`Error::ExtractionError`] is recovered by substituting
/// the placeholder deck, and the container variants only surface when an
/// uploaded template cannot be read at all.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The request carried no input text.
    #[error("Nothing to render: {0}")]
    UnrenderableInput(String),

    /// Generator output contained no parseable slide records.
    #[error("Could not extract slides from generator output: {0}")]
    ExtractionError(String),

    /// The template format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to parse the PPTX package structure.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// The package is readable but structurally unusable for this operation.
    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    /// Invalid or corrupted file.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error.
    #[error("XML parsing error: {0}")]
    XmlError(String),
}
