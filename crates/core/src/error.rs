//! Error types for document-to-deck conversion.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a document into a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The source document could not be opened or parsed.
    #[error("Failed to open document: {0}")]
    DocumentOpenError(String),

    /// The presentation template could not be opened or parsed.
    #[error("Failed to open template: {0}")]
    TemplateOpenError(String),

    /// The outline generator call failed (transport, API, or empty response).
    #[error("Outline generation failed: {0}")]
    GenerationError(String),

    /// The generator's output was not a usable outline structure.
    #[error("Outline format error: {0}")]
    OutlineFormatError(String),

    /// Failed to build or write the output deck.
    #[error("Deck build error: {0}")]
    DeckError(String),

    /// ZIP archive error (for DOCX/PPTX containers).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for DOCX/PPTX parts).
    #[error("XML parsing error: {0}")]
    XmlError(String),
}
