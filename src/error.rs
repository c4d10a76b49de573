//! Error types for the sticker-cutout crate.

/// Errors that can occur while cutting sheets and exporting stickers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The sheet-generation collaborator failed or returned no image.
    #[error("sheet generation failed: {0}")]
    Generation(String),

    /// No API credential was available for a remote collaborator.
    #[error("missing API credential")]
    MissingCredential,
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
