//! Document operations
//!
//! Operations that produce files from an open document: splitting it into
//! chapter files along its outline, and extracting its embedded images.

pub mod chapters;
pub mod extract_images;

pub use chapters::{
    chapter_path, sanitize_title, split_chapters, ChapterFailure, ChapterMap, ChapterRange,
    ChapterSplitter, SplitReport, MAX_PATH_LEN,
};
pub use extract_images::{
    extract_images, image_file_name, ExtractImagesOptions, ExtractedImage, ImageExtractor,
};

use crate::error::FolioError;

/// Result type for operations
pub type OperationResult<T> = Result<T, OperationError>;

/// Operation-specific errors
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// The document has no outline
    #[error("No outline found in the document")]
    NoOutline,

    /// The outline has no level 1 entries
    #[error("The outline has no top-level entries")]
    NoTopLevelEntries,

    /// Rejected before any processing started
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A page range selected no pages of the document
    #[error("No pages to process")]
    NoPagesToProcess,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document access error
    #[error("PDF error: {0}")]
    Pdf(#[from] FolioError),
}

impl OperationError {
    /// Whether the error describes the document's structure rather than a
    /// failure. Such errors are reported to the user as warnings.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            OperationError::NoOutline | OperationError::NoTopLevelEntries
        )
    }
}
