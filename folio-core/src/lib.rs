//! # folio
//!
//! Post-processing for PDF documents: keyword search with sentence context,
//! chapter splitting along the document outline, and image extraction.
//!
//! ## Features
//!
//! - **Sentence Indexing**: Split page text into globally numbered sentences that remember their page
//! - **Keyword Search**: Case-insensitive search returning a window of sentences around every match
//! - **Chapter Splitting**: One PDF per top-level outline entry
//! - **Image Extraction**: Write embedded images to JPEG, JPEG 2000 or PNG files
//! - **Batch Processing**: Run any of the above over a folder of PDFs
//!
//! ## Quick Start
//!
//! ### Searching a document
//!
//! ```rust,no_run
//! use folio::search::{search, Direction, SearchOptions};
//! use folio::{PdfDocument, SentenceIndex};
//! use std::num::NonZeroUsize;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = PdfDocument::open("report.pdf")?;
//! let index = SentenceIndex::from_source(&document);
//!
//! let options = SearchOptions::new("revenue", NonZeroUsize::new(3).unwrap(), Direction::Forward);
//! for result in search(&index, &options) {
//!     println!("{result}\n");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Splitting into chapters
//!
//! ```rust,no_run
//! use folio::operations::split_chapters;
//! use folio::PdfDocument;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = PdfDocument::open("book.pdf")?;
//! let report = split_chapters(&document, Path::new("chapters"))?;
//!
//! for failure in &report.failures {
//!     eprintln!("{failure}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod document;
pub mod error;
pub mod operations;
pub mod outline;
pub mod search;
pub mod text;

// Re-export commonly used types
pub use document::{DecodedImage, ImageFormat, ImageRef, PageAssembly, PdfDocument, PdfSource};
pub use error::{FolioError, Result};
pub use operations::{split_chapters, OperationError, OperationResult};
pub use outline::OutlineEntry;
pub use search::{Direction, SearchOptions, SearchResult};
pub use text::{SentenceIndex, SentencePageMap};

/// Current version of folio
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
