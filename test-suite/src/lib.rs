//! Test Suite for folio
//!
//! Generates PDF documents with known text, outlines and images for the
//! integration tests of the library and the command line tool.

pub mod generators;

pub use generators::{sample_pdfs, PdfVersion, TestImage, TestPdfBuilder};

/// Common test utilities
pub mod utils {
    use super::TestPdfBuilder;
    use std::path::{Path, PathBuf};

    /// Write `builder` to `<dir>/<name>` and return the path
    pub fn write_pdf(dir: &Path, name: &str, builder: &TestPdfBuilder) -> anyhow::Result<PathBuf> {
        let path = dir.join(name);
        builder.save(&path)?;
        Ok(path)
    }
}
