//! Generate Test PDFs
//!
//! Writes the sample documents to a folder for trying the command line tool
//! by hand.

use anyhow::Result;
use folio_test_suite::generators::sample_pdfs;
use std::path::PathBuf;

fn main() -> Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures"));

    println!("Generating sample PDFs in {}...", output_dir.display());
    sample_pdfs::generate_all(&output_dir)?;
    println!("Sample PDF generation complete!");
    Ok(())
}
