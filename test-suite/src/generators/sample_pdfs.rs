//! Sample PDF Generators
//!
//! Ready-made documents shared by the integration tests of the core library
//! and the command line tool.

use super::test_pdf_builder::{TestImage, TestPdfBuilder};
use anyhow::Result;
use std::fs;
use std::path::Path;

/// Bytes that start like a JPEG file
pub const JPEG_STUB: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0xFF, 0xD9];

/// A 20 page book with chapters starting on pages 1 and 10 and a nested
/// section in the first chapter
pub fn two_chapter_book() -> TestPdfBuilder {
    let mut builder = TestPdfBuilder::new().with_title("Two Chapter Book");
    builder
        .add_numbered_pages(20)
        .add_bookmark(1, "Chapter 1: Beginnings", 1)
        .add_bookmark(2, "Section 1.1", 4)
        .add_bookmark(1, "Chapter 2: Endings", 10);
    builder
}

/// A short story spread over three pages, without an outline
pub fn story() -> TestPdfBuilder {
    let mut builder = TestPdfBuilder::new().with_title("Story");
    builder
        .add_text_page("Hello Mr. Smith. He left the house early. The U.S. flag waved.")
        .add_text_page("It was cold. Nobody saw him leave? The dog did.")
        .add_text_page("He never came back. The end");
    builder
}

/// Three pages of images: a JPEG and a gray image, an undecodable JBIG2
/// image, and an RGB image
pub fn image_gallery() -> TestPdfBuilder {
    let mut builder = TestPdfBuilder::new().with_title("Gallery");
    builder
        .add_image_page(vec![
            TestImage::jpeg(4, 4, JPEG_STUB),
            TestImage::gray(8, 8, 0x80),
        ])
        .add_image_page(vec![TestImage::Jbig2 { width: 8, height: 8 }])
        .add_image_page(vec![TestImage::rgb(3, 2, [255, 0, 0])]);
    builder
}

/// Generate all sample PDFs into `output_dir`
pub fn generate_all<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    two_chapter_book().save(output_dir.join("two_chapter_book.pdf"))?;
    story().save(output_dir.join("story.pdf"))?;
    image_gallery().save(output_dir.join("image_gallery.pdf"))?;

    Ok(())
}
