//! Chapter splitting on generated documents

use folio::operations::{split_chapters, ChapterRange, ChapterSplitter, OperationError, MAX_PATH_LEN};
use folio::{PdfDocument, PdfSource};
use folio_test_suite::sample_pdfs;
use folio_test_suite::utils::write_pdf;
use folio_test_suite::TestPdfBuilder;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn open_sample(dir: &TempDir, name: &str, builder: &TestPdfBuilder) -> PdfDocument {
    let path = write_pdf(dir.path(), name, builder).unwrap();
    PdfDocument::open(path).unwrap()
}

#[test]
fn test_book_outline_levels() {
    let dir = TempDir::new().unwrap();
    let document = open_sample(&dir, "book.pdf", &sample_pdfs::two_chapter_book());

    let outline = document.outline().unwrap();
    let summary: Vec<(u32, &str, i64)> = outline
        .iter()
        .map(|entry| (entry.level, entry.title.as_str(), entry.page))
        .collect();

    assert_eq!(
        summary,
        vec![
            (1, "Chapter 1: Beginnings", 1),
            (2, "Section 1.1", 4),
            (1, "Chapter 2: Endings", 10),
        ]
    );
}

#[test]
fn test_book_chapter_ranges() {
    let dir = TempDir::new().unwrap();
    let document = open_sample(&dir, "book.pdf", &sample_pdfs::two_chapter_book());

    let ranges = ChapterSplitter::new(&document, dir.path()).chapter_ranges().unwrap();

    assert_eq!(
        ranges,
        vec![
            ChapterRange {
                start: 0,
                end: 9,
                title: "Chapter 1 Beginnings".to_string()
            },
            ChapterRange {
                start: 9,
                end: 20,
                title: "Chapter 2 Endings".to_string()
            },
        ]
    );
}

#[test]
fn test_split_book_into_chapter_files() {
    let dir = TempDir::new().unwrap();
    let document = open_sample(&dir, "book.pdf", &sample_pdfs::two_chapter_book());
    let output = dir.path().join("chapters");

    let report = split_chapters(&document, &output).unwrap();

    assert!(report.is_complete());
    assert_eq!(
        report.written,
        vec![
            output.join("Chapter 1 Beginnings.pdf"),
            output.join("Chapter 2 Endings.pdf"),
        ]
    );

    let first = PdfDocument::open(&report.written[0]).unwrap();
    assert_eq!(first.page_count(), 9);
    assert_eq!(first.page_text(0).unwrap(), "Page 1.\n");
    assert_eq!(first.page_text(8).unwrap(), "Page 9.\n");
    assert!(first.outline().unwrap().is_empty());

    let second = PdfDocument::open(&report.written[1]).unwrap();
    assert_eq!(second.page_count(), 11);
    assert_eq!(second.page_text(0).unwrap(), "Page 10.\n");
    assert_eq!(second.page_text(10).unwrap(), "Page 20.\n");
}

#[test]
fn test_chapters_starting_mid_document() {
    let dir = TempDir::new().unwrap();
    let mut builder = TestPdfBuilder::new();
    builder
        .add_numbered_pages(6)
        .add_bookmark(1, "Middle", 3)
        .add_bookmark(1, "Cover", 1)
        .add_bookmark(1, "Title Page", 1);
    let document = open_sample(&dir, "doc.pdf", &builder);

    let report = split_chapters(&document, dir.path()).unwrap();

    // "Title Page" replaces "Cover" on page 1
    assert_eq!(
        report.written,
        vec![dir.path().join("Title Page.pdf"), dir.path().join("Middle.pdf")]
    );
    assert_eq!(PdfDocument::open(&report.written[0]).unwrap().page_count(), 2);
    assert_eq!(PdfDocument::open(&report.written[1]).unwrap().page_count(), 4);
}

#[test]
fn test_entries_without_target_are_ignored() {
    let dir = TempDir::new().unwrap();
    let mut builder = TestPdfBuilder::new();
    builder
        .add_numbered_pages(4)
        .add_bookmark_without_target(1, "Foreword")
        .add_bookmark(1, "Body", 2);
    let document = open_sample(&dir, "doc.pdf", &builder);

    let ranges = ChapterSplitter::new(&document, dir.path()).chapter_ranges().unwrap();

    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].pages(), 1..4);
}

#[test]
fn test_only_untargeted_entries_write_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("chapters");
    let mut builder = TestPdfBuilder::new();
    builder.add_numbered_pages(2).add_bookmark_without_target(1, "Nowhere");
    let document = open_sample(&dir, "doc.pdf", &builder);

    let report = split_chapters(&document, &output).unwrap();

    assert!(report.written.is_empty());
    assert!(report.failures.is_empty());
}

#[test]
fn test_document_without_outline() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("chapters");
    let document = open_sample(&dir, "story.pdf", &sample_pdfs::story());

    let result = split_chapters(&document, &output);

    assert!(matches!(result, Err(OperationError::NoOutline)));
    assert!(!output.exists());
}

#[test]
fn test_long_titles_are_truncated() {
    let dir = TempDir::new().unwrap();
    let title = format!("Chapter {}", "z".repeat(400));
    let mut builder = TestPdfBuilder::new();
    builder.add_numbered_pages(2).add_bookmark(1, &title, 1);
    let document = open_sample(&dir, "doc.pdf", &builder);

    let report = split_chapters(&document, dir.path()).unwrap();

    assert_eq!(report.written.len(), 1);
    let written = &report.written[0];
    assert_eq!(written.to_string_lossy().chars().count(), MAX_PATH_LEN);
    assert_eq!(written.parent(), Some(dir.path()));
    assert!(written.exists());
}

#[test]
fn test_unwritable_output_is_reported_per_chapter() {
    let dir = TempDir::new().unwrap();
    let document = open_sample(&dir, "book.pdf", &sample_pdfs::two_chapter_book());
    let output = dir.path().join("chapters");
    fs::create_dir(&output).unwrap();
    // a folder where the first chapter file should go
    fs::create_dir(output.join("Chapter 1 Beginnings.pdf")).unwrap();

    let report = split_chapters(&document, &output).unwrap();

    assert_eq!(report.written, vec![output.join("Chapter 2 Endings.pdf")]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].title, "Chapter 1 Beginnings");
}
