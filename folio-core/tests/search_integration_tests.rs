//! Sentence indexing and keyword search on generated documents

use folio::search::{render_report, search, write_report, Direction, SearchOptions, REPORT_FILE_NAME};
use folio::{PdfDocument, PdfSource, SentenceIndex};
use folio_test_suite::sample_pdfs;
use folio_test_suite::TestPdfBuilder;
use pretty_assertions::assert_eq;
use std::fs;
use std::num::NonZeroUsize;
use tempfile::TempDir;

fn window(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn open(builder: &TestPdfBuilder) -> PdfDocument {
    let bytes = builder.build().unwrap();
    PdfDocument::from_document(lopdf::Document::load_mem(&bytes).unwrap())
}

#[test]
fn test_story_sentences_keep_their_pages() {
    let document = open(&sample_pdfs::story());
    let index = SentenceIndex::from_source(&document);

    assert_eq!(
        index.texts(),
        &[
            "Hello Mr. Smith.",
            "He left the house early.",
            "The U.S. flag waved.",
            "It was cold.",
            "Nobody saw him leave?",
            "The dog did.",
            "He never came back.",
            "The end\n",
        ]
    );
    assert_eq!(
        index.page_map().iter().map(|(_, page)| page).collect::<Vec<_>>(),
        vec![1, 1, 1, 2, 2, 2, 3, 3]
    );
}

#[test]
fn test_empty_pages_contribute_nothing() {
    let mut builder = TestPdfBuilder::new();
    builder
        .add_empty_page()
        .add_text_page("Only sentence.")
        .add_empty_page();
    let document = open(&builder);

    let index = SentenceIndex::from_source(&document);

    assert_eq!(document.page_count(), 3);
    assert_eq!(index.len(), 1);
    assert_eq!(index.page_map().page_of(0), Some(2));
}

#[test]
fn test_sentences_span_lines_of_a_page() {
    let mut builder = TestPdfBuilder::new();
    builder.add_text_page("The meeting started late\nbecause of traffic. Everyone waited.");
    let document = open(&builder);

    let index = SentenceIndex::from_source(&document);

    assert_eq!(
        index.texts(),
        &["The meeting started late\nbecause of traffic.", "Everyone waited."]
    );
}

#[test]
fn test_forward_search_on_document() {
    let document = open(&sample_pdfs::story());
    let index = SentenceIndex::from_source(&document);

    let results = search(&index, &SearchOptions::new("he", window(2), Direction::Forward));

    // "he" also matches inside "the" and "Hello"
    assert_eq!(
        results.iter().map(|r| r.sentence_index).collect::<Vec<_>>(),
        vec![0, 1, 2, 5, 6, 7]
    );
    assert_eq!(results[4].text, "He never came back. The end\n");
    assert_eq!(results[5].text, "The end\n");
    assert_eq!(results[5].page, 3);
}

#[test]
fn test_backward_search_crosses_pages() {
    let document = open(&sample_pdfs::story());
    let index = SentenceIndex::from_source(&document);

    let results = search(&index, &SearchOptions::new("cold", window(3), Direction::Backward));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].page, 2);
    assert_eq!(
        results[0].text,
        "He left the house early. The U.S. flag waved. It was cold."
    );
}

#[test]
fn test_search_is_repeatable() {
    let document = open(&sample_pdfs::story());
    let options = SearchOptions::new("the", window(4), Direction::Backward);

    let first = search(&SentenceIndex::from_source(&document), &options);
    let second = search(&SentenceIndex::from_source(&document), &options);

    assert_eq!(first, second);
}

#[test]
fn test_report_written_for_document() {
    let dir = TempDir::new().unwrap();
    let document = open(&sample_pdfs::story());
    let index = SentenceIndex::from_source(&document);
    let results = search(&index, &SearchOptions::new("dog", window(1), Direction::Forward));

    let path = write_report(&results, dir.path()).unwrap().unwrap();

    assert_eq!(path, dir.path().join(REPORT_FILE_NAME));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Keyword found on Page 2, Sentence 6:\nThe dog did."
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), render_report(&results));
}

#[test]
fn test_no_match_leaves_output_untouched() {
    let dir = TempDir::new().unwrap();
    let document = open(&sample_pdfs::story());
    let index = SentenceIndex::from_source(&document);
    let results = search(&index, &SearchOptions::new("dragon", window(5), Direction::Forward));

    assert_eq!(write_report(&results, dir.path()).unwrap(), None);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
