//! Sentence indexing
//!
//! Splits the text of every page into sentences and numbers them globally in
//! reading order, remembering which page each sentence came from.
//!
//! The boundary rule is a heuristic: a sentence ends at a whitespace character
//! preceded by `.` or `?`, unless the period closes an abbreviation such as
//! "U.S." (word character, period, word character, terminal mark) or "Mr."
//! (capital letter, lowercase letter, period). Other abbreviations are split.

use crate::document::PdfSource;
use tracing::{debug, warn};

/// Split `text` into sentences.
///
/// The whitespace character that ends a sentence is dropped; any further
/// whitespace stays at the start of the next sentence. Blank fragments are
/// skipped, so empty text yields no sentences and text without terminal
/// punctuation yields a single sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;

    for (pos, &(offset, c)) in chars.iter().enumerate() {
        if c.is_whitespace() && is_boundary(&chars, pos) {
            push_fragment(&mut sentences, &text[start..offset]);
            start = offset + c.len_utf8();
        }
    }
    push_fragment(&mut sentences, &text[start..]);

    sentences
}

fn push_fragment<'a>(sentences: &mut Vec<&'a str>, fragment: &'a str) {
    if !fragment.trim().is_empty() {
        sentences.push(fragment);
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether the whitespace at `pos` ends a sentence
fn is_boundary(chars: &[(usize, char)], pos: usize) -> bool {
    let before = |n: usize| pos.checked_sub(n).map(|i| chars[i].1);

    if !matches!(before(1), Some('.') | Some('?')) {
        return false;
    }
    if let (Some(a), Some('.'), Some(b)) = (before(4), before(3), before(2)) {
        if is_word(a) && is_word(b) {
            return false;
        }
    }
    if let (Some(a), Some(b), Some('.')) = (before(3), before(2), before(1)) {
        if a.is_ascii_uppercase() && b.is_ascii_lowercase() {
            return false;
        }
    }
    true
}

/// Page of every sentence, keyed by global sentence index.
///
/// Holds exactly one entry per indexed sentence and is never modified after
/// indexing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentencePageMap {
    pages: Vec<usize>,
}

impl SentencePageMap {
    /// Page number (1-based) of the sentence at `index`
    pub fn page_of(&self, index: usize) -> Option<usize> {
        self.pages.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// `(sentence index, page number)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pages.iter().copied().enumerate()
    }
}

/// A sentence together with its position in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    /// Global index, 0-based, in reading order
    pub index: usize,
    /// Page number, 1-based
    pub page: usize,
    pub text: &'a str,
}

/// Every sentence of a document in reading order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceIndex {
    sentences: Vec<String>,
    page_map: SentencePageMap,
}

impl SentenceIndex {
    /// Index the given page texts, the first being page 1
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        pages
            .into_iter()
            .enumerate()
            .fold(IndexAccumulator::default(), |acc, (page_index, text)| {
                acc.push_page(page_index + 1, text.as_ref())
            })
            .finish()
    }

    /// Index every page of a document.
    ///
    /// A page whose text cannot be extracted contributes no sentences.
    pub fn from_source<S: PdfSource + ?Sized>(source: &S) -> Self {
        let page_count = source.page_count();
        let index = (0..page_count)
            .fold(IndexAccumulator::default(), |acc, page_index| {
                match source.page_text(page_index) {
                    Ok(text) => acc.push_page(page_index + 1, &text),
                    Err(e) => {
                        warn!("No text for page {}: {}", page_index + 1, e);
                        acc
                    }
                }
            })
            .finish();

        debug!("Indexed {} sentences over {} pages", index.len(), page_count);
        index
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn page_map(&self) -> &SentencePageMap {
        &self.page_map
    }

    /// Sentence texts in reading order
    pub fn texts(&self) -> &[String] {
        &self.sentences
    }

    pub fn get(&self, index: usize) -> Option<Sentence<'_>> {
        let text = self.sentences.get(index)?;
        Some(Sentence {
            index,
            page: self.page_map.page_of(index)?,
            text,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Sentence<'_>> + '_ {
        self.sentences
            .iter()
            .zip(self.page_map.pages.iter())
            .enumerate()
            .map(|(index, (text, &page))| Sentence { index, page, text })
    }
}

/// Running state while folding over pages
#[derive(Default)]
struct IndexAccumulator {
    sentences: Vec<String>,
    pages: Vec<usize>,
}

impl IndexAccumulator {
    fn push_page(mut self, page_number: usize, text: &str) -> Self {
        for sentence in split_sentences(text) {
            self.sentences.push(sentence.to_string());
            self.pages.push(page_number);
        }
        self
    }

    fn finish(self) -> SentenceIndex {
        SentenceIndex {
            sentences: self.sentences,
            page_map: SentencePageMap { pages: self.pages },
        }
    }
}
