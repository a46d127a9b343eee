//! Keyword search with sentence context
//!
//! Finds every sentence containing a keyword (case-insensitive substring) and
//! returns a window of neighbouring sentences around it, looking either
//! forward or backward from the match.

use crate::text::SentenceIndex;
use std::fmt;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// File name of the written search report
pub const REPORT_FILE_NAME: &str = "extracted_text.txt";

/// Which side of the matched sentence the window extends to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// The match and the sentences after it
    #[default]
    Forward,
    /// The sentences before the match, ending with the match
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown direction '{0}' (expected 'forward' or 'backward')")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Direction::Forward),
            "backward" => Ok(Direction::Backward),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Parameters of a keyword search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub keyword: String,
    /// Number of sentences in each window, the match included
    pub window: NonZeroUsize,
    pub direction: Direction,
}

impl SearchOptions {
    pub fn new(keyword: impl Into<String>, window: NonZeroUsize, direction: Direction) -> Self {
        Self {
            keyword: keyword.into(),
            window,
            direction,
        }
    }
}

/// A keyword match and its context window
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchResult {
    /// Page of the matched sentence (1-based)
    pub page: usize,
    /// Global index of the matched sentence (0-based)
    pub sentence_index: usize,
    /// Window sentences joined with single spaces
    pub text: String,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Keyword found on Page {}, Sentence {}:\n{}",
            self.page,
            self.sentence_index + 1,
            self.text
        )
    }
}

/// Search the indexed sentences for `options.keyword`.
///
/// Results are in ascending sentence order. Overlapping windows of nearby
/// matches are all reported.
pub fn search(index: &SentenceIndex, options: &SearchOptions) -> Vec<SearchResult> {
    let keyword = options.keyword.to_lowercase();
    let sentences = index.texts();
    let window = options.window.get();

    let results: Vec<SearchResult> = sentences
        .iter()
        .enumerate()
        .filter(|(_, sentence)| sentence.to_lowercase().contains(&keyword))
        .map(|(i, _)| {
            let range = match options.direction {
                Direction::Forward => i..i.saturating_add(window).min(sentences.len()),
                Direction::Backward => (i + 1).saturating_sub(window)..i + 1,
            };
            SearchResult {
                page: index.page_map().page_of(i).unwrap_or(1),
                sentence_index: i,
                text: sentences[range].join(" "),
            }
        })
        .collect();

    debug!(
        "Found {} matches for '{}' among {} sentences",
        results.len(),
        options.keyword,
        sentences.len()
    );
    results
}

/// Render results as report blocks separated by a blank line
pub fn render_report(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Write the report to `extracted_text.txt` in `output_dir`.
///
/// Nothing is written when there are no results; `None` is returned instead.
pub fn write_report(results: &[SearchResult], output_dir: &Path) -> std::io::Result<Option<PathBuf>> {
    if results.is_empty() {
        return Ok(None);
    }

    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(REPORT_FILE_NAME);
    fs::write(&path, render_report(results))?;

    info!("Wrote {} matches to {}", results.len(), path.display());
    Ok(Some(path))
}
