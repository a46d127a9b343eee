//! Chapter splitting
//!
//! Splits a document into one file per top-level outline entry. Each chapter
//! runs from the page its entry points at up to the page before the next
//! chapter; the last chapter runs to the end of the document.

use super::{OperationError, OperationResult};
use crate::document::PdfSource;
use crate::outline::OutlineEntry;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Longest chapter file path, in characters, before the title is truncated
pub const MAX_PATH_LEN: usize = 255;

/// Keep only alphanumeric characters, spaces, underscores and hyphens.
///
/// Different titles may sanitize to the same name; the resulting files then
/// overwrite each other.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect()
}

/// Output path of a chapter file.
///
/// When `<output_dir>/<title>.pdf` exceeds [`MAX_PATH_LEN`] characters the
/// title is shortened until it fits. The directory is never shortened.
pub fn chapter_path(output_dir: &Path, title: &str) -> PathBuf {
    let path = output_dir.join(format!("{title}.pdf"));
    let length = path.to_string_lossy().chars().count();
    if length <= MAX_PATH_LEN {
        return path;
    }

    let keep = title.chars().count().saturating_sub(length - MAX_PATH_LEN);
    let truncated: String = title.chars().take(keep).collect();
    output_dir.join(format!("{truncated}.pdf"))
}

/// Sanitized chapter titles keyed by target page (1-based).
///
/// Insertion is last-write-wins: when two top-level entries point at the same
/// page, the one later in the outline names the chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterMap {
    titles: BTreeMap<usize, String>,
}

impl ChapterMap {
    /// Collect the top-level entries of an outline.
    ///
    /// Entries without a page target are skipped. Fails with
    /// [`OperationError::NoOutline`] for an empty outline and
    /// [`OperationError::NoTopLevelEntries`] when no entry is at level 1.
    pub fn from_outline(outline: &[OutlineEntry]) -> OperationResult<Self> {
        if outline.is_empty() {
            return Err(OperationError::NoOutline);
        }

        let mut top_level = outline.iter().filter(|entry| entry.is_top_level()).peekable();
        if top_level.peek().is_none() {
            return Err(OperationError::NoTopLevelEntries);
        }

        let mut map = Self::default();
        for entry in top_level {
            match entry.target_page() {
                Some(page) => {
                    if let Some(previous) = map.insert(page, sanitize_title(&entry.title)) {
                        debug!("Chapter '{}' on page {} replaced by '{}'", previous, page, entry.title);
                    }
                }
                None => debug!("Skipping chapter '{}' without a page target", entry.title),
            }
        }
        Ok(map)
    }

    /// Record a chapter, returning the title it replaced
    pub fn insert(&mut self, page: usize, title: impl Into<String>) -> Option<String> {
        self.titles.insert(page, title.into())
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// `(page, title)` pairs by ascending page
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.titles.iter().map(|(&page, title)| (page, title.as_str()))
    }

    /// Page ranges of the chapters in a document of `page_count` pages
    pub fn ranges(&self, page_count: usize) -> Vec<ChapterRange> {
        let pages: Vec<(usize, &str)> = self.iter().collect();

        pages
            .iter()
            .enumerate()
            .map(|(k, &(page, title))| {
                let end = match pages.get(k + 1) {
                    Some(&(next, _)) => next.saturating_sub(1),
                    None => page_count,
                };
                ChapterRange {
                    start: page.saturating_sub(1),
                    end,
                    title: title.to_string(),
                }
            })
            .collect()
    }
}

/// Pages of one chapter, 0-based, `start` inclusive and `end` exclusive
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChapterRange {
    pub start: usize,
    pub end: usize,
    /// Sanitized title, used as the file name
    pub title: String,
}

impl ChapterRange {
    pub fn pages(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A chapter that could not be written
#[derive(Debug)]
pub struct ChapterFailure {
    pub title: String,
    pub path: PathBuf,
    pub error: OperationError,
}

impl fmt::Display for ChapterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to save chapter '{}': {}", self.title, self.error)
    }
}

/// Outcome of splitting a document into chapters
#[derive(Debug, Default)]
pub struct SplitReport {
    /// Written chapter files in page order
    pub written: Vec<PathBuf>,
    pub failures: Vec<ChapterFailure>,
}

impl SplitReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Splits a document into chapter files
pub struct ChapterSplitter<'a, S: PdfSource + ?Sized> {
    source: &'a S,
    output_dir: PathBuf,
}

impl<'a, S: PdfSource + ?Sized> ChapterSplitter<'a, S> {
    pub fn new(source: &'a S, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            output_dir: output_dir.into(),
        }
    }

    /// Chapter ranges derived from the document outline
    pub fn chapter_ranges(&self) -> OperationResult<Vec<ChapterRange>> {
        let outline = self.source.outline()?;
        let map = ChapterMap::from_outline(&outline)?;
        Ok(map.ranges(self.source.page_count()))
    }

    /// Write every chapter to `<output_dir>/<title>.pdf`.
    ///
    /// Outline problems fail the whole split before anything is written. A
    /// chapter that cannot be written is recorded in the report and the
    /// remaining chapters are still processed.
    pub fn split(&self) -> OperationResult<SplitReport> {
        let ranges = self.chapter_ranges()?;
        if ranges.is_empty() {
            warn!("No top-level outline entry has a page target, nothing to split");
            return Ok(SplitReport::default());
        }

        fs::create_dir_all(&self.output_dir)?;
        let mut report = SplitReport::default();

        for range in ranges {
            let path = chapter_path(&self.output_dir, &range.title);
            match self.write_chapter(&range, &path) {
                Ok(()) => {
                    info!(
                        "Wrote chapter '{}' (pages {}-{}) to {}",
                        range.title,
                        range.start + 1,
                        range.end,
                        path.display()
                    );
                    report.written.push(path);
                }
                Err(error) => {
                    warn!("Failed to save chapter '{}': {}", range.title, error);
                    report.failures.push(ChapterFailure {
                        title: range.title,
                        path,
                        error,
                    });
                }
            }
        }

        Ok(report)
    }

    fn write_chapter(&self, range: &ChapterRange, path: &Path) -> OperationResult<()> {
        let pages = range.start..range.end.min(self.source.page_count());
        if pages.is_empty() {
            return Err(OperationError::NoPagesToProcess);
        }

        let mut assembly = self.source.new_assembly();
        for page_index in pages {
            assembly.append_page(page_index)?;
        }
        debug!("Assembled {} pages for '{}'", assembly.page_count(), range.title);
        assembly.save(path)?;
        Ok(())
    }
}

/// Split `source` into chapter files under `output_dir`
pub fn split_chapters<S: PdfSource + ?Sized>(
    source: &S,
    output_dir: &Path,
) -> OperationResult<SplitReport> {
    ChapterSplitter::new(source, output_dir).split()
}
