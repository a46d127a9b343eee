//! Batch processing of PDF files
//!
//! Runs the selected stages (keyword extraction, image extraction, chapter
//! splitting) over one file or every PDF in a folder. Each document gets its
//! own output folder named after the file, and a failing document never
//! stops the others.
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::batch::{BatchInput, BatchProcessor, ProcessOptions};
//! use folio::search::{Direction, SearchOptions};
//! use std::num::NonZeroUsize;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ProcessOptions {
//!     text: Some(SearchOptions::new(
//!         "revenue",
//!         NonZeroUsize::new(3).unwrap(),
//!         Direction::Forward,
//!     )),
//!     images: true,
//!     chapters: false,
//! };
//!
//! let processor = BatchProcessor::new("out", options)?;
//! let summary = processor.execute(&BatchInput::Folder("reports".into()))?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

use crate::document::PdfDocument;
use crate::operations::{self, OperationError, OperationResult};
use crate::search::{self, SearchOptions};
use crate::text::SentenceIndex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

pub mod result;

pub use result::{BatchSummary, JobResult};

/// Name of the image folder inside a document's output folder
pub const IMAGES_DIR: &str = "images";

/// Stages to run on every document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Keyword extraction, when set
    pub text: Option<SearchOptions>,
    /// Image extraction
    pub images: bool,
    /// Chapter splitting
    pub chapters: bool,
}

impl ProcessOptions {
    /// Reject option sets that would do nothing
    pub fn validate(&self) -> OperationResult<()> {
        if self.text.is_none() && !self.images && !self.chapters {
            return Err(OperationError::InvalidInput(
                "select at least one of text extraction, image extraction or chapter splitting"
                    .to_string(),
            ));
        }
        if let Some(text) = &self.text {
            if text.keyword.trim().is_empty() {
                return Err(OperationError::InvalidInput(
                    "a keyword is required for text extraction".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// What to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchInput {
    /// A single PDF file
    File(PathBuf),
    /// Every PDF file directly inside a folder
    Folder(PathBuf),
}

impl BatchInput {
    /// Documents to process, in sorted path order
    pub fn documents(&self) -> OperationResult<Vec<PathBuf>> {
        match self {
            BatchInput::File(path) => {
                if path.as_os_str().is_empty() {
                    return Err(OperationError::InvalidInput("no input file selected".to_string()));
                }
                Ok(vec![path.clone()])
            }
            BatchInput::Folder(dir) => {
                if dir.as_os_str().is_empty() {
                    return Err(OperationError::InvalidInput("no input folder selected".to_string()));
                }
                if !dir.is_dir() {
                    return Err(OperationError::InvalidInput(format!(
                        "{} is not a folder",
                        dir.display()
                    )));
                }

                let mut documents = Vec::new();
                for entry in fs::read_dir(dir)? {
                    let path = entry?.path();
                    if path.is_file() && is_pdf(&path) {
                        documents.push(path);
                    }
                }
                documents.sort();
                Ok(documents)
            }
        }
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Runs the selected stages over a set of documents
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    output_dir: PathBuf,
    options: ProcessOptions,
}

impl BatchProcessor {
    /// Create a processor writing under `output_dir`.
    ///
    /// Fails when no output folder is given or no stage is selected.
    pub fn new(output_dir: impl Into<PathBuf>, options: ProcessOptions) -> OperationResult<Self> {
        let output_dir = output_dir.into();
        if output_dir.as_os_str().is_empty() {
            return Err(OperationError::InvalidInput("no output folder selected".to_string()));
        }
        options.validate()?;
        Ok(Self {
            output_dir,
            options,
        })
    }

    /// Process every document of `input`
    pub fn execute(&self, input: &BatchInput) -> OperationResult<BatchSummary> {
        let documents = input.documents()?;
        if documents.is_empty() {
            warn!("No PDF files found in {:?}", input);
        }

        let start = Instant::now();
        let results: Vec<JobResult> = documents
            .iter()
            .map(|path| self.process_document(path))
            .collect();

        let summary = BatchSummary::from_results(results, start.elapsed());
        info!(
            "Processed {} documents ({} failed)",
            summary.total_jobs, summary.failed
        );
        Ok(summary)
    }

    /// Output folder of a document: `<output_dir>/<file stem>`
    pub fn document_output_dir(&self, path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        self.output_dir.join(stem)
    }

    /// Run every selected stage on one document
    pub fn process_document(&self, path: &Path) -> JobResult {
        let job_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let start = Instant::now();
        info!("Processing {}", path.display());

        let mut output_files = Vec::new();
        let mut warnings = Vec::new();
        match self.run_stages(path, &mut output_files, &mut warnings) {
            Ok(()) => JobResult::Success {
                job_name,
                duration: start.elapsed(),
                output_files,
                warnings,
            },
            Err(e) => {
                warn!("Failed to process {}: {}", path.display(), e);
                JobResult::Failed {
                    job_name,
                    duration: start.elapsed(),
                    error: e.to_string(),
                }
            }
        }
    }

    fn run_stages(
        &self,
        path: &Path,
        output_files: &mut Vec<PathBuf>,
        warnings: &mut Vec<String>,
    ) -> OperationResult<()> {
        let document = PdfDocument::open(path)?;
        let output_dir = self.document_output_dir(path);
        fs::create_dir_all(&output_dir)?;
        debug!("Writing results to {}", output_dir.display());

        if let Some(text) = &self.options.text {
            let index = SentenceIndex::from_source(&document);
            let results = search::search(&index, text);
            match search::write_report(&results, &output_dir)? {
                Some(report) => output_files.push(report),
                None => warnings.push(format!("No matches for keyword '{}'", text.keyword)),
            }
        }

        if self.options.images {
            let images = operations::extract_images(&document, &output_dir.join(IMAGES_DIR))?;
            output_files.extend(images.into_iter().map(|image| image.file_path));
        }

        if self.options.chapters {
            match operations::split_chapters(&document, &output_dir) {
                Ok(report) => {
                    output_files.extend(report.written);
                    warnings.extend(report.failures.iter().map(ToString::to_string));
                }
                Err(e) if e.is_structural() => {
                    warn!("{}: {}", path.display(), e);
                    warnings.push(e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

/// Process `input` with `options`, writing under `output_dir`
pub fn process_pdfs(
    input: &BatchInput,
    output_dir: &Path,
    options: ProcessOptions,
) -> OperationResult<BatchSummary> {
    BatchProcessor::new(output_dir, options)?.execute(input)
}
