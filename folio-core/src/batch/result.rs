//! Results and summaries for batch processing

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Result of processing one document
#[derive(Debug, Clone)]
pub enum JobResult {
    /// Every selected stage ran
    Success {
        job_name: String,
        duration: Duration,
        output_files: Vec<PathBuf>,
        /// Non-fatal conditions, such as a missing outline
        warnings: Vec<String>,
    },

    /// The document could not be processed
    Failed {
        job_name: String,
        duration: Duration,
        error: String,
    },
}

impl JobResult {
    /// Check if the job was successful
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success { .. })
    }

    /// Check if the job failed
    pub fn is_failed(&self) -> bool {
        matches!(self, JobResult::Failed { .. })
    }

    /// Get the job name
    pub fn job_name(&self) -> &str {
        match self {
            JobResult::Success { job_name, .. } | JobResult::Failed { job_name, .. } => job_name,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            JobResult::Success { duration, .. } | JobResult::Failed { duration, .. } => *duration,
        }
    }

    /// Get error message (if failed)
    pub fn error(&self) -> Option<&str> {
        match self {
            JobResult::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Get output files (if successful)
    pub fn output_files(&self) -> Option<&[PathBuf]> {
        match self {
            JobResult::Success { output_files, .. } => Some(output_files),
            _ => None,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            JobResult::Success { warnings, .. } => warnings,
            JobResult::Failed { .. } => &[],
        }
    }
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobResult::Success {
                job_name,
                duration,
                output_files,
                warnings,
            } => {
                write!(
                    f,
                    "✓ {} - completed in {:.2}s ({} files",
                    job_name,
                    duration.as_secs_f64(),
                    output_files.len()
                )?;
                match warnings.len() {
                    0 => write!(f, ")"),
                    1 => write!(f, ", 1 warning)"),
                    n => write!(f, ", {n} warnings)"),
                }
            }
            JobResult::Failed {
                job_name,
                duration,
                error,
            } => {
                write!(
                    f,
                    "✗ {job_name} - failed after {:.2}s: {error}",
                    duration.as_secs_f64()
                )
            }
        }
    }
}

/// Summary of a batch run
#[derive(Debug)]
pub struct BatchSummary {
    /// Total number of documents
    pub total_jobs: usize,
    /// Number of documents processed
    pub successful: usize,
    /// Number of documents that failed
    pub failed: usize,
    /// Total duration
    pub duration: Duration,
    /// Individual results in processing order
    pub results: Vec<JobResult>,
}

impl BatchSummary {
    /// Create an empty summary
    pub fn empty() -> Self {
        Self::from_results(Vec::new(), Duration::from_secs(0))
    }

    pub fn from_results(results: Vec<JobResult>, duration: Duration) -> Self {
        let successful = results.iter().filter(|r| r.is_success()).count();
        Self {
            total_jobs: results.len(),
            successful,
            failed: results.len() - successful,
            duration,
            results,
        }
    }

    /// Check if all documents were processed
    pub fn all_successful(&self) -> bool {
        self.failed == 0
    }

    /// Get all output files
    pub fn output_files(&self) -> Vec<&PathBuf> {
        self.results
            .iter()
            .filter_map(|r| r.output_files())
            .flatten()
            .collect()
    }

    /// `(document, warning)` pairs of every processed document
    pub fn warnings(&self) -> Vec<(&str, &str)> {
        self.results
            .iter()
            .flat_map(|r| r.warnings().iter().map(move |w| (r.job_name(), w.as_str())))
            .collect()
    }

    /// Format summary as a report
    pub fn format_report(&self) -> String {
        let mut report = format!(
            "Processing Summary\n\
             ==================\n\
             Documents: {}\n\
             Successful: {}\n\
             Failed: {}\n\
             Files written: {}\n\
             Duration: {:.2}s\n",
            self.total_jobs,
            self.successful,
            self.failed,
            self.output_files().len(),
            self.duration.as_secs_f64()
        );

        let warnings = self.warnings();
        if !warnings.is_empty() {
            report.push_str("\nWarnings:\n");
            for (job_name, warning) in warnings {
                report.push_str(&format!("  - {job_name}: {warning}\n"));
            }
        }

        let failed_jobs: Vec<_> = self.results.iter().filter(|r| r.is_failed()).collect();
        if !failed_jobs.is_empty() {
            report.push_str("\nFailed Documents:\n");
            for job in failed_jobs {
                report.push_str(&format!("  - {job}\n"));
            }
        }

        report
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_report())
    }
}
