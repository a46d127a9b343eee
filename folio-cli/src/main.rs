use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use folio::batch::{BatchInput, BatchProcessor, ProcessOptions};
use folio::operations::ChapterMap;
use folio::search::{self, Direction, SearchOptions};
use folio::{PdfDocument, PdfSource, SentenceIndex};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Keyword extraction, image extraction and chapter splitting for PDF files",
    version,
    author
)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one PDF or every PDF in a folder
    Process {
        /// Folder whose PDF files are processed
        #[arg(long, value_name = "DIR", required_unless_present = "input_file")]
        input_dir: Option<PathBuf>,

        /// Single PDF file to process
        #[arg(long, value_name = "FILE", conflicts_with = "input_dir")]
        input_file: Option<PathBuf>,

        /// Output folder; every document gets a sub-folder named after it
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Extract sentences around a keyword to extracted_text.txt
        #[arg(long)]
        text: bool,

        /// Keyword to search for
        #[arg(short, long, requires = "text")]
        keyword: Option<String>,

        /// Extract embedded images
        #[arg(long)]
        images: bool,

        /// Split into one PDF per top-level outline entry
        #[arg(long)]
        chapters: bool,

        /// Number of sentences in each window
        #[arg(short, long, default_value = "5")]
        sentences: NonZeroUsize,

        /// Read the window forward or backward from the match
        #[arg(short, long, default_value = "forward")]
        direction: Direction,
    },

    /// Search one PDF for a keyword and print the matches
    Search {
        /// Input PDF file
        input: PathBuf,

        /// Keyword to search for
        #[arg(short, long)]
        keyword: String,

        /// Number of sentences in each window
        #[arg(short, long, default_value = "5")]
        sentences: NonZeroUsize,

        /// Read the window forward or backward from the match
        #[arg(short, long, default_value = "forward")]
        direction: Direction,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the outline of a PDF and the chapters it defines
    Outline {
        /// Input PDF file
        input: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "folio=debug" } else { "folio=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Process {
            input_dir,
            input_file,
            output,
            text,
            keyword,
            images,
            chapters,
            sentences,
            direction,
        } => {
            let input = match (input_file, input_dir) {
                (Some(file), _) => BatchInput::File(file),
                (None, Some(dir)) => BatchInput::Folder(dir),
                (None, None) => anyhow::bail!("Select an input folder or an input file"),
            };
            let options = ProcessOptions {
                text: text.then(|| {
                    SearchOptions::new(keyword.unwrap_or_default(), sentences, direction)
                }),
                images,
                chapters,
            };

            tracing::debug!("Processing {:?} into {}", input, output.display());
            let processor = BatchProcessor::new(&output, options).context("Invalid options")?;
            let summary = processor
                .execute(&input)
                .context("Failed to read the input")?;

            for result in &summary.results {
                println!("{result}");
            }
            println!("\n{summary}");
        }

        Commands::Search {
            input,
            keyword,
            sentences,
            direction,
            format,
        } => {
            if keyword.trim().is_empty() {
                anyhow::bail!("The keyword must not be empty");
            }
            let document = PdfDocument::open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let index = SentenceIndex::from_source(&document);
            let results = search::search(&index, &SearchOptions::new(keyword.as_str(), sentences, direction));

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                OutputFormat::Text if results.is_empty() => {
                    eprintln!("Keyword '{keyword}' not found in {}", input.display());
                }
                OutputFormat::Text => println!("{}", search::render_report(&results)),
            }
        }

        Commands::Outline { input } => {
            let document = PdfDocument::open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let outline = document.outline().context("Failed to read the outline")?;

            println!("Outline of {}", input.display());
            println!("==========={}", "=".repeat(input.display().to_string().len()));
            for entry in &outline {
                let indent = "  ".repeat(entry.level.saturating_sub(1) as usize);
                match entry.target_page() {
                    Some(page) => println!("{indent}{} (page {page})", entry.title),
                    None => println!("{indent}{} (no page)", entry.title),
                }
            }

            match ChapterMap::from_outline(&outline) {
                Ok(map) => {
                    println!("\nChapters ({} pages):", document.page_count());
                    for range in map.ranges(document.page_count()) {
                        println!(
                            "  pages {}-{}: {}.pdf",
                            range.start + 1,
                            range.end,
                            range.title
                        );
                    }
                }
                Err(e) if e.is_structural() => {
                    eprintln!("Warning: {e}");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
