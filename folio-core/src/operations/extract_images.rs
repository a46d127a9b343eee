//! Image extraction
//!
//! Writes every image embedded in a document to its own file, named after the
//! page and its position on the page.

use super::OperationResult;
use crate::document::{ImageFormat, ImageRef, PdfSource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options for image extraction
#[derive(Debug, Clone)]
pub struct ExtractImagesOptions {
    /// Output directory for extracted images
    pub output_dir: PathBuf,
    /// Whether to create output directory if it doesn't exist
    pub create_dir: bool,
}

impl Default for ExtractImagesOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("images"),
            create_dir: true,
        }
    }
}

/// An image written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    /// Page number (1-based)
    pub page_number: usize,
    /// Image index on the page (1-based)
    pub image_index: usize,
    /// Output file path
    pub file_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

/// File name of an extracted image
pub fn image_file_name(page_number: usize, image_index: usize, format: ImageFormat) -> String {
    format!(
        "page_{}_image_{}.{}",
        page_number,
        image_index,
        format.extension()
    )
}

/// Image extractor
pub struct ImageExtractor<'a, S: PdfSource + ?Sized> {
    source: &'a S,
    options: ExtractImagesOptions,
}

impl<'a, S: PdfSource + ?Sized> ImageExtractor<'a, S> {
    pub fn new(source: &'a S, options: ExtractImagesOptions) -> Self {
        Self { source, options }
    }

    /// Extract all images from the document.
    ///
    /// Images that cannot be decoded or written are skipped with a warning.
    pub fn extract_all(&self) -> OperationResult<Vec<ExtractedImage>> {
        if self.options.create_dir && !self.options.output_dir.exists() {
            fs::create_dir_all(&self.options.output_dir)?;
        }

        let mut extracted = Vec::new();
        for page_index in 0..self.source.page_count() {
            extracted.extend(self.extract_from_page(page_index));
        }

        info!(
            "Extracted {} images to {}",
            extracted.len(),
            self.options.output_dir.display()
        );
        Ok(extracted)
    }

    /// Extract the images of a single page (0-based index)
    pub fn extract_from_page(&self, page_index: usize) -> Vec<ExtractedImage> {
        let images = match self.source.page_images(page_index) {
            Ok(images) => images,
            Err(e) => {
                warn!("Could not list images of page {}: {}", page_index + 1, e);
                return Vec::new();
            }
        };
        debug!("Page {} has {} images", page_index + 1, images.len());

        images
            .iter()
            .enumerate()
            .filter_map(|(i, image)| match self.extract_image(image, i + 1) {
                Ok(extracted) => Some(extracted),
                Err(e) => {
                    warn!(
                        "Skipping image {} on page {}: {}",
                        i + 1,
                        page_index + 1,
                        e
                    );
                    None
                }
            })
            .collect()
    }

    fn extract_image(&self, image: &ImageRef, image_index: usize) -> OperationResult<ExtractedImage> {
        let decoded = self.source.decode_image(image)?;
        let page_number = image.page_index + 1;
        let file_path = self
            .options
            .output_dir
            .join(image_file_name(page_number, image_index, decoded.format));

        fs::write(&file_path, &decoded.data)?;

        Ok(ExtractedImage {
            page_number,
            image_index,
            file_path,
            width: image.width,
            height: image.height,
            format: decoded.format,
        })
    }
}

/// Extract every image of `source` into `output_dir`
pub fn extract_images<S: PdfSource + ?Sized>(
    source: &S,
    output_dir: &Path,
) -> OperationResult<Vec<ExtractedImage>> {
    let options = ExtractImagesOptions {
        output_dir: output_dir.to_path_buf(),
        ..Default::default()
    };
    ImageExtractor::new(source, options).extract_all()
}
