//! Image extraction on generated documents

use folio::operations::{extract_images, ExtractImagesOptions, ImageExtractor};
use folio::{FolioError, ImageFormat, PdfDocument, PdfSource};
use folio_test_suite::sample_pdfs::{self, JPEG_STUB};
use folio_test_suite::{TestImage, TestPdfBuilder};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn open(builder: &TestPdfBuilder) -> PdfDocument {
    let bytes = builder.build().unwrap();
    PdfDocument::from_document(lopdf::Document::load_mem(&bytes).unwrap())
}

#[test]
fn test_gallery_images_are_listed_per_page() {
    let document = open(&sample_pdfs::image_gallery());

    let sizes: Vec<Vec<(u32, u32)>> = (0..document.page_count())
        .map(|page| {
            document
                .page_images(page)
                .unwrap()
                .iter()
                .map(|image| (image.width, image.height))
                .collect()
        })
        .collect();

    assert_eq!(sizes, vec![vec![(4, 4), (8, 8)], vec![(8, 8)], vec![(3, 2)]]);
}

#[test]
fn test_extract_gallery() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("images");
    let document = open(&sample_pdfs::image_gallery());

    let extracted = extract_images(&document, &output).unwrap();

    let names: Vec<String> = extracted
        .iter()
        .map(|image| image.file_path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    // the JBIG2 image on page 2 cannot be decoded
    assert_eq!(
        names,
        vec!["page_1_image_1.jpg", "page_1_image_2.png", "page_3_image_1.png"]
    );
    assert_eq!(extracted[0].format, ImageFormat::Jpeg);
    assert_eq!(fs::read(&extracted[0].file_path).unwrap(), JPEG_STUB);
}

#[test]
fn test_raw_samples_become_png() {
    let dir = TempDir::new().unwrap();
    let document = open(&sample_pdfs::image_gallery());

    let extracted = extract_images(&document, dir.path()).unwrap();

    let gray = image::open(dir.path().join("page_1_image_2.png")).unwrap();
    assert_eq!((gray.width(), gray.height()), (8, 8));
    assert_eq!(gray.to_luma8().get_pixel(3, 5).0, [0x80]);

    let rgb = image::open(dir.path().join("page_3_image_1.png")).unwrap();
    assert_eq!((rgb.width(), rgb.height()), (3, 2));
    assert_eq!(rgb.to_rgb8().get_pixel(2, 1).0, [255, 0, 0]);

    assert_eq!(extracted.len(), 3);
}

#[test]
fn test_skipped_image_keeps_its_index() {
    let dir = TempDir::new().unwrap();
    let mut builder = TestPdfBuilder::new();
    builder.add_image_page(vec![
        TestImage::Jbig2 { width: 2, height: 2 },
        TestImage::gray(2, 2, 0),
    ]);
    let document = open(&builder);

    let extracted = extract_images(&document, dir.path()).unwrap();

    assert_eq!(extracted.len(), 1);
    assert_eq!(extracted[0].image_index, 2);
    assert!(dir.path().join("page_1_image_2.png").exists());
    assert!(!dir.path().join("page_1_image_1.png").exists());
}

#[test]
fn test_document_without_images() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("images");
    let document = open(&sample_pdfs::story());

    let extracted = extract_images(&document, &output).unwrap();

    assert!(extracted.is_empty());
    assert!(output.is_dir());
    assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
}

#[test]
fn test_single_page_extraction() {
    let dir = TempDir::new().unwrap();
    let document = open(&sample_pdfs::image_gallery());
    let extractor = ImageExtractor::new(
        &document,
        ExtractImagesOptions {
            output_dir: dir.path().to_path_buf(),
            create_dir: false,
        },
    );

    let extracted = extractor.extract_from_page(2);

    assert_eq!(extracted.len(), 1);
    assert_eq!(extracted[0].page_number, 3);
    assert_eq!(extracted[0].file_path, dir.path().join("page_3_image_1.png"));
    assert!(extractor.extract_from_page(7).is_empty());
}

#[test]
fn test_oversized_dimensions_are_rejected() {
    let dir = TempDir::new().unwrap();
    let mut builder = TestPdfBuilder::new();
    builder.add_image_page(vec![TestImage::Rgb {
        width: u32::MAX,
        height: u32::MAX,
        samples: vec![0; 3],
    }]);
    let document = open(&builder);

    let images = document.page_images(0).unwrap();
    assert!(matches!(
        document.decode_image(&images[0]),
        Err(FolioError::InvalidImage(_))
    ));
    assert!(extract_images(&document, dir.path()).unwrap().is_empty());
}
