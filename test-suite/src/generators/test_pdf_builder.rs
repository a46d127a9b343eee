//! Test PDF Builder
//!
//! A builder for creating test PDFs with specific characteristics: text pages,
//! image pages and an outline with arbitrary nesting.

use anyhow::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::path::Path;

/// PDF version to generate
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum PdfVersion {
    V1_4,
    V1_5,
    V1_7,
}

impl std::fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let version = match self {
            PdfVersion::V1_4 => "1.4",
            PdfVersion::V1_5 => "1.5",
            PdfVersion::V1_7 => "1.7",
        };
        write!(f, "{version}")
    }
}

/// An image XObject to place on a page
#[derive(Debug, Clone)]
pub enum TestImage {
    /// JPEG bytes, written with DCTDecode
    Jpeg { width: u32, height: u32, data: Vec<u8> },
    /// 8-bit DeviceGray samples
    Gray { width: u32, height: u32, samples: Vec<u8> },
    /// 8-bit DeviceRGB samples
    Rgb { width: u32, height: u32, samples: Vec<u8> },
    /// A JBIG2 stream, which is never decodable
    Jbig2 { width: u32, height: u32 },
}

impl TestImage {
    /// A gray image filled with one value
    pub fn gray(width: u32, height: u32, value: u8) -> Self {
        TestImage::Gray {
            width,
            height,
            samples: vec![value; (width * height) as usize],
        }
    }

    /// An RGB image filled with one color
    pub fn rgb(width: u32, height: u32, color: [u8; 3]) -> Self {
        TestImage::Rgb {
            width,
            height,
            samples: color.repeat((width * height) as usize),
        }
    }

    /// A JPEG stream; the bytes are passed through untouched
    pub fn jpeg(width: u32, height: u32, data: &[u8]) -> Self {
        TestImage::Jpeg {
            width,
            height,
            data: data.to_vec(),
        }
    }

    fn to_stream(&self) -> Stream {
        let (width, height) = match self {
            TestImage::Jpeg { width, height, .. }
            | TestImage::Gray { width, height, .. }
            | TestImage::Rgb { width, height, .. }
            | TestImage::Jbig2 { width, height } => (*width, *height),
        };
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "BitsPerComponent" => 8,
        };

        match self {
            TestImage::Jpeg { data, .. } => {
                dict.set("ColorSpace", "DeviceRGB");
                dict.set("Filter", "DCTDecode");
                Stream::new(dict, data.clone())
            }
            TestImage::Gray { samples, .. } => {
                dict.set("ColorSpace", "DeviceGray");
                let mut stream = Stream::new(dict, samples.clone());
                // falls back to the raw samples when compression does not pay off
                let _ = stream.compress();
                stream
            }
            TestImage::Rgb { samples, .. } => {
                dict.set("ColorSpace", "DeviceRGB");
                Stream::new(dict, samples.clone())
            }
            TestImage::Jbig2 { .. } => {
                dict.set("ColorSpace", "DeviceGray");
                dict.set("BitsPerComponent", 1);
                dict.set("Filter", "JBIG2Decode");
                Stream::new(dict, vec![0; 16])
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PageContent {
    lines: Vec<String>,
    images: Vec<TestImage>,
}

#[derive(Debug, Clone)]
struct Bookmark {
    level: u32,
    title: String,
    /// 1-based page number
    page: Option<usize>,
}

/// Builder for creating test PDFs
#[derive(Debug, Clone)]
pub struct TestPdfBuilder {
    version: PdfVersion,
    pages: Vec<PageContent>,
    bookmarks: Vec<Bookmark>,
    title: Option<String>,
}

impl Default for TestPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPdfBuilder {
    /// Create a new PDF builder with default settings
    pub fn new() -> Self {
        Self {
            version: PdfVersion::V1_5,
            pages: Vec::new(),
            bookmarks: Vec::new(),
            title: None,
        }
    }

    /// Set PDF version
    pub fn with_version(mut self, version: PdfVersion) -> Self {
        self.version = version;
        self
    }

    /// Add title
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Add an empty page
    pub fn add_empty_page(&mut self) -> &mut Self {
        self.pages.push(PageContent::default());
        self
    }

    /// Add a page with text. Every line of `text` becomes its own text
    /// object, so extracted text keeps the line breaks.
    pub fn add_text_page(&mut self, text: &str) -> &mut Self {
        self.pages.push(PageContent {
            lines: text.lines().map(str::to_string).collect(),
            images: Vec::new(),
        });
        self
    }

    /// Add `count` pages reading "Page <n>." with their 1-based number
    pub fn add_numbered_pages(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            let number = self.pages.len() + 1;
            self.add_text_page(&format!("Page {number}."));
        }
        self
    }

    /// Add a page showing the given images
    pub fn add_image_page(&mut self, images: Vec<TestImage>) -> &mut Self {
        self.pages.push(PageContent {
            lines: Vec::new(),
            images,
        });
        self
    }

    /// Add an outline entry pointing at a 1-based page.
    ///
    /// Entries nest by level in the order they are added: a level 2 entry
    /// becomes a child of the closest preceding level 1 entry.
    pub fn add_bookmark(&mut self, level: u32, title: &str, page: usize) -> &mut Self {
        self.bookmarks.push(Bookmark {
            level,
            title: title.to_string(),
            page: Some(page),
        });
        self
    }

    /// Add an outline entry without a destination
    pub fn add_bookmark_without_target(&mut self, level: u32, title: &str) -> &mut Self {
        self.bookmarks.push(Bookmark {
            level,
            title: title.to_string(),
            page: None,
        });
        self
    }

    /// Number of pages added so far
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Build the document
    pub fn build_document(&self) -> Result<Document> {
        let mut doc = Document::with_version(self.version.to_string());
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut page_ids = Vec::new();
        for page in &self.pages {
            let page_id = add_page(&mut doc, pages_id, font_id, page)?;
            page_ids.push(page_id);
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.iter().map(|&id| Object::Reference(id)).collect::<Vec<_>>(),
                "Count" => page_ids.len() as i64,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if !self.bookmarks.is_empty() {
            let outlines_id = add_outline(&mut doc, &self.bookmarks, &page_ids);
            catalog.set("Outlines", outlines_id);
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        if let Some(title) = &self.title {
            let info_id = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
            });
            doc.trailer.set("Info", info_id);
        }

        Ok(doc)
    }

    /// Build the PDF bytes
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut doc = self.build_document()?;
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Build the PDF and write it to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut doc = self.build_document()?;
        doc.save(path)?;
        Ok(())
    }
}

fn add_page(doc: &mut Document, pages_id: ObjectId, font_id: ObjectId, page: &PageContent) -> Result<ObjectId> {
    let mut operations = Vec::new();
    let mut y = 720;
    for line in &page.lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        operations.push(Operation::new("Td", vec![72.into(), y.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
        operations.push(Operation::new("ET", vec![]));
        y -= 16;
    }

    let mut xobjects = Dictionary::new();
    for (i, image) in page.images.iter().enumerate() {
        let name = format!("Im{}", i + 1);
        let image_id = doc.add_object(image.to_stream());
        xobjects.set(name.as_str(), image_id);

        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new(
            "cm",
            vec![100.into(), 0.into(), 0.into(), 100.into(), 72.into(), (600 - 120 * i as i64).into()],
        ));
        operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        operations.push(Operation::new("Q", vec![]));
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let mut resources = dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    };
    if !xobjects.is_empty() {
        resources.set("XObject", xobjects);
    }

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => resources,
    }))
}

/// Write the outline tree and return the id of its root
fn add_outline(doc: &mut Document, bookmarks: &[Bookmark], page_ids: &[ObjectId]) -> ObjectId {
    let outlines_id = doc.new_object_id();
    let ids: Vec<ObjectId> = bookmarks.iter().map(|_| doc.new_object_id()).collect();

    // children of every node in order, keyed by parent id
    let mut children: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
    let mut parents: HashMap<ObjectId, ObjectId> = HashMap::new();
    let mut stack: Vec<(u32, ObjectId)> = Vec::new();
    for (bookmark, &id) in bookmarks.iter().zip(&ids) {
        while stack.last().is_some_and(|&(level, _)| level >= bookmark.level) {
            stack.pop();
        }
        let parent = stack.last().map(|&(_, parent)| parent).unwrap_or(outlines_id);
        children.entry(parent).or_default().push(id);
        parents.insert(id, parent);
        stack.push((bookmark.level, id));
    }

    for (bookmark, &id) in bookmarks.iter().zip(&ids) {
        let parent = parents[&id];
        let siblings = &children[&parent];
        let position = siblings.iter().position(|&sibling| sibling == id).unwrap_or(0);

        let mut item = dictionary! {
            "Title" => Object::string_literal(bookmark.title.as_str()),
            "Parent" => parent,
        };
        if position > 0 {
            item.set("Prev", siblings[position - 1]);
        }
        if let Some(&next) = siblings.get(position + 1) {
            item.set("Next", next);
        }
        if let Some(kids) = children.get(&id) {
            item.set("First", kids[0]);
            item.set("Last", kids[kids.len() - 1]);
            item.set("Count", kids.len() as i64);
        }
        if let Some(page_id) = bookmark.page.and_then(|page| page_ids.get(page.checked_sub(1)?)) {
            item.set("Dest", vec![Object::Reference(*page_id), "Fit".into()]);
        }
        doc.objects.insert(id, Object::Dictionary(item));
    }

    let mut root = dictionary! { "Type" => "Outlines" };
    if let Some(top) = children.get(&outlines_id) {
        root.set("First", top[0]);
        root.set("Last", top[top.len() - 1]);
        root.set("Count", top.len() as i64);
    }
    doc.objects.insert(outlines_id, Object::Dictionary(root));
    outlines_id
}
