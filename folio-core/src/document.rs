//! PDF document access
//!
//! The operations in this crate never touch PDF objects directly. They work
//! against [`PdfSource`], which exposes exactly what they need: page count,
//! plain page text, embedded images, the outline, and the ability to assemble
//! a new document out of a subset of the source pages.
//!
//! [`PdfDocument`] is the lopdf-backed implementation used by the CLI.

use crate::error::{FolioError, Result};
use crate::outline::{self, OutlineEntry};
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeSet, HashSet};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// An image XObject placed on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Page the image was found on (0-based)
    pub page_index: usize,
    /// Object number and generation of the image stream
    pub object_id: (u32, u16),
    pub width: u32,
    pub height: u32,
}

/// Encoding of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Jpeg2000,
    Png,
}

impl ImageFormat {
    /// File extension used when writing an image of this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Jpeg2000 => "jp2",
            ImageFormat::Png => "png",
        }
    }
}

/// Image bytes ready to be written to a file
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

/// Read access to a PDF document
pub trait PdfSource {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Plain text of a page (0-based index)
    fn page_text(&self, page_index: usize) -> Result<String>;

    /// Image XObjects used by a page, in resource order
    fn page_images(&self, page_index: usize) -> Result<Vec<ImageRef>>;

    /// Decode an image into file bytes
    fn decode_image(&self, image: &ImageRef) -> Result<DecodedImage>;

    /// The full outline in reading order
    fn outline(&self) -> Result<Vec<OutlineEntry>>;

    /// Start a new, empty document that takes its pages from this one.
    ///
    /// The assembly is released when dropped, whether or not it was saved.
    fn new_assembly(&self) -> Box<dyn PageAssembly + '_>;
}

/// A document being assembled from pages of a source document
pub trait PageAssembly {
    /// Append a page of the source document (0-based index)
    fn append_page(&mut self, page_index: usize) -> Result<()>;

    /// Number of pages appended so far
    fn page_count(&self) -> usize;

    /// Write the assembled document to `path`
    fn save(&mut self, path: &Path) -> Result<()>;
}

/// A PDF document loaded with lopdf
pub struct PdfDocument {
    inner: Document,
    pages: Vec<ObjectId>,
}

impl PdfDocument {
    /// Open and parse a PDF file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let inner = Document::load(path).map_err(|source| FolioError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let document = Self::from_document(inner);
        debug!(
            "Opened {} ({} pages)",
            path.display(),
            document.pages.len()
        );
        Ok(document)
    }

    /// Wrap an already loaded lopdf document
    pub fn from_document(inner: Document) -> Self {
        let pages = inner.get_pages().into_values().collect();
        Self { inner, pages }
    }

    fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.pages
            .get(page_index)
            .copied()
            .ok_or(FolioError::InvalidPageNumber(page_index))
    }

    fn xobject_ids(&self, page_id: ObjectId) -> Result<Vec<ObjectId>> {
        let (direct, inherited) = self.inner.get_page_resources(page_id)?;

        let mut resources: Vec<&Dictionary> = direct.into_iter().collect();
        for id in inherited {
            if let Ok(dict) = self.inner.get_dictionary(id) {
                resources.push(dict);
            }
        }

        let mut ids = Vec::new();
        for dict in resources {
            let xobjects = match dict
                .get(b"XObject")
                .and_then(|object| self.inner.dereference(object))
            {
                Ok((_, Object::Dictionary(xobjects))) => xobjects,
                _ => continue,
            };
            for (_, value) in xobjects.iter() {
                if let Ok(id) = value.as_reference() {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
        }
        Ok(ids)
    }
}

impl PdfSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page_index: usize) -> Result<String> {
        if page_index >= self.pages.len() {
            return Err(FolioError::InvalidPageNumber(page_index));
        }
        // lopdf numbers pages from 1
        let text = self.inner.extract_text(&[page_index as u32 + 1])?;
        Ok(text)
    }

    fn page_images(&self, page_index: usize) -> Result<Vec<ImageRef>> {
        let page_id = self.page_id(page_index)?;
        let mut images = Vec::new();

        for id in self.xobject_ids(page_id)? {
            let stream = match self.inner.get_object(id).and_then(Object::as_stream) {
                Ok(stream) => stream,
                Err(_) => continue,
            };
            if !matches!(stream.dict.get(b"Subtype").and_then(Object::as_name), Ok(b"Image")) {
                continue;
            }

            let dimension = |key: &[u8]| {
                stream
                    .dict
                    .get(key)
                    .and_then(Object::as_i64)
                    .ok()
                    .and_then(|value| u32::try_from(value).ok())
            };
            let (Some(width), Some(height)) = (dimension(b"Width"), dimension(b"Height")) else {
                warn!("Image {:?} on page {} has no usable size", id, page_index + 1);
                continue;
            };

            images.push(ImageRef {
                page_index,
                object_id: id,
                width,
                height,
            });
        }

        Ok(images)
    }

    fn decode_image(&self, image: &ImageRef) -> Result<DecodedImage> {
        let stream = self.inner.get_object(image.object_id)?.as_stream()?;
        let filters = stream.filters().unwrap_or_default();

        match filters.last().map(String::as_str) {
            Some("DCTDecode") if filters.len() == 1 => {
                return Ok(DecodedImage {
                    format: ImageFormat::Jpeg,
                    data: stream.content.clone(),
                })
            }
            Some("JPXDecode") if filters.len() == 1 => {
                return Ok(DecodedImage {
                    format: ImageFormat::Jpeg2000,
                    data: stream.content.clone(),
                })
            }
            Some("DCTDecode") | Some("JPXDecode") | Some("CCITTFaxDecode") | Some("JBIG2Decode") => {
                return Err(FolioError::UnsupportedImage(filters.join(", ")));
            }
            _ => {}
        }

        let bits = stream
            .dict
            .get(b"BitsPerComponent")
            .and_then(Object::as_i64)
            .unwrap_or(8);
        if bits != 8 {
            return Err(FolioError::UnsupportedImage(format!(
                "{bits} bits per component"
            )));
        }
        let components = self.color_components(&stream.dict)?;

        // lopdf refuses to decompress image streams directly
        let mut plain = stream.clone();
        plain.dict.remove(b"Subtype");
        let samples = if filters.is_empty() {
            plain.content
        } else {
            plain.decompressed_content()?
        };

        let expected = (image.width as usize)
            .checked_mul(image.height as usize)
            .and_then(|pixels| pixels.checked_mul(components))
            .ok_or_else(|| {
                FolioError::InvalidImage(format!("{}x{} image is too large", image.width, image.height))
            })?;
        if samples.len() < expected {
            return Err(FolioError::InvalidImage(format!(
                "expected {expected} bytes of samples, found {}",
                samples.len()
            )));
        }
        let samples = samples[..expected].to_vec();

        let decoded = match components {
            1 => GrayImage::from_raw(image.width, image.height, samples).map(DynamicImage::ImageLuma8),
            _ => RgbImage::from_raw(image.width, image.height, samples).map(DynamicImage::ImageRgb8),
        }
        .ok_or_else(|| FolioError::InvalidImage("sample buffer does not match size".to_string()))?;

        let mut data = Vec::new();
        decoded
            .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
            .map_err(|e| FolioError::InvalidImage(e.to_string()))?;

        Ok(DecodedImage {
            format: ImageFormat::Png,
            data,
        })
    }

    fn outline(&self) -> Result<Vec<OutlineEntry>> {
        outline::read_outline(&self.inner)
    }

    fn new_assembly(&self) -> Box<dyn PageAssembly + '_> {
        Box::new(LopdfAssembly {
            source: self,
            pages: Vec::new(),
        })
    }
}

impl PdfDocument {
    fn color_components(&self, dict: &Dictionary) -> Result<usize> {
        let color_space = match dict.get(b"ColorSpace") {
            Ok(object) => self.inner.dereference(object)?.1,
            Err(_) => return Err(FolioError::UnsupportedImage("no color space".to_string())),
        };

        match color_space {
            Object::Name(name) => match name.as_slice() {
                b"DeviceGray" | b"CalGray" => Ok(1),
                b"DeviceRGB" | b"CalRGB" => Ok(3),
                other => Err(FolioError::UnsupportedImage(
                    String::from_utf8_lossy(other).into_owned(),
                )),
            },
            Object::Array(array) => {
                let family = array.first().and_then(|name| name.as_name().ok());
                match family {
                    Some(b"ICCBased") => {
                        let profile = array
                            .get(1)
                            .ok_or_else(|| FolioError::InvalidImage("ICCBased without profile".to_string()))?;
                        let (_, profile) = self.inner.dereference(profile)?;
                        match profile.as_stream()?.dict.get(b"N").and_then(Object::as_i64) {
                            Ok(1) => Ok(1),
                            Ok(3) => Ok(3),
                            Ok(n) => Err(FolioError::UnsupportedImage(format!("ICCBased with {n} components"))),
                            Err(_) => Err(FolioError::InvalidImage("ICCBased profile without /N".to_string())),
                        }
                    }
                    Some(b"CalGray") => Ok(1),
                    Some(b"CalRGB") => Ok(3),
                    Some(other) => Err(FolioError::UnsupportedImage(
                        String::from_utf8_lossy(other).into_owned(),
                    )),
                    None => Err(FolioError::InvalidImage("empty color space".to_string())),
                }
            }
            _ => Err(FolioError::InvalidImage("malformed color space".to_string())),
        }
    }
}

/// Sub-document assembled by copying the source and keeping only the
/// appended pages. Pages keep their source order.
struct LopdfAssembly<'a> {
    source: &'a PdfDocument,
    pages: Vec<ObjectId>,
}

impl PageAssembly for LopdfAssembly<'_> {
    fn append_page(&mut self, page_index: usize) -> Result<()> {
        let page_id = self.source.page_id(page_index)?;
        if !self.pages.contains(&page_id) {
            self.pages.push(page_id);
        }
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        let mut doc = self.source.inner.clone();
        let keep: BTreeSet<ObjectId> = self.pages.iter().copied().collect();
        retain_pages(&mut doc, &keep)?;

        // Bookmarks point into pages that may no longer exist
        doc.catalog_mut()?.remove(b"Outlines");
        doc.prune_objects();
        doc.save(path)?;

        debug!("Saved {} pages to {}", keep.len(), path.display());
        Ok(())
    }
}

/// Remove every page not in `keep` in a single pass over the object graph,
/// then recompute the `/Count` of each page tree node.
fn retain_pages(doc: &mut Document, keep: &BTreeSet<ObjectId>) -> Result<()> {
    let dropped: BTreeSet<ObjectId> = doc
        .get_pages()
        .into_values()
        .filter(|id| !keep.contains(id))
        .collect();
    if dropped.is_empty() {
        return Ok(());
    }

    let is_dropped = |object: &Object| matches!(object, Object::Reference(id) if dropped.contains(id));
    doc.traverse_objects(|object| match object {
        Object::Array(array) => array.retain(|item| !is_dropped(item)),
        Object::Dictionary(dict) => {
            let keys: Vec<Vec<u8>> = dict
                .iter()
                .filter(|&(_, value)| is_dropped(value))
                .map(|(key, _)| key.clone())
                .collect();
            for key in keys {
                dict.remove(&key);
            }
        }
        _ => {}
    });
    for id in &dropped {
        doc.objects.remove(id);
    }

    let root = doc.catalog()?.get(b"Pages")?.as_reference()?;
    recount_page_tree(doc, root, &mut HashSet::new())?;
    Ok(())
}

fn recount_page_tree(doc: &mut Document, node: ObjectId, seen: &mut HashSet<ObjectId>) -> Result<i64> {
    if !seen.insert(node) {
        return Err(FolioError::InvalidStructure(format!(
            "page tree node {node:?} referenced twice"
        )));
    }

    let dict = doc.get_dictionary(node)?;
    if !dict.type_is(b"Pages") {
        return Ok(1);
    }
    let kids: Vec<ObjectId> = match dict.get(b"Kids").and_then(Object::as_array) {
        Ok(kids) => kids.iter().filter_map(|kid| kid.as_reference().ok()).collect(),
        Err(_) => Vec::new(),
    };

    let mut count = 0;
    for kid in kids {
        count += recount_page_tree(doc, kid, seen)?;
    }
    doc.get_dictionary_mut(node)?.set("Count", count);
    Ok(count)
}
