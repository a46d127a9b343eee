//! Document outline (bookmarks)
//!
//! Flattens the `/Outlines` tree of a document into an ordered list of
//! [`OutlineEntry`] values, in reading order, with the nesting level of each
//! entry and the page its destination points at.

use crate::error::Result;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Maximum number of indirections followed while resolving a destination
const MAX_DESTINATION_DEPTH: usize = 8;

/// A single outline item
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OutlineEntry {
    /// Nesting level, top-level entries are level 1
    pub level: u32,
    /// Decoded title
    pub title: String,
    /// Target page (1-based), negative when the entry has no page target
    pub page: i64,
}

impl OutlineEntry {
    pub fn new(level: u32, title: impl Into<String>, page: i64) -> Self {
        Self {
            level,
            title: title.into(),
            page,
        }
    }

    /// Whether this is a top-level (chapter) entry
    pub fn is_top_level(&self) -> bool {
        self.level == 1
    }

    /// The target page, if the entry has one
    pub fn target_page(&self) -> Option<usize> {
        usize::try_from(self.page).ok()
    }
}

/// Read the complete outline of a document.
///
/// Documents without an `/Outlines` dictionary yield an empty list.
pub fn read_outline(doc: &Document) -> Result<Vec<OutlineEntry>> {
    let catalog = doc.catalog()?;
    let root = match catalog.get(b"Outlines") {
        Ok(object) => match doc.dereference(object) {
            Ok((_, Object::Dictionary(dict))) => dict,
            _ => return Ok(Vec::new()),
        },
        Err(_) => return Ok(Vec::new()),
    };

    let mut walker = OutlineWalker {
        doc,
        catalog,
        page_numbers: doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| (id, number))
            .collect(),
        visited: HashSet::new(),
        entries: Vec::new(),
    };
    walker.walk_children(root, 1);

    debug!("Read {} outline entries", walker.entries.len());
    Ok(walker.entries)
}

struct OutlineWalker<'a> {
    doc: &'a Document,
    catalog: &'a Dictionary,
    page_numbers: HashMap<ObjectId, u32>,
    visited: HashSet<ObjectId>,
    entries: Vec<OutlineEntry>,
}

impl<'a> OutlineWalker<'a> {
    fn walk_children(&mut self, parent: &'a Dictionary, level: u32) {
        let doc = self.doc;
        let mut next = parent.get(b"First").and_then(Object::as_reference).ok();

        while let Some(id) = next {
            if !self.visited.insert(id) {
                warn!("Outline item {:?} visited twice, stopping this chain", id);
                break;
            }
            let item = match doc.get_dictionary(id) {
                Ok(item) => item,
                Err(e) => {
                    warn!("Skipping unreadable outline item {:?}: {}", id, e);
                    break;
                }
            };

            let title = self.title(item);
            let page = self
                .item_target(item)
                .map(i64::from)
                .unwrap_or(-1);
            self.entries.push(OutlineEntry { level, title, page });

            self.walk_children(item, level + 1);
            next = item.get(b"Next").and_then(Object::as_reference).ok();
        }
    }

    fn title(&self, item: &Dictionary) -> String {
        item.get(b"Title")
            .and_then(|object| self.doc.dereference(object))
            .and_then(|(_, object)| lopdf::decode_text_string(object))
            .unwrap_or_default()
    }

    fn item_target(&self, item: &Dictionary) -> Option<u32> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.destination_page(dest, 0);
        }

        // GoTo action
        let (_, action) = self.doc.dereference(item.get(b"A").ok()?).ok()?;
        let action = action.as_dict().ok()?;
        match action.get(b"S").and_then(Object::as_name) {
            Ok(b"GoTo") => self.destination_page(action.get(b"D").ok()?, 0),
            _ => None,
        }
    }

    fn destination_page(&self, dest: &Object, depth: usize) -> Option<u32> {
        if depth > MAX_DESTINATION_DEPTH {
            return None;
        }
        let (_, dest) = self.doc.dereference(dest).ok()?;

        match dest {
            Object::Array(array) => match array.first()? {
                Object::Reference(page_id) => self.page_numbers.get(page_id).copied(),
                Object::Integer(index) => {
                    let number = u32::try_from(*index).ok()?.checked_add(1)?;
                    (number as usize <= self.page_numbers.len()).then_some(number)
                }
                _ => None,
            },
            Object::Name(name) | Object::String(name, _) => {
                let named = self.named_destination(name)?;
                self.destination_page(named, depth + 1)
            }
            Object::Dictionary(dict) => self.destination_page(dict.get(b"D").ok()?, depth + 1),
            _ => None,
        }
    }

    fn named_destination(&self, name: &[u8]) -> Option<&'a Object> {
        let doc = self.doc;

        // PDF 1.1 style /Dests dictionary
        if let Ok(Object::Dictionary(dests)) = self
            .catalog
            .get(b"Dests")
            .and_then(|object| doc.dereference(object))
            .map(|(_, object)| object)
        {
            if let Ok(dest) = dests.get(name) {
                return Some(dest);
            }
        }

        // Name tree under /Names /Dests
        let (_, names) = doc.dereference(self.catalog.get(b"Names").ok()?).ok()?;
        let (_, tree) = doc
            .dereference(names.as_dict().ok()?.get(b"Dests").ok()?)
            .ok()?;
        self.search_name_tree(tree.as_dict().ok()?, name, 0)
    }

    fn search_name_tree(&self, node: &'a Dictionary, name: &[u8], depth: usize) -> Option<&'a Object> {
        if depth > MAX_DESTINATION_DEPTH {
            return None;
        }
        let doc = self.doc;

        if let Ok(Object::Array(pairs)) = node.get(b"Names") {
            for pair in pairs.chunks(2) {
                if let [Object::String(key, _), value] = pair {
                    if key.as_slice() == name {
                        return Some(value);
                    }
                }
            }
        }

        if let Ok(Object::Array(kids)) = node.get(b"Kids") {
            for kid in kids {
                let kid = kid.as_reference().ok().and_then(|id| doc.get_dictionary(id).ok());
                if let Some(found) = kid.and_then(|kid| self.search_name_tree(kid, name, depth + 1)) {
                    return Some(found);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object, StringFormat};

    fn single_page_document() -> (Document, ObjectId, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        (doc, catalog_id, page_id)
    }

    fn literal(text: &str) -> Object {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    }

    #[test]
    fn test_target_page() {
        assert_eq!(OutlineEntry::new(1, "Intro", 3).target_page(), Some(3));
        assert_eq!(OutlineEntry::new(1, "Intro", 0).target_page(), Some(0));
        assert_eq!(OutlineEntry::new(1, "Intro", -1).target_page(), None);
        assert!(OutlineEntry::new(1, "Intro", -1).is_top_level());
        assert!(!OutlineEntry::new(2, "Section", 4).is_top_level());
    }

    #[test]
    fn test_document_without_outline() {
        let (doc, _, _) = single_page_document();
        assert!(read_outline(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_cyclic_outline_chain_terminates() {
        let (mut doc, catalog_id, page_id) = single_page_document();
        let outlines_id = doc.new_object_id();
        let first_id = doc.new_object_id();
        let second_id = doc.new_object_id();

        doc.objects.insert(
            first_id,
            Object::Dictionary(dictionary! {
                "Title" => literal("One"),
                "Parent" => outlines_id,
                "Next" => second_id,
                "Dest" => Object::Array(vec![page_id.into(), "Fit".into()]),
            }),
        );
        doc.objects.insert(
            second_id,
            Object::Dictionary(dictionary! {
                "Title" => literal("Two"),
                "Parent" => outlines_id,
                "Next" => first_id,
            }),
        );
        doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => first_id,
                "Last" => second_id,
            }),
        );
        doc.get_dictionary_mut(catalog_id)
            .unwrap()
            .set("Outlines", outlines_id);

        let outline = read_outline(&doc).unwrap();
        assert_eq!(
            outline,
            vec![OutlineEntry::new(1, "One", 1), OutlineEntry::new(1, "Two", -1)]
        );
    }

    #[test]
    fn test_page_index_destinations() {
        let (mut doc, catalog_id, _) = single_page_document();
        let outlines_id = doc.new_object_id();
        let first_id = doc.new_object_id();
        let huge_id = doc.new_object_id();
        let negative_id = doc.new_object_id();

        let entries = [
            (first_id, "First", 0, Some(huge_id)),
            (huge_id, "Huge", i64::from(u32::MAX), Some(negative_id)),
            (negative_id, "Negative", -3, None),
        ];
        for (id, title, index, next) in entries {
            let mut item = dictionary! {
                "Title" => literal(title),
                "Parent" => outlines_id,
                "Dest" => Object::Array(vec![Object::Integer(index), "Fit".into()]),
            };
            if let Some(next) = next {
                item.set("Next", next);
            }
            doc.objects.insert(id, Object::Dictionary(item));
        }
        doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => first_id,
                "Last" => negative_id,
            }),
        );
        doc.get_dictionary_mut(catalog_id)
            .unwrap()
            .set("Outlines", outlines_id);

        let outline = read_outline(&doc).unwrap();
        assert_eq!(
            outline,
            vec![
                OutlineEntry::new(1, "First", 1),
                OutlineEntry::new(1, "Huge", -1),
                OutlineEntry::new(1, "Negative", -1),
            ]
        );
    }

    #[test]
    fn test_named_destination_and_goto_action() {
        let (mut doc, catalog_id, page_id) = single_page_document();
        let outlines_id = doc.new_object_id();
        let named_id = doc.new_object_id();
        let action_id = doc.new_object_id();

        doc.objects.insert(
            named_id,
            Object::Dictionary(dictionary! {
                "Title" => literal("Named"),
                "Parent" => outlines_id,
                "Next" => action_id,
                "Dest" => literal("chapter-1"),
            }),
        );
        doc.objects.insert(
            action_id,
            Object::Dictionary(dictionary! {
                "Title" => literal("Action"),
                "Parent" => outlines_id,
                "A" => dictionary! {
                    "S" => "GoTo",
                    "D" => Object::Array(vec![page_id.into(), "XYZ".into(), Object::Null, Object::Null, Object::Null]),
                },
            }),
        );
        doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => named_id,
                "Last" => action_id,
            }),
        );

        let catalog = doc.get_dictionary_mut(catalog_id).unwrap();
        catalog.set("Outlines", outlines_id);
        catalog.set(
            "Names",
            dictionary! {
                "Dests" => dictionary! {
                    "Names" => Object::Array(vec![
                        literal("chapter-1"),
                        Object::Array(vec![page_id.into(), "Fit".into()]),
                    ]),
                },
            },
        );

        let outline = read_outline(&doc).unwrap();
        assert_eq!(
            outline,
            vec![OutlineEntry::new(1, "Named", 1), OutlineEntry::new(1, "Action", 1)]
        );
    }
}
