use crate::error::{Error, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use tracing::debug;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Catalog entries that point into the old page tree.
const STALE_CATALOG_KEYS: [&[u8]; 4] = [b"Outlines", b"PageLabels", b"StructTreeRoot", b"OpenAction"];

/// Guard against cyclic `Parent` chains in broken files.
const MAX_TREE_DEPTH: usize = 64;

pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(Error::InvalidDocument)?;
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    /// Build a new document holding `pages` (1-based) in exactly the given order.
    pub fn extract_pages(&self, pages: &[u32]) -> Result<Document> {
        if pages.is_empty() {
            return Err(Error::EmptySelection);
        }

        let all_pages = self.page_ids();
        let total = all_pages.len() as u32;

        // Validate page numbers
        for &page in pages {
            if page == 0 || page > total {
                return Err(Error::PageOutOfRange { page, total });
            }
        }

        let mut new_doc = self.doc.clone();
        let root_id = new_doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(Error::InvalidDocument)?;
        let tree_id = new_doc
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(Error::InvalidDocument)?;

        let mut used = HashSet::new();
        let mut kids = Vec::with_capacity(pages.len());
        for &page in pages {
            let source_id = all_pages[(page - 1) as usize].1;
            let mut dict = self
                .doc
                .get_dictionary(source_id)
                .map_err(Error::InvalidDocument)?
                .clone();

            for key in INHERITABLE {
                if !dict.has(key) {
                    if let Some(value) = inherited_attribute(&self.doc, source_id, key) {
                        dict.set(key, value.clone());
                    }
                }
            }
            dict.set("Parent", Object::Reference(tree_id));

            // A page requested twice gets a second page object sharing its content
            let id = if used.insert(source_id) {
                new_doc.objects.insert(source_id, Object::Dictionary(dict));
                source_id
            } else {
                new_doc.add_object(dict)
            };
            kids.push(Object::Reference(id));
        }

        let tree = new_doc
            .get_dictionary_mut(tree_id)
            .map_err(Error::InvalidDocument)?;
        tree.set("Count", pages.len() as i64);
        tree.set("Kids", kids);
        tree.remove(b"Parent");

        let catalog = new_doc
            .get_dictionary_mut(root_id)
            .map_err(Error::InvalidDocument)?;
        for key in STALE_CATALOG_KEYS {
            catalog.remove(key);
        }

        let pruned = new_doc.prune_objects();
        debug!(pages = pages.len(), pruned = pruned.len(), "rebuilt page tree");

        Ok(new_doc)
    }

    /// Serialize a document to bytes
    pub fn save_to_bytes(doc: &mut Document) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|err| Error::Extraction(err.to_string()))?;
        Ok(bytes)
    }
}

/// Look up `key` on a page or the nearest ancestor that carries it.
fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node: &Dictionary = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Produce a new PDF containing `pages` (1-based) of `source`, in the given order.
pub fn extract(source: &[u8], pages: &[u32]) -> Result<Vec<u8>> {
    let doc = PdfDocument::from_bytes(source)?;
    let mut new_doc = doc.extract_pages(pages)?;
    PdfDocument::save_to_bytes(&mut new_doc)
}
