//! Template documents
//!
//! A template is decoded once per run and shared read-only between rows.
//! Every row gets its own [`Template::fresh_copy`].

mod copy;

pub use copy::{copy_object_deep, get_page_dimensions};

use crate::types::*;
use copy::{copy_page, page_tree_nodes};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use std::path::Path;

/// Page size in points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// A decoded template PDF
#[derive(Debug, Clone)]
pub struct Template {
    doc: Document,
    page_ids: Vec<ObjectId>,
    page_sizes: Vec<PageSize>,
}

impl Template {
    /// Load a template from disk
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let bytes = tokio::fs::read(&path).await?;
        Self::from_bytes(bytes).await
    }

    /// Decode template bytes on the blocking pool
    pub async fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::decode(&bytes)).await?
    }

    /// Decode template bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| FieldMapError::Template(e.to_string()))?;
        Self::from_document(doc)
    }

    pub fn from_document(doc: Document) -> Result<Self> {
        let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        if page_ids.is_empty() {
            return Err(FieldMapError::Template("document has no pages".to_string()));
        }

        let page_sizes = page_ids
            .iter()
            .map(|&id| {
                let (width, height) = get_page_dimensions(&doc, id);
                PageSize { width, height }
            })
            .collect();

        Ok(Self {
            doc,
            page_ids,
            page_sizes,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Size of a 1-based page
    pub fn page_size(&self, page: u32) -> Option<PageSize> {
        let index = (page as usize).checked_sub(1)?;
        self.page_sizes.get(index).copied()
    }

    pub fn page_sizes(&self) -> &[PageSize] {
        &self.page_sizes
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Build a new document holding a copy of every template page, in order.
    ///
    /// Nothing outside the page tree (outlines, forms, metadata) is carried.
    pub fn fresh_copy(&self) -> Result<Document> {
        let source = &self.doc;
        let mut output = Document::with_version(source.version.clone());
        let pages_tree_id = output.new_object_id();
        let mut cache: HashMap<ObjectId, ObjectId> = HashMap::new();

        // References to any page tree node resolve to the new root, and
        // references to pages (link destinations, annotation back-pointers)
        // resolve to their copies.
        for node_id in page_tree_nodes(source, &self.page_ids) {
            cache.insert(node_id, pages_tree_id);
        }
        let new_page_ids: Vec<ObjectId> = self
            .page_ids
            .iter()
            .map(|&id| {
                let new_id = output.new_object_id();
                cache.insert(id, new_id);
                new_id
            })
            .collect();

        let mut page_refs = Vec::with_capacity(new_page_ids.len());
        for (&page_id, &new_id) in self.page_ids.iter().zip(&new_page_ids) {
            let page_dict = copy_page(&mut output, source, page_id, pages_tree_id, &mut cache)?;
            output.objects.insert(new_id, Object::Dictionary(page_dict));
            page_refs.push(Object::Reference(new_id));
        }

        // Create pages tree
        let count = page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        output
            .objects
            .insert(pages_tree_id, Object::Dictionary(pages_dict));

        // Create catalog
        let catalog_id = output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_tree_id)),
        ]));

        output.trailer.set("Root", catalog_id);

        Ok(output)
    }
}
