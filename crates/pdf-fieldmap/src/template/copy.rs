//! Page copying between documents
//!
//! Pages are copied by value into a fresh output document so that stamping
//! one output never touches the shared template.

use crate::constants::{DEFAULT_PAGE_DIMENSIONS, MAX_INHERITANCE_DEPTH};
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{HashMap, HashSet};

/// Page attributes a page may inherit from its `Pages` ancestors
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page keys that point into document-level structures which are not copied
const SKIPPED_PAGE_KEYS: [&[u8]; 3] = [b"Parent", b"B", b"StructParents"];

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// The target id of a reference is reserved before its body is copied, so
/// reference cycles (annotation `/P` back-pointers and the like) terminate.
/// Dangling references become `null`.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let copied = match source.get_object(*id) {
                Ok(referenced) => copy_object_deep(output, source, referenced, cache)?,
                Err(_) => Object::Null,
            };
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

// =============================================================================
// Page Copy
// =============================================================================

/// Copy one page dictionary, re-parented under `parent_id`.
///
/// Inherited attributes are materialized on the copy because the source
/// page tree is not carried over.
pub fn copy_page(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    parent_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let page_dict = source.get_dictionary(page_id)?;

    let mut new_dict = Dictionary::new();
    for (key, value) in page_dict.iter() {
        if SKIPPED_PAGE_KEYS.contains(&key.as_slice()) {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }

    for key in INHERITABLE_KEYS {
        if page_dict.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(source, page_id, key) {
            new_dict.set(key.to_vec(), copy_object_deep(output, source, &value, cache)?);
        }
    }

    new_dict.set("Parent", Object::Reference(parent_id));
    Ok(new_dict)
}

/// Look up `key` on the ancestors of a page
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_INHERITANCE_DEPTH {
        let parent_id = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        let parent = doc.get_dictionary(parent_id).ok()?;
        if let Ok(value) = parent.get(key) {
            return Some(value.clone());
        }
        current = parent;
    }

    None
}

/// All `Pages` nodes above the given pages
pub fn page_tree_nodes(doc: &Document, page_ids: &[ObjectId]) -> HashSet<ObjectId> {
    let mut nodes = HashSet::new();

    for &page_id in page_ids {
        let mut current = page_id;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            let parent = doc
                .get_dictionary(current)
                .and_then(|d| d.get(b"Parent"))
                .and_then(Object::as_reference);
            match parent {
                Ok(parent_id) if nodes.insert(parent_id) => current = parent_id,
                _ => break,
            }
        }
    }

    nodes
}

// =============================================================================
// Page Dimensions
// =============================================================================

/// Get page dimensions (width, height) in points, following inheritance
pub fn get_page_dimensions(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let media_box = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|d| d.get(b"MediaBox").ok().cloned())
        .or_else(|| inherited_attribute(doc, page_id, b"MediaBox"));

    let media_box = match media_box {
        Some(Object::Reference(id)) => doc.get_object(id).ok().cloned(),
        other => other,
    };

    match media_box {
        Some(Object::Array(mb)) if mb.len() >= 4 => {
            let coords: Vec<Option<f32>> = mb.iter().take(4).map(extract_number).collect();
            match (coords[0], coords[1], coords[2], coords[3]) {
                (Some(x1), Some(y1), Some(x2), Some(y2)) => ((x2 - x1).abs(), (y2 - y1).abs()),
                _ => DEFAULT_PAGE_DIMENSIONS,
            }
        }
        _ => DEFAULT_PAGE_DIMENSIONS,
    }
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
