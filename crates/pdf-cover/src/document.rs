//! Source document inspection and I/O
//!
//! Page geometry is read straight from the page tree with lopdf so it is
//! available without a rasterizer. Attributes a page does not carry itself
//! are looked up through its `Parent` chain.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::geometry::Size;
use crate::types::*;
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// Page attributes a page may inherit from an ancestor `Pages` node
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guards against cyclic `Parent` links in malformed files
const MAX_TREE_DEPTH: usize = 64;

/// Displayed page sizes of a source document, in points
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentInfo {
    pub page_sizes: Vec<Size>,
}

impl DocumentInfo {
    pub fn from_document(doc: &Document) -> Self {
        let page_sizes = page_ids(doc)
            .into_iter()
            .map(|id| page_size(doc, id))
            .collect();
        Self { page_sizes }
    }

    /// Parse a PDF held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)?;
        Ok(Self::from_document(&doc))
    }

    pub fn page_count(&self) -> usize {
        self.page_sizes.len()
    }

    pub fn page_size(&self, page_index: usize) -> Option<Size> {
        self.page_sizes.get(page_index).copied()
    }
}

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}

/// Serialize a document to bytes
pub fn save_to_bytes(doc: &mut Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}

/// Page object ids in document order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Look up `key` on the page, falling back to its ancestors
pub(crate) fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Displayed size of a page in points, honouring `CropBox` and `Rotate`
pub fn page_size(doc: &Document, page_id: ObjectId) -> Size {
    let bounds = inherited_attribute(doc, page_id, b"CropBox")
        .and_then(|obj| resolve_box(doc, obj))
        .or_else(|| {
            inherited_attribute(doc, page_id, b"MediaBox").and_then(|obj| resolve_box(doc, obj))
        });

    let mut size = match bounds {
        Some([x1, y1, x2, y2]) => Size::new((x2 - x1).abs(), (y2 - y1).abs()),
        None => Size::new(DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1),
    };
    if size.is_degenerate() {
        size = Size::new(DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1);
    }

    let rotate = inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);
    if rotate.rem_euclid(180) == 90 {
        size = Size::new(size.height, size.width);
    }
    size
}

fn resolve_box(doc: &Document, obj: Object) -> Option<[f32; 4]> {
    let obj = match obj {
        Object::Reference(id) => doc.get_object(id).ok()?.clone(),
        other => other,
    };
    let values = obj.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut out = [0.0; 4];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = extract_number(value)?;
    }
    Some(out)
}

/// Extract numeric value from a PDF object
pub(crate) fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
