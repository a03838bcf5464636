//! Assembling a new document from selected source pages
//!
//! Selected pages are copied in ascending order; the cover page, when given,
//! is inserted at an index derived from its [`CoverPlacement`] and the number
//! of pages that were actually copied.

mod copy;

use crate::document::{load_pdf, page_ids, save_to_bytes};
use crate::types::*;
use copy::PageCopier;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeSet;
use std::path::Path;

/// Which pages go into the merged document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeRequest {
    /// Zero-based citation page indices, in any order, duplicates allowed
    pub selected_pages: Vec<usize>,
    /// Zero-based cover page index
    pub cover_page: Option<usize>,
    pub placement: CoverPlacement,
}

impl MergeRequest {
    pub fn new(selected_pages: impl IntoIterator<Item = usize>) -> Self {
        Self {
            selected_pages: selected_pages.into_iter().collect(),
            cover_page: None,
            placement: CoverPlacement::default(),
        }
    }

    pub fn with_cover(mut self, cover_page: usize, placement: CoverPlacement) -> Self {
        self.cover_page = Some(cover_page);
        self.placement = placement;
        self
    }
}

/// Source page indices in output order, assuming every copy succeeds
pub fn plan_page_order(request: &MergeRequest, page_count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = in_range_selection(request, page_count);
    if let Some(cover) = request.cover_page.filter(|&c| c < page_count) {
        let index = request.placement.insertion_index(order.len());
        order.insert(index, cover);
    }
    order
}

fn in_range_selection(request: &MergeRequest, page_count: usize) -> Vec<usize> {
    let unique: BTreeSet<usize> = request.selected_pages.iter().copied().collect();
    unique
        .into_iter()
        .filter(|&page| {
            let keep = page < page_count;
            if !keep {
                log::debug!("Skipping page {page}: document has {page_count} pages");
            }
            keep
        })
        .collect()
}

/// Build a new document from `source` according to `request`
pub fn merge(source: &Document, request: &MergeRequest) -> Result<Document> {
    if request.selected_pages.is_empty() {
        return Err(ComposeError::EmptySelection);
    }

    let source_pages = page_ids(source);
    let page_count = source_pages.len();

    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();

    let mut copier = PageCopier::new(source, &mut output);
    let mut page_refs = Vec::new();
    for page in in_range_selection(request, page_count) {
        if let Some(id) = copy_or_skip(&mut copier, &source_pages, page, pages_tree_id) {
            page_refs.push(Object::Reference(id));
        }
    }

    match request.cover_page {
        Some(cover) if cover < page_count => {
            if let Some(id) = copy_or_skip(&mut copier, &source_pages, cover, pages_tree_id) {
                let index = request.placement.insertion_index(page_refs.len());
                page_refs.insert(index, Object::Reference(id));
            }
        }
        Some(cover) => {
            log::debug!("Skipping cover page {cover}: document has {page_count} pages");
        }
        None => {}
    }

    if page_refs.is_empty() {
        return Err(ComposeError::NoPages);
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

fn copy_or_skip(
    copier: &mut PageCopier<'_>,
    source_pages: &[ObjectId],
    page: usize,
    parent_id: ObjectId,
) -> Option<ObjectId> {
    match copier.copy_page(source_pages[page], parent_id) {
        Ok(id) => Some(id),
        Err(err) => {
            log::warn!("Skipping page {page}: copy failed: {err}");
            None
        }
    }
}

/// Merge a PDF held in memory and serialize the result
pub fn merge_to_bytes(source: &[u8], request: &MergeRequest) -> Result<Vec<u8>> {
    if request.selected_pages.is_empty() {
        return Err(ComposeError::EmptySelection);
    }
    let source = Document::load_mem(source)?;
    let mut output = merge(&source, request)?;
    save_to_bytes(&mut output)
}

/// Merge a PDF on disk; parsing, copying and writing run off the async
/// executor
pub async fn merge_file(path: impl AsRef<Path>, request: &MergeRequest) -> Result<Vec<u8>> {
    if request.selected_pages.is_empty() {
        return Err(ComposeError::EmptySelection);
    }
    let source = load_pdf(path).await?;
    let request = request.clone();
    tokio::task::spawn_blocking(move || {
        let mut output = merge(&source, &request)?;
        save_to_bytes(&mut output)
    })
    .await?
}
