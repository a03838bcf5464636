use crate::merge::MergeRequest;
use crate::types::CoverPlacement;
use std::collections::BTreeSet;

/// Citation pages plus at most one cover page. A page may be both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    citations: BTreeSet<usize>,
    cover: Option<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a page in or out of the citation set; returns whether it is now
    /// selected
    pub fn toggle_citation(&mut self, page: usize) -> bool {
        if self.citations.remove(&page) {
            false
        } else {
            self.citations.insert(page);
            true
        }
    }

    pub fn is_citation(&self, page: usize) -> bool {
        self.citations.contains(&page)
    }

    /// Citation pages in ascending order
    pub fn citations(&self) -> impl Iterator<Item = usize> + '_ {
        self.citations.iter().copied()
    }

    pub fn citation_count(&self) -> usize {
        self.citations.len()
    }

    pub fn cover(&self) -> Option<usize> {
        self.cover
    }

    pub fn set_cover(&mut self, page: Option<usize>) {
        self.cover = page;
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty() && self.cover.is_none()
    }

    pub fn clear(&mut self) {
        self.citations.clear();
        self.cover = None;
    }

    pub fn to_merge_request(&self, placement: CoverPlacement) -> MergeRequest {
        MergeRequest {
            selected_pages: self.citations().collect(),
            cover_page: self.cover,
            placement,
        }
    }
}
