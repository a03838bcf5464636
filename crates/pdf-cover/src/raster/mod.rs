//! Page rasterization
//!
//! The compositor only needs three things from a document: how many pages it
//! has, how large each page is and an RGBA bitmap of a page at a given scale.
//! [`PageRasterizer`] captures exactly that so the compositing and export code
//! can be driven by any backend, including solid-colour fakes in tests.

#[cfg(feature = "pdfium")]
mod pdfium;

#[cfg(feature = "pdfium")]
pub use pdfium::{PdfiumRasterizer, init_pdfium};

use crate::geometry::Size;
use crate::types::Result;
use image::RgbaImage;

/// Source of page bitmaps
pub trait PageRasterizer: Send + Sync {
    fn page_count(&self) -> usize;

    /// Page size in points, or `None` when the index is out of range
    fn page_size(&self, page_index: usize) -> Option<Size>;

    /// Render a page at `scale` device pixels per point
    fn render(&self, page_index: usize, scale: f32) -> Result<RgbaImage>;

    /// Render a page so its width is `width` pixels
    fn render_to_width(&self, page_index: usize, width: u32) -> Result<RgbaImage> {
        let size = self
            .page_size(page_index)
            .ok_or(crate::types::ComposeError::PageOutOfRange {
                page: page_index,
                page_count: self.page_count(),
            })?;
        self.render(page_index, width as f32 / size.width)
    }
}
