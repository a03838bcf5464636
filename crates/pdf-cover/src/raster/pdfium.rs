//! Rasterization backed by PDFium

use super::PageRasterizer;
use crate::document::DocumentInfo;
use crate::geometry::Size;
use crate::types::*;
use image::RgbaImage;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Environment variable naming a directory that holds the PDFium library
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Initialize Pdfium, trying the vendored library first, then an explicit
/// path from the environment, then the system library
pub fn init_pdfium() -> std::result::Result<Pdfium, PdfiumError> {
    // When running from cargo, the working directory is the workspace root
    let vendor_path = std::env::current_dir().ok().and_then(|mut p| {
        p.push("vendor/pdfium/lib");
        if p.exists() { Some(p) } else { None }
    });

    let env_path = std::env::var_os(PDFIUM_LIB_PATH_ENV).map(std::path::PathBuf::from);

    for dir in vendor_path.into_iter().chain(env_path) {
        if let Ok(binding) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
        {
            return Ok(Pdfium::new(binding));
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// Rasterizer over a PDF held in memory.
///
/// Page sizes come from lopdf when the rasterizer is built; PDFium is bound
/// per render call so the rasterizer can be shared across threads.
#[derive(Clone)]
pub struct PdfiumRasterizer {
    bytes: Arc<Vec<u8>>,
    info: DocumentInfo,
}

impl PdfiumRasterizer {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let info = DocumentInfo::from_bytes(&bytes)?;
        Ok(Self {
            bytes: Arc::new(bytes),
            info,
        })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn page_count(&self) -> usize {
        self.info.page_count()
    }

    fn page_size(&self, page_index: usize) -> Option<Size> {
        self.info.page_size(page_index)
    }

    fn render(&self, page_index: usize, scale: f32) -> Result<RgbaImage> {
        if page_index >= self.page_count() {
            return Err(ComposeError::PageOutOfRange {
                page: page_index,
                page_count: self.page_count(),
            });
        }
        let render_error = |err: PdfiumError| ComposeError::Render {
            page: page_index,
            message: err.to_string(),
        };

        let pdfium = init_pdfium().map_err(render_error)?;
        let document = pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .map_err(render_error)?;
        let page = document
            .pages()
            .get(page_index as u16)
            .map_err(render_error)?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page.render_with_config(&config).map_err(render_error)?;
        let width = bitmap.width() as u32;
        let height = bitmap.height() as u32;
        let rgba_data = bitmap.as_rgba_bytes().to_vec();

        RgbaImage::from_raw(width, height, rgba_data).ok_or_else(|| ComposeError::Render {
            page: page_index,
            message: format!("bitmap buffer does not match {width}x{height}"),
        })
    }
}
