use pdf_cover::PageRasterizer;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;

/// Builds a rasterizer over an uploaded PDF
pub type RasterizerFactory =
    Arc<dyn Fn(Vec<u8>) -> pdf_cover::Result<Arc<dyn PageRasterizer>> + Send + Sync>;

/// Shared handler state
pub struct AppState {
    pub config: AppConfig,
    rasterizer: Option<RasterizerFactory>,
}

impl AppState {
    /// State using PDFium for thumbnails when it is compiled in
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            rasterizer: default_rasterizer(),
        }
    }

    pub fn with_rasterizer(mut self, factory: RasterizerFactory) -> Self {
        self.rasterizer = Some(factory);
        self
    }

    pub fn without_rasterizer(mut self) -> Self {
        self.rasterizer = None;
        self
    }

    pub fn rasterizer(&self) -> Option<&RasterizerFactory> {
        self.rasterizer.as_ref()
    }

    /// Stored upload for `file_id`
    pub fn upload_path(&self, file_id: &uuid::Uuid) -> PathBuf {
        self.config
            .storage
            .upload_dir
            .join(format!("{}.pdf", file_id))
    }

    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.config.storage.output_dir.join(filename)
    }
}

#[cfg(feature = "pdfium")]
fn default_rasterizer() -> Option<RasterizerFactory> {
    Some(Arc::new(pdfium_rasterizer))
}

#[cfg(feature = "pdfium")]
fn pdfium_rasterizer(bytes: Vec<u8>) -> pdf_cover::Result<Arc<dyn PageRasterizer>> {
    let rasterizer = pdf_cover::raster::PdfiumRasterizer::from_bytes(bytes)?;
    Ok(Arc::new(rasterizer))
}

#[cfg(not(feature = "pdfium"))]
fn default_rasterizer() -> Option<RasterizerFactory> {
    None
}
