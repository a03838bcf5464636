//! Turning the current scene into a downloadable artifact
//!
//! Exports reuse the preview's [`Compositor`]; only the target size differs.
//! All exports write into one shared target buffer, so at most one export
//! runs at a time and a second request is turned away instead of queued.

mod document;
mod encode;

pub use encode::encode_image;

use crate::compose::{CompositionReport, CompositionRequest, Compositor, Scene};
use crate::constants::{DEFAULT_PAGE_DIMENSIONS, MAX_EXPORT_PIXELS, MAX_QUALITY_SCALE};
use crate::geometry::Size;
use crate::options::ExportOptions;
use crate::raster::PageRasterizer;
use crate::types::*;
use image::RgbaImage;
use std::sync::{Arc, Mutex, TryLockError};

/// Finished export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub kind: ExportKind,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub file_name: String,
    /// Pixel size of the composited raster
    pub width: u32,
    pub height: u32,
    pub report: CompositionReport,
}

/// Drives the compositor at export quality and encodes the result
#[derive(Clone)]
pub struct ExportPipeline {
    compositor: Compositor,
    options: ExportOptions,
    target: Arc<Mutex<RgbaImage>>,
}

impl ExportPipeline {
    pub fn new(rasterizer: Arc<dyn PageRasterizer>, options: ExportOptions) -> Self {
        let compositor = Compositor::new(rasterizer).with_shadow(options.shadow);
        Self {
            compositor,
            options,
            target: Arc::new(Mutex::new(RgbaImage::new(0, 0))),
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// The request an export of `kind` would compose.
    ///
    /// Quality scales above [`MAX_QUALITY_SCALE`] and targets larger than
    /// [`MAX_EXPORT_PIXELS`] are rejected before anything is allocated.
    pub fn request_for(
        &self,
        scene: &Scene,
        kind: ExportKind,
        quality_scale: Option<f32>,
    ) -> Result<CompositionRequest> {
        let quality = match quality_scale {
            Some(q) if q.is_finite() && q > 0.0 => q,
            Some(q) => {
                return Err(ComposeError::Config(format!(
                    "Quality scale must be a positive number, got {q}"
                )));
            }
            None => self.options.default_quality(kind),
        };
        if quality > MAX_QUALITY_SCALE {
            return Err(ComposeError::Config(format!(
                "Quality scale must be at most {MAX_QUALITY_SCALE}, got {quality}"
            )));
        }

        let page_size = self.background_size(scene);
        let target = page_size.scaled(quality);
        let pixels = f64::from(target.width.round()) * f64::from(target.height.round());
        if pixels > MAX_EXPORT_PIXELS as f64 {
            return Err(ComposeError::Config(format!(
                "Export of {:.0}x{:.0} pixels exceeds the limit of {MAX_EXPORT_PIXELS}",
                target.width, target.height
            )));
        }
        Ok(CompositionRequest::at_quality(scene, page_size, quality))
    }

    /// Export on the calling thread
    pub fn export_blocking(
        &self,
        scene: &Scene,
        kind: ExportKind,
        quality_scale: Option<f32>,
    ) -> Result<ExportArtifact> {
        let request = self.request_for(scene, kind, quality_scale)?;

        let mut target = match self.target.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(ComposeError::ExportInProgress),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        log::debug!(
            "Exporting {:?} at {}x{} (quality {})",
            kind,
            request.target_width,
            request.target_height,
            request.quality_scale
        );
        let report = self.compositor.compose_into(&request, &mut target);

        let (bytes, mime_type) = match kind {
            ExportKind::ScreenImage | ExportKind::HighFidelityImage => {
                let encoding = self.options.encoding;
                (encode::encode_image(&target, encoding)?, encoding.mime_type())
            }
            ExportKind::Document => (
                document::write_document(&target, self.background_size(scene), "Composite")?,
                "application/pdf",
            ),
        };

        Ok(ExportArtifact {
            kind,
            bytes,
            mime_type,
            file_name: kind.file_name(self.options.encoding),
            width: target.width(),
            height: target.height(),
            report,
        })
    }

    /// Export on the blocking thread pool
    pub async fn export_as(
        &self,
        scene: &Scene,
        kind: ExportKind,
        quality_scale: Option<f32>,
    ) -> Result<ExportArtifact> {
        let pipeline = self.clone();
        let scene = scene.clone();
        tokio::task::spawn_blocking(move || pipeline.export_blocking(&scene, kind, quality_scale))
            .await?
    }

    fn background_size(&self, scene: &Scene) -> Size {
        self.compositor
            .rasterizer()
            .page_size(scene.background_page)
            .unwrap_or(Size::new(DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1))
    }
}
