//! Layering a background page and a cover overlay into one raster
//!
//! Preview and export share this code path: both build a
//! [`CompositionRequest`] and hand it to a [`Compositor`]. Every page is
//! rasterized at the resolution it is drawn at, so a larger target means a
//! sharper page, never an upscaled bitmap.

mod placeholder;
mod shadow;

pub use placeholder::Placeholder;
pub use shadow::ShadowStyle;

use crate::constants::{DEFAULT_PAGE_HEIGHT_PT, DEFAULT_PAGE_WIDTH_PT};
use crate::geometry::{OverlayTransform, Rect, Size, ViewGeometry, map_overlay};
use crate::raster::PageRasterizer;
use image::{Rgba, RgbaImage, imageops};
use placeholder::draw_placeholder;
use shadow::draw_shadow;
use std::sync::Arc;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// What the user currently sees: which pages are layered and how
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scene {
    pub background_page: usize,
    pub overlay_page: usize,
    pub transform: OverlayTransform,
    pub view: ViewGeometry,
}

/// Everything needed to produce one composite
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositionRequest {
    pub background_page: usize,
    pub overlay_page: usize,
    pub transform: OverlayTransform,
    pub view: ViewGeometry,
    pub target_width: u32,
    pub target_height: u32,
    /// Rasterization multiplier the target was sized with
    pub quality_scale: f32,
}

impl CompositionRequest {
    pub fn from_scene(
        scene: &Scene,
        target_width: u32,
        target_height: u32,
        quality_scale: f32,
    ) -> Self {
        Self {
            background_page: scene.background_page,
            overlay_page: scene.overlay_page,
            transform: scene.transform.clone(),
            view: scene.view,
            target_width: target_width.max(1),
            target_height: target_height.max(1),
            quality_scale,
        }
    }

    /// Target matching the displayed page at the given device pixel ratio
    pub fn for_preview(scene: &Scene, device_pixel_ratio: f32) -> Self {
        let shown = if scene.view.is_settled() {
            scene.view.layout.size()
        } else {
            scene.view.container
        };
        let size = shown.scaled(device_pixel_ratio);
        Self::from_scene(
            scene,
            size.width.round() as u32,
            size.height.round() as u32,
            device_pixel_ratio,
        )
    }

    /// Target sized to the background page in points times `quality_scale`
    pub fn at_quality(scene: &Scene, page_size: Size, quality_scale: f32) -> Self {
        let size = page_size.scaled(quality_scale);
        Self::from_scene(
            scene,
            size.width.round() as u32,
            size.height.round() as u32,
            quality_scale,
        )
    }

    pub fn target_size(&self) -> Size {
        Size::new(self.target_width as f32, self.target_height as f32)
    }
}

/// Where things ended up in a composite
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositionReport {
    /// Rectangle the background page was drawn into
    pub background: Rect,
    /// Rectangle the overlay was drawn into
    pub overlay: Rect,
    /// Pages replaced by placeholders
    pub placeholders: Vec<Placeholder>,
}

impl CompositionReport {
    pub fn is_complete(&self) -> bool {
        self.placeholders.is_empty()
    }
}

/// Renders [`CompositionRequest`]s with a shared rasterizer
#[derive(Clone)]
pub struct Compositor {
    rasterizer: Arc<dyn PageRasterizer>,
    shadow: ShadowStyle,
}

impl Compositor {
    pub fn new(rasterizer: Arc<dyn PageRasterizer>) -> Self {
        Self {
            rasterizer,
            shadow: ShadowStyle::default(),
        }
    }

    pub fn with_shadow(mut self, shadow: ShadowStyle) -> Self {
        self.shadow = shadow;
        self
    }

    pub fn rasterizer(&self) -> &Arc<dyn PageRasterizer> {
        &self.rasterizer
    }

    pub fn shadow(&self) -> &ShadowStyle {
        &self.shadow
    }

    /// Compose into a freshly allocated image
    pub fn compose(&self, request: &CompositionRequest) -> (RgbaImage, CompositionReport) {
        let mut target = RgbaImage::new(request.target_width, request.target_height);
        let report = self.compose_into(request, &mut target);
        (target, report)
    }

    /// Compose into `target`, reallocating it only when the size changed
    pub fn compose_into(
        &self,
        request: &CompositionRequest,
        target: &mut RgbaImage,
    ) -> CompositionReport {
        if target.dimensions() != (request.target_width, request.target_height) {
            *target = RgbaImage::new(request.target_width, request.target_height);
        }
        for pixel in target.pixels_mut() {
            *pixel = WHITE;
        }

        let mut report = CompositionReport::default();
        let target_size = request.target_size();

        // Background: full target width, aspect preserved, centred vertically
        let page_size = self
            .rasterizer
            .page_size(request.background_page)
            .unwrap_or(target_size);
        let background_scale = target_size.width / page_size.width;
        let drawn_height = page_size.height * background_scale;
        report.background = Rect::new(
            0.0,
            (target_size.height - drawn_height) / 2.0,
            target_size.width,
            drawn_height,
        );
        self.draw_page(
            target,
            request.background_page,
            background_scale,
            &report.background.clone(),
            &mut report,
        );

        // Overlay: mapped through the drawn background rectangle
        let mapped = map_overlay(&request.transform, &request.view, report.background.size())
            .translated(report.background.x, report.background.y);
        report.overlay = mapped;

        let factor = if request.view.is_settled() {
            target_size.width / request.view.layout.width
        } else {
            1.0
        };
        draw_shadow(target, &mapped, &self.shadow.scaled(factor));

        let overlay_scale = match self.rasterizer.page_size(request.overlay_page) {
            Some(size) if !size.is_degenerate() => mapped.width / size.width,
            _ => request.transform.scale() * factor,
        };
        self.draw_page(target, request.overlay_page, overlay_scale, &mapped, &mut report);

        report
    }

    /// Rasterize `page` at `scale` and draw it into `rect`, or draw a
    /// placeholder there when rasterization fails
    fn draw_page(
        &self,
        target: &mut RgbaImage,
        page: usize,
        scale: f32,
        rect: &Rect,
        report: &mut CompositionReport,
    ) {
        let width = rect.width.round().max(1.0) as u32;
        let height = rect.height.round().max(1.0) as u32;

        match self.rasterizer.render(page, scale) {
            Ok(mut bitmap) => {
                // Sub-pixel rounding only; the bitmap was rendered at this size
                if bitmap.dimensions() != (width, height) {
                    bitmap =
                        imageops::resize(&bitmap, width, height, imageops::FilterType::Triangle);
                }
                imageops::overlay(target, &bitmap, rect.x.round() as i64, rect.y.round() as i64);
            }
            Err(err) => {
                let placeholder = Placeholder::new(page, err.to_string());
                log::warn!("{}: {}", placeholder.label, placeholder.reason);
                draw_placeholder(target, rect);
                report.placeholders.push(placeholder);
            }
        }
    }
}

/// Render a single page to `width` pixels, substituting a placeholder image
/// when rasterization fails
pub fn render_thumbnail(
    rasterizer: &dyn PageRasterizer,
    page: usize,
    width: u32,
) -> (RgbaImage, Option<Placeholder>) {
    match rasterizer.render_to_width(page, width) {
        Ok(bitmap) => (bitmap, None),
        Err(err) => {
            let page_size = rasterizer
                .page_size(page)
                .unwrap_or(Size::new(DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT));
            let height = (width as f32 * page_size.height / page_size.width).round().max(1.0) as u32;
            let mut image = RgbaImage::from_pixel(width.max(1), height, WHITE);
            draw_placeholder(&mut image, &Rect::new(0.0, 0.0, width as f32, height as f32));
            let placeholder = Placeholder::new(page, err.to_string());
            log::warn!("{}: {}", placeholder.label, placeholder.reason);
            (image, Some(placeholder))
        }
    }
}
