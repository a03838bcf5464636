//! Per-document composition state
//!
//! [`CompositionSession`] ties the selection, the overlay transform and the
//! current view geometry together and produces the requests the compositor,
//! export pipeline and merge engine consume. It takes plain values only, so
//! any front end (GUI, CLI, HTTP) can drive it.

use crate::compose::{CompositionRequest, Scene};
use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::document::DocumentInfo;
use crate::geometry::{OverlayTransform, PageLayoutBox, Size, TransformLimits, ViewGeometry};
use crate::merge::MergeRequest;
use crate::options::ExportOptions;
use crate::selection::Selection;
use crate::types::*;

#[derive(Debug, Clone)]
pub struct CompositionSession {
    info: DocumentInfo,
    selection: Selection,
    transform: Option<OverlayTransform>,
    view: ViewGeometry,
    background_page: Option<usize>,
    limits: TransformLimits,
}

impl CompositionSession {
    pub fn new(info: DocumentInfo, limits: TransformLimits) -> Self {
        Self {
            info,
            selection: Selection::new(),
            transform: None,
            view: ViewGeometry::default(),
            background_page: None,
            limits,
        }
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn transform(&self) -> Option<&OverlayTransform> {
        self.transform.as_ref()
    }

    pub fn view(&self) -> &ViewGeometry {
        &self.view
    }

    /// Citation page currently previewed under the cover
    pub fn background_page(&self) -> Option<usize> {
        self.background_page
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Flip a page in or out of the citation set; returns whether it is now
    /// selected. The first citation becomes the previewed background.
    pub fn toggle_citation(&mut self, page: usize) -> Result<bool> {
        self.check_page(page)?;
        let selected = self.selection.toggle_citation(page);
        if selected && self.background_page.is_none() {
            self.background_page = Some(page);
        } else if !selected && self.background_page == Some(page) {
            self.background_page = self.selection.citations().next();
        }
        Ok(selected)
    }

    /// Preview a different citation page under the cover
    pub fn set_background(&mut self, page: usize) -> Result<()> {
        self.check_page(page)?;
        self.background_page = Some(page);
        Ok(())
    }

    /// Choose the cover page. Any previous placement is discarded and the
    /// overlay starts at its default position.
    pub fn set_cover(&mut self, page: usize) -> Result<()> {
        self.check_page(page)?;
        let intrinsic = self.page_size(page);
        self.selection.set_cover(Some(page));

        let mut transform = OverlayTransform::new(intrinsic, self.limits);
        if self.view.is_settled() {
            transform.reset(&self.view.layout);
        }
        self.transform = Some(transform);
        Ok(())
    }

    pub fn clear_cover(&mut self) {
        self.selection.set_cover(None);
        self.transform = None;
    }

    /// Forget everything tied to the loaded document
    pub fn unload(&mut self) {
        self.selection.clear();
        self.transform = None;
        self.background_page = None;
        self.view = ViewGeometry::default();
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Record where the background page is now displayed
    pub fn set_layout(&mut self, container: Size, layout: PageLayoutBox) {
        let previous = self.view.layout;
        self.view = ViewGeometry::new(container, layout);
        if let Some(transform) = self.transform.as_mut() {
            transform.on_layout_changed(&previous, &layout);
        }
    }

    /// Fit the background page into `container` and record the result
    pub fn fit_to_container(&mut self, container: Size) {
        let page_size = self
            .background_page
            .map(|page| self.page_size(page))
            .unwrap_or(Size::new(DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1));
        let fitted = ViewGeometry::fitted(container, page_size);
        self.set_layout(fitted.container, fitted.layout);
    }

    // =========================================================================
    // Gestures (no-ops while no cover is chosen)
    // =========================================================================

    pub fn move_overlay(&mut self, x: f32, y: f32) {
        let layout = self.view.layout;
        if let Some(transform) = self.transform.as_mut() {
            transform.set_position(x, y, &layout);
        }
    }

    pub fn drag_overlay(&mut self, dx: f32, dy: f32) {
        let layout = self.view.layout;
        if let Some(transform) = self.transform.as_mut() {
            transform.drag_by(dx, dy, &layout);
        }
    }

    pub fn scale_overlay(&mut self, scale: f32) {
        let layout = self.view.layout;
        if let Some(transform) = self.transform.as_mut() {
            transform.set_scale(scale, &layout);
        }
    }

    pub fn zoom_overlay(&mut self, factor: f32) {
        let layout = self.view.layout;
        if let Some(transform) = self.transform.as_mut() {
            transform.zoom_by(factor, &layout);
        }
    }

    pub fn reset_overlay(&mut self) {
        let layout = self.view.layout;
        if let Some(transform) = self.transform.as_mut() {
            transform.reset(&layout);
        }
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Snapshot of what is on screen
    pub fn scene(&self) -> Result<Scene> {
        let background_page = self.background_page.ok_or(ComposeError::EmptySelection)?;
        let overlay_page = self.selection.cover().ok_or(ComposeError::NoCover)?;
        let transform = self.transform.clone().ok_or(ComposeError::NoCover)?;
        Ok(Scene {
            background_page,
            overlay_page,
            transform,
            view: self.view,
        })
    }

    pub fn composition_request(
        &self,
        target_width: u32,
        target_height: u32,
        quality_scale: f32,
    ) -> Result<CompositionRequest> {
        Ok(CompositionRequest::from_scene(
            &self.scene()?,
            target_width,
            target_height,
            quality_scale,
        ))
    }

    /// Request sized for an export of `kind`; `None` uses the kind's default
    /// quality
    pub fn export_request(
        &self,
        kind: ExportKind,
        quality_scale: Option<f32>,
    ) -> Result<CompositionRequest> {
        let scene = self.scene()?;
        let quality =
            quality_scale.unwrap_or_else(|| ExportOptions::default().default_quality(kind));
        let page_size = self.page_size(scene.background_page);
        Ok(CompositionRequest::at_quality(&scene, page_size, quality))
    }

    pub fn merge_request(&self, placement: CoverPlacement) -> Result<MergeRequest> {
        if self.selection.citation_count() == 0 {
            return Err(ComposeError::EmptySelection);
        }
        Ok(self.selection.to_merge_request(placement))
    }

    fn check_page(&self, page: usize) -> Result<()> {
        if page < self.info.page_count() {
            Ok(())
        } else {
            Err(ComposeError::PageOutOfRange {
                page,
                page_count: self.info.page_count(),
            })
        }
    }

    fn page_size(&self, page: usize) -> Size {
        self.info
            .page_size(page)
            .unwrap_or(Size::new(DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1))
    }
}
