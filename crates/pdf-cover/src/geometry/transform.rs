//! The overlay transform model
//!
//! A single [`OverlayTransform`] is the source of truth for where the cover
//! sits over the citation page. Its position lives in container pixels; every
//! mutation is clamped against the page layout box passed in by the caller,
//! so a layout that changed between two calls can never leave a stale,
//! out-of-bounds placement behind.

use crate::constants::{DEFAULT_OVERLAY_SCALE, MAX_OVERLAY_SCALE, MIN_OVERLAY_SCALE, OVERLAY_PADDING};

use super::mapper::clamp_to_background;
use super::{PageLayoutBox, Point, Rect, Size};

/// Bounds applied to overlay placement
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformLimits {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Scale used by [`OverlayTransform::reset`]
    pub default_scale: f32,
    /// Inset from every edge of the displayed page
    pub padding: f32,
}

impl Default for TransformLimits {
    fn default() -> Self {
        Self {
            min_scale: MIN_OVERLAY_SCALE,
            max_scale: MAX_OVERLAY_SCALE,
            default_scale: DEFAULT_OVERLAY_SCALE,
            padding: OVERLAY_PADDING,
        }
    }
}

/// Position and scale of the cover overlay in container space
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverlayTransform {
    position: Point,
    scale: f32,
    intrinsic_size: Size,
    display_size: Size,
    limits: TransformLimits,
}

impl OverlayTransform {
    /// Unplaced transform at the default scale; call [`reset`](Self::reset)
    /// once a layout is known.
    pub fn new(intrinsic_size: Size, limits: TransformLimits) -> Self {
        let scale = limits.default_scale;
        Self {
            position: Point::default(),
            scale,
            intrinsic_size,
            display_size: intrinsic_size.scaled(scale),
            limits,
        }
    }

    /// Transform already placed at the default position for `layout`
    pub fn placed(intrinsic_size: Size, limits: TransformLimits, layout: &PageLayoutBox) -> Self {
        let mut transform = Self::new(intrinsic_size, limits);
        transform.reset(layout);
        transform
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn intrinsic_size(&self) -> Size {
        self.intrinsic_size
    }

    pub fn display_size(&self) -> Size {
        self.display_size
    }

    pub fn limits(&self) -> &TransformLimits {
        &self.limits
    }

    /// The overlay rectangle in container space
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.display_size)
    }

    /// Move the overlay. Out-of-range requests are clamped, never rejected.
    pub fn set_position(&mut self, x: f32, y: f32, layout: &PageLayoutBox) {
        let requested = Point::new(
            if x.is_finite() { x } else { self.position.x },
            if y.is_finite() { y } else { self.position.y },
        );
        self.position =
            clamp_to_background(requested, self.display_size, layout, self.limits.padding);
    }

    /// Change the scale, keeping the top-left corner where it is when possible
    pub fn set_scale(&mut self, scale: f32, layout: &PageLayoutBox) {
        if !scale.is_finite() {
            return;
        }
        self.scale = self.clamp_scale(scale, layout);
        self.display_size = self.intrinsic_size.scaled(self.scale);
        let position = self.position;
        self.set_position(position.x, position.y, layout);
    }

    /// Default placement: top-right corner of the page, inset by the padding,
    /// at the default scale
    pub fn reset(&mut self, layout: &PageLayoutBox) {
        self.scale = self.clamp_scale(self.limits.default_scale, layout);
        self.display_size = self.intrinsic_size.scaled(self.scale);
        let x = layout.right() - self.limits.padding - self.display_size.width;
        let y = layout.y + self.limits.padding;
        self.set_position(x, y, layout);
    }

    /// Pointer drag by a container-space delta
    pub fn drag_by(&mut self, dx: f32, dy: f32, layout: &PageLayoutBox) {
        let position = self.position;
        self.set_position(position.x + dx, position.y + dy, layout);
    }

    /// Multiply the current scale, as a wheel or pinch gesture does
    pub fn zoom_by(&mut self, factor: f32, layout: &PageLayoutBox) {
        if factor > 0.0 {
            self.set_scale(self.scale * factor, layout);
        }
    }

    /// Re-express the placement after the page layout box moved or resized.
    ///
    /// The overlay keeps its location and size relative to the page, so the
    /// composite rendered afterwards is unchanged.
    pub fn on_layout_changed(&mut self, previous: &PageLayoutBox, current: &PageLayoutBox) {
        if previous.is_degenerate() {
            self.reset(current);
            return;
        }
        if current.is_degenerate() {
            return;
        }
        let fx = (self.position.x - previous.x) / previous.width;
        let fy = (self.position.y - previous.y) / previous.height;
        let ratio = current.width / previous.width;

        self.scale = self.clamp_scale(self.scale * ratio, current);
        self.display_size = self.intrinsic_size.scaled(self.scale);
        self.set_position(
            current.x + fx * current.width,
            current.y + fy * current.height,
            current,
        );
    }

    /// Clamp to the configured range and to the largest scale that still fits
    /// inside the padded page. `min_scale` wins when the two conflict.
    fn clamp_scale(&self, scale: f32, layout: &PageLayoutBox) -> f32 {
        let mut max = self.limits.max_scale;
        let available = layout.inset(self.limits.padding);
        if !self.intrinsic_size.is_degenerate() && !layout.is_degenerate() {
            let fit = (available.width / self.intrinsic_size.width)
                .min(available.height / self.intrinsic_size.height);
            max = max.min(fit);
        }
        scale.min(max).max(self.limits.min_scale)
    }
}
