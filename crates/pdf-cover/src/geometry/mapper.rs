//! Conversion between the canonical container space and rendering targets
//!
//! Every projection goes through the background page's displayed rectangle:
//! a container point is first made relative to the page layout box, then
//! normalized to page fractions, then scaled into the target. Scaling
//! container pixels straight into the target would be wrong whenever the page
//! is letterboxed inside its container.

use crate::constants::FALLBACK_OVERLAY_FRACTION;

use super::{OverlayTransform, PageLayoutBox, Point, Rect, Size, ViewGeometry};

/// Constrain the top-left corner of an overlay of `overlay_size` so the whole
/// overlay stays inside `layout` inset by `padding`.
///
/// When the overlay does not fit, the lower bound wins and the overlay is
/// pinned to the padded top-left corner.
pub fn clamp_to_background(
    point: Point,
    overlay_size: Size,
    layout: &PageLayoutBox,
    padding: f32,
) -> Point {
    let min_x = layout.x + padding;
    let min_y = layout.y + padding;
    let max_x = layout.right() - padding - overlay_size.width;
    let max_y = layout.bottom() - padding - overlay_size.height;

    Point::new(
        clamp_min_wins(point.x, min_x, max_x),
        clamp_min_wins(point.y, min_y, max_y),
    )
}

fn clamp_min_wins(value: f32, min: f32, max: f32) -> f32 {
    // f32::clamp panics when min > max; here min simply takes precedence
    value.min(max).max(min)
}

/// Express a container point as fractions of the displayed page.
///
/// Returns `None` while the layout is degenerate.
pub fn normalize(point: Point, view: &ViewGeometry) -> Option<Point> {
    if !view.is_settled() {
        return None;
    }
    let layout = &view.layout;
    Some(Point::new(
        (point.x - layout.x) / layout.width,
        (point.y - layout.y) / layout.height,
    ))
}

/// Project a container point into a target of `export` size whose full extent
/// corresponds to the displayed background page.
pub fn to_export_space(container_point: Point, view: &ViewGeometry, export: Size) -> Point {
    match normalize(container_point, view) {
        Some(fraction) => Point::new(fraction.x * export.width, fraction.y * export.height),
        None => fallback_placement(export).origin(),
    }
}

/// Inverse of [`to_export_space`]
pub fn to_container_space(export_point: Point, view: &ViewGeometry, export: Size) -> Point {
    let layout = &view.layout;
    if export.is_degenerate() {
        return layout.origin();
    }
    Point::new(
        layout.x + export_point.x / export.width * layout.width,
        layout.y + export_point.y / export.height * layout.height,
    )
}

/// Overlay size in a target whose width corresponds to the background page
pub fn overlay_size_in_export(
    intrinsic_size: Size,
    scale: f32,
    view: &ViewGeometry,
    export_width: f32,
) -> Size {
    let factor = export_width / view.layout.width;
    intrinsic_size.scaled(scale * factor)
}

/// Map the overlay rectangle described by `transform` into a target of
/// `export` size.
///
/// Falls back to [`fallback_placement`] when the layout has not settled.
pub fn map_overlay(transform: &OverlayTransform, view: &ViewGeometry, export: Size) -> Rect {
    if !view.is_settled() {
        return fallback_placement(export);
    }
    let origin = to_export_space(transform.position(), view, export);
    let size = overlay_size_in_export(
        transform.intrinsic_size(),
        transform.scale(),
        view,
        export.width,
    );
    Rect::from_origin_size(origin, size)
}

/// Fixed placement used when the page layout is not measurable: the top-right
/// quadrant cell, a quarter of the target in each dimension.
pub fn fallback_placement(export: Size) -> Rect {
    let width = export.width * FALLBACK_OVERLAY_FRACTION;
    let height = export.height * FALLBACK_OVERLAY_FRACTION;
    Rect::new(export.width - width, 0.0, width, height)
}

/// A rectangle expressed as fractions of `target`
pub fn fractional_rect(rect: &Rect, target: Size) -> Rect {
    Rect::new(
        rect.x / target.width,
        rect.y / target.height,
        rect.width / target.width,
        rect.height / target.height,
    )
}
