//! Stand-in drawn where a page could not be rasterized

use crate::constants::{PLACEHOLDER_FILL, PLACEHOLDER_STROKE};
use crate::geometry::Rect;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};

/// A page that was replaced by a placeholder during composition
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placeholder {
    /// Zero-based page index
    pub page: usize,
    /// Human readable label, e.g. "page 4 unavailable"
    pub label: String,
    /// Why rasterization failed
    pub reason: String,
}

impl Placeholder {
    pub fn new(page: usize, reason: impl Into<String>) -> Self {
        Self {
            page,
            label: format!("page {} unavailable", page + 1),
            reason: reason.into(),
        }
    }
}

/// Light grey box with a dark border and a diagonal cross.
///
/// No text is drawn; the [`Placeholder::label`] reaches callers through the
/// [`CompositionReport`](crate::compose::CompositionReport) and the log.
pub(crate) fn draw_placeholder(target: &mut RgbaImage, rect: &Rect) {
    let x = rect.x.round() as i32;
    let y = rect.y.round() as i32;
    let width = rect.width.round() as i64;
    let height = rect.height.round() as i64;
    if width <= 0 || height <= 0 {
        return;
    }
    let area = imageproc::rect::Rect::at(x, y).of_size(width as u32, height as u32);

    draw_filled_rect_mut(target, area, Rgba(PLACEHOLDER_FILL));
    draw_hollow_rect_mut(target, area, Rgba(PLACEHOLDER_STROKE));

    let (left, top) = (x as f32, y as f32);
    let (right, bottom) = (left + width as f32 - 1.0, top + height as f32 - 1.0);
    draw_line_segment_mut(target, (left, top), (right, bottom), Rgba(PLACEHOLDER_STROKE));
    draw_line_segment_mut(target, (right, top), (left, bottom), Rgba(PLACEHOLDER_STROKE));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_one_based() {
        assert_eq!(Placeholder::new(3, "boom").label, "page 4 unavailable");
    }

    #[test]
    fn draws_fill_border_and_cross() {
        let mut target = RgbaImage::from_pixel(50, 50, Rgba([255, 255, 255, 255]));
        draw_placeholder(&mut target, &Rect::new(10.0, 10.0, 21.0, 21.0));

        assert_eq!(target.get_pixel(10, 10).0, PLACEHOLDER_STROKE);
        assert_eq!(target.get_pixel(20, 20).0, PLACEHOLDER_STROKE);
        assert_eq!(target.get_pixel(14, 12).0, PLACEHOLDER_FILL);
        assert_eq!(target.get_pixel(5, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn empty_rect_is_ignored() {
        let mut target = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        draw_placeholder(&mut target, &Rect::new(2.0, 2.0, 0.0, 5.0));
        assert!(target.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }
}
