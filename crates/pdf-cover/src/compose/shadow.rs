//! Drop shadow drawn beneath the overlay

use crate::constants::{SHADOW_BLUR_RADIUS, SHADOW_COLOR, SHADOW_OFFSET_X, SHADOW_OFFSET_Y};
use crate::geometry::Rect;
use image::{Rgba, RgbaImage, imageops};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::filter::gaussian_blur_f32;

/// Shadow parameters in preview pixels
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShadowStyle {
    pub color: [u8; 4],
    pub blur_radius: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            color: SHADOW_COLOR,
            blur_radius: SHADOW_BLUR_RADIUS,
            offset_x: SHADOW_OFFSET_X,
            offset_y: SHADOW_OFFSET_Y,
        }
    }
}

impl ShadowStyle {
    /// No shadow at all
    pub fn none() -> Self {
        Self {
            color: [0, 0, 0, 0],
            blur_radius: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Blur and offset scaled for a target `factor` times larger than the
    /// preview
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            color: self.color,
            blur_radius: self.blur_radius * factor,
            offset_x: self.offset_x * factor,
            offset_y: self.offset_y * factor,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.color[3] > 0
    }
}

/// Composite a blurred shadow for `rect` onto `target`
pub(crate) fn draw_shadow(target: &mut RgbaImage, rect: &Rect, style: &ShadowStyle) {
    if !style.is_visible() || rect.is_degenerate() {
        return;
    }
    let width = rect.width.round().max(1.0) as u32;
    let height = rect.height.round().max(1.0) as u32;

    // Canvas-style blur: the radius is twice the standard deviation
    let sigma = style.blur_radius / 2.0;
    let margin = (sigma * 3.0).ceil().max(0.0) as u32;

    let mut layer = RgbaImage::new(width + 2 * margin, height + 2 * margin);
    draw_filled_rect_mut(
        &mut layer,
        imageproc::rect::Rect::at(margin as i32, margin as i32).of_size(width, height),
        Rgba(style.color),
    );
    if sigma > 0.0 {
        layer = gaussian_blur_f32(&layer, sigma);
    }

    let x = (rect.x + style.offset_x).round() as i64 - margin as i64;
    let y = (rect.y + style.offset_y).round() as i64 - margin as i64;
    imageops::overlay(target, &layer, x, y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_keeps_colour() {
        let scaled = ShadowStyle::default().scaled(4.0);
        assert_eq!(scaled.color, SHADOW_COLOR);
        assert_eq!(scaled.blur_radius, 40.0);
        assert_eq!(scaled.offset_x, 20.0);
    }

    #[test]
    fn shadow_darkens_offset_area() {
        let mut target = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        let style = ShadowStyle {
            blur_radius: 0.0,
            ..ShadowStyle::default()
        };
        draw_shadow(&mut target, &Rect::new(10.0, 10.0, 40.0, 40.0), &style);

        // inside the offset shadow
        assert!(target.get_pixel(50, 50)[0] < 255);
        // outside it
        assert_eq!(target.get_pixel(5, 5)[0], 255);
        assert_eq!(target.get_pixel(80, 80)[0], 255);
    }

    #[test]
    fn invisible_shadow_is_skipped() {
        let mut target = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        draw_shadow(&mut target, &Rect::new(0.0, 0.0, 10.0, 10.0), &ShadowStyle::none());
        assert!(target.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }
}
