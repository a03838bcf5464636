//! Shared constants for cover composition
//!
//! This module centralizes magic numbers used by the transform model,
//! the compositor and the export pipeline.

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Overlay Transform
// =============================================================================

/// Inset between the overlay and the edges of the displayed background page
pub const OVERLAY_PADDING: f32 = 20.0;

/// Scale applied to a freshly placed overlay
pub const DEFAULT_OVERLAY_SCALE: f32 = 0.25;

/// Smallest allowed overlay scale
pub const MIN_OVERLAY_SCALE: f32 = 0.1;

/// Largest allowed overlay scale
pub const MAX_OVERLAY_SCALE: f32 = 2.0;

/// Fraction of the target used by the fallback placement when the page layout
/// has not settled yet
pub const FALLBACK_OVERLAY_FRACTION: f32 = 0.25;

// =============================================================================
// Drop Shadow (preview pixels, scaled with the target)
// =============================================================================

/// Shadow colour (black at 30% opacity)
pub const SHADOW_COLOR: [u8; 4] = [0, 0, 0, 77];

/// Shadow blur radius
pub const SHADOW_BLUR_RADIUS: f32 = 10.0;

/// Horizontal shadow offset
pub const SHADOW_OFFSET_X: f32 = 5.0;

/// Vertical shadow offset
pub const SHADOW_OFFSET_Y: f32 = 5.0;

// =============================================================================
// Placeholders
// =============================================================================

/// Fill of a page that failed to rasterize
pub const PLACEHOLDER_FILL: [u8; 4] = [235, 235, 235, 255];

/// Border and cross colour of a placeholder
pub const PLACEHOLDER_STROKE: [u8; 4] = [120, 120, 120, 255];

// =============================================================================
// Export Quality
// =============================================================================

/// Quality scale for quick screen images
pub const SCREEN_IMAGE_QUALITY: f32 = 2.0;

/// Quality scale for high fidelity images
pub const HIGH_FIDELITY_QUALITY: f32 = 4.0;

/// Quality scale for document exports
pub const DOCUMENT_QUALITY: f32 = 3.0;

/// Largest quality scale accepted for any export kind
pub const MAX_QUALITY_SCALE: f32 = 10.0;

/// Largest export raster, in pixels (256 MiB of RGBA)
pub const MAX_EXPORT_PIXELS: u64 = 64_000_000;

/// Default JPEG quality when JPEG encoding is requested
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Points per inch in PDF user space
pub const POINTS_PER_INCH: f32 = 72.0;
