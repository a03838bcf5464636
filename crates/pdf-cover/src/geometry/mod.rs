//! Geometry for overlay placement
//!
//! This module owns the coordinate spaces used when composing a cover over a
//! citation page:
//! - Container space, where the preview is displayed and the user drags
//! - Export space, the pixel grid of a rendered composite
//! - Page-relative fractions that connect the two

mod mapper;
mod transform;
mod types;

pub use mapper::*;
pub use transform::*;
pub use types::*;
