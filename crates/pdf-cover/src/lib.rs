pub mod compose;
pub mod constants;
pub mod document;
pub mod export;
pub mod geometry;
pub mod merge;
mod options;
pub mod raster;
mod selection;
mod session;
mod types;

pub use compose::{
    CompositionReport, CompositionRequest, Compositor, Placeholder, Scene, ShadowStyle,
    render_thumbnail,
};
pub use document::{DocumentInfo, load_pdf};
pub use export::{ExportArtifact, ExportPipeline};
pub use geometry::*;
pub use merge::{MergeRequest, merge, merge_file, merge_to_bytes, plan_page_order};
pub use options::*;
pub use raster::PageRasterizer;
pub use selection::Selection;
pub use session::CompositionSession;
pub use types::*;
