//! HTTP front end for cover/citation merging
//!
//! Clients upload a PDF, pick citation pages and a cover page, and download
//! the merged document. Uploads and results live on local disk under the
//! configured storage directories.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::{ServiceError, ServiceResult};
pub use routes::router;
pub use state::{AppState, RasterizerFactory};
