mod preview;
mod protocol;
mod thumbnails;

pub use preview::{PreviewCommand, PreviewFrame, PreviewWorker};
pub use protocol::*;
pub use thumbnails::{ThumbnailChannel, ThumbnailWorker, thumbnail_worker_task};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Worker task has stopped")]
    WorkerGone,
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
