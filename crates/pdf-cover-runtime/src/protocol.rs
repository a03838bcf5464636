/// Identifies one thumbnail generation request and every event it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// Commands sent from a client to the thumbnail worker
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerCommand {
    GenerateThumbnails {
        task_id: TaskId,
        total_pages: usize,
        /// Thumbnails per `ThumbnailsBatch` event
        batch_size: usize,
        /// Thumbnail width in pixels
        width: u32,
    },
    Cancel {
        task_id: TaskId,
    },
    Ping {
        task_id: TaskId,
    },
}

/// Events sent from the thumbnail worker back to its client
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    Progress {
        task_id: TaskId,
        /// One-based number of the page just finished
        page_num: usize,
        /// Fraction of the task done, 0.0 to 1.0
        progress: f32,
    },
    ThumbnailsBatch {
        task_id: TaskId,
        thumbnails: Vec<Thumbnail>,
    },
    ThumbnailsComplete {
        task_id: TaskId,
        thumbnails: Vec<Thumbnail>,
    },
    Error {
        task_id: TaskId,
        error: String,
    },
    Cancelled {
        task_id: TaskId,
    },
    Pong {
        task_id: TaskId,
    },
}

impl WorkerEvent {
    pub fn task_id(&self) -> TaskId {
        match self {
            WorkerEvent::Progress { task_id, .. }
            | WorkerEvent::ThumbnailsBatch { task_id, .. }
            | WorkerEvent::ThumbnailsComplete { task_id, .. }
            | WorkerEvent::Error { task_id, .. }
            | WorkerEvent::Cancelled { task_id }
            | WorkerEvent::Pong { task_id } => *task_id,
        }
    }

    /// True for the events that end a generation task
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkerEvent::ThumbnailsComplete { .. }
                | WorkerEvent::Error { .. }
                | WorkerEvent::Cancelled { .. }
        )
    }
}

/// A rendered page thumbnail, PNG encoded
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub page_index: usize,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
    /// True when the page failed to render and a placeholder was drawn instead
    pub placeholder: bool,
}
