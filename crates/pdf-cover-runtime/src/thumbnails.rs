//! Task-scoped thumbnail generation
//!
//! Each `GenerateThumbnails` request runs as its own task with its own
//! [`CancellationToken`]. A newer request cancels the older one; the token is
//! checked between pages, so a cancelled task stops after the page it is
//! rendering. Clients filter out events from superseded tasks by id.

use crate::protocol::*;
use crate::{Result, RuntimeError};
use pdf_cover::export::encode_image;
use pdf_cover::{ImageEncoding, PageRasterizer, render_thumbnail};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Worker loop: processes commands until every sender is dropped
pub async fn thumbnail_worker_task(
    rasterizer: Arc<dyn PageRasterizer>,
    mut command_rx: mpsc::UnboundedReceiver<WorkerCommand>,
    event_tx: mpsc::UnboundedSender<WorkerEvent>,
) {
    let mut active: Option<(TaskId, CancellationToken)> = None;

    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            WorkerCommand::GenerateThumbnails {
                task_id,
                total_pages,
                batch_size,
                width,
            } => {
                if let Some((previous, token)) = active.take() {
                    log::debug!(
                        "Cancelling thumbnail task {:?}, superseded by {:?}",
                        previous,
                        task_id
                    );
                    token.cancel();
                }
                let token = CancellationToken::new();
                active = Some((task_id, token.clone()));

                let job = Job {
                    task_id,
                    total_pages,
                    batch_size: batch_size.max(1),
                    width: width.max(1),
                };
                tokio::spawn(run_generation(
                    rasterizer.clone(),
                    job,
                    token,
                    event_tx.clone(),
                ));
            }
            WorkerCommand::Cancel { task_id } => {
                if active.as_ref().is_some_and(|(id, _)| *id == task_id) {
                    if let Some((_, token)) = active.take() {
                        token.cancel();
                    }
                }
                // Acknowledged at once; the task itself stops at the next page
                let _ = event_tx.send(WorkerEvent::Cancelled { task_id });
            }
            WorkerCommand::Ping { task_id } => {
                let _ = event_tx.send(WorkerEvent::Pong { task_id });
            }
        }
    }

    if let Some((_, token)) = active {
        token.cancel();
    }
}

struct Job {
    task_id: TaskId,
    total_pages: usize,
    batch_size: usize,
    width: u32,
}

async fn run_generation(
    rasterizer: Arc<dyn PageRasterizer>,
    job: Job,
    token: CancellationToken,
    event_tx: mpsc::UnboundedSender<WorkerEvent>,
) {
    let task_id = job.task_id;
    let mut all = Vec::with_capacity(job.total_pages);
    let mut batch = Vec::with_capacity(job.batch_size);

    for page_index in 0..job.total_pages {
        if token.is_cancelled() {
            log::debug!("Thumbnail task {:?} stopped before page {}", task_id, page_index);
            return;
        }

        let rasterizer = rasterizer.clone();
        let width = job.width;
        let rendered =
            tokio::task::spawn_blocking(move || render_page(rasterizer.as_ref(), page_index, width))
                .await
                .unwrap_or_else(|err| Err(err.to_string()));

        let thumbnail = match rendered {
            Ok(thumbnail) => thumbnail,
            Err(error) => {
                if !token.is_cancelled() {
                    let _ = event_tx.send(WorkerEvent::Error { task_id, error });
                }
                return;
            }
        };

        // A result that finished after cancellation is dropped
        if token.is_cancelled() {
            return;
        }

        all.push(thumbnail.clone());
        batch.push(thumbnail);

        let progress = WorkerEvent::Progress {
            task_id,
            page_num: page_index + 1,
            progress: (page_index + 1) as f32 / job.total_pages as f32,
        };
        if event_tx.send(progress).is_err() {
            return;
        }

        if batch.len() >= job.batch_size {
            let thumbnails = std::mem::take(&mut batch);
            if event_tx
                .send(WorkerEvent::ThumbnailsBatch {
                    task_id,
                    thumbnails,
                })
                .is_err()
            {
                return;
            }
        }
    }

    if token.is_cancelled() {
        return;
    }
    if !batch.is_empty() {
        let _ = event_tx.send(WorkerEvent::ThumbnailsBatch {
            task_id,
            thumbnails: batch,
        });
    }
    let _ = event_tx.send(WorkerEvent::ThumbnailsComplete {
        task_id,
        thumbnails: all,
    });
}

fn render_page(
    rasterizer: &dyn PageRasterizer,
    page_index: usize,
    width: u32,
) -> std::result::Result<Thumbnail, String> {
    let (image, placeholder) = render_thumbnail(rasterizer, page_index, width);
    let png = encode_image(&image, ImageEncoding::Png).map_err(|e| e.to_string())?;
    Ok(Thumbnail {
        page_index,
        width: image.width(),
        height: image.height(),
        png,
        placeholder: placeholder.is_some(),
    })
}

/// Raw protocol endpoints of a running thumbnail worker
pub struct ThumbnailWorker {
    pub commands: mpsc::UnboundedSender<WorkerCommand>,
    pub events: mpsc::UnboundedReceiver<WorkerEvent>,
}

impl ThumbnailWorker {
    /// Spawn a worker on the current tokio runtime
    pub fn spawn(rasterizer: Arc<dyn PageRasterizer>) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();
        tokio::spawn(thumbnail_worker_task(rasterizer, command_rx, event_tx));
        Self { commands, events }
    }
}

/// Client side of the thumbnail worker.
///
/// Tracks which task is current and hides events from any other task, so
/// callers never see late results from a request they already replaced.
pub struct ThumbnailChannel {
    command_tx: mpsc::UnboundedSender<WorkerCommand>,
    event_rx: mpsc::UnboundedReceiver<WorkerEvent>,
    next_id: u64,
    current: Option<TaskId>,
    awaiting: HashSet<TaskId>,
}

impl ThumbnailChannel {
    /// Spawn a worker on the current tokio runtime
    pub fn spawn(rasterizer: Arc<dyn PageRasterizer>) -> Self {
        let worker = ThumbnailWorker::spawn(rasterizer);
        Self {
            command_tx: worker.commands,
            event_rx: worker.events,
            next_id: 1,
            current: None,
            awaiting: HashSet::new(),
        }
    }

    /// Task whose events are currently delivered
    pub fn current(&self) -> Option<TaskId> {
        self.current
    }

    /// Start generating thumbnails, replacing any task still running
    pub fn start(&mut self, total_pages: usize, batch_size: usize, width: u32) -> Result<TaskId> {
        let task_id = self.allocate_id();
        self.send(WorkerCommand::GenerateThumbnails {
            task_id,
            total_pages,
            batch_size,
            width,
        })?;
        self.current = Some(task_id);
        Ok(task_id)
    }

    /// Cancel the current task, if any
    pub fn cancel(&mut self) -> Result<Option<TaskId>> {
        let Some(task_id) = self.current.take() else {
            return Ok(None);
        };
        self.send(WorkerCommand::Cancel { task_id })?;
        self.awaiting.insert(task_id);
        Ok(Some(task_id))
    }

    /// Check the worker is alive; answered with a `Pong` event
    pub fn ping(&mut self) -> Result<TaskId> {
        let task_id = self.allocate_id();
        self.send(WorkerCommand::Ping { task_id })?;
        self.awaiting.insert(task_id);
        Ok(task_id)
    }

    /// Next event for the current task, or an acknowledgement this client
    /// asked for. Returns `None` once the worker is gone.
    pub async fn next_event(&mut self) -> Option<WorkerEvent> {
        loop {
            let event = self.event_rx.recv().await?;
            if self.accept(&event) {
                return Some(event);
            }
        }
    }

    fn accept(&mut self, event: &WorkerEvent) -> bool {
        let task_id = event.task_id();
        match event {
            WorkerEvent::Cancelled { .. } | WorkerEvent::Pong { .. }
                if self.awaiting.remove(&task_id) =>
            {
                true
            }
            _ if Some(task_id) == self.current => {
                if event.is_terminal() {
                    self.current = None;
                }
                true
            }
            _ => {
                log::debug!("Dropping stale event from task {:?}", task_id);
                false
            }
        }
    }

    fn allocate_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }

    fn send(&self, command: WorkerCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| RuntimeError::WorkerGone)
    }
}
