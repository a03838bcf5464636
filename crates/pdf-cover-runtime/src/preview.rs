//! Coalescing preview redraws
//!
//! Gestures can request redraws far faster than pages rasterize. The worker
//! keeps one composition in flight, collapses everything queued behind it to
//! the newest request, and drops a finished frame if a newer generation was
//! requested while it was being drawn.

use crate::{Result, RuntimeError};
use image::RgbaImage;
use pdf_cover::{CompositionReport, CompositionRequest, Compositor};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum PreviewCommand {
    Redraw {
        generation: u64,
        request: CompositionRequest,
    },
}

/// A finished preview
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub generation: u64,
    pub image: RgbaImage,
    pub report: CompositionReport,
}

/// Handle used to request redraws
#[derive(Clone)]
pub struct PreviewWorker {
    command_tx: mpsc::UnboundedSender<PreviewCommand>,
    latest: Arc<AtomicU64>,
}

impl PreviewWorker {
    /// Spawn a worker on the current tokio runtime; frames arrive on the
    /// returned receiver
    pub fn spawn(compositor: Compositor) -> (Self, mpsc::UnboundedReceiver<PreviewFrame>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let latest = Arc::new(AtomicU64::new(0));

        tokio::spawn(preview_worker_task(
            compositor,
            latest.clone(),
            command_rx,
            frame_tx,
        ));

        (Self { command_tx, latest }, frame_rx)
    }

    /// Queue a redraw; returns the generation it was assigned
    pub fn redraw(&self, request: CompositionRequest) -> Result<u64> {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.command_tx
            .send(PreviewCommand::Redraw {
                generation,
                request,
            })
            .map_err(|_| RuntimeError::WorkerGone)?;
        Ok(generation)
    }

    /// Most recently requested generation
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

async fn preview_worker_task(
    compositor: Compositor,
    latest: Arc<AtomicU64>,
    mut command_rx: mpsc::UnboundedReceiver<PreviewCommand>,
    frame_tx: mpsc::UnboundedSender<PreviewFrame>,
) {
    while let Some(PreviewCommand::Redraw {
        mut generation,
        mut request,
    }) = command_rx.recv().await
    {
        // Drain any queued redraws, keeping only the most recent
        while let Ok(PreviewCommand::Redraw {
            generation: newer_generation,
            request: newer_request,
        }) = command_rx.try_recv()
        {
            log::debug!(
                "Discarding queued redraw {}, using newer request {}",
                generation,
                newer_generation
            );
            generation = newer_generation;
            request = newer_request;
        }

        let worker = compositor.clone();
        let composed = tokio::task::spawn_blocking(move || worker.compose(&request)).await;
        let (image, report) = match composed {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("Preview redraw {} failed: {}", generation, err);
                continue;
            }
        };

        if generation < latest.load(Ordering::SeqCst) {
            log::debug!("Dropping stale preview {}", generation);
            continue;
        }

        let frame = PreviewFrame {
            generation,
            image,
            report,
        };
        if frame_tx.send(frame).is_err() {
            break;
        }
    }
}
