use image::{Rgba, RgbaImage};
use pdf_cover::*;
use pdf_cover_runtime::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Rasterizer that paints each page a single colour. When `gate` is set, the
/// first render reports on `started` and waits for `release`.
struct SolidRasterizer {
    pages: Vec<Size>,
    gate: Option<Gate>,
}

struct Gate {
    armed: AtomicBool,
    started: mpsc::UnboundedSender<()>,
    release: Mutex<std::sync::mpsc::Receiver<()>>,
}

impl PageRasterizer for SolidRasterizer {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page_index: usize) -> Option<Size> {
        self.pages.get(page_index).copied()
    }

    fn render(&self, page_index: usize, scale: f32) -> pdf_cover::Result<RgbaImage> {
        if let Some(gate) = &self.gate {
            if gate.armed.swap(false, Ordering::SeqCst) {
                let _ = gate.started.send(());
                let _ = gate.release.lock().unwrap().recv();
            }
        }
        let size = self.pages.get(page_index).ok_or(ComposeError::PageOutOfRange {
            page: page_index,
            page_count: self.pages.len(),
        })?;
        let width = (size.width * scale).round().max(1.0) as u32;
        let height = (size.height * scale).round().max(1.0) as u32;
        Ok(RgbaImage::from_pixel(width, height, Rgba([90, 90, 90, 255])))
    }
}

fn plain(pages: usize) -> Arc<dyn PageRasterizer> {
    Arc::new(SolidRasterizer {
        pages: vec![Size::new(400.0, 560.0); pages],
        gate: None,
    })
}

fn request(target_width: u32) -> CompositionRequest {
    let view = ViewGeometry::new(Size::new(500.0, 600.0), Rect::new(50.0, 0.0, 400.0, 560.0));
    let transform =
        OverlayTransform::placed(Size::new(400.0, 560.0), TransformLimits::default(), &view.layout);
    let scene = Scene {
        background_page: 0,
        overlay_page: 1,
        transform,
        view,
    };
    CompositionRequest::from_scene(&scene, target_width, target_width * 7 / 5, 1.0)
}

// =============================================================================
// Preview worker
// =============================================================================

#[tokio::test]
async fn test_queued_redraws_are_coalesced() {
    let (worker, mut frames) = PreviewWorker::spawn(Compositor::new(plain(2)));

    worker.redraw(request(100)).unwrap();
    worker.redraw(request(200)).unwrap();
    let last = worker.redraw(request(300)).unwrap();
    assert_eq!(last, 3);

    let frame = frames.recv().await.unwrap();
    assert_eq!(frame.generation, 3);
    assert_eq!(frame.image.width(), 300);

    let nothing_else = tokio::time::timeout(Duration::from_millis(100), frames.recv()).await;
    assert!(nothing_else.is_err());
}

#[tokio::test]
async fn test_stale_frame_is_dropped() {
    let (started_tx, mut started_rx) = mpsc::unbounded_channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel();
    let rasterizer = Arc::new(SolidRasterizer {
        pages: vec![Size::new(400.0, 560.0); 2],
        gate: Some(Gate {
            armed: AtomicBool::new(true),
            started: started_tx,
            release: Mutex::new(release_rx),
        }),
    });
    let (worker, mut frames) = PreviewWorker::spawn(Compositor::new(rasterizer));

    worker.redraw(request(100)).unwrap();
    started_rx.recv().await.unwrap();

    // Requested while generation 1 is still being drawn
    worker.redraw(request(200)).unwrap();
    release_tx.send(()).unwrap();

    let frame = frames.recv().await.unwrap();
    assert_eq!(frame.generation, 2);
    assert_eq!(frame.image.width(), 200);
}

// =============================================================================
// Thumbnail worker
// =============================================================================

async fn collect_until_terminal(channel: &mut ThumbnailChannel) -> Vec<WorkerEvent> {
    let mut events = Vec::new();
    while let Some(event) = channel.next_event().await {
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            break;
        }
    }
    events
}

#[tokio::test]
async fn test_thumbnails_arrive_in_batches() {
    let mut channel = ThumbnailChannel::spawn(plain(5));
    let task_id = channel.start(5, 2, 50).unwrap();

    let events = collect_until_terminal(&mut channel).await;
    assert!(events.iter().all(|e| e.task_id() == task_id));

    let batch_sizes: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            WorkerEvent::ThumbnailsBatch { thumbnails, .. } => Some(thumbnails.len()),
            _ => None,
        })
        .collect();
    assert_eq!(batch_sizes, vec![2, 2, 1]);

    let progress: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            WorkerEvent::Progress { page_num, .. } => Some(*page_num),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![1, 2, 3, 4, 5]);

    match events.last() {
        Some(WorkerEvent::ThumbnailsComplete { thumbnails, .. }) => {
            assert_eq!(thumbnails.len(), 5);
            assert_eq!(thumbnails[0].width, 50);
            assert_eq!(thumbnails[0].height, 70);
            assert!(thumbnails[0].png.starts_with(b"\x89PNG"));
        }
        other => panic!("expected completion, got {other:?}"),
    }
    assert_eq!(channel.current(), None);
}

#[tokio::test]
async fn test_missing_pages_become_placeholder_thumbnails() {
    let mut channel = ThumbnailChannel::spawn(plain(2));
    channel.start(3, 10, 40).unwrap();

    let events = collect_until_terminal(&mut channel).await;
    match events.last() {
        Some(WorkerEvent::ThumbnailsComplete { thumbnails, .. }) => {
            let flags: Vec<bool> = thumbnails.iter().map(|t| t.placeholder).collect();
            assert_eq!(flags, vec![false, false, true]);
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_new_task_hides_events_of_previous_one() {
    let mut channel = ThumbnailChannel::spawn(plain(4));
    let first = channel.start(4, 1, 30).unwrap();
    let second = channel.start(2, 1, 30).unwrap();
    assert_ne!(first, second);

    let events = collect_until_terminal(&mut channel).await;
    assert!(events.iter().all(|e| e.task_id() == second));
    assert!(matches!(
        events.last(),
        Some(WorkerEvent::ThumbnailsComplete { thumbnails, .. }) if thumbnails.len() == 2
    ));
}

#[tokio::test]
async fn test_cancel_is_acknowledged() {
    let mut channel = ThumbnailChannel::spawn(plain(50));
    let task_id = channel.start(50, 5, 30).unwrap();
    assert_eq!(channel.cancel().unwrap(), Some(task_id));
    assert_eq!(channel.current(), None);

    // Everything after the acknowledgement belongs to the cancelled task
    let event = channel.next_event().await.unwrap();
    assert_eq!(event, WorkerEvent::Cancelled { task_id });
}

#[tokio::test]
async fn test_ping_pong() {
    let mut channel = ThumbnailChannel::spawn(plain(1));
    let task_id = channel.ping().unwrap();
    let event = channel.next_event().await.unwrap();
    assert_eq!(event, WorkerEvent::Pong { task_id });
}

#[tokio::test]
async fn test_raw_worker_tags_every_event() {
    let mut worker = ThumbnailWorker::spawn(plain(3));
    let task_id = TaskId(7);
    worker
        .commands
        .send(WorkerCommand::GenerateThumbnails {
            task_id,
            total_pages: 3,
            batch_size: 10,
            width: 40,
        })
        .unwrap();

    let mut events = Vec::new();
    while let Some(event) = worker.events.recv().await {
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            break;
        }
    }

    assert!(events.iter().all(|event| event.task_id() == task_id));
    match events.last() {
        Some(WorkerEvent::ThumbnailsComplete { thumbnails, .. }) => {
            assert_eq!(thumbnails.len(), 3);
            assert!(thumbnails.iter().all(|t| t.width == 40 && !t.placeholder));
        }
        other => panic!("unexpected final event: {other:?}"),
    }
}

#[tokio::test]
async fn test_cancelled_task_stops_at_page_boundary() {
    let (started_tx, mut started_rx) = mpsc::unbounded_channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel();
    let rasterizer = Arc::new(SolidRasterizer {
        pages: vec![Size::new(400.0, 560.0); 5],
        gate: Some(Gate {
            armed: AtomicBool::new(true),
            started: started_tx,
            release: Mutex::new(release_rx),
        }),
    });
    let mut worker = ThumbnailWorker::spawn(rasterizer);
    let task_id = TaskId(11);
    worker
        .commands
        .send(WorkerCommand::GenerateThumbnails {
            task_id,
            total_pages: 5,
            batch_size: 1,
            width: 40,
        })
        .unwrap();

    // Page 0 is mid-render when the cancel lands
    started_rx.recv().await.unwrap();
    worker.commands.send(WorkerCommand::Cancel { task_id }).unwrap();
    assert_eq!(
        worker.events.recv().await.unwrap(),
        WorkerEvent::Cancelled { task_id }
    );
    release_tx.send(()).unwrap();

    let mut late = Vec::new();
    while let Ok(Some(event)) =
        tokio::time::timeout(Duration::from_millis(200), worker.events.recv()).await
    {
        late.push(event);
    }
    assert!(
        !late.iter().any(|event| matches!(
            event,
            WorkerEvent::Progress { page_num, .. } if *page_num > 1
        )),
        "progress past the first page: {late:?}"
    );
    assert!(
        !late
            .iter()
            .any(|event| matches!(event, WorkerEvent::ThumbnailsComplete { .. })),
        "cancelled task completed: {late:?}"
    );

    // The worker itself keeps serving commands
    let ping = TaskId(12);
    worker.commands.send(WorkerCommand::Ping { task_id: ping }).unwrap();
    assert_eq!(
        worker.events.recv().await.unwrap(),
        WorkerEvent::Pong { task_id: ping }
    );
}
