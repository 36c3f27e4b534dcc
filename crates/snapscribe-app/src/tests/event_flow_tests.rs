//! Backend event flows against stub capture and recognition

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use image::{GrayImage, Rgba, RgbaImage};
use snapscribe_config::Config;
use snapscribe_core::{CaptureController, ScreenCapture, TextRecognizer};
use snapscribe_types::{
    AppEvent, CaptureRegion, Point, PointerEvent, RecognitionStatus, ScreenBounds, UiEvent,
};
use tempfile::TempDir;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::controller::{AppController, UiHandle};
use crate::state::AppState;
use crate::ui::drive;

struct StubCapture {
    delay: Duration,
}

impl ScreenCapture for StubCapture {
    fn capture(&self, region: CaptureRegion) -> anyhow::Result<RgbaImage> {
        std::thread::sleep(self.delay);
        Ok(RgbaImage::from_pixel(
            region.width as u32,
            region.height as u32,
            Rgba([240, 240, 240, 255]),
        ))
    }

    fn screen_bounds(&self) -> Option<ScreenBounds> {
        Some(ScreenBounds {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        })
    }
}

struct StubRecognizer {
    text: &'static str,
    delay: Duration,
}

impl TextRecognizer for StubRecognizer {
    fn recognize(&self, _image: &GrayImage) -> anyhow::Result<String> {
        std::thread::sleep(self.delay);
        Ok(self.text.to_string())
    }
}

fn recognizer(text: &'static str, delay_ms: u64) -> Result<Arc<dyn TextRecognizer>, String> {
    Ok(Arc::new(StubRecognizer {
        text,
        delay: Duration::from_millis(delay_ms),
    }))
}

struct Harness {
    app: AppController,
    tasks: JoinSet<anyhow::Result<()>>,
    ui: UiHandle,
    dir: TempDir,
}

impl Harness {
    fn start(recognizer: Result<Arc<dyn TextRecognizer>, String>) -> Self {
        Self::with_capture_delay(0, recognizer)
    }

    fn with_capture_delay(
        delay_ms: u64,
        recognizer: Result<Arc<dyn TextRecognizer>, String>,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();
        config.capture.overlay_settle_ms = 0;
        config.artifact.output_dir = dir.path().join("shots");

        let app = AppController::new(Arc::new(AppState::new(config)));
        let mut tasks = JoinSet::new();
        app.spawn_backend(
            &mut tasks,
            CaptureController::new(
                Arc::new(StubCapture {
                    delay: Duration::from_millis(delay_ms),
                }),
                recognizer,
            ),
        );
        let ui = app.ui_handle();

        Self {
            app,
            tasks,
            ui,
            dir,
        }
    }

    async fn send(&self, event: AppEvent) {
        self.ui.to_app.send(event).await.unwrap();
    }

    /// Collect events up to and including the first one matching `done`
    async fn collect_until(&self, done: impl Fn(&AppEvent) -> bool) -> Vec<AppEvent> {
        let mut events = Vec::new();
        loop {
            let event = timeout(Duration::from_secs(5), self.ui.from_app.recv())
                .await
                .expect("Timeout - backend went quiet")
                .expect("Backend channel closed");
            let finished = done(&event);
            events.push(event);
            if finished {
                return events;
            }
        }
    }

    /// Drive the remaining events through a graceful shutdown
    async fn finish(mut self, events: Vec<AppEvent>) -> (Vec<AppEvent>, TempDir) {
        let seen = timeout(Duration::from_secs(5), drive(&self.ui, events))
            .await
            .expect("Timeout - shutdown did not drain")
            .unwrap();
        self.app.shutdown();
        while let Some(result) = self.tasks.join_next().await {
            result.unwrap().unwrap();
        }
        (seen, self.dir)
    }
}

fn saved_descriptor(events: &[AppEvent]) -> Option<&Path> {
    events.iter().find_map(|event| match event {
        AppEvent::ArtifactSaved { descriptor, .. } => Some(descriptor.as_path()),
        _ => None,
    })
}

fn statuses(events: &[AppEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|event| match event {
            AppEvent::StatusUpdate { status, .. } => Some(status.as_str()),
            _ => None,
        })
        .collect()
}

fn count_ui(events: &[AppEvent], wanted: &UiEvent) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, AppEvent::UiEvent(ui) if ui == wanted))
        .count()
}

#[tokio::test]
async fn test_drag_selection_captures_region() {
    let harness = Harness::start(recognizer("unused", 0));

    harness.send(AppEvent::BeginSelection).await;
    harness
        .send(AppEvent::Pointer(PointerEvent::Down(Point::new(110, 60))))
        .await;
    harness
        .send(AppEvent::Pointer(PointerEvent::Move(Point::new(50, 40))))
        .await;
    harness
        .send(AppEvent::Pointer(PointerEvent::Up(Point::new(10, 10))))
        .await;

    let events = harness
        .collect_until(|event| matches!(event, AppEvent::CaptureTaken { .. }))
        .await;

    assert_eq!(count_ui(&events, &UiEvent::Hide), 1);
    assert_eq!(count_ui(&events, &UiEvent::ShowOverlay), 1);
    assert_eq!(count_ui(&events, &UiEvent::HideOverlay), 1);
    assert_eq!(count_ui(&events, &UiEvent::Show), 1);
    assert_eq!(count_ui(&events, &UiEvent::Focus), 1);
    assert!(events.iter().any(|event| matches!(
        event,
        AppEvent::SelectionResolved(region) if *region == CaptureRegion::new(10, 10, 100, 50)
    )));

    match events.last() {
        Some(AppEvent::CaptureTaken {
            region,
            sequence,
            bounds_warning,
        }) => {
            assert_eq!(*region, CaptureRegion::new(10, 10, 100, 50));
            assert_eq!(*sequence, 1);
            assert!(bounds_warning.is_none());
        }
        other => panic!("unexpected {other:?}"),
    }

    harness.finish(Vec::new()).await;
}

#[tokio::test]
async fn test_second_selection_is_rejected_while_active() {
    let harness = Harness::start(recognizer("unused", 0));

    let (events, _dir) = harness
        .finish(vec![
            AppEvent::BeginSelection,
            AppEvent::BeginSelection,
            AppEvent::Pointer(PointerEvent::Cancel),
        ])
        .await;

    assert_eq!(count_ui(&events, &UiEvent::ShowOverlay), 1);
    assert_eq!(count_ui(&events, &UiEvent::Show), 1);
    assert!(statuses(&events).contains(&"A region selection is already in progress"));
    assert!(
        events
            .iter()
            .any(|event| matches!(event, AppEvent::SelectionCancelled))
    );
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, AppEvent::CaptureTaken { .. }))
    );
}

#[tokio::test]
async fn test_capture_extract_save() {
    let harness = Harness::start(recognizer("Invoice 42", 0));

    harness
        .send(AppEvent::Capture(CaptureRegion::new(0, 0, 40, 20)))
        .await;
    harness.send(AppEvent::ExtractText).await;
    let events = harness
        .collect_until(|event| matches!(event, AppEvent::TextExtracted { .. }))
        .await;
    match events.last() {
        Some(AppEvent::TextExtracted { sequence, result }) => {
            assert_eq!(*sequence, 1);
            assert_eq!(result.status, RecognitionStatus::Available);
            assert_eq!(result.text(), Some("Invoice 42"));
        }
        other => panic!("unexpected {other:?}"),
    }

    let (events, _dir) = harness.finish(vec![AppEvent::Save]).await;
    let descriptor = std::fs::read_to_string(saved_descriptor(&events).unwrap()).unwrap();
    assert!(descriptor.contains("## Recognized Text"));
    assert!(descriptor.contains("Invoice 42"));
    assert!(descriptor.contains("- **Dimensions**: 40 x 20"));
}

#[tokio::test]
async fn test_text_from_older_capture_is_not_saved() {
    let harness = Harness::start(recognizer("first capture", 0));

    harness
        .send(AppEvent::Capture(CaptureRegion::new(0, 0, 40, 20)))
        .await;
    harness.send(AppEvent::ExtractText).await;
    harness
        .collect_until(|event| matches!(event, AppEvent::TextExtracted { .. }))
        .await;

    let (events, _dir) = harness
        .finish(vec![
            AppEvent::Capture(CaptureRegion::new(5, 5, 10, 10)),
            AppEvent::Save,
        ])
        .await;
    let descriptor = std::fs::read_to_string(saved_descriptor(&events).unwrap()).unwrap();
    assert!(!descriptor.contains("first capture"));
    assert!(descriptor.contains("- **Position**: (5, 5)"));
}

#[tokio::test]
async fn test_quick_capture_drains_on_shutdown() {
    let harness = Harness::start(recognizer("slow text", 100));

    let (events, dir) = harness
        .finish(vec![AppEvent::QuickCapture {
            region: CaptureRegion::new(0, 0, 30, 30),
            ocr: true,
        }])
        .await;

    assert!(events.iter().any(|event| matches!(
        event,
        AppEvent::TextExtracted { sequence: 1, result } if result.text() == Some("slow text")
    )));
    let descriptor = saved_descriptor(&events).unwrap();
    assert!(descriptor.starts_with(dir.path()));
    assert!(
        std::fs::read_to_string(descriptor)
            .unwrap()
            .contains("slow text")
    );
}

#[tokio::test]
async fn test_cancelled_extraction_is_not_reported() {
    let harness = Harness::start(recognizer("too late", 300));

    let (events, _dir) = harness
        .finish(vec![
            AppEvent::Capture(CaptureRegion::new(0, 0, 30, 30)),
            AppEvent::ExtractText,
            AppEvent::CancelExtraction,
        ])
        .await;

    assert!(
        !events
            .iter()
            .any(|event| matches!(event, AppEvent::TextExtracted { .. }))
    );
    assert!(
        statuses(&events)
            .iter()
            .any(|status| status.ends_with("cancelled"))
    );
}

#[tokio::test]
async fn test_unavailable_recognizer_does_not_block_saving() {
    let harness = Harness::start(Err("no engine on this platform".to_string()));

    let (events, _dir) = harness
        .finish(vec![
            AppEvent::Capture(CaptureRegion::new(0, 0, 30, 30)),
            AppEvent::ExtractText,
            AppEvent::Save,
        ])
        .await;

    assert!(
        statuses(&events)
            .iter()
            .any(|status| status.contains("no engine on this platform"))
    );
    let descriptor = std::fs::read_to_string(saved_descriptor(&events).unwrap()).unwrap();
    assert!(!descriptor.contains("Recognized Text"));
}

#[tokio::test]
async fn test_invalid_requests_report_errors() {
    let harness = Harness::start(recognizer("unused", 0));

    let (events, _dir) = harness
        .finish(vec![
            AppEvent::Save,
            AppEvent::ExtractText,
            AppEvent::Capture(CaptureRegion::new(0, 0, 0, 10)),
        ])
        .await;

    let statuses = statuses(&events);
    assert_eq!(
        statuses
            .iter()
            .filter(|status| status.starts_with("No active capture"))
            .count(),
        2
    );
    assert!(
        statuses
            .iter()
            .any(|status| status.starts_with("Invalid geometry"))
    );
    assert!(saved_descriptor(&events).is_none());
}

#[tokio::test]
async fn test_region_past_screen_edge_warns() {
    let harness = Harness::start(recognizer("unused", 0));

    let (events, _dir) = harness
        .finish(vec![AppEvent::Capture(CaptureRegion::new(1900, 1000, 100, 100))])
        .await;

    assert!(events.iter().any(|event| matches!(
        event,
        AppEvent::CaptureTaken { bounds_warning: Some(_), .. }
    )));
}

fn position(events: &[AppEvent], wanted: impl Fn(&AppEvent) -> bool) -> usize {
    events
        .iter()
        .position(wanted)
        .expect("event never arrived")
}

#[tokio::test]
async fn test_slow_capture_keeps_loop_responsive() {
    let harness = Harness::with_capture_delay(400, recognizer("unused", 0));

    harness
        .send(AppEvent::Capture(CaptureRegion::new(0, 0, 20, 20)))
        .await;
    harness.send(AppEvent::BeginSelection).await;
    harness
        .send(AppEvent::Pointer(PointerEvent::Cancel))
        .await;

    let events = harness
        .collect_until(|event| matches!(event, AppEvent::CaptureTaken { .. }))
        .await;

    let overlay = position(&events, |event| {
        matches!(event, AppEvent::UiEvent(UiEvent::ShowOverlay))
    });
    let cancelled = position(&events, |event| matches!(event, AppEvent::SelectionCancelled));
    let taken = position(&events, |event| matches!(event, AppEvent::CaptureTaken { .. }));
    assert!(overlay < cancelled && cancelled < taken);

    harness.finish(Vec::new()).await;
}

#[tokio::test]
async fn test_requests_behind_slow_capture_apply_to_it() {
    let harness = Harness::with_capture_delay(200, recognizer("second", 0));

    let (events, _dir) = harness
        .finish(vec![
            AppEvent::Capture(CaptureRegion::new(0, 0, 20, 20)),
            AppEvent::Capture(CaptureRegion::new(7, 8, 12, 6)),
            AppEvent::ExtractText,
            AppEvent::Save,
        ])
        .await;

    let sequences: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            AppEvent::CaptureTaken { sequence, .. } => Some(*sequence),
            _ => None,
        })
        .collect();
    assert_eq!(sequences, vec![1, 2]);
    assert!(events.iter().any(|event| matches!(
        event,
        AppEvent::TextExtracted { sequence: 2, .. }
    )));
    assert!(!statuses(&events).iter().any(|status| status.starts_with("No active capture")));

    let descriptor = std::fs::read_to_string(saved_descriptor(&events).unwrap()).unwrap();
    assert!(descriptor.contains("- **Position**: (7, 8)"));
}

#[tokio::test]
async fn test_quick_capture_reports_unavailable_recognizer() {
    let harness = Harness::start(Err("no engine on this platform".to_string()));

    let (events, _dir) = harness
        .finish(vec![AppEvent::QuickCapture {
            region: CaptureRegion::new(0, 0, 30, 30),
            ocr: true,
        }])
        .await;

    match events
        .iter()
        .find(|event| matches!(event, AppEvent::TextExtracted { .. }))
    {
        Some(AppEvent::TextExtracted { sequence, result }) => {
            assert_eq!(*sequence, 1);
            assert_eq!(result.status, RecognitionStatus::Unavailable);
            assert!(
                result
                    .message
                    .as_deref()
                    .is_some_and(|message| message.contains("no engine on this platform"))
            );
        }
        other => panic!("unexpected {other:?}"),
    }
    let descriptor = std::fs::read_to_string(saved_descriptor(&events).unwrap()).unwrap();
    assert!(!descriptor.contains("Recognized Text"));
}

#[tokio::test]
async fn test_cancel_without_selection_is_silent() {
    let harness = Harness::start(recognizer("unused", 0));

    let (events, _dir) = harness
        .finish(vec![AppEvent::Pointer(PointerEvent::Cancel)])
        .await;

    assert!(
        !events
            .iter()
            .any(|event| matches!(event, AppEvent::SelectionCancelled))
    );
    assert!(!statuses(&events).contains(&"Selection cancelled"));
    assert_eq!(count_ui(&events, &UiEvent::Show), 0);
}
