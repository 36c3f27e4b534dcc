use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use snapscribe_core::{
    ArtifactError, ArtifactWriter, CaptureController, CaptureError, CapturedFrame, RegionSelector,
    SavedArtifact,
};
use snapscribe_types::{AppEvent, RecognitionResult};
use tokio_util::sync::CancellationToken;

use crate::host::ChannelHost;
use crate::state::AppState;

pub mod capture;
pub mod extract_text;
pub mod quick_capture;
pub mod save;
pub mod selection;

use capture::{AfterCapture, CAPTURE_TASK, CaptureRequest, handle_capture, handle_captured};
use extract_text::{EXTRACTION_TASK, handle_cancel_extraction, handle_extract_text};
use quick_capture::handle_quick_capture;
use save::handle_save;
use selection::{handle_begin_selection, handle_pointer};

/// Result of a blocking worker. Every spawned worker sends exactly one.
#[derive(Debug)]
pub enum WorkerEvent {
    Captured {
        result: Result<CapturedFrame, CaptureError>,
        then: AfterCapture,
    },
    Extracted {
        sequence: u64,
        result: RecognitionResult,
    },
    ExtractionCancelled {
        sequence: u64,
    },
    Saved {
        sequence: u64,
        recognition: Option<RecognitionResult>,
        outcome: Result<SavedArtifact, ArtifactError>,
    },
    Failed {
        task: &'static str,
        message: String,
    },
}

/// Shared handles every handler needs
pub struct EventContext {
    pub state: Arc<AppState>,
    pub app_to_ui_tx: AsyncSender<AppEvent>,
    pub worker_tx: AsyncSender<WorkerEvent>,
    pub writer: Arc<ArtifactWriter>,
}

impl EventContext {
    pub async fn notify(&self, event: AppEvent) {
        if let Err(e) = self.app_to_ui_tx.send(event).await {
            tracing::warn!("Failed to notify UI: {}", e);
        }
    }

    pub async fn status(&self, message: impl Into<String>, busy: bool) {
        let message = message.into();
        self.state.status.write().await.set_message(&message, busy);
        self.notify(AppEvent::StatusUpdate {
            status: message,
            busy,
        })
        .await;
    }

    pub async fn report_error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        {
            let mut status = self.state.status.write().await;
            status.record_error(&message);
            status.busy = false;
        }
        self.notify(AppEvent::StatusUpdate {
            status: message,
            busy: false,
        })
        .await;
    }

    /// Run `work` on the blocking pool and report its result to the event loop
    pub fn spawn_worker<F>(&self, task: &'static str, work: F)
    where
        F: FnOnce() -> WorkerEvent + Send + 'static,
    {
        let worker_tx = self.worker_tx.clone();
        tokio::spawn(async move {
            let event = match tokio::task::spawn_blocking(work).await {
                Ok(event) => event,
                Err(e) => WorkerEvent::Failed {
                    task,
                    message: e.to_string(),
                },
            };
            if let Err(e) = worker_tx.send(event).await {
                tracing::error!("Failed to report {} result: {}", task, e);
            }
        });
    }
}

/// Work that has to wait until the capture in flight is committed
#[derive(Debug)]
pub enum Deferred {
    Event(AppEvent),
    Capture(CaptureRequest),
}

/// State owned by the event loop task and nobody else
pub struct Pipeline {
    pub controller: CaptureController,
    pub selector: RegionSelector<ChannelHost>,
    /// Last recognition and the capture sequence it belongs to
    pub last_recognition: Option<(u64, RecognitionResult)>,
    pub pending_extraction: Option<CancellationToken>,
    pub capture_pending: bool,
    pub deferred: VecDeque<Deferred>,
    pub in_flight: usize,
}

impl Pipeline {
    pub fn new(controller: CaptureController, host: ChannelHost) -> Self {
        Self {
            controller,
            selector: RegionSelector::new(host),
            last_recognition: None,
            pending_extraction: None,
            capture_pending: false,
            deferred: VecDeque::new(),
            in_flight: 0,
        }
    }
}

/// App's main loop
pub async fn event_loop(
    ctx: EventContext,
    controller: CaptureController,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    worker_rx: AsyncReceiver<WorkerEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut pipeline = Pipeline::new(controller, ChannelHost::new(ctx.app_to_ui_tx.clone()));
    let mut shutting_down = false;

    ctx.notify(AppEvent::BackendReady).await;
    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");

    loop {
        if shutting_down && pipeline.in_flight == 0 {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("[EVENT_LOOP] Cancelled");
                break;
            }
            event = worker_rx.recv() => {
                let event = event?;
                pipeline.in_flight = pipeline.in_flight.saturating_sub(1);
                handle_worker_event(&ctx, &mut pipeline, event).await;
                replay_deferred(&ctx, &mut pipeline).await;
            }
            event = ui_to_app_rx.recv(), if !shutting_down => {
                match event {
                    Ok(AppEvent::Shutdown) | Err(_) => {
                        tracing::info!(
                            "[EVENT_LOOP] Shutdown requested, {} task(s) in flight",
                            pipeline.in_flight
                        );
                        shutting_down = true;
                        pipeline.selector.cancel();
                    }
                    Ok(event) => handle_events(&ctx, &mut pipeline, event).await,
                }
            }
        }
    }

    {
        let status = ctx.state.status.read().await;
        tracing::info!(
            "Session finished: {} capture(s), {} save(s), {} error(s)",
            status.capture_count,
            status.save_count,
            status.error_count
        );
    }
    ctx.notify(AppEvent::Shutdown).await;
    Ok(())
}

/// Events that read or replace the session wait for a pending capture
fn waits_for_capture(event: &AppEvent) -> bool {
    matches!(
        event,
        AppEvent::ExtractText | AppEvent::Save | AppEvent::Reset
    )
}

async fn handle_events(ctx: &EventContext, pipeline: &mut Pipeline, event: AppEvent) {
    if pipeline.capture_pending && waits_for_capture(&event) {
        tracing::debug!("[EVENT_LOOP] Deferring {:?} until the capture lands", event);
        pipeline.deferred.push_back(Deferred::Event(event));
        return;
    }

    tracing::debug!("[EVENT_LOOP] Handling {:?}", std::mem::discriminant(&event));
    match event {
        AppEvent::BeginSelection => handle_begin_selection(ctx, pipeline).await,
        AppEvent::Pointer(pointer) => handle_pointer(ctx, pipeline, pointer).await,
        AppEvent::Capture(region) => {
            handle_capture(ctx, pipeline, CaptureRequest::now(region, AfterCapture::Hold)).await
        }
        AppEvent::ExtractText => handle_extract_text(ctx, pipeline).await,
        AppEvent::QuickCapture { region, ocr } => {
            handle_quick_capture(ctx, pipeline, region, ocr).await
        }
        AppEvent::Save => handle_save(ctx, pipeline).await,
        AppEvent::Reset => {
            pipeline.controller.reset();
            pipeline.last_recognition = None;
            ctx.status("Capture cleared", false).await;
        }
        AppEvent::CancelExtraction => handle_cancel_extraction(ctx, pipeline).await,
        // Backend -> front-end events, nothing to do here
        AppEvent::UiEvent(_)
        | AppEvent::SelectionResolved(_)
        | AppEvent::SelectionCancelled
        | AppEvent::CaptureTaken { .. }
        | AppEvent::TextExtracted { .. }
        | AppEvent::ArtifactSaved { .. }
        | AppEvent::ArtifactFailed { .. }
        | AppEvent::StatusUpdate { .. }
        | AppEvent::BackendReady
        | AppEvent::Shutdown => {}
    }
}

/// Run queued work in arrival order until another capture goes in flight
async fn replay_deferred(ctx: &EventContext, pipeline: &mut Pipeline) {
    while !pipeline.capture_pending {
        let Some(deferred) = pipeline.deferred.pop_front() else {
            break;
        };
        match deferred {
            Deferred::Event(event) => handle_events(ctx, pipeline, event).await,
            Deferred::Capture(request) => handle_capture(ctx, pipeline, request).await,
        }
    }
}

async fn handle_worker_event(ctx: &EventContext, pipeline: &mut Pipeline, event: WorkerEvent) {
    match event {
        WorkerEvent::Captured { result, then } => {
            handle_captured(ctx, pipeline, result, then).await;
        }
        WorkerEvent::Extracted { sequence, result } => {
            pipeline.pending_extraction = None;
            publish_recognition(ctx, pipeline, sequence, result).await;
        }
        WorkerEvent::ExtractionCancelled { sequence } => {
            pipeline.pending_extraction = None;
            ctx.status(format!("Text extraction for capture #{sequence} cancelled"), false)
                .await;
        }
        WorkerEvent::Saved {
            sequence,
            recognition,
            outcome,
        } => {
            if let Some(result) = recognition {
                publish_recognition(ctx, pipeline, sequence, result).await;
            }
            match outcome {
                Ok(saved) => {
                    ctx.state.status.write().await.record_save();
                    ctx.status(format!("Saved {}", saved.base_name), false).await;
                    ctx.notify(AppEvent::ArtifactSaved {
                        image: saved.image_path,
                        descriptor: saved.descriptor_path,
                    })
                    .await;
                }
                Err(e) => {
                    let orphaned_image = e.orphaned_image().map(Path::to_path_buf);
                    ctx.report_error(format!("Save failed: {e}")).await;
                    ctx.notify(AppEvent::ArtifactFailed {
                        message: e.to_string(),
                        orphaned_image,
                    })
                    .await;
                }
            }
        }
        WorkerEvent::Failed { task, message } => {
            match task {
                EXTRACTION_TASK => pipeline.pending_extraction = None,
                CAPTURE_TASK => pipeline.capture_pending = false,
                _ => {}
            }
            ctx.report_error(format!("{task} worker failed: {message}"))
                .await;
        }
    }
}

async fn publish_recognition(
    ctx: &EventContext,
    pipeline: &mut Pipeline,
    sequence: u64,
    result: RecognitionResult,
) {
    match &result.message {
        Some(message) => ctx.status(message.clone(), false).await,
        None if result.text.trim().is_empty() => ctx.status("No text found", false).await,
        None => ctx.status("Ready", false).await,
    }
    pipeline.last_recognition = Some((sequence, result.clone()));
    ctx.notify(AppEvent::TextExtracted { sequence, result }).await;
}
