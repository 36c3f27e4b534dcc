use std::time::Duration;

use snapscribe_core::{CaptureError, CapturedFrame};
use snapscribe_types::{AppEvent, CaptureRegion};

use super::quick_capture::save_quick_capture;
use super::{Deferred, EventContext, Pipeline, WorkerEvent};

pub const CAPTURE_TASK: &str = "capture";

/// What to do with a capture once it becomes the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterCapture {
    Hold,
    Save { ocr: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct CaptureRequest {
    pub region: CaptureRegion,
    /// Slept on the worker before grabbing pixels
    pub delay: Duration,
    pub then: AfterCapture,
}

impl CaptureRequest {
    pub fn now(region: CaptureRegion, then: AfterCapture) -> Self {
        Self {
            region,
            delay: Duration::ZERO,
            then,
        }
    }
}

/// Validate on the loop, grab pixels on a worker.
///
/// The session only changes in [`handle_captured`], so a capture that fails
/// or is still running leaves the previous one usable.
pub async fn handle_capture(ctx: &EventContext, pipeline: &mut Pipeline, request: CaptureRequest) {
    if pipeline.capture_pending {
        tracing::debug!("Queueing capture of {} behind the one in flight", request.region);
        pipeline.deferred.push_back(Deferred::Capture(request));
        return;
    }

    let job = match pipeline.controller.prepare_capture(request.region) {
        Ok(job) => job,
        Err(e) => {
            ctx.report_error(e.to_string()).await;
            return;
        }
    };

    pipeline.capture_pending = true;
    pipeline.in_flight += 1;
    ctx.status(format!("Capturing {}", job.region()), true).await;

    let CaptureRequest { delay, then, .. } = request;
    ctx.spawn_worker(CAPTURE_TASK, move || {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        WorkerEvent::Captured {
            result: job.run(),
            then,
        }
    });
}

pub async fn handle_captured(
    ctx: &EventContext,
    pipeline: &mut Pipeline,
    result: Result<CapturedFrame, CaptureError>,
    then: AfterCapture,
) {
    pipeline.capture_pending = false;
    let frame = match result {
        Ok(frame) => frame,
        Err(e) => {
            ctx.report_error(e.to_string()).await;
            return;
        }
    };

    let outcome = pipeline.controller.commit(frame);
    ctx.state.status.write().await.record_capture();
    ctx.notify(AppEvent::CaptureTaken {
        region: outcome.region,
        sequence: outcome.sequence,
        bounds_warning: outcome.bounds_warning.map(|w| w.to_string()),
    })
    .await;

    match then {
        AfterCapture::Hold => {
            ctx.status(format!("Capture #{} ready", outcome.sequence), false)
                .await
        }
        AfterCapture::Save { ocr } => save_quick_capture(ctx, pipeline, ocr).await,
    }
}
