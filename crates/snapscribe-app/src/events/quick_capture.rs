use snapscribe_core::{CaptureError, ExtractionJob};
use snapscribe_types::{CaptureRegion, RecognitionResult};

use super::capture::{AfterCapture, CaptureRequest, handle_capture};
use super::{EventContext, Pipeline, WorkerEvent};

/// capture -> (preprocess -> recognize) -> save
pub async fn handle_quick_capture(
    ctx: &EventContext,
    pipeline: &mut Pipeline,
    region: CaptureRegion,
    ocr: bool,
) {
    handle_capture(
        ctx,
        pipeline,
        CaptureRequest::now(region, AfterCapture::Save { ocr }),
    )
    .await;
}

/// Second half of a quick capture, once its frame is the session.
/// Recognition and the save share one worker.
pub async fn save_quick_capture(ctx: &EventContext, pipeline: &mut Pipeline, ocr: bool) {
    let Some(session) = pipeline.controller.session() else {
        return;
    };
    let image = session.image().clone();
    let (sequence, region, captured_at) =
        (session.sequence(), session.region(), session.captured_at());

    let (job, unavailable) = if ocr {
        match pipeline.controller.prepare_extraction() {
            Ok(job) => (Some(job), None),
            Err(e @ CaptureError::RecognizerUnavailable { .. }) => {
                tracing::warn!("Saving capture #{} without text: {}", sequence, e);
                (None, Some(RecognitionResult::unavailable(e.to_string())))
            }
            Err(e) => {
                tracing::warn!("Saving capture #{} without text: {}", sequence, e);
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    pipeline.in_flight += 1;
    ctx.status(format!("Processing capture #{sequence}"), true)
        .await;

    let writer = ctx.writer.clone();
    ctx.spawn_worker("quick capture", move || {
        let recognition = job.map(ExtractionJob::run).or(unavailable);
        let text = recognition.as_ref().and_then(RecognitionResult::text);
        let outcome = writer.save(&image, region, captured_at, text);
        WorkerEvent::Saved {
            sequence,
            recognition,
            outcome,
        }
    });
}
