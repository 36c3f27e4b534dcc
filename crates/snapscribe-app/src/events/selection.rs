use std::time::Duration;

use snapscribe_core::SelectionUpdate;
use snapscribe_types::{AppEvent, PointerEvent};

use super::capture::{AfterCapture, CaptureRequest, handle_capture};
use super::{EventContext, Pipeline};

pub async fn handle_begin_selection(ctx: &EventContext, pipeline: &mut Pipeline) {
    match pipeline.selector.begin() {
        Ok(()) => {
            ctx.status("Drag to select a region, Escape to cancel", true)
                .await
        }
        Err(e) => ctx.report_error(e.to_string()).await,
    }
}

pub async fn handle_pointer(ctx: &EventContext, pipeline: &mut Pipeline, event: PointerEvent) {
    match pipeline.selector.handle(event) {
        SelectionUpdate::Resolved(region) => {
            ctx.notify(AppEvent::SelectionResolved(region)).await;

            // Let the compositor remove the overlay before grabbing pixels
            let request = CaptureRequest {
                region,
                delay: Duration::from_millis(ctx.state.config.capture.overlay_settle_ms),
                then: AfterCapture::Hold,
            };
            handle_capture(ctx, pipeline, request).await;
        }
        SelectionUpdate::Cancelled => {
            ctx.notify(AppEvent::SelectionCancelled).await;
            ctx.status("Selection cancelled", false).await;
        }
        SelectionUpdate::Anchored(_) | SelectionUpdate::Redrawn(_) | SelectionUpdate::Ignored => {}
    }
}
