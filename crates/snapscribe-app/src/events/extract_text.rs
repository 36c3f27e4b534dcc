use tokio_util::sync::CancellationToken;

use super::{EventContext, Pipeline, WorkerEvent};

pub const EXTRACTION_TASK: &str = "text extraction";

pub async fn handle_extract_text(ctx: &EventContext, pipeline: &mut Pipeline) {
    if pipeline.pending_extraction.is_some() {
        ctx.report_error("Text extraction is already running").await;
        return;
    }

    let job = match pipeline.controller.prepare_extraction() {
        Ok(job) => job,
        Err(e) => {
            ctx.report_error(e.to_string()).await;
            return;
        }
    };
    let sequence = job.sequence();

    // Checked only once the recognizer returns
    let token = CancellationToken::new();
    pipeline.pending_extraction = Some(token.clone());
    pipeline.in_flight += 1;
    ctx.status(format!("Extracting text from capture #{sequence}"), true)
        .await;

    ctx.spawn_worker(EXTRACTION_TASK, move || {
        let result = job.run();
        if token.is_cancelled() {
            WorkerEvent::ExtractionCancelled { sequence }
        } else {
            WorkerEvent::Extracted { sequence, result }
        }
    });
}

pub async fn handle_cancel_extraction(ctx: &EventContext, pipeline: &mut Pipeline) {
    match &pipeline.pending_extraction {
        Some(token) => {
            token.cancel();
            ctx.status("Cancelling text extraction", true).await;
        }
        None => ctx.status("No text extraction to cancel", false).await,
    }
}
