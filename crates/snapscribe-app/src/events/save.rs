use snapscribe_core::CaptureError;

use super::{EventContext, Pipeline, WorkerEvent};

pub async fn handle_save(ctx: &EventContext, pipeline: &mut Pipeline) {
    let Some(session) = pipeline.controller.session() else {
        ctx.report_error(CaptureError::NoActiveCapture.to_string())
            .await;
        return;
    };
    let image = session.image().clone();
    let region = session.region();
    let sequence = session.sequence();
    let captured_at = session.captured_at();

    // Text from an older capture must not end up in this descriptor
    let text = pipeline
        .last_recognition
        .as_ref()
        .filter(|(seq, _)| *seq == sequence)
        .and_then(|(_, result)| result.text().map(str::to_owned));

    pipeline.in_flight += 1;
    ctx.status(format!("Saving capture #{sequence}"), true).await;

    let writer = ctx.writer.clone();
    ctx.spawn_worker("save", move || WorkerEvent::Saved {
        sequence,
        recognition: None,
        outcome: writer.save(&image, region, captured_at, text.as_deref()),
    });
}
