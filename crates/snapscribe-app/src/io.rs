use std::sync::Arc;
use std::time::Duration;

use kanal::AsyncSender;
use snapscribe_ocr::HotkeyManager;
use snapscribe_types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Poll the global capture hotkey and turn presses into quick captures
pub async fn watch_hotkey(
    state: Arc<AppState>,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let hotkey = state.config.hotkey.clone();

    // The manager is not Send, so it lives and dies on this blocking thread
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let manager = HotkeyManager::new(hotkey.binding)?;
        tracing::info!(
            "Capture hotkey registered ({:?}), capturing {}",
            hotkey.binding,
            hotkey.region
        );

        let interval = Duration::from_millis(hotkey.poll_interval_ms.max(1));
        while !cancel.is_cancelled() {
            if manager.poll() {
                tracing::info!("Capture hotkey pressed");
                let event = AppEvent::QuickCapture {
                    region: hotkey.region,
                    ocr: hotkey.ocr,
                };
                match event_tx.try_send(event) {
                    Ok(true) => {}
                    Ok(false) => tracing::warn!("Backend is busy, hotkey press dropped"),
                    Err(e) => {
                        tracing::warn!("Backend channel closed: {}", e);
                        break;
                    }
                }
            }

            std::thread::sleep(interval);
        }

        tracing::info!("Hotkey listener stopping");
        Ok(())
    })
    .await?
}
