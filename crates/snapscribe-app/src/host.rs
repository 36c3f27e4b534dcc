use kanal::AsyncSender;
use snapscribe_core::SelectionHost;
use snapscribe_types::{AppEvent, CaptureRegion, UiEvent};

/// Forwards overlay and window instructions to the front-end
pub struct ChannelHost {
    tx: AsyncSender<AppEvent>,
}

impl ChannelHost {
    pub fn new(tx: AsyncSender<AppEvent>) -> Self {
        Self { tx }
    }

    fn post(&self, event: UiEvent) {
        match self.tx.try_send(AppEvent::UiEvent(event.clone())) {
            Ok(true) => {}
            Ok(false) => tracing::warn!("UI channel full, dropped {:?}", event),
            Err(e) => tracing::warn!("UI channel closed, dropped {:?}: {}", event, e),
        }
    }
}

impl SelectionHost for ChannelHost {
    fn hide_window(&mut self) {
        self.post(UiEvent::Hide);
    }

    fn restore_window(&mut self) {
        self.post(UiEvent::Show);
        self.post(UiEvent::Focus);
    }

    fn show_overlay(&mut self) {
        self.post(UiEvent::ShowOverlay);
    }

    fn close_overlay(&mut self) {
        self.post(UiEvent::HideOverlay);
    }

    fn draw_selection(&mut self, region: CaptureRegion) {
        self.post(UiEvent::DrawSelection(region));
    }

    fn clear_selection(&mut self) {
        self.post(UiEvent::ClearSelection);
    }
}
