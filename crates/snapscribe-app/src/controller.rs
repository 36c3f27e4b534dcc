use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use snapscribe_config::Config;
use snapscribe_core::{ArtifactWriter, CaptureController};
use snapscribe_types::AppEvent;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::{EventContext, WorkerEvent, event_loop};
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub worker_to_app: (AsyncSender<WorkerEvent>, AsyncReceiver<WorkerEvent>),
}

impl ChannelSet {
    pub fn new(config: &Config) -> Self {
        Self {
            app_to_ui: kanal::bounded_async(config.app_to_ui_capacity),
            ui_to_app: kanal::bounded_async(config.ui_to_app_capacity),
            worker_to_app: kanal::bounded_async(16),
        }
    }
}

/// Front-end end of the channels
pub struct UiHandle {
    pub from_app: AsyncReceiver<AppEvent>,
    pub to_app: AsyncSender<AppEvent>,
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(&state.config),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn ui_handle(&self) -> UiHandle {
        UiHandle {
            from_app: self.channels.app_to_ui.1.clone(),
            to_app: self.channels.ui_to_app.0.clone(),
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    /// Spawn the backend event loop. It owns `controller` for its lifetime.
    pub fn spawn_backend(
        &self,
        tasks: &mut JoinSet<anyhow::Result<()>>,
        controller: CaptureController,
    ) {
        let writer = Arc::new(ArtifactWriter::from_config(&self.state.config.artifact));
        let ctx = EventContext {
            state: self.state.clone(),
            app_to_ui_tx: self.channels.app_to_ui.0.clone(),
            worker_tx: self.channels.worker_to_app.0.clone(),
            writer,
        };

        tasks.spawn(event_loop(
            ctx,
            controller,
            self.channels.ui_to_app.1.clone(),
            self.channels.worker_to_app.1.clone(),
            self.cancel_token.child_token(),
        ));
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
