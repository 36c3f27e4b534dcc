use snapscribe_config::Config;
use tokio::sync::RwLock;

use crate::status::PipelineStatus;

pub struct AppState {
    pub config: Config,
    pub status: RwLock<PipelineStatus>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            status: RwLock::new(PipelineStatus::default()),
        }
    }
}
