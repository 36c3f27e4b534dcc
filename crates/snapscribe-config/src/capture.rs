use std::env;

use serde::{Deserialize, Serialize};

fn default_overlay_settle_ms() -> u64 {
    200
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CaptureConfig {
    /// Wait after the overlay is torn down so it does not end up in the capture
    #[serde(default = "default_overlay_settle_ms")]
    pub overlay_settle_ms: u64,
}

impl CaptureConfig {
    pub fn new() -> Self {
        let overlay_settle_ms = env::var("SNAPSCRIBE_OVERLAY_SETTLE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_overlay_settle_ms);

        Self { overlay_settle_ms }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::new()
    }
}
