use std::env;

use serde::{Deserialize, Serialize};

fn default_filter() -> String {
    "snapscribe=info".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Used when RUST_LOG is not set
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl LoggingConfig {
    pub fn new() -> Self {
        let json = env::var("SNAPSCRIBE_LOG_JSON")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        Self {
            json,
            filter: default_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new()
    }
}
