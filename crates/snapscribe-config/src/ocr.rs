use std::env;

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

fn default_closing_kernel() -> u32 {
    2
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OcrConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Recognizer language tag (e.g. "en", "ja")
    #[serde(default = "default_language")]
    pub language: String,
    /// Side of the square structuring element used to close stroke gaps
    #[serde(default = "default_closing_kernel")]
    pub closing_kernel: u32,
}

impl OcrConfig {
    pub fn new() -> Self {
        let enabled = env::var("SNAPSCRIBE_OCR_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_enabled);
        let language =
            env::var("SNAPSCRIBE_OCR_LANGUAGE").unwrap_or_else(|_| default_language());

        Self {
            enabled,
            language,
            closing_kernel: default_closing_kernel(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::new()
    }
}
