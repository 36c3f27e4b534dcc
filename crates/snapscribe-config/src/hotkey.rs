use std::env;

use serde::{Deserialize, Serialize};
use snapscribe_types::CaptureRegion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotkeyBinding {
    CtrlShiftS,
    F9,
}

impl std::str::FromStr for HotkeyBinding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ctrl+shift+s" | "ctrl_shift_s" => Ok(Self::CtrlShiftS),
            "f9" => Ok(Self::F9),
            other => Err(format!("unknown hotkey binding '{other}'")),
        }
    }
}

fn default_region() -> CaptureRegion {
    CaptureRegion::new(0, 0, 800, 600)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Start the hotkey watcher together with the backend
    pub enabled: bool,
    pub binding: HotkeyBinding,
    /// Region captured on every hotkey press
    #[serde(default = "default_region")]
    pub region: CaptureRegion,
    /// Run OCR on hotkey captures when a recognizer is available
    pub ocr: bool,
    pub poll_interval_ms: u64,
}

impl HotkeyConfig {
    pub fn new() -> Self {
        let binding = env::var("SNAPSCRIBE_HOTKEY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(HotkeyBinding::CtrlShiftS);

        let enabled = env::var("SNAPSCRIBE_HOTKEY_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        Self {
            enabled,
            binding,
            region: default_region(),
            ocr: true,
            poll_interval_ms: 50,
        }
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self::new()
    }
}
