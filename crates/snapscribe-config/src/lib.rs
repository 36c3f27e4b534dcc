use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use self::artifact::ArtifactConfig;
use self::capture::CaptureConfig;
use self::hotkey::HotkeyConfig;
use self::logging::LoggingConfig;
use self::ocr::OcrConfig;

pub mod artifact;
pub mod capture;
pub mod hotkey;
pub mod logging;
pub mod ocr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to open config file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub ocr: OcrConfig,
    pub artifact: ArtifactConfig,
    pub hotkey: HotkeyConfig,
    pub logging: LoggingConfig,

    /// Capacity of the backend -> front-end channel
    pub app_to_ui_capacity: usize,
    /// Capacity of the front-end -> backend channel
    pub ui_to_app_capacity: usize,
}

impl Config {
    pub fn new() -> Self {
        let app_to_ui_capacity = env::var("SNAPSCRIBE_APP_TO_UI_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(256);

        let ui_to_app_capacity = env::var("SNAPSCRIBE_UI_TO_APP_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(64); // pointer moves arrive in bursts

        Config {
            capture: CaptureConfig::new(),
            ocr: OcrConfig::new(),
            artifact: ArtifactConfig::new(),
            hotkey: HotkeyConfig::new(),
            logging: LoggingConfig::new(),

            app_to_ui_capacity,
            ui_to_app_capacity,
        }
    }

    /// Load a JSON profile. Missing fields fall back to the env/default values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
