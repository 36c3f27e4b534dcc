use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_output_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

fn default_prefix() -> String {
    "capture".to_string()
}

fn default_image_extension() -> String {
    "png".to_string()
}

fn default_descriptor_extension() -> String {
    "md".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directory the image/descriptor pairs are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Leading part of every base file name
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_image_extension")]
    pub image_extension: String,
    #[serde(default = "default_descriptor_extension")]
    pub descriptor_extension: String,
}

impl ArtifactConfig {
    pub fn new() -> Self {
        let output_dir = env::var("SNAPSCRIBE_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_output_dir());

        Self {
            output_dir,
            prefix: default_prefix(),
            image_extension: default_image_extension(),
            descriptor_extension: default_descriptor_extension(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self::new()
    }
}
