use std::path::{Path, PathBuf};

use snapscribe_types::CaptureRegion;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Invalid geometry {region}: {reason}")]
    InvalidGeometry {
        region: CaptureRegion,
        reason: &'static str,
    },

    #[error("Screen capture failed: {reason}")]
    CaptureFailed { reason: String },

    #[error("No active capture, take a screenshot first")]
    NoActiveCapture,

    #[error("Text recognizer is not available: {reason}")]
    RecognizerUnavailable { reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to create output directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write image {path}: {reason}")]
    ImageWriteFailed { path: PathBuf, reason: String },

    #[error("Failed to write descriptor {path}: {reason} (image {image} was saved without it)")]
    DescriptorWriteFailed {
        path: PathBuf,
        image: PathBuf,
        reason: String,
    },
}

impl ArtifactError {
    /// Image left on disk without a descriptor, if any
    pub fn orphaned_image(&self) -> Option<&Path> {
        match self {
            Self::DescriptorWriteFailed { image, .. } => Some(image),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("A region selection is already in progress")]
    AlreadyActive,
}
