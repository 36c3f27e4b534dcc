pub mod artifact;
pub mod capability;
pub mod controller;
pub mod error;
pub mod preprocess;
pub mod selector;

pub use artifact::{ArtifactStore, ArtifactWriter, FsStore, SavedArtifact};
pub use capability::{ScreenCapture, TextRecognizer};
pub use controller::{
    BoundsWarning, CaptureController, CaptureJob, CaptureOutcome, CaptureSession, CapturedFrame,
    ExtractionJob,
};
pub use error::{ArtifactError, CaptureError, SelectionError};
pub use preprocess::{ImagePreprocessor, Preprocessor};
pub use selector::{RegionSelector, SelectionHost, SelectionPhase, SelectionState, SelectionUpdate};
