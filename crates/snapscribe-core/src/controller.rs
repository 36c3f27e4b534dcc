use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use image::RgbaImage;
use snapscribe_types::{CaptureRegion, RecognitionResult, ScreenBounds};

use crate::capability::{ScreenCapture, TextRecognizer};
use crate::error::CaptureError;
use crate::preprocess::{ImagePreprocessor, Preprocessor};

/// The one image currently held by the controller
#[derive(Clone)]
pub struct CaptureSession {
    image: RgbaImage,
    region: CaptureRegion,
    sequence: u64,
    captured_at: DateTime<Local>,
}

impl CaptureSession {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn region(&self) -> CaptureRegion {
        self.region
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// When the pixels were grabbed, not when the session was looked at
    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("region", &self.region)
            .field("sequence", &self.sequence)
            .field("captured_at", &self.captured_at)
            .field("image", &self.image.dimensions())
            .finish()
    }
}

/// Region runs past the detected screen; capture was still attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsWarning {
    pub region: CaptureRegion,
    pub bounds: ScreenBounds,
}

impl fmt::Display for BoundsWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Region {} extends past the screen ({}x{} at ({}, {})), the capture may be clipped",
            self.region, self.bounds.width, self.bounds.height, self.bounds.x, self.bounds.y
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub region: CaptureRegion,
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub bounds_warning: Option<BoundsWarning>,
}

/// A validated capture request. Running it blocks on the screen backend, so
/// it belongs on a worker thread.
pub struct CaptureJob {
    region: CaptureRegion,
    capture: Arc<dyn ScreenCapture>,
}

impl CaptureJob {
    pub fn region(&self) -> CaptureRegion {
        self.region
    }

    pub fn run(self) -> Result<CapturedFrame, CaptureError> {
        let region = self.region;
        let bounds_warning = self
            .capture
            .screen_bounds()
            .filter(|bounds| !bounds.contains(&region))
            .map(|bounds| BoundsWarning { region, bounds });
        if let Some(warning) = &bounds_warning {
            tracing::warn!("{}", warning);
        }

        let image = self
            .capture
            .capture(region)
            .map_err(|e| CaptureError::CaptureFailed {
                reason: format!("{e:#}"),
            })?;
        if image.width() == 0 || image.height() == 0 {
            return Err(CaptureError::CaptureFailed {
                reason: format!("backend returned an empty image for {region}"),
            });
        }

        Ok(CapturedFrame {
            image,
            region,
            captured_at: Local::now(),
            bounds_warning,
        })
    }
}

/// Pixels from a finished [`CaptureJob`], not yet the active session
pub struct CapturedFrame {
    image: RgbaImage,
    region: CaptureRegion,
    captured_at: DateTime<Local>,
    bounds_warning: Option<BoundsWarning>,
}

impl fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("region", &self.region)
            .field("captured_at", &self.captured_at)
            .field("image", &self.image.dimensions())
            .finish()
    }
}

/// Everything needed to run OCR away from the controller's thread
pub struct ExtractionJob {
    image: RgbaImage,
    sequence: u64,
    preprocessor: ImagePreprocessor,
    recognizer: Arc<dyn TextRecognizer>,
}

impl ExtractionJob {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Preprocess and recognize. Recognizer failures come back as data.
    pub fn run(self) -> RecognitionResult {
        let binary = self.preprocessor.process(&self.image);
        match self.recognizer.recognize(&binary) {
            Ok(text) => {
                tracing::debug!(
                    "Capture #{} recognized {} chars",
                    self.sequence,
                    text.chars().count()
                );
                RecognitionResult::available(text)
            }
            Err(e) => {
                tracing::warn!("Text extraction failed for capture #{}: {:#}", self.sequence, e);
                RecognitionResult::extraction_error(format!("Text extraction failed: {e:#}"))
            }
        }
    }
}

pub struct CaptureController {
    capture: Arc<dyn ScreenCapture>,
    recognizer: Result<Arc<dyn TextRecognizer>, String>,
    preprocessor: ImagePreprocessor,
    session: Option<CaptureSession>,
    sequence: u64,
}

impl CaptureController {
    /// `recognizer` is decided once at startup. An `Err` carries the reason it
    /// could not be initialized and is reported on every extraction attempt.
    pub fn new(
        capture: Arc<dyn ScreenCapture>,
        recognizer: Result<Arc<dyn TextRecognizer>, String>,
    ) -> Self {
        match &recognizer {
            Ok(recognizer) => tracing::info!("Text recognition via {}", recognizer.name()),
            Err(reason) => tracing::warn!("Text recognition disabled: {}", reason),
        }
        Self {
            capture,
            recognizer,
            preprocessor: ImagePreprocessor::default(),
            session: None,
            sequence: 0,
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: ImagePreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// Capture and commit in one blocking call
    pub fn capture(&mut self, region: CaptureRegion) -> Result<CaptureOutcome, CaptureError> {
        let frame = self.prepare_capture(region)?.run()?;
        Ok(self.commit(frame))
    }

    /// Reject bad geometry up front and hand back the blocking part
    pub fn prepare_capture(&self, region: CaptureRegion) -> Result<CaptureJob, CaptureError> {
        validate(region)?;
        Ok(CaptureJob {
            region,
            capture: Arc::clone(&self.capture),
        })
    }

    /// Make `frame` the active session, replacing any previous one
    pub fn commit(&mut self, frame: CapturedFrame) -> CaptureOutcome {
        let CapturedFrame {
            image,
            region,
            captured_at,
            bounds_warning,
        } = frame;

        self.sequence += 1;
        let (width, height) = image.dimensions();
        self.session = Some(CaptureSession {
            image,
            region,
            sequence: self.sequence,
            captured_at,
        });
        tracing::info!("Capture #{} taken: {}", self.sequence, region);

        CaptureOutcome {
            region,
            sequence: self.sequence,
            width,
            height,
            bounds_warning,
        }
    }

    /// Snapshot the session for OCR on a worker
    pub fn prepare_extraction(&self) -> Result<ExtractionJob, CaptureError> {
        let session = self.session.as_ref().ok_or(CaptureError::NoActiveCapture)?;
        let recognizer = self
            .recognizer
            .as_ref()
            .map_err(|reason| CaptureError::RecognizerUnavailable {
                reason: reason.clone(),
            })?;

        Ok(ExtractionJob {
            image: session.image.clone(),
            sequence: session.sequence,
            preprocessor: self.preprocessor,
            recognizer: Arc::clone(recognizer),
        })
    }

    pub fn extract_text(&self) -> Result<RecognitionResult, CaptureError> {
        Ok(self.prepare_extraction()?.run())
    }

    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("Capture session cleared");
        }
    }
}

fn validate(region: CaptureRegion) -> Result<(), CaptureError> {
    let reason = if region.width <= 0 || region.height <= 0 {
        "width and height must be positive"
    } else if region.x < 0 || region.y < 0 {
        "position must be non-negative"
    } else {
        return Ok(());
    };
    Err(CaptureError::InvalidGeometry { region, reason })
}
