use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Take over the screen with the selection overlay
    BeginSelection,
    Pointer(PointerEvent),
    /// Capture a typed-in region
    Capture(CaptureRegion),
    ExtractText,
    /// Capture, recognize (when asked and possible) and save in one go
    QuickCapture {
        region: CaptureRegion,
        ocr: bool,
    },
    /// Persist the current capture with the last recognized text, if any
    Save,
    Reset,
    /// Drop the result of an in-flight extraction
    CancelExtraction,
    UiEvent(UiEvent),
    SelectionResolved(CaptureRegion),
    SelectionCancelled,
    CaptureTaken {
        region: CaptureRegion,
        sequence: u64,
        bounds_warning: Option<String>,
    },
    TextExtracted {
        sequence: u64,
        result: RecognitionResult,
    },
    ArtifactSaved {
        image: PathBuf,
        descriptor: PathBuf,
    },
    ArtifactFailed {
        message: String,
        orphaned_image: Option<PathBuf>,
    },
    StatusUpdate {
        status: String,
        busy: bool,
    },
    BackendReady,
    Shutdown,
}

/// Instructions for whatever front-end hosts the controlling window and overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Show,
    Hide,
    Focus,
    ShowOverlay,
    HideOverlay,
    DrawSelection(CaptureRegion),
    ClearSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Screen rectangle to rasterize. Signed so typed-in values can be validated
/// instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CaptureRegion {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalize two raw drag points into a top-left anchored rectangle
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (i64::from(a.x) - i64::from(b.x)).unsigned_abs().min(i32::MAX as u64) as i32,
            height: (i64::from(a.y) - i64::from(b.y)).unsigned_abs().min(i32::MAX as u64) as i32,
        }
    }

    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl std::fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Union of all detected monitors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenBounds {
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    pub fn contains(&self, region: &CaptureRegion) -> bool {
        region.right() <= self.right() && region.bottom() <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionStatus {
    Available,
    Unavailable,
    ExtractionError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub text: String,
    pub status: RecognitionStatus,
    /// Human-readable reason when status is not `Available`
    pub message: Option<String>,
}

impl RecognitionResult {
    pub fn available(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: RecognitionStatus::Available,
            message: None,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            status: RecognitionStatus::Unavailable,
            message: Some(message.into()),
        }
    }

    pub fn extraction_error(message: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            status: RecognitionStatus::ExtractionError,
            message: Some(message.into()),
        }
    }

    /// Text worth attaching to a descriptor
    pub fn text(&self) -> Option<&str> {
        match self.status {
            RecognitionStatus::Available => Some(self.text.as_str()),
            _ => None,
        }
    }
}
