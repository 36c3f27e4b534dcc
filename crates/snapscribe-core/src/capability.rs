//! Seams to the outside world. The controller only ever talks to these traits,
//! so the real screen and OCR engine can be swapped for stubs.

use image::{GrayImage, RgbaImage};
use snapscribe_types::{CaptureRegion, ScreenBounds};

/// Rasterizes a rectangle of the screen
pub trait ScreenCapture: Send + Sync {
    /// Capture `region`. Backends may clip a region that runs off screen.
    fn capture(&self, region: CaptureRegion) -> anyhow::Result<RgbaImage>;

    /// Union of all monitors, `None` when it cannot be detected
    fn screen_bounds(&self) -> Option<ScreenBounds>;
}

/// Turns a preprocessed raster into text
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &GrayImage) -> anyhow::Result<String>;

    /// Engine description for logs
    fn name(&self) -> String {
        "text recognizer".to_string()
    }
}
