mod capture;
#[cfg(windows)]
mod com;
mod hotkey;
mod ocr;

pub use capture::{MonitorInfo, XcapScreenCapture, list_monitors};
#[cfg(windows)]
pub use com::ComGuard;
pub use hotkey::HotkeyManager;
pub use ocr::init_recognizer;
#[cfg(windows)]
pub use ocr::WindowsRecognizer;
