use std::sync::Arc;

use snapscribe_config::ocr::OcrConfig;
use snapscribe_core::TextRecognizer;

/// Build the recognizer once at startup.
///
/// `Err` carries a human-readable reason; the caller keeps capturing without OCR.
pub fn init_recognizer(config: &OcrConfig) -> Result<Arc<dyn TextRecognizer>, String> {
    if !config.enabled {
        return Err("text recognition is disabled in the configuration".to_string());
    }
    platform_recognizer(&config.language)
}

#[cfg(windows)]
fn platform_recognizer(language: &str) -> Result<Arc<dyn TextRecognizer>, String> {
    match WindowsRecognizer::new(language) {
        Ok(recognizer) => {
            tracing::info!("Windows OCR ready for language '{}'", language);
            Ok(Arc::new(recognizer))
        }
        Err(e) => Err(format!(
            "Windows OCR could not be created for '{language}': {e:#}. Install the language pack in Windows settings"
        )),
    }
}

#[cfg(not(windows))]
fn platform_recognizer(language: &str) -> Result<Arc<dyn TextRecognizer>, String> {
    Err(format!(
        "no text recognition engine is available on this platform (requested language '{language}')"
    ))
}

#[cfg(windows)]
pub use windows_ocr::WindowsRecognizer;

#[cfg(windows)]
mod windows_ocr {
    use std::io::Cursor;

    use anyhow::{Context, Result};
    use image::{GrayImage, ImageFormat};
    use snapscribe_core::TextRecognizer;
    use windows::{
        Globalization::Language,
        Graphics::Imaging::BitmapDecoder,
        Media::Ocr::OcrEngine as WinOcrEngine,
        Storage::Streams::{DataWriter, InMemoryRandomAccessStream},
        core::HSTRING,
    };

    use crate::com::ComGuard;

    /// Windows.Media.Ocr behind the [`TextRecognizer`] seam
    pub struct WindowsRecognizer {
        engine: WinOcrEngine,
        language: String,
    }

    impl WindowsRecognizer {
        /// Create an engine for the given language tag (e.g. "en", "ja")
        pub fn new(language_code: &str) -> Result<Self> {
            let _com = ComGuard::initialize()?;
            let language = Language::CreateLanguage(&HSTRING::from(language_code))
                .context("Failed to create language")?;

            let engine = WinOcrEngine::TryCreateFromLanguage(&language)
                .context("Failed to create OCR engine for language")?;

            Ok(Self {
                engine,
                language: language_code.to_string(),
            })
        }

        /// Recognize text from PNG image bytes
        fn recognize_png(&self, image_bytes: &[u8]) -> Result<String> {
            let stream = InMemoryRandomAccessStream::new().context("Failed to create stream")?;
            let writer =
                DataWriter::CreateDataWriter(&stream).context("Failed to create writer")?;

            writer
                .WriteBytes(image_bytes)
                .context("Failed to write image bytes")?;
            writer
                .StoreAsync()
                .context("Failed to store async")?
                .get()
                .context("Failed to store data")?;
            writer.FlushAsync().context("Failed to flush")?.get()?;

            stream.Seek(0).context("Failed to seek")?;

            let decoder = BitmapDecoder::CreateAsync(&stream)
                .context("Failed to create decoder async")?
                .get()
                .context("Failed to get decoder")?;

            let bitmap = decoder
                .GetSoftwareBitmapAsync()
                .context("Failed to get bitmap async")?
                .get()
                .context("Failed to get software bitmap")?;

            let result = self
                .engine
                .RecognizeAsync(&bitmap)
                .context("Failed to recognize async")?
                .get()
                .context("Failed to get OCR result")?;

            Ok(result.Text().context("Failed to get text")?.to_string())
        }
    }

    impl TextRecognizer for WindowsRecognizer {
        fn recognize(&self, image: &GrayImage) -> Result<String> {
            let _com = ComGuard::initialize()?;

            let mut png = Cursor::new(Vec::new());
            image
                .write_to(&mut png, ImageFormat::Png)
                .context("Failed to encode OCR input")?;
            self.recognize_png(png.get_ref())
        }

        fn name(&self) -> String {
            format!("Windows OCR ({})", self.language)
        }
    }
}
