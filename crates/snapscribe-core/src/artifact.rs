//! Image + descriptor persistence.
//!
//! Every save produces `<base>.<image ext>` and `<base>.<descriptor ext>`
//! where `<base>` is `<prefix>_<YYYYmmdd_HHMMSS>_<seq>`. The sequence is per
//! writer, so two saves in the same second never share a base name. Nothing
//! guards against collisions with files from earlier runs beyond the
//! timestamp.

use std::fmt::Write as _;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use image::{ImageFormat, RgbaImage};
use snapscribe_config::artifact::ArtifactConfig;
use snapscribe_types::CaptureRegion;

use crate::error::ArtifactError;

/// Filesystem operations used by [`ArtifactWriter`]
pub trait ArtifactStore: Send + Sync {
    fn create_dir_all(&self, dir: &Path) -> std::io::Result<()>;
    fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl ArtifactStore for FsStore {
    fn create_dir_all(&self, dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        std::fs::write(path, contents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub base_name: String,
    pub image_path: PathBuf,
    pub descriptor_path: PathBuf,
    pub sequence: u64,
    pub captured_at: DateTime<Local>,
}

pub struct ArtifactWriter<S: ArtifactStore = FsStore> {
    output_dir: PathBuf,
    prefix: String,
    image_extension: String,
    descriptor_extension: String,
    sequence: AtomicU64,
    store: S,
}

impl ArtifactWriter<FsStore> {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_store(output_dir, FsStore)
    }

    pub fn from_config(config: &ArtifactConfig) -> Self {
        let mut writer = Self::new(&config.output_dir);
        writer.prefix = config.prefix.clone();
        writer.image_extension = config.image_extension.clone();
        writer.descriptor_extension = config.descriptor_extension.clone();
        writer
    }
}

impl<S: ArtifactStore> ArtifactWriter<S> {
    pub fn with_store(output_dir: impl Into<PathBuf>, store: S) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: "capture".to_string(),
            image_extension: "png".to_string(),
            descriptor_extension: "md".to_string(),
            sequence: AtomicU64::new(0),
            store,
        }
    }

    /// Write the image, then its descriptor.
    ///
    /// `captured_at` is when the pixels were grabbed; it names the pair and
    /// fills the descriptor's timestamp, however late the save happens.
    /// A failed image write never leaves a descriptor behind. A failed
    /// descriptor write leaves the image in place and says so in the error.
    pub fn save(
        &self,
        image: &RgbaImage,
        region: CaptureRegion,
        captured_at: DateTime<Local>,
        text: Option<&str>,
    ) -> Result<SavedArtifact, ArtifactError> {
        self.store
            .create_dir_all(&self.output_dir)
            .map_err(|source| ArtifactError::DirectoryCreate {
                path: self.output_dir.clone(),
                source,
            })?;

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let base_name = format!(
            "{}_{}_{:04}",
            self.prefix,
            captured_at.format("%Y%m%d_%H%M%S"),
            sequence
        );
        let image_name = format!("{base_name}.{}", self.image_extension);
        let image_path = self.output_dir.join(&image_name);
        let descriptor_path = self
            .output_dir
            .join(format!("{base_name}.{}", self.descriptor_extension));

        let bytes = encode_png(image).map_err(|e| ArtifactError::ImageWriteFailed {
            path: image_path.clone(),
            reason: e.to_string(),
        })?;
        self.store
            .write(&image_path, &bytes)
            .map_err(|e| ArtifactError::ImageWriteFailed {
                path: image_path.clone(),
                reason: e.to_string(),
            })?;
        tracing::debug!("Wrote {} ({} bytes)", image_path.display(), bytes.len());

        let descriptor = render_descriptor(&DescriptorFields {
            base_name: &base_name,
            image_name: &image_name,
            captured_at,
            region,
            image_size: image.dimensions(),
            text,
        });
        self.store
            .write(&descriptor_path, descriptor.as_bytes())
            .map_err(|e| ArtifactError::DescriptorWriteFailed {
                path: descriptor_path.clone(),
                image: image_path.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!("Saved {} and {}", image_path.display(), descriptor_path.display());
        Ok(SavedArtifact {
            base_name,
            image_path,
            descriptor_path,
            sequence,
            captured_at,
        })
    }
}

fn encode_png(image: &RgbaImage) -> image::ImageResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

struct DescriptorFields<'a> {
    base_name: &'a str,
    image_name: &'a str,
    captured_at: DateTime<Local>,
    region: CaptureRegion,
    image_size: (u32, u32),
    text: Option<&'a str>,
}

fn render_descriptor(fields: &DescriptorFields<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Screenshot {}", title_from_base(fields.base_name));
    out.push('\n');
    let _ = writeln!(
        out,
        "- **Captured**: {}",
        fields.captured_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(
        out,
        "- **Position**: ({}, {})",
        fields.region.x, fields.region.y
    );
    let _ = writeln!(
        out,
        "- **Dimensions**: {} x {}",
        fields.region.width, fields.region.height
    );
    if fields.image_size != (fields.region.width as u32, fields.region.height as u32) {
        let _ = writeln!(
            out,
            "- **Captured size**: {} x {}",
            fields.image_size.0, fields.image_size.1
        );
    }
    let _ = writeln!(out, "- **File**: {}", fields.image_name);
    out.push('\n');
    let _ = writeln!(out, "![{}]({})", fields.base_name, fields.image_name);

    if let Some(text) = fields.text {
        let fence = fence_for(text);
        out.push('\n');
        out.push_str("## Recognized Text\n\n");
        let _ = writeln!(out, "{fence}text");
        out.push_str(text);
        if !text.ends_with('\n') {
            out.push('\n');
        }
        let _ = writeln!(out, "{fence}");
    }
    out
}

/// `capture_20260102_030405_0007` -> `capture 2026-01-02 03:04:05 #7`
fn title_from_base(base_name: &str) -> String {
    let parts: Vec<&str> = base_name.rsplitn(4, '_').collect();
    match parts.as_slice() {
        [seq, time, date, prefix]
            if date.len() == 8 && time.len() == 6 && seq.parse::<u64>().is_ok() =>
        {
            format!(
                "{} {}-{}-{} {}:{}:{} #{}",
                prefix,
                &date[0..4],
                &date[4..6],
                &date[6..8],
                &time[0..2],
                &time[2..4],
                &time[4..6],
                seq.trim_start_matches('0')
            )
        }
        _ => base_name.to_string(),
    }
}

/// A backtick fence longer than any backtick run inside `text`
fn fence_for(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}
