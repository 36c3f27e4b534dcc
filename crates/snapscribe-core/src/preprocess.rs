use image::{GrayImage, Luma, RgbaImage};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};

const BLACK: u8 = 0;
const WHITE: u8 = 255;

/// Largest closing element; anything wider erases glyphs anyway
pub const MAX_CLOSING_KERNEL: u32 = 64;

/// Turns a raw capture into the raster handed to a text recognizer
pub trait Preprocessor: Send + Sync {
    fn process(&self, image: &RgbaImage) -> GrayImage;
}

/// grayscale -> Otsu binarization -> morphological closing
///
/// Screenshot backgrounds range from dark themes to white pages, so the
/// threshold is picked per image rather than fixed.
#[derive(Debug, Clone, Copy)]
pub struct ImagePreprocessor {
    closing_kernel: u32,
}

impl ImagePreprocessor {
    pub fn new(closing_kernel: u32) -> Self {
        Self {
            closing_kernel: closing_kernel.clamp(1, MAX_CLOSING_KERNEL),
        }
    }

    pub fn closing_kernel(&self) -> u32 {
        self.closing_kernel
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Preprocessor for ImagePreprocessor {
    fn process(&self, image: &RgbaImage) -> GrayImage {
        let gray = image::imageops::grayscale(image);
        let binary = binarize(&gray);
        close(&binary, self.closing_kernel)
    }
}

/// Two-level threshold at the level minimizing intra-class variance
pub fn binarize(gray: &GrayImage) -> GrayImage {
    let level = imageproc::contrast::otsu_level(gray);
    tracing::debug!("Otsu level {} for {}x{}", level, gray.width(), gray.height());

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > level {
            Luma([WHITE])
        } else {
            Luma([BLACK])
        }
    })
}

/// Dilation followed by erosion with a `size`x`size` square element.
///
/// An even element has no center pixel, so the erosion runs with the
/// reflected mask. That keeps the result a true closing: it never darkens a
/// pixel and applying it twice changes nothing.
pub fn close(image: &GrayImage, size: u32) -> GrayImage {
    let size = size.min(MAX_CLOSING_KERNEL);
    if size <= 1 {
        return image.clone();
    }
    let element = GrayImage::from_pixel(size, size, Luma([WHITE]));
    let far = (size - 1) as u8;
    let dilation = Mask::from_image(&element, far, far);
    let erosion = Mask::from_image(&element, 0, 0);
    grayscale_erode(&grayscale_dilate(image, &dilation), &erosion)
}
