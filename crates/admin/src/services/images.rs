//! Image upload validation and cropping.
//!
//! Uploads within 1200x1200 px and 2 MiB are accepted as-is; anything larger
//! is routed through an interactive crop step at a fixed aspect ratio
//! (square for products, widescreen for categories and the restaurant logo).
//! The checks are advisory - the backend may enforce its own limits.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{GenericImageView, ImageReader};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted dimension on either axis, in pixels.
pub const MAX_DIMENSION: u32 = 1200;

/// Maximum accepted upload size, in bytes (2 MiB).
pub const MAX_BYTES: usize = 2 * 1024 * 1024;

/// JPEG quality used when re-encoding a cropped image.
const JPEG_QUALITY: u8 = 90;

/// Errors from the image pipeline.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The upload could not be decoded as an image.
    #[error("could not decode image: {0}")]
    Decode(String),

    /// Encoding the cropped result failed.
    #[error("could not encode image: {0}")]
    Encode(String),

    /// The crop rectangle had no area after clamping.
    #[error("crop rectangle is empty")]
    EmptyCrop,
}

/// Target aspect ratio for a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 1:1, used for product images.
    Square,
    /// 16:9, used for category images and the restaurant logo.
    Widescreen,
}

impl AspectRatio {
    /// Width and height components of the ratio.
    #[must_use]
    pub const fn components(self) -> (u32, u32) {
        match self {
            Self::Square => (1, 1),
            Self::Widescreen => (16, 9),
        }
    }
}

/// Decoded facts about an upload.
#[derive(Debug, Clone, Copy)]
pub struct InspectedImage {
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
}

impl InspectedImage {
    /// Whether the upload exceeds the dimension or size thresholds.
    #[must_use]
    pub const fn needs_crop(&self) -> bool {
        self.width > MAX_DIMENSION || self.height > MAX_DIMENSION || self.byte_len > MAX_BYTES
    }
}

/// Decode an upload far enough to learn its pixel dimensions.
///
/// # Errors
///
/// Returns [`ImageError::Decode`] if the bytes are not a supported image.
pub fn inspect(bytes: &[u8]) -> Result<InspectedImage, ImageError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(e.to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    Ok(InspectedImage {
        width,
        height,
        byte_len: bytes.len(),
    })
}

/// A crop rectangle in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Largest centered rectangle of the given aspect inside an image.
///
/// This is the initial position of the interactive crop frame.
#[must_use]
pub fn default_crop(image_width: u32, image_height: u32, aspect: AspectRatio) -> CropRect {
    let (aw, ah) = aspect.components();

    // Try full width first; shrink to fit the height if needed.
    let mut width = image_width;
    let mut height = width * ah / aw;
    if height > image_height {
        height = image_height;
        width = height * aw / ah;
    }

    CropRect {
        x: (image_width - width) / 2,
        y: (image_height - height) / 2,
        width,
        height,
    }
}

/// Clamp an operator-supplied rectangle into the image and force the aspect.
///
/// The operator's pan/zoom inputs arrive as a free rectangle; the width wins
/// and the height is recomputed from the aspect, then everything is shifted
/// and shrunk to stay inside the image.
#[must_use]
pub fn clamp_crop(
    rect: CropRect,
    image_width: u32,
    image_height: u32,
    aspect: AspectRatio,
) -> CropRect {
    let (aw, ah) = aspect.components();

    let mut width = rect.width.clamp(1, image_width);
    let mut height = width * ah / aw;
    if height > image_height {
        height = image_height;
        width = height * aw / ah;
    }
    let height = height.max(1);
    let width = width.max(1);

    let x = rect.x.min(image_width - width);
    let y = rect.y.min(image_height - height);

    CropRect {
        x,
        y,
        width,
        height,
    }
}

/// Crop an upload to the given rectangle and re-encode as JPEG.
///
/// The rectangle is clamped to the image and the aspect before cropping; if
/// the cropped result still exceeds [`MAX_DIMENSION`] on either axis it is
/// scaled down to fit.
///
/// # Errors
///
/// Returns an error if the upload cannot be decoded or the result cannot be
/// encoded.
pub fn crop_to_jpeg(
    bytes: &[u8],
    rect: CropRect,
    aspect: AspectRatio,
) -> Result<Vec<u8>, ImageError> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    let (image_width, image_height) = image.dimensions();
    let rect = clamp_crop(rect, image_width, image_height, aspect);
    if rect.width == 0 || rect.height == 0 {
        return Err(ImageError::EmptyCrop);
    }

    let mut cropped = image.crop_imm(rect.x, rect.y, rect.width, rect.height);

    if rect.width > MAX_DIMENSION || rect.height > MAX_DIMENSION {
        cropped = cropped.resize(
            MAX_DIMENSION,
            MAX_DIMENSION,
            image::imageops::FilterType::Lanczos3,
        );
    }

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    cropped
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| ImageError::Encode(e.to_string()))?;

    Ok(out)
}
