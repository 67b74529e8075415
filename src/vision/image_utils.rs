// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image loading for uploaded plate photos

use image::{DynamicImage, GenericImageView, ImageFormat};
use thiserror::Error;

/// Default maximum accepted upload size (10MB)
pub const DEFAULT_MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Errors raised while turning uploaded bytes into pixels
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Decoded image has no pixels")]
    EmptyImage,
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Size in bytes
    pub size_bytes: usize,
}

/// Decode raw image bytes (multipart uploads) into a 3-channel 8-bit image
///
/// Alpha is dropped and grayscale sources are expanded, so every decoded
/// image has the same (height, width, 3) layout regardless of the source.
///
/// # Errors
/// - `EmptyData` / `TooLarge` for size violations
/// - `UnsupportedFormat` when the magic bytes match no known format
/// - `DecodeFailed` when the payload is truncated or corrupt
/// - `EmptyImage` when the decoded grid has zero width or height
pub fn decode_image_bytes(
    bytes: &[u8],
    max_size: usize,
) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    if bytes.len() > max_size {
        return Err(ImageError::TooLarge(bytes.len(), max_size));
    }

    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ImageError::EmptyImage);
    }

    let info = ImageInfo {
        width,
        height,
        format,
        size_bytes: bytes.len(),
    };

    Ok((DynamicImage::ImageRgb8(img.to_rgb8()), info))
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}
