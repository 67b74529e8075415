// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tensor preparation for the PaddleOCR models

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Square input size of the detection model
pub const DET_INPUT_SIZE: u32 = 640;

/// Recognition model input height
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Maximum width of a recognition input line
pub const REC_MAX_WIDTH: u32 = 320;

/// Minimum width of a recognition input line
pub const REC_MIN_WIDTH: u32 = 4;

/// Mean values for normalization (ImageNet)
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for normalization (ImageNet)
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Gray used to pad letterboxed detection input
const PAD_VALUE: u8 = 128;

/// Build the `[1, 3, 640, 640]` detection tensor
///
/// The image is letterboxed (aspect preserved, centred, gray padding) and
/// normalized with ImageNet mean/std. Grayscale input is replicated across
/// the three channels.
pub fn preprocess_for_detection(image: &DynamicImage) -> Array4<f32> {
    let padded = resize_with_padding(image, DET_INPUT_SIZE);
    to_normalized_tensor(&padded)
}

/// Build the `[1, 3, 48, W]` recognition tensor for one text line
///
/// Width follows the line's aspect ratio, clamped to `4..=320`.
pub fn preprocess_for_recognition(image: &DynamicImage) -> Array4<f32> {
    let (orig_w, orig_h) = image.dimensions();

    let scale = REC_INPUT_HEIGHT as f32 / orig_h.max(1) as f32;
    let new_width = ((orig_w as f32 * scale).round() as u32).clamp(REC_MIN_WIDTH, REC_MAX_WIDTH);

    let resized = image
        .resize_exact(new_width, REC_INPUT_HEIGHT, FilterType::Lanczos3)
        .to_rgb8();
    to_normalized_tensor(&resized)
}

/// Scale `image` to fit a `target_size` square and centre it on gray
pub fn resize_with_padding(image: &DynamicImage, target_size: u32) -> RgbImage {
    let mut output = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));

    let info = PreprocessInfo::new(image, target_size);
    if info.original_width == 0 || info.original_height == 0 {
        return output;
    }

    let resized = image
        .resize_exact(info.scaled_width, info.scaled_height, FilterType::Lanczos3)
        .to_rgb8();

    image::imageops::replace(
        &mut output,
        &resized,
        info.offset_x as i64,
        info.offset_y as i64,
    );
    output
}

fn to_normalized_tensor(rgb: &RgbImage) -> Array4<f32> {
    let (width, height) = rgb.dimensions();
    let mut tensor = Array4::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }

    tensor
}

/// Letterbox geometry, used to map detections back to source pixels
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessInfo {
    /// Scale factor applied
    pub scale: f32,
    /// Width after scaling
    pub scaled_width: u32,
    /// Height after scaling
    pub scaled_height: u32,
    /// X offset from padding
    pub offset_x: u32,
    /// Y offset from padding
    pub offset_y: u32,
    /// Original image width
    pub original_width: u32,
    /// Original image height
    pub original_height: u32,
}

impl PreprocessInfo {
    pub fn new(image: &DynamicImage, target_size: u32) -> Self {
        let (orig_w, orig_h) = image.dimensions();

        if orig_w == 0 || orig_h == 0 {
            return Self {
                scale: 1.0,
                scaled_width: 0,
                scaled_height: 0,
                offset_x: 0,
                offset_y: 0,
                original_width: orig_w,
                original_height: orig_h,
            };
        }

        let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
        let scaled_width = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
        let scaled_height = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

        Self {
            scale,
            scaled_width,
            scaled_height,
            offset_x: (target_size - scaled_width) / 2,
            offset_y: (target_size - scaled_height) / 2,
            original_width: orig_w,
            original_height: orig_h,
        }
    }

    /// Map a point from letterboxed space to the original image, clamped to
    /// its bounds
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let orig_x = (x - self.offset_x as f32) / self.scale;
        let orig_y = (y - self.offset_y as f32) / self.scale;
        (
            orig_x.clamp(0.0, self.original_width as f32),
            orig_y.clamp(0.0, self.original_height as f32),
        )
    }
}
