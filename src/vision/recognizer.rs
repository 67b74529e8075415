// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Single-line text reader for plate regions

use image::DynamicImage;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

use super::ocr::{EngineError, TextDetection, TextEngine};

/// Reads the most confident text line of a region
#[derive(Clone)]
pub struct TextRecognizer {
    engine: Arc<dyn TextEngine>,
}

impl std::fmt::Debug for TextRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRecognizer")
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl TextRecognizer {
    pub fn new(engine: Arc<dyn TextEngine>) -> Self {
        Self { engine }
    }

    /// Text of the highest-confidence detection, or `""` when the engine
    /// finds nothing. Multiple lines are never concatenated.
    pub fn recognize(&self, region: &DynamicImage) -> Result<String, EngineError> {
        let prepared = prepare_region(region);
        let detections = self.engine.read_text(&prepared)?;

        let text = best_detection(&detections)
            .map(|d| d.text.clone())
            .unwrap_or_default();

        debug!(
            "{} detections in {}x{} region, best: {:?}",
            detections.len(),
            region.width(),
            region.height(),
            text
        );

        Ok(text)
    }
}

/// Highest-confidence detection; the first one wins a tie and a `NaN`
/// confidence never wins
pub fn best_detection(detections: &[TextDetection]) -> Option<&TextDetection> {
    let mut best: Option<&TextDetection> = None;
    for detection in detections.iter().filter(|d| !d.confidence.is_nan()) {
        match best {
            Some(current) if detection.confidence <= current.confidence => {}
            _ => best = Some(detection),
        }
    }
    best
}

/// 8-bit gray and RGB pass through untouched; other colour layouts become
/// RGB8 and other single-channel layouts become Luma8.
fn prepare_region(region: &DynamicImage) -> Cow<'_, DynamicImage> {
    match region {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(region),
        DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_) => {
            Cow::Owned(DynamicImage::ImageLuma8(region.to_luma8()))
        }
        _ => Cow::Owned(DynamicImage::ImageRgb8(region.to_rgb8())),
    }
}
