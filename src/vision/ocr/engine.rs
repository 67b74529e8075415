// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine seam
//!
//! `TextEngine` is the boundary between plate recognition and whatever reads
//! text. The production implementation is `PaddleOcrEngine`; tests inject
//! their own.

use image::{DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::detection::{OcrDetectionModel, TextBox};
use super::preprocessing::{
    preprocess_for_detection, preprocess_for_recognition, PreprocessInfo, DET_INPUT_SIZE,
};
use super::recognition::OcrRecognitionModel;
use crate::vision::plate::Rectangle;

/// Detection model file inside the model directory
pub const DET_MODEL_FILE: &str = "det_model.onnx";
/// Recognition model file inside the model directory
pub const REC_MODEL_FILE: &str = "rec_model.onnx";
/// Character dictionary inside the model directory
pub const DICT_FILE: &str = "ppocr_keys_v1.txt";

/// Regions smaller than this (either side, in source pixels) are not read
const MIN_REGION_SIDE: u32 = 2;

/// OCR engine failures
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("OCR model not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to load OCR engine: {0}")]
    Load(String),

    #[error("OCR inference failed: {0}")]
    Inference(String),

    #[error("Invalid OCR input: {0}")]
    InvalidInput(String),
}

/// One line of text found by an engine
#[derive(Debug, Clone, PartialEq)]
pub struct TextDetection {
    /// Corners clockwise from top-left, in the coordinates of the input image
    pub polygon: [[f32; 2]; 4],
    pub text: String,
    /// 0.0-1.0
    pub confidence: f32,
}

/// Something that reads text lines from an image
///
/// Implementations must be safe to call from several requests at once.
#[cfg_attr(test, mockall::automock)]
pub trait TextEngine: Send + Sync {
    /// Short engine name for logs
    fn name(&self) -> &'static str;

    /// Read every text line in `image`, in detection order
    fn read_text(&self, image: &DynamicImage) -> Result<Vec<TextDetection>, EngineError>;
}

/// PaddleOCR (PP-OCR ONNX export) running on CPU
#[derive(Debug, Clone)]
pub struct PaddleOcrEngine {
    detector: OcrDetectionModel,
    recognizer: OcrRecognitionModel,
}

impl PaddleOcrEngine {
    /// Load both models and the dictionary from `model_dir`
    ///
    /// Expected files:
    /// - det_model.onnx (text detection)
    /// - rec_model.onnx (text recognition)
    /// - ppocr_keys_v1.txt (character dictionary)
    pub async fn load<P: AsRef<Path>>(model_dir: P) -> Result<Self, EngineError> {
        let model_dir = model_dir.as_ref();
        info!("Loading PaddleOCR models from {}", model_dir.display());

        let det_path = required_file(model_dir, DET_MODEL_FILE)?;
        let rec_path = required_file(model_dir, REC_MODEL_FILE)?;
        let dict_path = required_file(model_dir, DICT_FILE)?;

        let detector = OcrDetectionModel::new(&det_path)
            .await
            .map_err(|e| EngineError::Load(format!("{:#}", e)))?;
        let recognizer = OcrRecognitionModel::new(&rec_path, &dict_path)
            .await
            .map_err(|e| EngineError::Load(format!("{:#}", e)))?;

        info!(
            "PaddleOCR engine ready ({} dictionary classes)",
            recognizer.dictionary_size()
        );

        Ok(Self {
            detector,
            recognizer,
        })
    }
}

impl TextEngine for PaddleOcrEngine {
    fn name(&self) -> &'static str {
        "paddleocr"
    }

    fn read_text(&self, image: &DynamicImage) -> Result<Vec<TextDetection>, EngineError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidInput(format!(
                "empty image {}x{}",
                width, height
            )));
        }

        let info = PreprocessInfo::new(image, DET_INPUT_SIZE);
        let det_input = preprocess_for_detection(image);
        let boxes = self
            .detector
            .detect(&det_input)
            .map_err(|e| EngineError::Inference(format!("{:#}", e)))?;

        let mut detections = Vec::with_capacity(boxes.len());
        for text_box in &boxes {
            let Some(region) = project_box(&info, text_box) else {
                continue;
            };

            let crop = image.crop_imm(region.x, region.y, region.width, region.height);
            let rec_input = preprocess_for_recognition(&crop);
            let recognized = self
                .recognizer
                .recognize(&rec_input)
                .map_err(|e| EngineError::Inference(format!("{:#}", e)))?;

            if recognized.is_empty() {
                continue;
            }

            detections.push(TextDetection {
                polygon: rectangle_corners(&region),
                text: recognized.text,
                confidence: recognized.confidence,
            });
        }

        debug!(
            "{}: {} boxes, {} text lines",
            self.name(),
            boxes.len(),
            detections.len()
        );

        Ok(detections)
    }
}

fn required_file(dir: &Path, name: &str) -> Result<PathBuf, EngineError> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(EngineError::ModelNotFound(path.display().to_string()))
    }
}

/// Map a detection box from letterboxed input space onto the source image,
/// clipped to its bounds. Returns `None` for slivers.
fn project_box(info: &PreprocessInfo, text_box: &TextBox) -> Option<Rectangle> {
    let (x0, y0) = info.map_to_original(text_box.x, text_box.y);
    let (x1, y1) = info.map_to_original(
        text_box.x + text_box.width,
        text_box.y + text_box.height,
    );

    let left = x0.floor().max(0.0) as u32;
    let top = y0.floor().max(0.0) as u32;
    let right = (x1.ceil() as u32).min(info.original_width);
    let bottom = (y1.ceil() as u32).min(info.original_height);

    if right < left + MIN_REGION_SIDE || bottom < top + MIN_REGION_SIDE {
        return None;
    }

    Some(Rectangle::new(left, top, right - left, bottom - top))
}

fn rectangle_corners(rect: &Rectangle) -> [[f32; 2]; 4] {
    let (x0, y0) = (rect.x as f32, rect.y as f32);
    let (x1, y1) = (x0 + rect.width as f32, y0 + rect.height as f32);
    [[x0, y0], [x1, y0], [x1, y1], [x0, y1]]
}
