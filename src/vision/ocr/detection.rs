// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! Produces a per-pixel text probability map; connected regions above the
//! confidence threshold become text boxes.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array4, ArrayView2, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Probability threshold for text pixels
pub const CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Regions with fewer pixels are treated as noise
pub const MIN_REGION_PIXELS: usize = 10;

/// A detected text box in detection-input coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean text probability over the region (0.0-1.0)
    pub confidence: f32,
}

/// PaddleOCR text detection model (CPU-only)
#[derive(Clone)]
pub struct OcrDetectionModel {
    /// ONNX Runtime session, serialised across callers
    session: Arc<Mutex<Session>>,
    input_name: String,
}

impl std::fmt::Debug for OcrDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrDetectionModel")
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OcrDetectionModel {
    /// Load the detection model (`det_model.onnx`)
    pub async fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR detection model not found: {}", model_path.display());
        }

        info!("Loading OCR detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load OCR detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        debug!("Detection model input: {}", input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
        })
    }

    /// Run detection on a `[1, 3, H, W]` tensor from `preprocess_for_detection`
    pub fn detect(&self, input: &Array4<f32>) -> Result<Vec<TextBox>> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }
        let (input_height, input_width) = (shape[2], shape[3]);

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Detection session lock poisoned"))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        // [1, 1, H, W] or [1, H, W] probability map
        let mut prob_map = output.view();
        while prob_map.ndim() > 2 {
            prob_map = prob_map.index_axis_move(Axis(0), 0);
        }
        let prob_map = prob_map
            .into_dimensionality::<Ix2>()
            .context("Unexpected detection output shape")?;

        let boxes = extract_text_boxes(
            prob_map,
            CONFIDENCE_THRESHOLD,
            input_width,
            input_height,
        );
        debug!("Detected {} text regions", boxes.len());

        Ok(boxes)
    }
}

/// Group above-threshold pixels into 4-connected regions and return their
/// bounding boxes scaled to `input_width` x `input_height`, sorted top to
/// bottom then left to right.
pub fn extract_text_boxes(
    prob_map: ArrayView2<f32>,
    threshold: f32,
    input_width: usize,
    input_height: usize,
) -> Vec<TextBox> {
    let (height, width) = prob_map.dim();
    if height == 0 || width == 0 {
        return Vec::new();
    }

    let scale_x = input_width as f32 / width as f32;
    let scale_y = input_height as f32 / height as f32;

    let mut visited = vec![false; width * height];
    let mut boxes = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[y * width + x] || prob_map[[y, x]] < threshold {
                continue;
            }

            let region = flood_fill(&prob_map, &mut visited, x, y, threshold);
            if region.count < MIN_REGION_PIXELS {
                continue;
            }

            boxes.push(TextBox {
                x: region.min_x as f32 * scale_x,
                y: region.min_y as f32 * scale_y,
                width: (region.max_x - region.min_x + 1) as f32 * scale_x,
                height: (region.max_y - region.min_y + 1) as f32 * scale_y,
                confidence: region.prob_sum / region.count as f32,
            });
        }
    }

    boxes.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    boxes
}

struct Region {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    count: usize,
    prob_sum: f32,
}

fn flood_fill(
    prob_map: &ArrayView2<f32>,
    visited: &mut [bool],
    start_x: usize,
    start_y: usize,
    threshold: f32,
) -> Region {
    let (height, width) = prob_map.dim();
    let mut region = Region {
        min_x: start_x,
        max_x: start_x,
        min_y: start_y,
        max_y: start_y,
        count: 0,
        prob_sum: 0.0,
    };

    let mut stack = vec![(start_x, start_y)];
    while let Some((x, y)) = stack.pop() {
        let idx = y * width + x;
        if visited[idx] {
            continue;
        }
        let prob = prob_map[[y, x]];
        if prob < threshold {
            continue;
        }

        visited[idx] = true;
        region.count += 1;
        region.prob_sum += prob;
        region.min_x = region.min_x.min(x);
        region.max_x = region.max_x.max(x);
        region.min_y = region.min_y.min(y);
        region.max_y = region.max_y.max(y);

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }

    region
}
