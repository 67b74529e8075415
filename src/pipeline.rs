// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Plate recognition pipeline
//!
//! decode -> locate candidates -> read up to three of them, or the whole
//! image when nothing plate-shaped was found.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

use crate::vision::image_utils::{decode_image_bytes, ImageError, DEFAULT_MAX_IMAGE_SIZE};
use crate::vision::ocr::{EngineError, TextEngine};
use crate::vision::plate::CandidateLocator;
use crate::vision::recognizer::TextRecognizer;

pub use crate::vision::plate::Rectangle;

/// Candidates read per image, in discovery order
pub const MAX_CANDIDATES: usize = 3;

/// A recognized region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionItem {
    pub bbox: Rectangle,
    /// May be empty
    pub text: String,
}

/// One to three items: the first candidates, or a single full-image item
pub type RecognitionResult = Vec<RecognitionItem>;

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error(transparent)]
    Decode(#[from] ImageError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("{0}")]
    Unexpected(String),
}

pub struct RecognitionPipeline {
    locator: CandidateLocator,
    recognizer: TextRecognizer,
    max_image_bytes: usize,
}

impl std::fmt::Debug for RecognitionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionPipeline")
            .field("locator", &self.locator)
            .field("recognizer", &self.recognizer)
            .field("max_image_bytes", &self.max_image_bytes)
            .finish()
    }
}

impl RecognitionPipeline {
    pub fn new(engine: Arc<dyn TextEngine>) -> Self {
        Self {
            locator: CandidateLocator::default(),
            recognizer: TextRecognizer::new(engine),
            max_image_bytes: DEFAULT_MAX_IMAGE_SIZE,
        }
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    /// Run the whole pipeline on an uploaded file
    ///
    /// Blocking and CPU-bound. Any failure aborts the request; there are no
    /// partial results.
    pub fn process(&self, bytes: &[u8]) -> Result<RecognitionResult, RecognitionError> {
        let start = Instant::now();

        let (image, info) = decode_image_bytes(bytes, self.max_image_bytes)?;
        debug!(
            "Decoded {:?} image {}x{} ({} bytes)",
            info.format, info.width, info.height, info.size_bytes
        );

        let candidates = self.locator.locate(&image);

        let mut result = Vec::with_capacity(MAX_CANDIDATES);
        for bbox in candidates.iter().take(MAX_CANDIDATES) {
            // The crop must match the reported bbox; crop_imm clamps
            if !bbox.fits_within(info.width, info.height) {
                return Err(RecognitionError::Unexpected(format!(
                    "candidate {:?} outside {}x{} image",
                    bbox, info.width, info.height
                )));
            }
            let region = image.crop_imm(bbox.x, bbox.y, bbox.width, bbox.height);
            let text = self.recognizer.recognize(&region)?;
            result.push(RecognitionItem { bbox: *bbox, text });
        }

        if result.is_empty() {
            let bbox = Rectangle::full(info.width, info.height);
            let text = self.recognizer.recognize(&image)?;
            result.push(RecognitionItem { bbox, text });
        }

        debug!(
            "Recognition finished in {:?}: {} candidates, {} items",
            start.elapsed(),
            candidates.len(),
            result.len()
        );

        Ok(result)
    }
}
