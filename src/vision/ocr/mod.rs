// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR integration for reading text from image regions
//!
//! Components:
//! - `detection` - Text region detection
//! - `recognition` - Text line recognition with CTC decoding
//! - `preprocessing` - Image preprocessing for models
//! - `engine` - `TextEngine` seam and the combined PaddleOCR engine

pub mod detection;
pub mod engine;
pub mod preprocessing;
pub mod recognition;

pub use detection::{OcrDetectionModel, TextBox};
pub use engine::{EngineError, PaddleOcrEngine, TextDetection, TextEngine};
pub use recognition::{OcrRecognitionModel, RecognizedText};
