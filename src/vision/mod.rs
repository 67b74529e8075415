// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for plate recognition
//!
//! This module provides:
//! - Upload decoding with format sniffing and size limits
//! - Plate candidate search over edges and contours
//! - OCR via PaddleOCR, behind the `TextEngine` trait
//!
//! Everything here is CPU-bound and blocking.

pub mod image_utils;
pub mod ocr;
pub mod plate;
pub mod recognizer;

pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo};
pub use ocr::{EngineError, PaddleOcrEngine, TextDetection, TextEngine};
pub use plate::{CandidateLocator, LocatorParams, Rectangle};
pub use recognizer::TextRecognizer;
