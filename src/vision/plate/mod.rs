// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Plate candidate search
//!
//! Finds quadrilateral contours with a plate-like aspect ratio using generic
//! edge/contour heuristics:
//! - `filters` - grayscale conversion and edge-preserving smoothing
//! - `geometry` - contour perimeter, polygon approximation, bounding boxes
//! - `locator` - the fixed candidate search policy

pub mod filters;
pub mod geometry;
pub mod locator;

use serde::{Deserialize, Serialize};

pub use locator::{CandidateLocator, LocatorParams};

/// Axis-aligned region in image coordinates
///
/// Serialized as `[x, y, width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width` x `height` image
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Width over height, with `epsilon` added to the height
    pub fn aspect_ratio(&self, epsilon: f64) -> f64 {
        self.width as f64 / (self.height as f64 + epsilon)
    }

    /// Non-empty and fully inside a `width` x `height` image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

impl From<[u32; 4]> for Rectangle {
    fn from([x, y, width, height]: [u32; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<Rectangle> for [u32; 4] {
    fn from(rect: Rectangle) -> Self {
        [rect.x, rect.y, rect.width, rect.height]
    }
}
