// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Plate candidate locator
//!
//! Fixed policy:
//! 1. grayscale
//! 2. bilateral smoothing (diameter 11, sigma 17/17)
//! 3. Canny edges (30/200)
//! 4. full contour hierarchy, in discovery order
//! 5. polygon approximation at 2% of the perimeter, quadrilaterals only
//! 6. bounding rectangle with `2 <= w / (h + 1e-6) <= 6`
//!
//! Candidates are returned in discovery order with no deduplication, merging
//! or ranking. Overlapping candidates (e.g. the inner and outer edge of the
//! same plate frame) are all reported.

use image::DynamicImage;
use imageproc::contours::find_contours;
use imageproc::edges::canny;
use tracing::debug;

use super::filters::{bilateral_filter, to_grayscale};
use super::geometry::{approximate_polygon, arc_length, bounding_rect};
use super::Rectangle;

/// Images narrower or shorter than this cannot hold an edge contour
const MIN_SEARCH_SIDE: u32 = 3;

/// Parameters of the candidate search
#[derive(Debug, Clone, PartialEq)]
pub struct LocatorParams {
    /// Bilateral filter neighbourhood diameter
    pub bilateral_diameter: u32,
    /// Bilateral filter intensity sigma
    pub bilateral_sigma_color: f32,
    /// Bilateral filter spatial sigma
    pub bilateral_sigma_space: f32,
    /// Canny hysteresis low threshold
    pub canny_low: f32,
    /// Canny hysteresis high threshold
    pub canny_high: f32,
    /// Polygon approximation tolerance as a fraction of the contour perimeter
    pub approx_tolerance: f64,
    /// Minimum accepted width/height ratio (inclusive)
    pub min_aspect: f64,
    /// Maximum accepted width/height ratio (inclusive)
    pub max_aspect: f64,
    /// Added to the height before dividing
    pub aspect_epsilon: f64,
}

impl Default for LocatorParams {
    fn default() -> Self {
        Self {
            bilateral_diameter: 11,
            bilateral_sigma_color: 17.0,
            bilateral_sigma_space: 17.0,
            canny_low: 30.0,
            canny_high: 200.0,
            approx_tolerance: 0.02,
            min_aspect: 2.0,
            max_aspect: 6.0,
            aspect_epsilon: 1e-6,
        }
    }
}

/// Finds rectangular regions likely to contain a licence plate
///
/// Stateless and deterministic: the same image always yields the same,
/// identically ordered candidate list.
#[derive(Debug, Clone, Default)]
pub struct CandidateLocator {
    params: LocatorParams,
}

impl CandidateLocator {
    pub fn new(params: LocatorParams) -> Self {
        Self { params }
    }

    /// Locate plate candidates, in contour discovery order
    pub fn locate(&self, image: &DynamicImage) -> Vec<Rectangle> {
        let params = &self.params;

        if image.width() < MIN_SEARCH_SIDE || image.height() < MIN_SEARCH_SIDE {
            return Vec::new();
        }

        let gray = to_grayscale(&image.to_rgb8());
        let smoothed = bilateral_filter(
            &gray,
            params.bilateral_diameter,
            params.bilateral_sigma_color,
            params.bilateral_sigma_space,
        );
        let edges = canny(&smoothed, params.canny_low, params.canny_high);
        let contours = find_contours::<u32>(&edges);

        let mut candidates = Vec::new();
        for contour in &contours {
            let epsilon = params.approx_tolerance * arc_length(&contour.points);
            let polygon = approximate_polygon(&contour.points, epsilon);
            if polygon.len() != 4 {
                continue;
            }

            let Some(rect) = bounding_rect(&polygon) else {
                continue;
            };

            if self.has_plate_aspect(&rect) {
                candidates.push(rect);
            }
        }

        debug!(
            "Plate candidate search: {} contours, {} candidates",
            contours.len(),
            candidates.len()
        );

        candidates
    }

    fn has_plate_aspect(&self, rect: &Rectangle) -> bool {
        let aspect = rect.aspect_ratio(self.params.aspect_epsilon);
        aspect >= self.params.min_aspect && aspect <= self.params.max_aspect
    }
}
