// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Grayscale conversion and bilateral smoothing
//!
//! Both follow OpenCV's conventions (BT.601 luma weights, circular bilateral
//! window with reflect-101 borders) so that candidate search behaves like the
//! classic `cvtColor` + `bilateralFilter` plate heuristics.

use image::{GrayImage, Luma, RgbImage};

/// BT.601 luma weights (R, G, B)
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Convert an RGB image to single-channel grayscale
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let value = LUMA_WEIGHTS[0] * r as f32
            + LUMA_WEIGHTS[1] * g as f32
            + LUMA_WEIGHTS[2] * b as f32;
        gray.put_pixel(x, y, Luma([value.round().clamp(0.0, 255.0) as u8]));
    }

    gray
}

/// Edge-preserving bilateral filter
///
/// `diameter` is the pixel neighbourhood diameter; only offsets inside the
/// inscribed circle contribute. Each neighbour is weighted by
/// `exp(-d²/2σs²) * exp(-Δ²/2σc²)` where `d` is the spatial distance and `Δ`
/// the intensity difference to the centre pixel.
pub fn bilateral_filter(
    image: &GrayImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let radius = (diameter / 2).max(1) as i64;
    let color_coeff = -0.5 / (sigma_color as f64 * sigma_color as f64);
    let space_coeff = -0.5 / (sigma_space as f64 * sigma_space as f64);

    let color_weights: Vec<f64> = (0..256)
        .map(|delta| ((delta * delta) as f64 * color_coeff).exp())
        .collect();

    let mut kernel = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let dist_sq = (dx * dx + dy * dy) as f64;
            if dist_sq.sqrt() > radius as f64 {
                continue;
            }
            kernel.push((dx, dy, (dist_sq * space_coeff).exp()));
        }
    }

    let mut output = GrayImage::new(width, height);
    let (w, h) = (width as i64, height as i64);

    for y in 0..h {
        for x in 0..w {
            let center = image.get_pixel(x as u32, y as u32)[0] as i32;
            let mut sum = 0.0f64;
            let mut weight_sum = 0.0f64;

            for &(dx, dy, space_weight) in &kernel {
                let sx = reflect_101(x + dx, w);
                let sy = reflect_101(y + dy, h);
                let value = image.get_pixel(sx as u32, sy as u32)[0] as i32;
                let weight = space_weight * color_weights[(value - center).unsigned_abs() as usize];
                sum += weight * value as f64;
                weight_sum += weight;
            }

            let filtered = if weight_sum > 0.0 {
                (sum / weight_sum).round()
            } else {
                center as f64
            };
            output.put_pixel(x as u32, y as u32, Luma([filtered.clamp(0.0, 255.0) as u8]));
        }
    }

    output
}

/// Reflect an out-of-range index back into `0..len` without repeating the edge
/// sample (`gfedcb|abcdefgh|gfedcba`).
fn reflect_101(index: i64, len: i64) -> i64 {
    if len == 1 {
        return 0;
    }
    let mut i = index;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= len {
            i = 2 * len - 2 - i;
        } else {
            return i;
        }
    }
}
