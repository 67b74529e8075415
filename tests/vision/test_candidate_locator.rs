// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Candidate locator tests on synthetic scenes

use image::{DynamicImage, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use plate_recognition_node::vision::{CandidateLocator, LocatorParams};

use crate::common::{blank_image, many_plates_image, plate_image, BLACK};

#[test]
fn test_locate_is_deterministic() {
    let locator = CandidateLocator::default();
    let image = DynamicImage::ImageRgb8(many_plates_image());

    let first = locator.locate(&image);
    let second = locator.locate(&image);
    assert_eq!(first, second);
}

#[test]
fn test_candidates_lie_inside_image() {
    let locator = CandidateLocator::default();
    let image = DynamicImage::ImageRgb8(many_plates_image());

    let candidates = locator.locate(&image);
    assert!(candidates.len() >= 5, "{:?}", candidates);
    for rect in &candidates {
        assert!(rect.fits_within(400, 300), "{:?}", rect);
        let aspect = rect.aspect_ratio(1e-6);
        assert!((2.0..=6.0).contains(&aspect), "{:?}", rect);
    }
}

#[test]
fn test_outline_yields_overlapping_candidates() {
    let mut img = blank_image(300, 160);
    draw_hollow_rect_mut(&mut img, Rect::at(50, 40).of_size(200, 50), BLACK);

    let candidates = CandidateLocator::default().locate(&DynamicImage::ImageRgb8(img));

    // Edges form on both sides of the stroke and nothing is merged
    assert_eq!(candidates.len(), 4, "{:?}", candidates);
    assert_eq!(candidates[2], candidates[3]);

    let first = candidates[0];
    assert!((first.x as i64 - 50).abs() <= 2, "{:?}", first);
    assert!((first.y as i64 - 40).abs() <= 2, "{:?}", first);
    assert!((first.width as i64 - 200).abs() <= 3, "{:?}", first);
    assert!((first.height as i64 - 50).abs() <= 3, "{:?}", first);

    for rect in &candidates {
        let right = (rect.x + rect.width) as i64;
        let bottom = (rect.y + rect.height) as i64;
        assert!((rect.x as i64 - 50).abs() <= 4, "{:?}", rect);
        assert!((rect.y as i64 - 40).abs() <= 4, "{:?}", rect);
        assert!((right - 250).abs() <= 4, "{:?}", rect);
        assert!((bottom - 90).abs() <= 4, "{:?}", rect);
    }
}

#[test]
fn test_blank_and_flat_images_have_no_candidates() {
    let locator = CandidateLocator::default();
    assert!(locator
        .locate(&DynamicImage::ImageRgb8(blank_image(320, 240)))
        .is_empty());

    let gray = image::RgbImage::from_pixel(64, 64, Rgb([90, 90, 90]));
    assert!(locator.locate(&DynamicImage::ImageRgb8(gray)).is_empty());
}

#[test]
fn test_tiny_image_is_handled() {
    let locator = CandidateLocator::default();
    assert!(locator
        .locate(&DynamicImage::ImageRgb8(blank_image(1, 1)))
        .is_empty());
}

#[test]
fn test_narrow_aspect_window_rejects_plate() {
    let params = LocatorParams {
        min_aspect: 5.0,
        max_aspect: 6.0,
        ..LocatorParams::default()
    };
    let candidates = CandidateLocator::new(params).locate(&DynamicImage::ImageRgb8(plate_image()));
    assert!(candidates.is_empty(), "{:?}", candidates);
}
