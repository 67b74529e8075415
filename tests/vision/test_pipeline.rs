// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end pipeline tests with stand-in OCR engines

use plate_recognition_node::pipeline::{
    RecognitionError, RecognitionItem, RecognitionPipeline, Rectangle, MAX_CANDIDATES,
};
use plate_recognition_node::vision::ImageError;
use std::sync::Arc;

use crate::common::{
    blank_image, many_plates_image, plate_image, png_bytes, FailingEngine, FixedTextEngine,
    MultiLineEngine, RecordingEngine,
};

#[test]
fn test_no_candidates_reads_whole_image() {
    let engine = Arc::new(RecordingEngine::default());
    let pipeline = RecognitionPipeline::new(engine.clone());

    let result = pipeline.process(&png_bytes(&blank_image(320, 200))).unwrap();

    assert_eq!(
        result,
        vec![RecognitionItem {
            bbox: Rectangle::new(0, 0, 320, 200),
            text: String::new(),
        }]
    );
    assert_eq!(engine.seen(), vec![(320, 200)]);
}

#[test]
fn test_plate_candidates_are_read() {
    let pipeline = RecognitionPipeline::new(Arc::new(FixedTextEngine::new("MH 12 DE 1433")));

    let result = pipeline.process(&png_bytes(&plate_image())).unwrap();

    assert!((1..=MAX_CANDIDATES).contains(&result.len()));
    for item in &result {
        assert_eq!(item.text, "MH 12 DE 1433");
        assert!(item.bbox.fits_within(240, 140));
        assert_ne!(item.bbox, Rectangle::full(240, 140));
    }
}

#[test]
fn test_at_most_three_candidates() {
    let pipeline = RecognitionPipeline::new(Arc::new(FixedTextEngine::new("X")));

    let result = pipeline.process(&png_bytes(&many_plates_image())).unwrap();
    assert_eq!(result.len(), MAX_CANDIDATES);
}

#[test]
fn test_crops_match_reported_boxes() {
    let engine = Arc::new(RecordingEngine::default());
    let pipeline = RecognitionPipeline::new(engine.clone());

    let result = pipeline.process(&png_bytes(&many_plates_image())).unwrap();

    let boxes: Vec<(u32, u32)> = result
        .iter()
        .map(|item| (item.bbox.width, item.bbox.height))
        .collect();
    assert_eq!(engine.seen(), boxes);
    assert!(result.iter().all(|item| item.text.is_empty()));
}

#[test]
fn test_best_line_is_kept() {
    let pipeline = RecognitionPipeline::new(Arc::new(MultiLineEngine));

    let result = pipeline.process(&png_bytes(&plate_image())).unwrap();
    assert!(result.iter().all(|item| item.text == "DL 3C AB 1234"));
}

#[test]
fn test_malformed_upload_is_decode_error() {
    let pipeline = RecognitionPipeline::new(Arc::new(FixedTextEngine::new("X")));

    let err = pipeline.process(b"GIF89a-but-not-really").unwrap_err();
    assert!(matches!(err, RecognitionError::Decode(ImageError::DecodeFailed(_))));

    let err = pipeline.process(&[]).unwrap_err();
    assert!(matches!(err, RecognitionError::Decode(ImageError::EmptyData)));
}

#[test]
fn test_engine_failure_surfaces() {
    let pipeline = RecognitionPipeline::new(Arc::new(FailingEngine));

    let err = pipeline.process(&png_bytes(&plate_image())).unwrap_err();
    assert!(matches!(err, RecognitionError::Engine(_)));
    assert!(err.to_string().contains("resource exhausted"));
}
