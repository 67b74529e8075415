// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! Reads a single cropped text line. The model emits per-timestep class
//! probabilities which are collapsed with greedy CTC decoding.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array4, ArrayViewD, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::{REC_INPUT_HEIGHT, REC_MIN_WIDTH};

/// CTC blank class index
const BLANK_INDEX: usize = 0;

/// Recognized line with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean probability of the emitted characters (0.0-1.0)
    pub confidence: f32,
}

impl RecognizedText {
    pub fn new(text: String, confidence: f32) -> Self {
        Self { text, confidence }
    }

    /// Check if the text is empty or whitespace only
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// PaddleOCR text recognition model (CPU-only)
#[derive(Clone)]
pub struct OcrRecognitionModel {
    /// ONNX Runtime session, serialised across callers
    session: Arc<Mutex<Session>>,
    /// Class index -> character; index 0 is the CTC blank
    dictionary: Arc<Vec<char>>,
    input_name: String,
}

impl std::fmt::Debug for OcrRecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrRecognitionModel")
            .field("dictionary_size", &self.dictionary.len())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OcrRecognitionModel {
    /// Load the recognition model (`rec_model.onnx`) and its character
    /// dictionary (`ppocr_keys_v1.txt`)
    pub async fn new<P: AsRef<Path>>(model_path: P, dict_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let dict_path = dict_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR recognition model not found: {}", model_path.display());
        }
        if !dict_path.exists() {
            anyhow::bail!(
                "OCR character dictionary not found: {}",
                dict_path.display()
            );
        }

        info!(
            "Loading OCR recognition model from {}",
            model_path.display()
        );

        let dictionary = load_dictionary(dict_path)?;
        info!(
            "Loaded character dictionary with {} classes",
            dictionary.len()
        );

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
                "Failed to load OCR recognition model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        debug!("Recognition model input: {}", input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            dictionary: Arc::new(dictionary),
            input_name,
        })
    }

    pub fn dictionary_size(&self) -> usize {
        self.dictionary.len()
    }

    /// Recognize a `[1, 3, 48, W]` tensor from `preprocess_for_recognition`
    pub fn recognize(&self, input: &Array4<f32>) -> Result<RecognizedText> {
        let shape = input.shape();
        if shape[0] != 1
            || shape[1] != 3
            || shape[2] != REC_INPUT_HEIGHT as usize
            || shape[3] < REC_MIN_WIDTH as usize
        {
            anyhow::bail!(
                "Invalid input shape: {:?}, expected [1, 3, {}, W>={}]",
                shape,
                REC_INPUT_HEIGHT,
                REC_MIN_WIDTH
            );
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Recognition session lock poisoned"))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Recognition inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        ctc_greedy_decode(output.view(), &self.dictionary)
    }
}

/// Read a PaddleOCR dictionary: one character per line
///
/// Index 0 is reserved for the CTC blank and a trailing space class is
/// appended, matching models exported with `use_space_char`.
pub fn load_dictionary<P: AsRef<Path>>(path: P) -> Result<Vec<char>> {
    let file = File::open(path.as_ref()).context(format!(
        "Failed to open dictionary: {}",
        path.as_ref().display()
    ))?;

    let mut dictionary = vec!['\0'];
    for line in BufReader::new(file).lines() {
        let line = line.context("Failed to read dictionary line")?;
        if let Some(ch) = line.chars().next() {
            dictionary.push(ch);
        }
    }
    dictionary.push(' ');

    Ok(dictionary)
}

/// Best-path CTC decoding over `[1, T, C]` or `[T, C]` probabilities
///
/// Repeated classes collapse and blanks separate genuine repeats. The
/// returned text is trimmed.
pub fn ctc_greedy_decode(output: ArrayViewD<f32>, dictionary: &[char]) -> Result<RecognizedText> {
    let mut probs = output;
    while probs.ndim() > 2 {
        probs = probs.index_axis_move(Axis(0), 0);
    }
    let probs = probs
        .into_dimensionality::<Ix2>()
        .context("Unexpected recognition output shape")?;

    let mut text = String::new();
    let mut prob_sum = 0.0f32;
    let mut emitted = 0usize;
    let mut prev_index = BLANK_INDEX;

    for step in probs.rows() {
        let (index, prob) = step
            .iter()
            .copied()
            .enumerate()
            .fold((BLANK_INDEX, f32::NEG_INFINITY), |best, cur| {
                if cur.1 > best.1 {
                    cur
                } else {
                    best
                }
            });

        if index != BLANK_INDEX && index != prev_index {
            if let Some(&ch) = dictionary.get(index) {
                text.push(ch);
                prob_sum += prob;
                emitted += 1;
            }
        }
        prev_index = index;
    }

    let confidence = if emitted == 0 {
        0.0
    } else {
        (prob_sum / emitted as f32).clamp(0.0, 1.0)
    };

    Ok(RecognizedText::new(text.trim().to_string(), confidence))
}
