// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recognition response envelope

use serde::{Deserialize, Serialize};

use crate::pipeline::{RecognitionError, RecognitionResult};

/// `{"success": true, "result": [...]}` or `{"success": false, "error": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RecognitionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecognizeResponse {
    pub fn ok(result: RecognitionResult) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }
}

impl From<Result<RecognitionResult, RecognitionError>> for RecognizeResponse {
    fn from(outcome: Result<RecognitionResult, RecognitionError>) -> Self {
        match outcome {
            Ok(result) => Self::ok(result),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}
