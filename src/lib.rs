// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod pipeline;
pub mod version;
pub mod vision;

pub use api::{create_app, start_server, AppState};
pub use config::ServerConfig;
pub use pipeline::{
    RecognitionError, RecognitionItem, RecognitionPipeline, RecognitionResult, Rectangle,
    MAX_CANDIDATES,
};
pub use vision::{EngineError, PaddleOcrEngine, TextDetection, TextEngine};
