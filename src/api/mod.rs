// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod http_server;
pub mod recognize;

pub use http_server::{create_app, start_server, AppState};
pub use recognize::{recognize_handler, RecognizeResponse};
