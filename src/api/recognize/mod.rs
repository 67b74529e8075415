// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Plate recognition API endpoint module
//!
//! Provides POST /api/recognize for reading licence plates from an uploaded
//! image.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::recognize_handler;
pub use request::{read_upload, UPLOAD_FIELD};
pub use response::RecognizeResponse;
