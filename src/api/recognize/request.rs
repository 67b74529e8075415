// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction

use axum::body::Bytes;
use axum_extra::extract::Multipart;
use tracing::debug;

use crate::pipeline::RecognitionError;

/// Form field the web frontend posts the image under
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartKind {
    /// The `file` field
    Upload,
    /// Some other part carrying a filename
    Fallback,
    Ignored,
}

fn classify_part(name: Option<&str>, file_name: Option<&str>) -> PartKind {
    if name == Some(UPLOAD_FIELD) {
        PartKind::Upload
    } else if file_name.is_some() {
        PartKind::Fallback
    } else {
        PartKind::Ignored
    }
}

/// Read the uploaded image bytes
///
/// Takes the `file` part; failing that, the first part with a filename.
/// Plain form fields are skipped.
pub async fn read_upload(multipart: &mut Multipart) -> Result<Bytes, RecognitionError> {
    let mut fallback: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RecognitionError::Unexpected(format!("Invalid multipart body: {}", e)))?
    {
        let kind = classify_part(field.name(), field.file_name());
        if kind == PartKind::Ignored || (kind == PartKind::Fallback && fallback.is_some()) {
            continue;
        }

        let name = field.name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| {
            RecognitionError::Unexpected(format!("Failed to read upload '{}': {}", name, e))
        })?;
        debug!("Read multipart part '{}' ({} bytes)", name, bytes.len());

        if kind == PartKind::Upload {
            return Ok(bytes);
        }
        fallback = Some(bytes);
    }

    fallback.ok_or_else(|| RecognitionError::Unexpected("no file uploaded".to_string()))
}
