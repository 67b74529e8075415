// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration from flags and environment

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::vision::image_utils::DEFAULT_MAX_IMAGE_SIZE;

/// Plate Recognition Node
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "plate-recognition-node")]
#[command(version)]
#[command(about = "Licence plate recognition over HTTP", long_about = None)]
pub struct ServerConfig {
    /// Interface to listen on
    #[arg(long, env = "PLATE_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PLATE_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory holding det_model.onnx, rec_model.onnx and ppocr_keys_v1.txt
    #[arg(long, env = "OCR_MODEL_DIR", default_value = "./models/paddleocr-onnx")]
    pub ocr_model_dir: PathBuf,

    /// Largest accepted image upload in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_IMAGE_SIZE)]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
