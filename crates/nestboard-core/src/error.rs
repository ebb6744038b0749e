//! Error types.
//!
//! Missing references are not errors: store operations on unknown ids are
//! no-ops and queries come back empty. The variants here cover the few
//! conditions a caller has to act on.

use crate::ids::CanvasId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Canvas {canvas} is not empty: {objects} objects, {children} child canvases")]
    CanvasNotEmpty {
        canvas: CanvasId,
        objects: usize,
        children: usize,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors decoding or encoding wire messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Could not encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
