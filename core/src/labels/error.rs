//! Error types for label payload parsing

use std::path::PathBuf;
use thiserror::Error;

/// Errors while reading or interpreting a label payload
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to parse label payload")]
    Json(#[source] serde_json::Error),

    #[error("failed to read label file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("frame key '{key}' is not an integer")]
    InvalidFrameKey { key: String },
}

/// Network-level failure reported by the host; never raised as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub status: Option<u16>,
    pub message: String,
}

impl FetchError {
    pub fn not_found() -> Self {
        Self {
            status: Some(404),
            message: "not found".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
