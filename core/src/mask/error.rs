//! Error types for mask decoding

use thiserror::Error;

/// Errors raised while decoding a binary-encoded mask array
#[derive(Debug, Error)]
pub enum MaskError {
    #[error("mask is not valid base64")]
    Base64(#[source] base64::DecodeError),

    #[error("failed to inflate mask payload")]
    Inflate(#[source] std::io::Error),

    #[error("malformed mask data: {reason}")]
    Format { reason: String },

    #[error("unsupported array format version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("unsupported array element type '{descr}'")]
    UnsupportedType { descr: String },
}

impl MaskError {
    pub(crate) fn format(reason: impl Into<String>) -> Self {
        MaskError::Format {
            reason: reason.into(),
        }
    }
}
