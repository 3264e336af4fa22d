//! Error types for the overlay player

use labelplay_core::{MaskError, PayloadError};
use thiserror::Error;

/// Errors raised by player and index operations
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("render surface is not mounted")]
    NotRendered,

    #[error("invalid label payload")]
    Payload(#[from] PayloadError),

    #[error("failed to decode mask for frame {frame}")]
    Mask {
        frame: i64,
        #[source]
        source: MaskError,
    },

    #[error("failed to encode PNG")]
    Png(#[from] png::EncodingError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
