//! Label payloads
//!
//! Schema for the raw label payload fetched by the host. Parsing into
//! drawable overlays happens in the overlay crate's index.

mod error;
mod payload;

#[cfg(test)]
mod payload_tests;

pub use error::{FetchError, PayloadError};
pub use payload::{
    Attribute, AttributeContainer, BoundingBox, Classification, ClassificationGroup,
    FrameRecord, MaskIndex, MaskIndexEntry, NormalizedPoint, ObjectContainer, ObjectRecord,
    RawLabelPayload,
};
