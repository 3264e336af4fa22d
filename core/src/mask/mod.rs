//! Binary-encoded mask arrays
//!
//! Decoding is synchronous and runs once per mask; the decoded
//! [`MaskArray`] is then owned by the overlay that draws it.

mod array;
mod decoder;
mod dtype;
mod encode;
mod error;

#[cfg(test)]
mod decoder_tests;

pub use array::{MaskArray, MaskData};
pub use decoder::{DecodedArray, LEGACY_TAG, MAGIC, decode_mask, parse_array};
pub use dtype::{ByteOrder, DType, ElementKind, NumericBuffer};
pub use encode::{compress_and_encode, encode_array, encode_legacy_bool, encode_u8_mask};
pub use error::MaskError;
