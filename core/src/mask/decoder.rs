//! Binary array decoding
//!
//! Masks arrive as `base64(deflate(npy bytes))`:
//!
//! ```text
//! [0..6)    magic "\x93NUMPY"
//! [6..8)    version (major, minor), major must be 1
//! [8..10)   header length, little-endian u16
//! [10..N)   dict-literal header with 'descr' and 'shape'
//! [N..)     row-major element payload
//! ```
//!
//! A legacy variant stores bit-packed boolean arrays without compression:
//! `"bool"`, a u32 dimension count, one u32 per dimension, then one bit per
//! element, most significant bit first.

use std::io::Read;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::read::{DeflateDecoder, ZlibDecoder};
use serde::Deserialize;

use super::MaskError;
use super::dtype::{DType, NumericBuffer};

/// Magic signature at the start of every array payload
pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Tag that marks the legacy bit-packed boolean layout
pub const LEGACY_TAG: &[u8; 4] = b"bool";

const HEADER_START: usize = 10;

/// A decoded array: shape plus flat row-major data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedArray {
    pub shape: Vec<usize>,
    pub data: NumericBuffer,
}

#[derive(Debug, Deserialize)]
struct ArrayHeader {
    descr: String,
    #[serde(default)]
    fortran_order: bool,
    shape: Vec<usize>,
}

/// Decode a mask string from the wire format.
pub fn decode_mask(encoded: &str) -> Result<DecodedArray, MaskError> {
    let bytes = STANDARD
        .decode(encoded.trim().as_bytes())
        .map_err(MaskError::Base64)?;

    if bytes.starts_with(LEGACY_TAG) {
        return decode_legacy_bool(&bytes);
    }

    let raw = inflate(&bytes)?;
    parse_array(&raw)
}

/// Inflate a zlib stream, falling back to a raw deflate stream.
fn inflate(bytes: &[u8]) -> Result<Vec<u8>, MaskError> {
    let mut out = Vec::new();
    if ZlibDecoder::new(bytes).read_to_end(&mut out).is_ok() {
        return Ok(out);
    }

    out.clear();
    DeflateDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(MaskError::Inflate)?;
    Ok(out)
}

/// Parse uncompressed array bytes.
pub fn parse_array(bytes: &[u8]) -> Result<DecodedArray, MaskError> {
    if bytes.len() < HEADER_START || &bytes[..6] != MAGIC {
        return Err(MaskError::format("missing array magic signature"));
    }

    let (major, minor) = (bytes[6], bytes[7]);
    if major != 1 {
        return Err(MaskError::UnsupportedVersion { major, minor });
    }

    let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
    let data_start = HEADER_START + header_len;
    let header_bytes = bytes
        .get(HEADER_START..data_start)
        .ok_or_else(|| MaskError::format("header extends past end of data"))?;
    let header_text = std::str::from_utf8(header_bytes)
        .map_err(|_| MaskError::format("header is not valid UTF-8"))?;

    let header = parse_header(header_text)?;
    if header.fortran_order {
        return Err(MaskError::format("column-major arrays are not supported"));
    }

    let dtype = DType::parse(&header.descr)?;
    let count = element_count(&header.shape)?;
    let payload = &bytes[data_start..];
    let needed = count
        .checked_mul(dtype.width())
        .ok_or_else(|| MaskError::format(format!("shape {:?} is too large", header.shape)))?;
    if payload.len() < needed {
        return Err(MaskError::format(format!(
            "payload holds {} bytes, shape {:?} needs {}",
            payload.len(),
            header.shape,
            needed
        )));
    }

    Ok(DecodedArray {
        data: NumericBuffer::from_bytes(dtype, &payload[..needed], count),
        shape: header.shape,
    })
}

/// Product of the dimensions, failing instead of overflowing
fn element_count(shape: &[usize]) -> Result<usize, MaskError> {
    shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| MaskError::format(format!("shape {shape:?} is too large")))
}

/// Normalize the dict-literal header into JSON and parse it.
fn parse_header(text: &str) -> Result<ArrayHeader, MaskError> {
    let json = normalize_header(text);
    serde_json::from_str(&json)
        .map_err(|e| MaskError::format(format!("invalid array header {text:?}: {e}")))
}

/// `{'descr': '|u1', 'shape': (2, 3), }` → `{"descr":"|u1","shape":[2,3]}`
fn normalize_header(text: &str) -> String {
    let mut json: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '\'' => '"',
            '(' => '[',
            ')' => ']',
            other => other,
        })
        .collect();

    json = json.replace("True", "true").replace("False", "false");
    json.replace(",]", "]").replace(",}", "}")
}

/// Decode the legacy bit-packed boolean layout.
fn decode_legacy_bool(bytes: &[u8]) -> Result<DecodedArray, MaskError> {
    let mut offset = LEGACY_TAG.len();
    let mut read_u32 = |bytes: &[u8]| -> Result<u32, MaskError> {
        let word = bytes
            .get(offset..offset + 4)
            .ok_or_else(|| MaskError::format("truncated legacy shape header"))?;
        offset += 4;
        Ok(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
    };

    let ndim = read_u32(bytes)? as usize;
    let data_start = ndim
        .checked_add(1)
        .and_then(|words| words.checked_mul(4))
        .and_then(|len| len.checked_add(LEGACY_TAG.len()))
        .filter(|&start| start <= bytes.len())
        .ok_or_else(|| MaskError::format(format!("legacy header declares {ndim} dimensions")))?;

    let mut shape = Vec::with_capacity(ndim);
    for _ in 0..ndim {
        shape.push(read_u32(bytes)? as usize);
    }

    let packed = &bytes[data_start..];
    let count = element_count(&shape)?;
    if packed.len() < count.div_ceil(8) {
        return Err(MaskError::format(format!(
            "legacy payload holds {} bytes, shape {:?} needs {} bits",
            packed.len(),
            shape,
            count
        )));
    }

    let data = (0..count)
        .map(|i| (packed[i >> 3] >> (7 - i % 8)) & 1)
        .collect();

    Ok(DecodedArray {
        shape,
        data: NumericBuffer::U8(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        let text = "{'descr': '|u1', 'fortran_order': False, 'shape': (2, 3), }   \n";
        assert_eq!(
            normalize_header(text),
            r#"{"descr":"|u1","fortran_order":false,"shape":[2,3]}"#
        );
    }

    #[test]
    fn test_normalize_single_dim_tuple() {
        let header = parse_header("{'descr': '<i4', 'fortran_order': False, 'shape': (5,), }")
            .unwrap();
        assert_eq!(header.shape, vec![5]);
        assert_eq!(header.descr, "<i4");
    }

    #[test]
    fn test_bad_magic_is_format_error() {
        let bytes = b"\x93NUMPZ\x01\x00\x00\x00";
        assert!(matches!(
            parse_array(bytes),
            Err(MaskError::Format { .. })
        ));
    }

    #[test]
    fn test_short_input_is_format_error() {
        assert!(matches!(parse_array(b"\x93NU"), Err(MaskError::Format { .. })));
    }
}
