//! Encoding helpers for the mask wire format
//!
//! The host pipeline produces masks elsewhere; these helpers exist for
//! fixtures and for the REPL's `encode-mask` command.

use std::io::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::ZlibEncoder;

use super::decoder::{LEGACY_TAG, MAGIC};

/// Build uncompressed array bytes for `shape`, `descr` and a raw payload.
pub fn encode_array(shape: &[usize], descr: &str, payload: &[u8]) -> Vec<u8> {
    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    let shape_text = if dims.len() == 1 {
        format!("({},)", dims[0])
    } else {
        format!("({})", dims.join(", "))
    };
    let mut header =
        format!("{{'descr': '{descr}', 'fortran_order': False, 'shape': {shape_text}, }}");

    // Pad so the payload starts on a 16-byte boundary, newline-terminated
    let unpadded = MAGIC.len() + 4 + header.len() + 1;
    let padding = (16 - unpadded % 16) % 16;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let mut out = Vec::with_capacity(MAGIC.len() + 4 + header.len() + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Compress and base64-encode array bytes.
pub fn compress_and_encode(bytes: &[u8]) -> std::io::Result<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}

/// Encode a `|u1` label mask in the wire format.
pub fn encode_u8_mask(shape: &[usize], labels: &[u8]) -> std::io::Result<String> {
    compress_and_encode(&encode_array(shape, "|u1", labels))
}

/// Encode a boolean array in the legacy bit-packed layout.
pub fn encode_legacy_bool(shape: &[usize], values: &[bool]) -> String {
    let mut out = Vec::new();
    out.extend_from_slice(LEGACY_TAG);
    out.extend_from_slice(&(shape.len() as u32).to_le_bytes());
    for dim in shape {
        out.extend_from_slice(&(*dim as u32).to_le_bytes());
    }

    let mut packed = vec![0u8; values.len().div_ceil(8)];
    for (i, _) in values.iter().enumerate().filter(|(_, v)| **v) {
        packed[i >> 3] |= 1 << (7 - i % 8);
    }
    out.extend_from_slice(&packed);
    STANDARD.encode(out)
}
