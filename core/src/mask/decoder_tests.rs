//! Wire-format tests for mask decoding

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::{
    MaskError, NumericBuffer, compress_and_encode, decode_mask, encode_array, encode_legacy_bool,
    encode_u8_mask,
};

#[test]
fn test_u8_mask_round_trip() {
    let encoded = encode_u8_mask(&[2, 2], &[1, 0, 0, 1]).unwrap();
    let decoded = decode_mask(&encoded).unwrap();
    assert_eq!(decoded.shape, vec![2, 2]);
    assert_eq!(decoded.data, NumericBuffer::U8(vec![1, 0, 0, 1]));
}

#[test]
fn test_u1_scenario_2x3() {
    let bytes = encode_array(&[2, 3], "|u1", &[5, 4, 3, 2, 1, 0]);
    let encoded = compress_and_encode(&bytes).unwrap();
    let decoded = decode_mask(&encoded).unwrap();
    assert_eq!(decoded.shape, vec![2, 3]);
    assert_eq!(decoded.data.to_i64_vec(), vec![5, 4, 3, 2, 1, 0]);
}

#[test]
fn test_decode_is_deterministic() {
    let encoded = encode_u8_mask(&[3, 1], &[7, 8, 9]).unwrap();
    let first = decode_mask(&encoded).unwrap();
    let second = decode_mask(&encoded).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_version_two_is_rejected() {
    let mut bytes = encode_array(&[1, 1], "|u1", &[1]);
    bytes[6] = 2;
    let encoded = compress_and_encode(&bytes).unwrap();
    match decode_mask(&encoded) {
        Err(MaskError::UnsupportedVersion { major, .. }) => assert_eq!(major, 2),
        other => panic!("expected UnsupportedVersion, got {other:?}"),
    }
}

#[test]
fn test_corrupted_magic_is_rejected() {
    let mut bytes = encode_array(&[1, 1], "|u1", &[1]);
    bytes[1] = b'X';
    let encoded = compress_and_encode(&bytes).unwrap();
    assert!(matches!(
        decode_mask(&encoded),
        Err(MaskError::Format { .. })
    ));
}

#[test]
fn test_unknown_dtype_is_rejected() {
    let bytes = encode_array(&[1], "<f4", &[0, 0, 0, 0]);
    let encoded = compress_and_encode(&bytes).unwrap();
    match decode_mask(&encoded) {
        Err(MaskError::UnsupportedType { descr }) => assert_eq!(descr, "<f4"),
        other => panic!("expected UnsupportedType, got {other:?}"),
    }
}

#[test]
fn test_little_endian_i4() {
    let payload: Vec<u8> = [1i32, -2, 300]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let encoded = compress_and_encode(&encode_array(&[3], "<i4", &payload)).unwrap();
    let decoded = decode_mask(&encoded).unwrap();
    assert_eq!(decoded.shape, vec![3]);
    assert_eq!(decoded.data, NumericBuffer::I32(vec![1, -2, 300]));
}

#[test]
fn test_big_endian_u4_is_decoded_big_endian() {
    let payload: Vec<u8> = [1u32, 258].iter().flat_map(|v| v.to_be_bytes()).collect();
    let encoded = compress_and_encode(&encode_array(&[2], ">u4", &payload)).unwrap();
    let decoded = decode_mask(&encoded).unwrap();
    assert_eq!(decoded.data, NumericBuffer::U32(vec![1, 258]));
}

#[test]
fn test_u8_elements_are_down_converted() {
    let payload: Vec<u8> = [4u64, 5].iter().flat_map(|v| v.to_le_bytes()).collect();
    let encoded = compress_and_encode(&encode_array(&[1, 2], "<u8", &payload)).unwrap();
    let decoded = decode_mask(&encoded).unwrap();
    assert_eq!(decoded.data, NumericBuffer::U32(vec![4, 5]));
}

#[test]
fn test_truncated_payload_is_format_error() {
    let bytes = encode_array(&[2, 2], "|u1", &[1, 2]);
    let encoded = compress_and_encode(&bytes).unwrap();
    assert!(matches!(
        decode_mask(&encoded),
        Err(MaskError::Format { .. })
    ));
}

#[test]
fn test_legacy_bool_unpacks_msb_first() {
    let values = [true, false, true, true, false, false, false, false, true, false];
    let encoded = encode_legacy_bool(&[2, 5], &values);
    let decoded = decode_mask(&encoded).unwrap();
    assert_eq!(decoded.shape, vec![2, 5]);
    assert_eq!(
        decoded.data,
        NumericBuffer::U8(vec![1, 0, 1, 1, 0, 0, 0, 0, 1, 0])
    );
}

#[test]
fn test_legacy_bool_truncated_header() {
    let encoded = STANDARD.encode(b"bool\x02\x00\x00\x00\x04\x00");
    assert!(matches!(
        decode_mask(&encoded),
        Err(MaskError::Format { .. })
    ));
}

#[test]
fn test_legacy_bool_huge_dimension_count() {
    let mut bytes = b"bool".to_vec();
    bytes.extend_from_slice(&0x4000_0000u32.to_le_bytes());
    let encoded = STANDARD.encode(&bytes);
    assert!(matches!(
        decode_mask(&encoded),
        Err(MaskError::Format { .. })
    ));
}

#[test]
fn test_legacy_bool_overflowing_shape() {
    let mut bytes = b"bool".to_vec();
    bytes.extend_from_slice(&3u32.to_le_bytes());
    for _ in 0..3 {
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    }
    bytes.push(0xff);
    let encoded = STANDARD.encode(&bytes);
    assert!(matches!(
        decode_mask(&encoded),
        Err(MaskError::Format { .. })
    ));
}

#[test]
fn test_overflowing_shape_is_format_error() {
    let dim = 1usize << 40;
    let encoded = compress_and_encode(&encode_array(&[dim, dim, dim], "|u1", &[1, 2, 3])).unwrap();
    assert!(matches!(
        decode_mask(&encoded),
        Err(MaskError::Format { .. })
    ));
}

#[test]
fn test_byte_count_overflow_is_format_error() {
    // Element count fits, element count * width does not
    let encoded =
        compress_and_encode(&encode_array(&[usize::MAX / 2], "<i4", &[0, 0, 0, 0])).unwrap();
    assert!(matches!(
        decode_mask(&encoded),
        Err(MaskError::Format { .. })
    ));
}

#[test]
fn test_invalid_base64() {
    assert!(matches!(decode_mask("!!!not base64"), Err(MaskError::Base64(_))));
}

#[test]
fn test_garbage_after_base64_fails_to_inflate() {
    let encoded = STANDARD.encode([0xffu8, 0xfe, 0xfd, 0xfc]);
    assert!(decode_mask(&encoded).is_err());
}
