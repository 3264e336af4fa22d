//! Element type table and typed numeric buffers

use super::MaskError;

/// Byte order of a multi-byte element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
    /// Single-byte types, where order is meaningless
    NotApplicable,
}

/// Element kind after decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    /// 8-byte unsigned, down-converted to `U32`
    U64,
    /// 8-byte signed, down-converted to `I32`
    I64,
}

/// Entry of the fixed type table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DType {
    pub kind: ElementKind,
    pub order: ByteOrder,
}

impl DType {
    /// Look up a dtype code such as `|u1` or `<i8`.
    pub fn parse(descr: &str) -> Result<Self, MaskError> {
        let unsupported = || MaskError::UnsupportedType {
            descr: descr.to_string(),
        };

        let mut chars = descr.chars();
        let prefix = chars.next().ok_or_else(unsupported)?;
        let code = chars.as_str();

        let kind = match code {
            "b1" => ElementKind::Bool,
            "u1" => ElementKind::U8,
            "i1" => ElementKind::I8,
            "u2" => ElementKind::U16,
            "i2" => ElementKind::I16,
            "u4" => ElementKind::U32,
            "i4" => ElementKind::I32,
            "u8" => ElementKind::U64,
            "i8" => ElementKind::I64,
            _ => return Err(unsupported()),
        };

        let order = match (prefix, kind.width()) {
            (_, 1) if matches!(prefix, '|' | '<' | '>' | '=') => ByteOrder::NotApplicable,
            ('<' | '=', _) => ByteOrder::Little,
            ('>', _) => ByteOrder::Big,
            _ => return Err(unsupported()),
        };

        Ok(Self { kind, order })
    }

    pub fn width(&self) -> usize {
        self.kind.width()
    }
}

impl ElementKind {
    /// Width in bytes of one element on the wire
    pub fn width(&self) -> usize {
        match self {
            ElementKind::Bool | ElementKind::U8 | ElementKind::I8 => 1,
            ElementKind::U16 | ElementKind::I16 => 2,
            ElementKind::U32 | ElementKind::I32 => 4,
            ElementKind::U64 | ElementKind::I64 => 8,
        }
    }
}

/// Flat row-major element storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericBuffer {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
}

impl NumericBuffer {
    pub fn len(&self) -> usize {
        match self {
            NumericBuffer::U8(v) => v.len(),
            NumericBuffer::I8(v) => v.len(),
            NumericBuffer::U16(v) => v.len(),
            NumericBuffer::I16(v) => v.len(),
            NumericBuffer::U32(v) => v.len(),
            NumericBuffer::I32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at flat index `i`, widened to i64
    pub fn get(&self, i: usize) -> Option<i64> {
        match self {
            NumericBuffer::U8(v) => v.get(i).map(|&x| x as i64),
            NumericBuffer::I8(v) => v.get(i).map(|&x| x as i64),
            NumericBuffer::U16(v) => v.get(i).map(|&x| x as i64),
            NumericBuffer::I16(v) => v.get(i).map(|&x| x as i64),
            NumericBuffer::U32(v) => v.get(i).map(|&x| x as i64),
            NumericBuffer::I32(v) => v.get(i).map(|&x| x as i64),
        }
    }

    /// All elements widened to i64
    pub fn to_i64_vec(&self) -> Vec<i64> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }

    /// Reinterpret `bytes` as `count` elements of `dtype`.
    ///
    /// 8-byte integers keep only their low 4 bytes; values are assumed to
    /// fit in 32 bits.
    pub(crate) fn from_bytes(dtype: DType, bytes: &[u8], count: usize) -> Self {
        let width = dtype.width();
        let chunks = bytes.chunks_exact(width).take(count);
        let big = dtype.order == ByteOrder::Big;

        match dtype.kind {
            ElementKind::Bool => NumericBuffer::U8(chunks.map(|c| (c[0] != 0) as u8).collect()),
            ElementKind::U8 => NumericBuffer::U8(chunks.map(|c| c[0]).collect()),
            ElementKind::I8 => NumericBuffer::I8(chunks.map(|c| c[0] as i8).collect()),
            ElementKind::U16 => NumericBuffer::U16(
                chunks
                    .map(|c| {
                        let b = [c[0], c[1]];
                        if big { u16::from_be_bytes(b) } else { u16::from_le_bytes(b) }
                    })
                    .collect(),
            ),
            ElementKind::I16 => NumericBuffer::I16(
                chunks
                    .map(|c| {
                        let b = [c[0], c[1]];
                        if big { i16::from_be_bytes(b) } else { i16::from_le_bytes(b) }
                    })
                    .collect(),
            ),
            ElementKind::U32 => NumericBuffer::U32(chunks.map(|c| read_u32(c, big)).collect()),
            ElementKind::I32 => {
                NumericBuffer::I32(chunks.map(|c| read_u32(c, big) as i32).collect())
            }
            ElementKind::U64 => {
                NumericBuffer::U32(chunks.map(|c| read_u32(low_word(c, big), big)).collect())
            }
            ElementKind::I64 => NumericBuffer::I32(
                chunks
                    .map(|c| read_u32(low_word(c, big), big) as i32)
                    .collect(),
            ),
        }
    }
}

fn read_u32(c: &[u8], big: bool) -> u32 {
    let b = [c[0], c[1], c[2], c[3]];
    if big {
        u32::from_be_bytes(b)
    } else {
        u32::from_le_bytes(b)
    }
}

/// Low 4 bytes of an 8-byte element
fn low_word(c: &[u8], big: bool) -> &[u8] {
    if big { &c[4..8] } else { &c[0..4] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_byte_ignores_order() {
        for descr in ["|u1", "<u1", ">u1", "|b1", "|i1"] {
            let dtype = DType::parse(descr).unwrap();
            assert_eq!(dtype.order, ByteOrder::NotApplicable, "{descr}");
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        assert!(matches!(
            DType::parse("<f4"),
            Err(MaskError::UnsupportedType { .. })
        ));
        assert!(matches!(
            DType::parse("|u2"),
            Err(MaskError::UnsupportedType { .. })
        ));
        assert!(DType::parse("").is_err());
    }

    #[test]
    fn test_i64_down_converts_low_word() {
        let dtype = DType::parse("<i8").unwrap();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&7i64.to_le_bytes());
        bytes.extend_from_slice(&(-3i64).to_le_bytes());
        let buf = NumericBuffer::from_bytes(dtype, &bytes, 2);
        assert_eq!(buf, NumericBuffer::I32(vec![7, -3]));
    }

    #[test]
    fn test_big_endian_u16() {
        let dtype = DType::parse(">u2").unwrap();
        let buf = NumericBuffer::from_bytes(dtype, &[0x01, 0x02], 1);
        assert_eq!(buf, NumericBuffer::U16(vec![0x0102]));
    }
}
