//! Per-object record header of a pack body
//!
//! One little-endian varint: 7 payload bits per byte, high bit set while more
//! bytes follow. The first byte carries the 3-bit type code in bits 4-6 and the
//! low 4 bits of the size; every following byte adds 7 more size bits.
//!
//! Equivalently, it is the varint of `((size >> 4) << 7) | (type << 4) | (size & 0xF)`,
//! which is how the type shares the leading token with the size.

use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use derive_new::new;

#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct ObjectHeader {
    pub object_type: ObjectType,
    /// Decompressed payload size
    pub size: u64,
    /// Encoded length of the header itself
    pub len: usize,
}

pub fn encode(object_type: ObjectType, size: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(10);
    let mut byte = (object_type.pack_code() << 4) | (size & 0x0F) as u8;
    let mut rest = size >> 4;

    while rest > 0 {
        bytes.push(byte | 0x80);
        byte = (rest & 0x7F) as u8;
        rest >>= 7;
    }
    bytes.push(byte);

    bytes
}

/// Decode the header at the start of `data`
///
/// Fails on truncation or on a size that does not fit 64 bits; the type code is
/// returned as-is (possibly `Invalid`) for the caller to judge.
pub fn decode(data: &[u8]) -> Result<ObjectHeader> {
    let truncated = || Error::malformed("pack object header", "truncated");

    let mut byte = *data.first().ok_or_else(truncated)?;
    let object_type = ObjectType::from_pack_code((byte >> 4) & 0x07);
    let mut size = u64::from(byte & 0x0F);
    let mut shift = 4;
    let mut len = 1;

    while byte & 0x80 != 0 {
        byte = *data.get(len).ok_or_else(truncated)?;
        len += 1;

        let bits = u64::from(byte & 0x7F);
        if shift >= 64 || (shift > 57 && bits >> (64 - shift) != 0) {
            return Err(Error::malformed("pack object header", "size overflows 64 bits"));
        }
        size |= bits << shift;
        shift += 7;
    }

    Ok(ObjectHeader::new(object_type, size, len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    /// Plain unsigned LEB128
    fn varint(mut value: u64) -> Vec<u8> {
        let mut bytes = Vec::new();
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                bytes.push(byte);
                return bytes;
            }
            bytes.push(byte | 0x80);
        }
    }

    #[rstest]
    #[case(ObjectType::Blob, 6, vec![0x36])]
    #[case(ObjectType::Blob, 15, vec![0x3F])]
    #[case(ObjectType::Tree, 16, vec![0xA0, 0x01])]
    #[case(ObjectType::Commit, 100, vec![0x94, 0x06])]
    #[case(ObjectType::Blob, 0, vec![0x30])]
    fn known_encodings(#[case] object_type: ObjectType, #[case] size: u64, #[case] expected: Vec<u8>) {
        assert_eq!(encode(object_type, size), expected);
        assert_eq!(
            decode(&expected).unwrap(),
            ObjectHeader::new(object_type, size, expected.len())
        );
    }

    #[test]
    fn truncated_header_is_malformed() {
        assert!(decode(&[]).is_err());
        assert!(decode(&[0xB4]).is_err());
    }

    #[test]
    fn overlong_header_is_rejected() {
        let mut data = vec![0xFF; 12];
        data.push(0x01);
        assert!(matches!(decode(&data), Err(Error::Malformed { .. })));
    }

    #[test]
    fn trailing_bytes_are_not_consumed() {
        let header = decode(&[0x36, 0x78, 0x9c]).unwrap();
        assert_eq!(header.len, 1);
    }

    proptest! {
        #[test]
        fn matches_shifted_size_varint(size in 0u64..(1 << 56), code in 1u8..=3) {
            let object_type = ObjectType::from_pack_code(code);
            let packed = ((size >> 4) << 7) | (u64::from(code) << 4) | (size & 0xF);

            prop_assert_eq!(encode(object_type, size), varint(packed));
        }

        #[test]
        fn decode_inverts_encode(size in any::<u64>(), code in 1u8..=3) {
            let object_type = ObjectType::from_pack_code(code);
            let encoded = encode(object_type, size);

            prop_assert_eq!(decode(&encoded).unwrap(), ObjectHeader::new(object_type, size, encoded.len()));
        }
    }
}
