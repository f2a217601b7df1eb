// Hex and frame encoding helpers shared by the server engine and the
// reference client.

use num_bigint::BigUint;
use num_traits::Num;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("'{0}' is not a hex digit")]
    InvalidHexDigit(char),
    #[error("empty hex string")]
    EmptyHex,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame is not valid UTF-8")]
    NotText,
    #[error("expected {expected} comma-separated fields, got {got}")]
    FieldCount { expected: usize, got: usize },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Decode a hex string into bytes. An odd digit count is treated as if the
/// string were left-padded with a single zero nibble, so `"abc"` decodes to
/// the same bytes as `"0abc"`.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, CodecError> {
    let mut nibbles = Vec::with_capacity(hex.len() + 1);
    if hex.len() % 2 == 1 {
        nibbles.push(0);
    }
    for c in hex.chars() {
        let nibble = c.to_digit(16).ok_or(CodecError::InvalidHexDigit(c))?;
        nibbles.push(nibble as u8);
    }
    Ok(nibbles.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn hex_to_biguint(hex: &str) -> Result<BigUint, CodecError> {
    if hex.is_empty() {
        return Err(CodecError::EmptyHex);
    }
    BigUint::from_str_radix(hex, 16).map_err(|_| {
        match hex.chars().find(|c| !c.is_ascii_hexdigit()) {
            Some(c) => CodecError::InvalidHexDigit(c),
            None => CodecError::EmptyHex,
        }
    })
}

/// Minimal lowercase hex, no leading zeros; zero encodes as `"0"`.
pub fn biguint_to_hex(n: &BigUint) -> String {
    format!("{:x}", n)
}

/// Minimal big-endian bytes; zero encodes as a single `0x00` byte, matching
/// the hex round-trip of `"0"` through [`hex_to_bytes`].
pub fn biguint_to_bytes(n: &BigUint) -> Vec<u8> {
    n.to_bytes_be()
}

/// Decode a frame as text and split it into exactly `expected` comma-separated
/// fields.
pub fn split_fields(frame: &[u8], expected: usize) -> Result<Vec<&str>, FrameError> {
    let text = std::str::from_utf8(frame).map_err(|_| FrameError::NotText)?;
    let fields: Vec<&str> = text.split(',').collect();
    if fields.len() != expected {
        return Err(FrameError::FieldCount {
            expected,
            got: fields.len(),
        });
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("abc", "0abc")]
    #[case("f", "0f")]
    #[case("0", "00")]
    #[case("123ab", "0123ab")]
    fn odd_length_hex_decodes_as_if_zero_padded(#[case] odd: &str, #[case] even: &str) {
        assert_eq!(hex_to_bytes(odd).unwrap(), hex_to_bytes(even).unwrap());
    }

    #[rstest]
    #[case("", vec![])]
    #[case("00", vec![0x00])]
    #[case("deadbeef", vec![0xde, 0xad, 0xbe, 0xef])]
    #[case("DEADBEEF", vec![0xde, 0xad, 0xbe, 0xef])]
    fn hex_to_bytes_decodes_even_length_strings(#[case] hex: &str, #[case] expected: Vec<u8>) {
        assert_eq!(hex_to_bytes(hex).unwrap(), expected);
    }

    #[test]
    fn hex_to_bytes_rejects_non_hex_digits() {
        assert_eq!(
            hex_to_bytes("12g4"),
            Err(CodecError::InvalidHexDigit('g'))
        );
    }

    #[test]
    fn bytes_to_hex_round_trips() {
        let bytes = vec![0x00, 0x01, 0xab, 0xff];

        let hex = bytes_to_hex(&bytes);

        assert_eq!(hex, "0001abff");
        assert_eq!(hex_to_bytes(&hex).unwrap(), bytes);
    }

    #[test]
    fn biguint_hex_is_minimal_lowercase() {
        let n = BigUint::from(0xdeadu64);

        assert_eq!(biguint_to_hex(&n), "dead");
        assert_eq!(hex_to_biguint("dead").unwrap(), n);
    }

    #[test]
    fn zero_encodes_as_a_single_zero_byte() {
        let zero = BigUint::from(0u64);

        assert_eq!(biguint_to_bytes(&zero), vec![0x00]);
        assert_eq!(biguint_to_hex(&zero), "0");
    }

    #[test]
    fn hex_to_biguint_rejects_garbage() {
        assert!(hex_to_biguint("").is_err());
        assert!(hex_to_biguint("12xy").is_err());
    }

    #[test]
    fn split_fields_enforces_field_count() {
        assert_eq!(split_fields(b"a,b", 2).unwrap(), vec!["a", "b"]);
        assert_eq!(
            split_fields(b"a,b,c", 2),
            Err(FrameError::FieldCount {
                expected: 2,
                got: 3
            })
        );
        assert_eq!(
            split_fields(b"lonely", 2),
            Err(FrameError::FieldCount {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn split_fields_rejects_non_utf8() {
        assert_eq!(split_fields(&[0xff, 0xfe, 0x2c, 0x30], 2), Err(FrameError::NotText));
    }
}
