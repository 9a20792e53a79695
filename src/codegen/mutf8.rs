//! Modified UTF-8 as used by `CONSTANT_Utf8` entries
//!
//! Differs from standard UTF-8 in two ways: U+0000 is written as two bytes and
//! supplementary characters are written as a surrogate pair of three-byte
//! sequences.

pub fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => bytes.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                bytes.push(0xC0 | (unit >> 6) as u8);
                bytes.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                bytes.push(0xE0 | (unit >> 12) as u8);
                bytes.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                bytes.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    bytes
}

/// `None` when the bytes are not well-formed modified UTF-8
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let unit = match b {
            0x01..=0x7F => {
                i += 1;
                u16::from(b)
            }
            0xC0..=0xDF => {
                let b2 = continuation(bytes.get(i + 1))?;
                i += 2;
                (u16::from(b & 0x1F) << 6) | b2
            }
            0xE0..=0xEF => {
                let b2 = continuation(bytes.get(i + 1))?;
                let b3 = continuation(bytes.get(i + 2))?;
                i += 3;
                (u16::from(b & 0x0F) << 12) | (b2 << 6) | b3
            }
            _ => return None,
        };
        units.push(unit);
    }
    String::from_utf16(&units).ok()
}

fn continuation(byte: Option<&u8>) -> Option<u16> {
    match byte.copied()? {
        b @ 0x80..=0xBF => Some(u16::from(b & 0x3F)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_unchanged() {
        assert_eq!(encode_modified_utf8("getValue"), b"getValue".to_vec());
    }

    #[test]
    fn test_nul_and_supplementary_characters() {
        assert_eq!(encode_modified_utf8("\0"), vec![0xC0, 0x80]);
        let emoji = encode_modified_utf8("\u{1F600}");
        assert_eq!(emoji.len(), 6);
        assert_eq!(decode_modified_utf8(&emoji).as_deref(), Some("\u{1F600}"));
    }

    #[test]
    fn test_decode_round_trips_identifiers() {
        for text in ["größe", "名前", "a\0b"] {
            assert_eq!(decode_modified_utf8(&encode_modified_utf8(text)).as_deref(), Some(text));
        }
    }

    #[test]
    fn test_rejects_raw_nul_and_four_byte_forms() {
        assert!(decode_modified_utf8(&[0x00]).is_none());
        assert!(decode_modified_utf8(&[0xF0, 0x9F, 0x98, 0x80]).is_none());
        assert!(decode_modified_utf8(&[0xC3]).is_none());
    }
}
