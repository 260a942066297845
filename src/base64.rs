//! Lenient standard Base64 decoding, used to read Basic-Auth payloads.

/// Maps one character of the standard alphabet (`A-Z a-z 0-9 + /`) to its
/// 6-bit value.
fn sextet(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'a'..=b'z' => Some(c - b'a' + 26),
        b'0'..=b'9' => Some(c - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

fn reassemble(group: [u8; 4]) -> [u8; 3] {
    [
        (group[0] << 2) | ((group[1] & 0x30) >> 4),
        ((group[1] & 0x0f) << 4) | ((group[2] & 0x3c) >> 2),
        ((group[2] & 0x03) << 6) | group[3],
    ]
}

/// Decodes standard Base64 text into raw bytes.
///
/// Decoding never fails. Input is consumed up to the first padding character
/// (`=`) or the first character outside the alphabet, and everything after it
/// is ignored. A trailing partial group of `n` characters yields `n - 1`
/// bytes, so a single leftover character yields nothing.
pub fn decode(input: impl AsRef<[u8]>) -> Vec<u8> {
    let sextets: Vec<u8> = input.as_ref().iter().map_while(|&c| sextet(c)).collect();

    let mut decoded = Vec::with_capacity(sextets.len() / 4 * 3 + 2);
    let mut groups = sextets.chunks_exact(4);
    for group in &mut groups {
        decoded.extend_from_slice(&reassemble([group[0], group[1], group[2], group[3]]));
    }

    let leftover = groups.remainder();
    if !leftover.is_empty() {
        let mut group = [0u8; 4];
        group[..leftover.len()].copy_from_slice(leftover);
        decoded.extend_from_slice(&reassemble(group)[..leftover.len() - 1]);
    }

    decoded
}

#[cfg(test)]
mod test {
    use ::base64::{engine::general_purpose::STANDARD, Engine};

    use super::*;

    #[test]
    fn decode_known_values() {
        assert_eq!(decode(""), b"");
        assert_eq!(decode("Zg=="), b"f");
        assert_eq!(decode("Zm8="), b"fo");
        assert_eq!(decode("Zm9v"), b"foo");
        assert_eq!(decode("Zm9vYmFy"), b"foobar");
        assert_eq!(decode("dXNlcjpwYXNzd29yZA=="), b"user:password");
    }

    #[test]
    fn decode_reference_encoding() {
        // Every length up to a few full groups, covering each padding case.
        for len in 0..64usize {
            let bytes: Vec<u8> = (0..len).map(|i| (i * 37 + 11) as u8).collect();
            assert_eq!(decode(STANDARD.encode(&bytes)), bytes, "length {len}");
        }

        let all: Vec<u8> = (0..=255).collect();
        assert_eq!(decode(STANDARD.encode(&all)), all);
    }

    #[test]
    fn decode_stops_at_padding_or_invalid_character() {
        assert_eq!(decode("QQ==!!!"), decode("QQ=="));
        assert_eq!(decode("QQ==QUJD"), b"A");
        assert_eq!(decode("Zm9v YmFy"), b"foo");
        assert_eq!(decode("Zm9v-YmFy"), b"foo");
    }

    #[test]
    fn decode_partial_groups() {
        // Unpadded partial groups decode the same as padded ones.
        assert_eq!(decode("Zm8"), b"fo");
        assert_eq!(decode("Zg"), b"f");
        // A single leftover character carries less than a byte.
        assert_eq!(decode("Zm9vY"), b"foo");
        assert_eq!(decode("Z"), b"");
    }
}
