//! Base62 codec used for generated short codes.
//!
//! The alphabet is `0-9A-Za-z`, most-significant digit first. The raw
//! encoding carries no leading-zero padding, so `0` encodes to the empty
//! string; callers that need a non-empty code pad with [`pad`].

use thiserror::Error;

pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BASE: u64 = 62;

/// `u64::MAX` needs 11 base62 digits.
pub const MAX_ENCODED_LEN: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base62Error {
    #[error("invalid base62 character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("base62 value does not fit in 64 bits")]
    Overflow,
}

/// Encodes `value` in base62 without padding.
pub fn encode(mut value: u64) -> String {
    let mut buf = [0u8; MAX_ENCODED_LEN];
    let mut start = buf.len();
    while value > 0 {
        start -= 1;
        buf[start] = ALPHABET[(value % BASE) as usize];
        value /= BASE;
    }
    buf[start..].iter().map(|&b| b as char).collect()
}

/// Left-pads an encoded value with `'0'` up to `min_width` characters.
///
/// Leading zero digits do not change the decoded value.
pub fn pad(encoded: String, min_width: usize) -> String {
    if encoded.len() >= min_width {
        return encoded;
    }
    let mut padded = "0".repeat(min_width - encoded.len());
    padded.push_str(&encoded);
    padded
}

/// Decodes a base62 string back into the integer it was produced from.
///
/// The empty string decodes to `0`.
pub fn decode(encoded: &str) -> Result<u64, Base62Error> {
    encoded
        .chars()
        .enumerate()
        .try_fold(0u64, |acc, (position, character)| {
            let digit = digit_value(character)
                .ok_or(Base62Error::InvalidCharacter { character, position })?;
            acc.checked_mul(BASE)
                .and_then(|shifted| shifted.checked_add(digit))
                .ok_or(Base62Error::Overflow)
        })
}

fn digit_value(c: char) -> Option<u64> {
    let value = match c {
        '0'..='9' => c as u64 - '0' as u64,
        'A'..='Z' => c as u64 - 'A' as u64 + 10,
        'a'..='z' => c as u64 - 'a' as u64 + 36,
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_is_ordered_digits_upper_lower() {
        assert_eq!(ALPHABET.len(), 62);
        for (i, &b) in ALPHABET.iter().enumerate() {
            assert_eq!(digit_value(b as char), Some(i as u64));
        }
    }

    #[test]
    fn encodes_known_vectors() {
        assert_eq!(encode(0), "");
        assert_eq!(encode(1), "1");
        assert_eq!(encode(10), "A");
        assert_eq!(encode(61), "z");
        assert_eq!(encode(62), "10");
        assert_eq!(encode(3843), "zz");
        assert_eq!(encode(u64::MAX), "LygHa16AHYF");
    }

    #[test]
    fn round_trips_small_range() {
        for n in 0..20_000u64 {
            assert_eq!(decode(&encode(n)).unwrap(), n, "value {n}");
        }
    }

    #[test]
    fn round_trips_powers_and_extremes() {
        let mut samples = vec![u64::MAX, u64::MAX - 1, 1 << 63, (1 << 32) + 7];
        let mut p = 1u64;
        while let Some(next) = p.checked_mul(BASE) {
            samples.extend([p - 1, p, p + 1]);
            p = next;
        }
        for n in samples {
            assert_eq!(decode(&encode(n)).unwrap(), n, "value {n}");
        }
    }

    #[test]
    fn padding_is_value_neutral() {
        let padded = pad(encode(62), 6);
        assert_eq!(padded, "000010");
        assert_eq!(decode(&padded).unwrap(), 62);
        assert_eq!(pad(encode(0), 3), "000");
        assert_eq!(pad("abcdef".to_string(), 3), "abcdef");
    }

    #[test]
    fn decode_rejects_foreign_characters() {
        assert_eq!(
            decode("ab-c"),
            Err(Base62Error::InvalidCharacter {
                character: '-',
                position: 2
            })
        );
    }

    #[test]
    fn decode_detects_overflow() {
        assert_eq!(decode("LygHa16AHYG"), Err(Base62Error::Overflow));
        assert_eq!(decode("zzzzzzzzzzzz"), Err(Base62Error::Overflow));
    }

    #[test]
    fn empty_decodes_to_zero() {
        assert_eq!(decode("").unwrap(), 0);
    }
}
