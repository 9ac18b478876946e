//! Hex codec laws over generated text, plus the fixed malformed cases.

use proptest::prelude::*;

use msgx::codec::{decode, encode};
use msgx::error::CodecError;

const WHITESPACE: &[&str] = &[" ", "\n", "\t", "\r\n", "  "];

/// Text plus offsets into its hex form where whitespace gets inserted.
/// Offsets can fall between the two digits of a pair.
fn text_with_breaks() -> impl Strategy<Value = (String, Vec<(usize, usize)>)> {
    any::<String>().prop_flat_map(|s| {
        let hex_len = 2 * s.len();
        let breaks = prop::collection::vec((0..hex_len + 1, 0..WHITESPACE.len()), 0..8);
        (Just(s), breaks)
    })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    #[test]
    fn decode_inverts_encode(s in any::<String>()) {
        prop_assert_eq!(decode(&encode(&s)).unwrap(), s);
    }

    #[test]
    fn two_lowercase_digits_per_byte(s in any::<String>()) {
        let h = encode(&s);
        prop_assert_eq!(h.len(), 2 * s.len());
        prop_assert!(
            h.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')),
            "non-lowercase hex in {}", h
        );
    }

    #[test]
    fn whitespace_anywhere_is_ignored((s, breaks) in text_with_breaks()) {
        let h = encode(&s);
        let mut cuts = breaks;
        cuts.sort_unstable();
        let mut spaced = String::with_capacity(h.len() + 2 * cuts.len());
        let mut last = 0;
        for (pos, ws) in cuts {
            spaced.push_str(&h[last..pos]);
            spaced.push_str(WHITESPACE[ws]);
            last = pos;
        }
        spaced.push_str(&h[last..]);
        prop_assert_eq!(decode(&spaced).unwrap(), s);
    }
}

#[test]
fn known_values() {
    assert_eq!(encode("Hello"), "48656c6c6f");
    assert_eq!(encode(""), "");
    assert_eq!(decode("48656C6C6F").unwrap(), "Hello");
}

#[test]
fn malformed_inputs_are_rejected() {
    for bad in ["0x4865", "486", "zz", "48 6"] {
        assert!(
            matches!(decode(bad), Err(CodecError::MalformedHex { .. })),
            "{bad:?} should be malformed"
        );
    }
}

#[test]
fn invalid_utf8_is_rejected() {
    // lone continuation byte, then a truncated 3-byte sequence
    for bad in ["80", "e382"] {
        assert!(matches!(decode(bad), Err(CodecError::InvalidUtf8(_))));
    }
}
