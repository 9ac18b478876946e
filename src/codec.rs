//! Text <-> hex byte-string conversion for transaction arguments.
//!
//! `encode` is "UTF-8 encode, then two lowercase hex digits per byte".
//! `decode` strips whitespace first and refuses anything that is not a
//! sequence of complete hex pairs, so a bad payload never renders as
//! truncated or garbled text.

use crate::error::CodecError;

/// Encode text as lowercase hex of its UTF-8 bytes. Empty in, empty out.
pub fn encode(text: &str) -> String {
    hex::encode(text.as_bytes())
}

/// Inverse of [`encode`]. Whitespace anywhere in the input is ignored.
pub fn decode(hex_str: &str) -> Result<String, CodecError> {
    let compact: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(&compact).map_err(|e| CodecError::MalformedHex {
        reason: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| CodecError::InvalidUtf8(e.to_string()))
}
