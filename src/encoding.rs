//! ISO-8859-1 text handling for RAW dumps and their outputs.
//!
//! The instrument software writes single-byte Latin-1 text. Every byte maps
//! to the Unicode code point of the same value, so decoding never fails and
//! encoding a decoded buffer reproduces the original bytes.

/// Decode ISO-8859-1 bytes and normalise line endings to `\n`.
///
/// Both `\r\n` and a lone `\r` become a single `\n`.
pub fn decode_latin1(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    let mut iter = bytes.iter().peekable();

    while let Some(&byte) = iter.next() {
        if byte == b'\r' {
            if iter.peek() == Some(&&b'\n') {
                iter.next();
            }
            text.push('\n');
        } else {
            text.push(char::from(byte));
        }
    }

    text
}

/// Encode text back to ISO-8859-1.
///
/// Characters outside Latin-1 cannot come from a decoded RAW file; they are
/// written as `?`.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
