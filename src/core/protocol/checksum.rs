//! NMEA checksum
//!
//! The checksum of a sentence is the XOR of every byte between the `$` start
//! flag and the `*` delimiter, written as two uppercase hex digits.

/// Number of hex characters in a sentence checksum
pub const CHECKSUM_LENGTH: usize = 2;

/// XOR of all bytes in `data`
///
/// `data` is the sentence body without the `$` and without the `*XX` suffix.
pub fn calculate(data: &str) -> u8 {
    data.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// Format a checksum as it appears on the wire (`7A`, `05`, ...)
///
/// Only the low byte is ever emitted.
pub fn encode(checksum: u32) -> String {
    format!("{:02X}", checksum & 0xFF)
}

/// Parse the two hex digits following `*`
///
/// Lowercase digits are accepted. Anything that is not exactly two hex
/// digits yields `None`.
pub fn decode(text: &str) -> Option<u8> {
    if text.len() != CHECKSUM_LENGTH || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(text, 16).ok()
}

/// Check a body against its textual checksum
pub fn verify(data: &str, checksum: &str) -> bool {
    decode(checksum) == Some(calculate(data))
}
