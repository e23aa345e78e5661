//! Percent decoding for query strings and form-encoded bodies.
//!
//! This is the permissive decoder described in
//! [RFC 3986 Section 2.1](https://tools.ietf.org/html/rfc3986#section-2.1)
//! as applied by form submissions: `+` stands for a space and `%XY` for a
//! single byte. Decoding never fails; malformed escapes degrade instead of
//! being rejected:
//!
//! - a non-hex digit in an escape contributes `0` to its nibble, so `%4Z`
//!   decodes to the byte `0x40`
//! - a `%` followed by fewer than two characters truncates the output at
//!   that point
//!
//! Callers that need strictness should validate the decoded value afterwards.

/// Decodes `%XY` escapes and `+` in `text`, returning the decoded string.
///
/// Unreserved characters (alphanumeric and `-_.~`) and any byte outside the
/// escape syntax pass through unchanged, so decoding a string containing no
/// `%` or `+` returns it verbatim. Decoded byte sequences that are not valid
/// UTF-8 are converted lossily.
pub fn decode(text: &str) -> String {
    match String::from_utf8(decode_bytes(text.as_bytes())) {
        Ok(decoded) => decoded,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Byte-level form of [`decode`], a single O(n) pass.
pub fn decode_bytes(input: &[u8]) -> Vec<u8> {
    let mut decoded = Vec::with_capacity(input.len());

    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'+' => decoded.push(b' '),
            b'%' => {
                // An escape missing one or both digits truncates the output:
                // whatever was decoded so far is the result.
                let Some(&hi) = input.get(i + 1) else { break };
                let Some(&lo) = input.get(i + 2) else { break };
                decoded.push((from_hex(hi) << 4) + from_hex(lo));
                i += 2;
            }
            other => decoded.push(other),
        }
        i += 1;
    }

    decoded
}

/// Maps a hex digit to its value; non-hex digits count as zero.
fn from_hex(digit: u8) -> u8 {
    match digit {
        b'a'..=b'f' => 10 + (digit - b'a'),
        b'A'..=b'F' => 10 + (digit - b'A'),
        b'0'..=b'9' => digit - b'0',
        _ => 0,
    }
}
