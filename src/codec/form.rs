//! Decoding of `application/x-www-form-urlencoded` bodies and query strings.
//!
//! The body is a sequence of `key=value` pairs joined by `&`. Decoding is
//! best-effort over input whose shape is only loosely specified by clients:
//! malformed pairs are dropped silently, never surfaced as errors.

use std::collections::HashMap;

use crate::codec::percent;

/// Splits `body` into `key=value` pairs and stores them in `params`.
///
/// - pairs are separated by `&`; empty segments are skipped
/// - only segments containing exactly one `=` are kept, everything else is
///   dropped silently
/// - key and value are both percent-decoded
/// - a later duplicate key overwrites the earlier one
pub fn decode(body: &[u8], params: &mut HashMap<String, String>) {
    for pair in body.split(|&byte| byte == b'&') {
        if pair.is_empty() {
            continue;
        }

        let Some(separator) = pair.iter().position(|&byte| byte == b'=') else {
            continue;
        };
        let (key, value) = (&pair[..separator], &pair[separator + 1..]);
        if value.contains(&b'=') {
            continue;
        }

        params.insert(decode_component(key), decode_component(value));
    }
}

fn decode_component(raw: &[u8]) -> String {
    let decoded = percent::decode_bytes(raw);
    match String::from_utf8(decoded) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
