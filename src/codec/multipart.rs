//! Decoding of `multipart/form-data` bodies.
//!
//! Implements the body splitting described by
//! [RFC 7578](https://tools.ietf.org/html/rfc7578) (returning values from
//! forms) together with the `Content-Disposition` parameter extraction of
//! [RFC 6266](https://tools.ietf.org/html/rfc6266) /
//! [RFC 2183](https://tools.ietf.org/html/rfc2183).
//!
//! # Boundary handling
//!
//! The boundary token is taken from the `Content-Type` header value after the
//! **first** `=` only; boundary values may themselves contain `=` (base64
//! tokens often end in one). Quoted boundaries are accepted by stripping
//! `"` characters. A header value without any `=` is not treated as a
//! protocol error at this layer; decoding is a no-op with an empty result.
//!
//! # Failure mode
//!
//! The only fatal condition is a part header line without a `:` separator at
//! position one or later; that aborts the whole body with
//! [`MultipartError::InvalidHeaderLine`], carrying the offending line so the
//! caller can mirror it to the session's diagnostics stream. Everything else
//! degrades to skipped or partially-filled fields.

use std::collections::HashMap;

use bytes::Bytes;

use crate::ensure;
use crate::protocol::{MultipartError, MultipartField};

/// Decodes a `multipart/form-data` body into `fields`, keyed by part name.
///
/// `content_type` is the raw `CONTENT_TYPE` header value, which declares the
/// boundary. Parts without a `name` parameter are stored under the empty key;
/// when several parts share a name the last one wins.
///
/// # Errors
///
/// Returns [`MultipartError::InvalidHeaderLine`] when a part header line is
/// missing its `:` separator. A missing boundary is not an error.
pub fn decode(
    body: &[u8],
    content_type: &str,
    fields: &mut HashMap<String, MultipartField>,
) -> Result<(), MultipartError> {
    let Some(separator) = content_type.find('=') else {
        return Ok(());
    };

    let mut delimiter = format!("--{}", &content_type[separator + 1..]);
    delimiter.retain(|c| c != '"');

    let segments = split_on(body, delimiter.as_bytes());
    if segments.len() < 3 {
        // No interior segments: at most preamble and epilogue.
        return Ok(());
    }

    // First and last segments are protocol preamble/epilogue.
    for segment in &segments[1..segments.len() - 1] {
        // Interior segments carry a leading CRLF and a trailing CRLF that
        // belongs to the next delimiter line; both are stripped. Anything
        // shorter cannot hold a part.
        if segment.len() <= 3 {
            continue;
        }
        let part = &segment[2..segment.len() - 2];

        let field = parse_part(part)?;
        fields.insert(field.name.clone(), field);
    }

    Ok(())
}

/// Parses one part: a CRLF-delimited header block, a blank line, then the
/// payload. A part without a blank line yields an empty field.
fn parse_part(content: &[u8]) -> Result<MultipartField, MultipartError> {
    let mut field = MultipartField::default();

    let Some(header_end) = find(content, b"\r\n\r\n") else {
        return Ok(field);
    };

    let header_block = String::from_utf8_lossy(&content[..header_end]);
    for line in header_block.split("\r\n") {
        if line.is_empty() {
            continue;
        }

        let colon = line.find(':').unwrap_or(0);
        ensure!(colon >= 1, MultipartError::invalid_header_line(line));

        // Only the colon itself is consumed; the value keeps any leading
        // whitespace exactly as received.
        field.headers.insert(line[..colon].to_owned(), line[colon + 1..].to_owned());
    }

    field.content_type = strip_char(field.headers.get("Content-Type").map_or("", String::as_str), ' ');

    let disposition = field.headers.get("Content-Disposition").cloned().unwrap_or_default();
    let mut tokens = disposition.split(';');
    if let Some(first) = tokens.next() {
        // inline / attachment / form-data
        field.content_disposition = strip_char(first, ' ');
    }
    for token in tokens {
        let token = strip_char(token, ' ');
        if let Some(rest) = token.strip_prefix("name=") {
            field.name = strip_char(rest, '"');
        } else if let Some(rest) = token.strip_prefix("filename=") {
            field.filename = strip_char(rest, '"');
        }
    }

    field.data = Bytes::copy_from_slice(&content[header_end + 4..]);
    Ok(field)
}

/// Removes every occurrence of `unwanted`, not just leading/trailing ones.
fn strip_char(text: &str, unwanted: char) -> String {
    text.chars().filter(|&c| c != unwanted).collect()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Splits `haystack` on every occurrence of `needle`, keeping empty segments.
fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut segments = Vec::new();
    let mut rest = haystack;
    while let Some(position) = find(rest, needle) {
        segments.push(&rest[..position]);
        rest = &rest[position + needle.len()..];
    }
    segments.push(rest);
    segments
}
