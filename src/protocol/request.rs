//! The decoded, protocol-agnostic request handed to the routing tree.

use std::collections::HashMap;
use std::fmt;
use std::io;

use bytes::Bytes;
use http::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{Method, MultipartField};

/// The decoded values of one request, before they are bound to the session's
/// output streams.
///
/// Built by the connection layer's request builder. At most one of
/// `body_params` and `multipart_fields` is populated, selected by the
/// session's `CONTENT_TYPE`.
#[derive(Debug, Default)]
pub struct RequestParts {
    /// Request method; unknown raw methods have already been mapped to GET.
    pub method: Method,

    /// The request path split on `/` with empty segments removed, so
    /// `/a//b/` becomes `["a", "b"]`.
    pub route: Vec<String>,

    /// Decoded parameters from the query component of the URI.
    pub query_params: HashMap<String, String>,

    /// The exact byte body as read from the session (may be empty).
    pub raw_body: Bytes,

    /// Decoded pairs of a conventional form-encoded body.
    pub body_params: HashMap<String, String>,

    /// Decoded parts of a `multipart/form-data` body, keyed by part name.
    pub multipart_fields: HashMap<String, MultipartField>,
}

/// A fully decoded request bound to its transport session.
///
/// Owned exclusively by the worker that built it; the output and diagnostics
/// sinks are borrowed from the session for the request's lifetime. The
/// routing tree writes its response through [`send_header`](Self::send_header),
/// [`write_body`](Self::write_body) or the raw [`out`](Self::out) sink.
pub struct Request<'a> {
    parts: RequestParts,
    out: &'a mut (dyn AsyncWrite + Send + Unpin),
    err: &'a mut (dyn AsyncWrite + Send + Unpin),
}

impl<'a> Request<'a> {
    pub fn new(
        parts: RequestParts,
        out: &'a mut (dyn AsyncWrite + Send + Unpin),
        err: &'a mut (dyn AsyncWrite + Send + Unpin),
    ) -> Self {
        Self { parts, out, err }
    }

    pub fn method(&self) -> Method {
        self.parts.method
    }

    /// The route segments consumed by the routing tree.
    pub fn route(&self) -> &[String] {
        &self.parts.route
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.parts.query_params.get(name).map(String::as_str)
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.parts.query_params
    }

    pub fn body_param(&self, name: &str) -> Option<&str> {
        self.parts.body_params.get(name).map(String::as_str)
    }

    pub fn body_params(&self) -> &HashMap<String, String> {
        &self.parts.body_params
    }

    pub fn multipart_field(&self, name: &str) -> Option<&MultipartField> {
        self.parts.multipart_fields.get(name)
    }

    pub fn multipart_fields(&self) -> &HashMap<String, MultipartField> {
        &self.parts.multipart_fields
    }

    /// The exact byte body. For `application/json` requests this is the only
    /// body representation. Decoding is left to the application layer.
    pub fn raw_body(&self) -> &Bytes {
        &self.parts.raw_body
    }

    /// Writes the CGI-style response prelude:
    /// `Status: <code> <reason>` and `Content-Type`, followed by the blank
    /// line that separates headers from the body.
    pub async fn send_header(&mut self, status: StatusCode, content_type: &str) -> io::Result<()> {
        let header = format!(
            "Status: {} {}\r\nContent-Type: {}\r\n\r\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            content_type
        );
        self.out.write_all(header.as_bytes()).await
    }

    /// Writes response body bytes to the session's output stream.
    pub async fn write_body(&mut self, body: &[u8]) -> io::Result<()> {
        self.out.write_all(body).await
    }

    /// The session's response stream.
    pub fn out(&mut self) -> &mut (dyn AsyncWrite + Send + Unpin) {
        self.out
    }

    /// The session's diagnostics stream.
    pub fn err(&mut self) -> &mut (dyn AsyncWrite + Send + Unpin) {
        self.err
    }
}

impl fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.parts.method)
            .field("route", &self.parts.route)
            .field("query_params", &self.parts.query_params)
            .finish_non_exhaustive()
    }
}
