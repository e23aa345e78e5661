//! Decoding a session's environment and body stream into request parts.
//!
//! This is the glue between the transport boundary and the pure codecs:
//! method and route extraction, the conditional body read, and the
//! Content-Type dispatch that selects which body decoder runs.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::codec::{form, multipart};
use crate::protocol::{DecodeError, Method, RequestParts};
use crate::transport::Params;

/// Content-Type prefixes are matched case-sensitively against the raw header
/// value, exactly as the front-end servers send them.
const MULTIPART_PREFIX: &str = "multipart/form-data;";
const JSON_PREFIX: &str = "application/json;";

/// Decodes a session's environment and body into [`RequestParts`].
///
/// This never fails outright: a decode failure is returned *alongside*
/// whatever was decoded, so the caller can still build a request and write
/// the fixed error response through it.
///
/// The body stream is only touched when the method carries a body (POST or
/// PUT) and `CONTENT_LENGTH` declares more than zero bytes; exactly the
/// declared count is then read. A short read resolves to a 400 with no
/// further body decoding.
pub async fn build_request<B, E>(
    params: &Params,
    body: &mut B,
    diagnostics: &mut E,
) -> (RequestParts, Option<DecodeError>)
where
    B: AsyncRead + Unpin,
    E: AsyncWrite + Unpin,
{
    let mut parts = RequestParts::default();
    let mut failure = None;

    parts.method = Method::from_param(params.request_method().unwrap_or(""));

    // REQUEST_URI is optional: a session without one simply has an empty
    // route and no query parameters.
    if let Some(uri) = params.request_uri() {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };

        parts.route = path.split('/').filter(|segment| !segment.is_empty()).map(str::to_owned).collect();

        if let Some(query) = query {
            form::decode(query.as_bytes(), &mut parts.query_params);
        }
    }

    let content_length = params.content_length();
    if parts.method.reads_body() && content_length > 0 {
        let mut content = vec![0u8; content_length];
        match body.read_exact(&mut content).await {
            Ok(_) => {
                trace!(content_length, "read request body");
                parts.raw_body = Bytes::from(content);
                failure = decode_body(&mut parts, params.content_type(), diagnostics).await;
            }
            Err(source) => failure = Some(DecodeError::from(source)),
        }
    }

    // Debugging aid only: the raw query string is mirrored verbatim to the
    // diagnostics stream, it plays no role in control flow. A diagnostics
    // write failure never fails the request.
    if let Some(query_string) = params.query_string() {
        if let Err(error) = diagnostics.write_all(query_string.as_bytes()).await {
            trace!(cause = %error, "failed to mirror query string to diagnostics");
        }
    }

    (parts, failure)
}

/// Dispatches the raw body to a decoder based on the `CONTENT_TYPE` prefix.
///
/// The `application/json;` branch is a deliberate no-op: the raw body stays
/// available as an exact byte buffer and decoding is left to the application
/// layer (extension point).
async fn decode_body<E>(
    parts: &mut RequestParts,
    content_type: &str,
    diagnostics: &mut E,
) -> Option<DecodeError>
where
    E: AsyncWrite + Unpin,
{
    if content_type.starts_with(MULTIPART_PREFIX) {
        match multipart::decode(&parts.raw_body, content_type, &mut parts.multipart_fields) {
            Ok(()) => None,
            Err(error) => {
                let line = format!("{}\n", error.offending_line());
                if let Err(cause) = diagnostics.write_all(line.as_bytes()).await {
                    trace!(cause = %cause, "failed to write offending header line to diagnostics");
                }
                Some(DecodeError::from(error))
            }
        }
    } else if content_type.starts_with(JSON_PREFIX) {
        None
    } else {
        form::decode(&parts.raw_body, &mut parts.body_params);
        None
    }
}
