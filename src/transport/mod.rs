//! The boundary to the transport/protocol library.
//!
//! The gateway core does not speak the wire protocol itself. It assumes a
//! transport layer (the FastCGI record plumbing, or an in-memory fake in
//! tests) that demultiplexes individual requests and exposes each one as a
//! [`Session`]: a key/value environment plus a body input stream and two
//! output streams. [`Listener`] is the shared accept source a pool of
//! workers competes on.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// Environment parameters of one accepted transport session.
///
/// Typed accessors cover the parameters the gateway itself consumes;
/// everything else stays reachable through [`get`](Self::get) for the
/// application layer.
#[derive(Debug, Clone, Default)]
pub struct Params {
    inner: HashMap<String, String>,
}

impl Params {
    pub fn new(inner: HashMap<String, String>) -> Self {
        Self { inner }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    pub fn request_method(&self) -> Option<&str> {
        self.get("REQUEST_METHOD")
    }

    pub fn request_uri(&self) -> Option<&str> {
        self.get("REQUEST_URI")
    }

    pub fn query_string(&self) -> Option<&str> {
        self.get("QUERY_STRING")
    }

    /// The raw `CONTENT_TYPE` value, empty when absent.
    pub fn content_type(&self) -> &str {
        self.get("CONTENT_TYPE").unwrap_or("")
    }

    /// The declared body length. Parsing is lenient: an absent, malformed or
    /// negative value counts as zero, so a broken declaration means "no
    /// body" rather than an error.
    pub fn content_length(&self) -> usize {
        self.get("CONTENT_LENGTH")
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map_or(0, |value| usize::try_from(value).unwrap_or(0))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { inner: iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect() }
    }
}

/// One accepted request/response exchange.
pub trait Session: Send + 'static {
    type Body: AsyncRead + Send + Unpin;
    type Sink: AsyncWrite + Send + Unpin;

    /// Splits the session into its environment and its three byte streams:
    /// body input, response output, diagnostics output.
    fn into_parts(self) -> (Params, Self::Body, Self::Sink, Self::Sink);
}

/// The shared accept source all workers compete on.
///
/// `accept` must be safe for concurrent invocation; it is the sole
/// cross-worker serialization point. An implementation wrapping a primitive
/// that is not itself concurrency-safe should guard only the accept call
/// with a lock, never per-request processing.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    type Session: Session;

    /// Waits for the next session. `None` signals shutdown: the listener has
    /// been closed externally and the calling worker should stop.
    async fn accept(&self) -> Option<Self::Session>;
}
