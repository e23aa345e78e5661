//! Per-session processing: build the request, dispatch it, write the
//! response.
//!
//! A [`FcgiConnection`] owns exactly one accepted transport session and
//! drives it through its full lifecycle: splitting the session into
//! environment and streams, decoding via [`build_request`], dispatching to
//! the routing tree, and writing the error/404 fallbacks when needed. Decode
//! failures are resolved here into fixed 400 responses; only response I/O
//! errors propagate to the worker loop, where they are logged.

use std::io;

use http::StatusCode;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::handler::Router;
use crate::protocol::Request;
use crate::transport::Session;

mod request_builder;
pub use request_builder::build_request;

/// One accepted transport session being processed by a worker.
#[derive(Debug)]
pub struct FcgiConnection<S> {
    session: S,
}

impl<S: Session> FcgiConnection<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    /// Processes the session end to end and flushes its output streams.
    ///
    /// - a decode failure writes the failure's fixed status/message and
    ///   skips dispatch
    /// - a dispatched request the routing tree reports as unhandled gets the
    ///   fixed 404 fallback
    ///
    /// # Errors
    ///
    /// Returns an error only when writing the response itself fails.
    pub async fn process<R>(self, router: &R) -> io::Result<()>
    where
        R: Router + ?Sized,
    {
        let (params, mut body, mut out, mut err) = self.session.into_parts();

        let (parts, failure) = build_request(&params, &mut body, &mut err).await;
        let mut request = Request::new(parts, &mut out, &mut err);

        match failure {
            Some(error) => {
                debug!(cause = %error, "request decoding failed, responding with error");
                request.send_header(error.status(), "text/html").await?;
                request.write_body(error.public_message().as_bytes()).await?;
            }
            None => {
                // The routing tree always starts at the first route segment.
                if !router.handle_request(&mut request, 0).await {
                    request.send_header(StatusCode::NOT_FOUND, "text/html").await?;
                    request.write_body(b"Page Not Found 404").await?;
                }
            }
        }

        drop(request);
        out.flush().await?;
        err.flush().await?;
        Ok(())
    }
}
