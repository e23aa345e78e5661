//! An asynchronous micro FastCGI gateway implementation
//!
//! This crate terminates a FastCGI-style transport between a front-end web
//! server and an application: it accepts transport sessions from a shared
//! listener on a pool of worker tasks, decodes each session's environment and
//! body into a protocol-agnostic [`Request`](protocol::Request), and hands the
//! result to an external routing tree for application-level handling.
//!
//! # Features
//!
//! - Worker pool competing for sessions on one shared listener, each worker
//!   handling requests strictly sequentially
//! - Maintenance loop invoking registered callbacks at a fixed cadence until
//!   all workers have stopped
//! - Permissive percent decoding and form-encoded body/query parsing
//! - RFC 7578 `multipart/form-data` decoding, including boundary values that
//!   contain `=` or are quoted
//! - Clean error handling: every decode failure resolves into a fixed 400
//!   response on the session that caused it, never past the worker loop
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use micro_fcgi::server::Server;
//!
//! #[tokio::main]
//! async fn main() {
//!     // `SocketListener` is whatever implements `transport::Listener` for
//!     // your deployment, e.g. over the fcgi spawn socket.
//!     let listener = SocketListener::bind("/run/app.sock").unwrap();
//!
//!     let server = Server::builder()
//!         .workers(4)
//!         .router(Arc::new(AppRoutes::new()))
//!         .poll_callback(|| flush_metrics())
//!         .build()
//!         .unwrap();
//!
//!     // Returns once the listener is closed and every worker has stopped.
//!     server.run(listener).await;
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`transport`]: the boundary to the transport library: listener accept,
//!   session environment parameters and byte streams
//! - [`codec`]: pure decoding functions (percent, form pairs, multipart)
//! - [`protocol`]: decoded value types and decode-time error types
//! - [`connection`]: per-session lifecycle, from building the request through
//!   dispatch to the response and the error/404 fallbacks
//! - [`handler`]: the routing entry point consumed by the workers
//! - [`server`]: worker pool and maintenance loop
//!
//! # Limitations
//!
//! - Not a general HTTP server: no keep-alive, no chunked transfer decoding,
//!   no TLS. The transport layer is expected to demultiplex individual
//!   requests and expose a key/value environment plus a byte body stream.
//! - `application/json` bodies are kept as raw bytes only; decoding them is
//!   left to the application layer.

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;
pub mod transport;

mod utils;
pub(crate) use utils::ensure;
