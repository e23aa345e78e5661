//! Core protocol value types and error types.
//!
//! This module holds everything a routing tree sees: the decoded
//! [`Request`] with its route segments and parameter maps, the
//! [`MultipartField`] parts of an upload body, and the error types produced
//! while decoding a session.
//!
//! # Components
//!
//! - [`Method`]: request method enum, unknown methods default to GET
//! - [`Request`] / [`RequestParts`]: the decoded request, borrowing the
//!   session's output and diagnostics sinks for its lifetime
//! - [`MultipartField`]: one named part of a `multipart/form-data` body
//! - [`DecodeError`] / [`MultipartError`]: decode-time failures, each
//!   resolved locally into a fixed 400 response by the connection layer

mod method;
pub use method::Method;

mod multipart;
pub use multipart::MultipartField;

mod request;
pub use request::Request;
pub use request::RequestParts;

mod error;
pub use error::DecodeError;
pub use error::MultipartError;
