//! Pure decoding functions for request metadata and bodies.
//!
//! Everything in this module operates on complete byte slices: the transport
//! layer has already demultiplexed the request and the connection layer has
//! read the declared body length. The decoders are therefore synchronous,
//! pure, and (with one multipart exception) infallible.
//!
//! # Components
//!
//! - [`percent`]: `%XY`/`+` unescaping, permissive, never fails
//! - [`form`]: `key=value&...` pair splitting for query strings and
//!   conventional form bodies, malformed pairs dropped silently
//! - [`multipart`]: RFC 7578 `multipart/form-data` splitting; the only
//!   fatal condition is a part header line without its `:` separator

pub mod form;
pub mod multipart;
pub mod percent;
