use std::io;

use http::StatusCode;
use thiserror::Error;

/// A decode-time failure of one session.
///
/// Every variant resolves locally into a fixed `(status, message)` response
/// written back on the session that caused it; nothing here ever propagates
/// past the worker loop or affects other in-flight requests.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body stream delivered fewer bytes than `CONTENT_LENGTH` declared.
    #[error("failed to read declared content: {source}")]
    ContentRead {
        #[from]
        source: io::Error,
    },

    /// A `multipart/form-data` body failed structural parsing.
    #[error("failed to parse multipart body: {source}")]
    Multipart {
        #[from]
        source: MultipartError,
    },
}

impl DecodeError {
    /// The client-facing status code; decode failures are always 400.
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// The fixed client-facing body for this failure.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::ContentRead { .. } => "Failed to read content.",
            Self::Multipart { .. } => "Failed to parse multipart/form-data.",
        }
    }
}

/// Structural failure inside a `multipart/form-data` body.
#[derive(Debug, Error)]
pub enum MultipartError {
    /// A part header line is missing its `:` separator (or starts with one).
    #[error("part header line without separator: {line}")]
    InvalidHeaderLine { line: String },
}

impl MultipartError {
    pub fn invalid_header_line<S: ToString>(line: S) -> Self {
        Self::InvalidHeaderLine { line: line.to_string() }
    }

    /// The header line that failed to parse, for the diagnostics stream.
    pub fn offending_line(&self) -> &str {
        match self {
            Self::InvalidHeaderLine { line } => line,
        }
    }
}
