use std::collections::HashMap;

use bytes::Bytes;

/// One named part of a `multipart/form-data` body.
///
/// Fields are created by the multipart decoder, owned by the request's
/// multipart map, and dropped with the request at the end of the
/// request/response cycle; no field outlives its request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartField {
    /// The part's header lines, case preserved as received.
    pub headers: HashMap<String, String>,

    /// Value of the part's `Content-Type` header, spaces removed; empty if
    /// the header is absent.
    pub content_type: String,

    /// First token of the `Content-Disposition` header (`form-data`,
    /// `inline`, `attachment`, ...), spaces removed; empty if absent.
    pub content_disposition: String,

    /// The `name="..."` parameter of `Content-Disposition`; empty if absent.
    pub name: String,

    /// The `filename="..."` parameter of `Content-Disposition`; empty unless
    /// the part is a file upload.
    pub filename: String,

    /// Raw bytes of the part body, excluding the header block and the CRLF
    /// that belongs to the terminating delimiter.
    pub data: Bytes,
}
