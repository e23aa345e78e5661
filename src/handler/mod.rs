//! The routing entry point consumed by the worker loops.
//!
//! The routing tree itself lives outside this crate; workers only need the
//! single dispatch seam below. Implementations typically walk a tree of
//! route nodes, passing an incremented depth into each child.

use async_trait::async_trait;

use crate::protocol::Request;

/// The application-level routing tree.
#[async_trait]
pub trait Router: Send + Sync {
    /// Handles a decoded request.
    ///
    /// `depth` is the index of the route segment this node should examine;
    /// the gateway always dispatches with a depth of `0`.
    ///
    /// Returning `true` means the request was fully handled and the status
    /// and body have been written to the request's output sink. Returning
    /// `false` makes the worker write the fixed 404 fallback.
    async fn handle_request(&self, request: &mut Request<'_>, depth: usize) -> bool;
}
