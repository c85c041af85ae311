//! Time-ordered identifier helpers.
//!
//! Every entity id is a UUIDv7 (RFC 9562): the first 48 bits carry a
//! millisecond Unix timestamp, so ids sort by creation time. Thread node
//! listings rely on this as the deterministic tie-break when two nodes
//! share a `created_at` timestamp.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}
