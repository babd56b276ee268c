//! Error types for the store boundary.

use nightfall_protocol::RoomCode;

/// Errors that can occur talking to the room store.
///
/// Every store operation is fallible — the backend is remote and may be
/// slow, gone, or racing another client. An error means the operation was
/// NOT applied; callers re-trigger the action rather than retrying
/// automatically (conflicts are the one exception, see
/// [`Conflict`](StoreError::Conflict)).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The room does not exist (never created, or deleted concurrently,
    /// typically because the host left).
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// A room with this code already exists.
    ///
    /// Codes are random and collisions are accepted as improbable, so this
    /// is surfaced rather than resolved by the store.
    #[error("room code {0} already exists")]
    DuplicateRoomCode(RoomCode),

    /// The record changed under a compare-and-swap update.
    ///
    /// Another client committed between this client's read and its write.
    /// Recoverable: re-read the record, rebuild the patch, and try again.
    #[error("version conflict on room {code}: expected {expected}, found {found}")]
    Conflict {
        code: RoomCode,
        expected: u64,
        found: u64,
    },

    /// Network, timeout, or unexpected backend failure.
    #[error("store backend failure: {0}")]
    Backend(String),
}
