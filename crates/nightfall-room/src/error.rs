//! Error types for the room layer.

use nightfall_protocol::RoomCode;
use nightfall_store::StoreError;

/// Errors that can occur while executing a room command.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The store round-trip failed. A `NotFound` inside means the room
    /// vanished (host left) and the machine has already returned to idle.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Tried to join a room whose game is already running.
    #[error("the game in room {0} has already started")]
    GameAlreadyStarted(RoomCode),

    /// Tried to create or join while still bound to a room. A client is
    /// in at most one room at a time; leave first.
    #[error("already in room {0}")]
    AlreadyInRoom(RoomCode),

    /// Tried to ready up before the host started the game.
    #[error("the game has not started yet")]
    GameNotStarted,

    /// A command that requires room membership was issued with no active
    /// session, or this player's entry is gone from the record.
    #[error("no active room membership")]
    NotInRoom,
}
