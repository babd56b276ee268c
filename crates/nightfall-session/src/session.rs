//! The session: one local player identity bound to one room.

use nightfall_protocol::{PlayerId, RoomCode};

/// A client's local binding to one player identity within one room.
///
/// Lives from create/join until leave (or teardown). The session never
/// outlives its room membership — when the machine returns to idle the
/// session is dropped, and rejoining mints a fresh [`PlayerId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// This client's identity within the room.
    pub player_id: PlayerId,
    /// Display name, as validated at the landing screen.
    pub player_name: String,
    /// The room this session is bound to.
    pub room_code: RoomCode,
    /// Whether this client created the room.
    pub is_host: bool,
}

impl Session {
    /// A session for the player hosting `room_code`.
    pub fn host(player_name: impl Into<String>, room_code: RoomCode) -> Self {
        Self::bind(player_name, room_code, true)
    }

    /// A session for a player joining an existing room.
    pub fn guest(player_name: impl Into<String>, room_code: RoomCode) -> Self {
        Self::bind(player_name, room_code, false)
    }

    fn bind(
        player_name: impl Into<String>,
        room_code: RoomCode,
        is_host: bool,
    ) -> Self {
        let player_id = PlayerId::generate();
        let player_name = player_name.into();
        tracing::debug!(
            %player_id,
            name = %player_name,
            %room_code,
            is_host,
            "session bound"
        );
        Self {
            player_id,
            player_name,
            room_code,
            is_host,
        }
    }
}
