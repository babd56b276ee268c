//! Error types for client-side validation.

use nightfall_protocol::ROOM_CODE_LEN;

/// A local precondition failed before any store round-trip.
///
/// Always recoverable: the message is shown to the user, they fix their
/// input, and re-trigger the action. Never conflated with store failures —
/// a validation error means nothing was sent anywhere.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Name was empty (after trimming whitespace).
    #[error("please enter a name")]
    EmptyName,

    /// Room code was not exactly the required length.
    #[error("room code must be exactly {len} characters, got {got}", len = ROOM_CODE_LEN)]
    BadRoomCode { got: usize },

    /// Not enough players in the room to start.
    #[error("need at least {min} players to start, have {have}")]
    NotEnoughPlayers { have: usize, min: usize },

    /// The configured roles don't fit in the current player count.
    #[error("{required} special roles configured but only {players} players")]
    TooManyRoles { required: u32, players: usize },

    /// Requested mafia count outside the allowed band for this roster.
    #[error("mafia count {requested} outside allowed range {min}..={max}")]
    MafiaCountOutOfRange { requested: u32, min: u32, max: u32 },

    /// A host-only command issued by a non-host.
    #[error("only the host can {0}")]
    HostOnly(&'static str),
}
