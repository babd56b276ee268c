//! Unified error type for the lobby client boundary.

use nightfall_room::LobbyError;
use nightfall_session::ValidationError;
use nightfall_store::StoreError;

/// Top-level error returned by every [`LobbyClient`](crate::LobbyClient)
/// command.
///
/// The presentation layer matches on this to decide what to show: a
/// validation failure is an inline hint next to the offending input, a
/// room error is a toast, and a closed room sends the user back to the
/// landing screen.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// A local precondition failed; nothing was sent to the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The command reached the room layer and failed there.
    #[error(transparent)]
    Room(#[from] LobbyError),
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        Self::Room(LobbyError::Store(e))
    }
}

impl CommandError {
    /// True when the failure means the room is gone (host left or the
    /// record vanished) and the client has returned to idle.
    pub fn is_room_closed(&self) -> bool {
        matches!(
            self,
            Self::Room(LobbyError::Store(StoreError::NotFound(_)))
        )
    }
}
