//! # Nightfall
//!
//! Party game lobby core for a social deduction game: one player hosts a
//! room, others join with a 4-character code, the host configures role
//! counts, and on start every player is privately dealt a role.
//! Synchronization runs entirely through a pluggable realtime record
//! store — see [`nightfall_store::RoomStore`] for the contract.
//!
//! This meta-crate wires the layers together behind [`LobbyClient`] and a
//! single [`CommandError`]. The sub-crates remain usable on their own:
//!
//! - [`nightfall_protocol`] — record types and the role catalog
//! - [`nightfall_store`] — store contract and the in-memory backend
//! - [`nightfall_room`] — state machine, derived view, role distribution
//! - [`nightfall_session`] — local identity and command validation
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use nightfall::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), nightfall::CommandError> {
//! let store = Arc::new(MemoryStore::new());
//!
//! let mut host = LobbyClient::new(Arc::clone(&store));
//! let code = host.create_room("Alice").await?;
//!
//! let mut guest = LobbyClient::new(Arc::clone(&store));
//! guest.join_room(code.as_str(), "Bob").await?;
//!
//! host.drain_updates();
//! assert_eq!(host.view().player_count, 2);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::LobbyClient;
pub use error::CommandError;

pub use nightfall_protocol::{
    Player, PlayerId, ProtocolError, RoleId, RoleInfo, RoomCode, RoomRecord,
    Settings, SettingsDelta, Team,
};
pub use nightfall_room::{
    distribute, role_plan, LobbyError, LobbyUpdate, LobbyView, Phase,
    PlayerEntry, RolePlan, RoleSummaryEntry, RoomMachine,
};
pub use nightfall_session::{validate, Session, ValidationError};
pub use nightfall_store::{RoomEvent, RoomPatch, RoomStore, StoreError, Subscription};
#[cfg(feature = "memory")]
pub use nightfall_store::MemoryStore;

/// The common imports for building a presentation layer.
pub mod prelude {
    pub use crate::{
        CommandError, LobbyClient, LobbyUpdate, LobbyView, Phase, RoleId,
        RoomCode, RoomStore, Settings, SettingsDelta,
    };
    #[cfg(feature = "memory")]
    pub use crate::MemoryStore;
}
