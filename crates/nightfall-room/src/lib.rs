//! Room state machine and role distribution for Nightfall.
//!
//! Each client runs one [`RoomMachine`]: it reconciles remote room
//! snapshots into a local [`Phase`] and derived [`LobbyView`], and
//! translates player commands into read-modify-write operations against
//! the room store.
//!
//! # Key types
//!
//! - [`RoomMachine`] — per-client reconciliation and command execution
//! - [`Phase`] — where the local client is in the lobby flow
//! - [`LobbyView`] — what the presentation layer renders
//! - [`LobbyUpdate`] — what a remote event changed
//! - [`distribute`] — the one-shot fair role assignment
//! - [`LobbyError`] — what can go wrong executing a command

mod distribute;
mod error;
mod machine;
mod view;

pub use distribute::{distribute, role_plan, RolePlan};
pub use error::LobbyError;
pub use machine::{LobbyUpdate, Phase, RoomMachine, CAS_ATTEMPTS};
pub use view::{LobbyView, PlayerEntry, RoleSummaryEntry};
