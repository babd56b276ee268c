//! Shared record types for Nightfall.
//!
//! This crate defines the data that every participant in a game agrees on:
//!
//! - **Identity** ([`PlayerId`], [`RoomCode`]) — who a player is, which
//!   room they are talking about.
//! - **Role catalog** ([`RoleId`], [`Team`], [`RoleInfo`]) — the closed set
//!   of roles and their static display metadata.
//! - **Room record** ([`RoomRecord`], [`Player`], [`Settings`]) — the
//!   authoritative shared state persisted in the room store, one record per
//!   active room, keyed by room code.
//! - **Errors** ([`ProtocolError`]) — what can go wrong when parsing data
//!   that crossed the store boundary.
//!
//! # Architecture
//!
//! The record layer sits below everything else. It knows nothing about the
//! store, subscriptions, or the local state machine — it only defines the
//! shapes and their serialized form.
//!
//! ```text
//! Store (persistence) → Record (this crate) → Room machine (local view)
//! ```

mod error;
mod record;
mod roles;

pub use error::ProtocolError;
pub use record::{
    Player, PlayerId, RoomCode, RoomRecord, Settings, SettingsDelta,
    ROOM_CODE_ALPHABET, ROOM_CODE_LEN,
};
pub use roles::{RoleId, RoleInfo, Team};
