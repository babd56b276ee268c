//! Local player session and command validation for Nightfall.
//!
//! This crate handles the client's side of identity:
//!
//! 1. **Session** — the binding of one local player identity to one room
//!    ([`Session`]). Created on create/join, destroyed on leave. Owned and
//!    passed explicitly — there is no module-wide mutable state.
//! 2. **Validation** — the cheap, local preconditions every command must
//!    pass before any store round-trip ([`validate`]). A failed check is a
//!    [`ValidationError`]: the user corrects their input and retries,
//!    and the store never hears about it.
//!
//! # How it fits in the stack
//!
//! ```text
//! Lobby client (above)  ← validates commands, owns the session
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Record layer (below)  ← provides PlayerId, RoomCode, Settings
//! ```

mod error;
mod session;
pub mod validate;

pub use error::ValidationError;
pub use session::Session;
