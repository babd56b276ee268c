//! Room store abstraction for Nightfall.
//!
//! The store is the only shared-state collaborator in the system: a
//! realtime-capable record service that persists one [`RoomRecord`] per
//! active room and pushes change notifications to subscribers. This crate
//! defines the contract every backend must satisfy ([`RoomStore`]) and
//! ships an in-process implementation ([`MemoryStore`], behind the
//! `memory` feature, on by default) used by tests and demos.
//!
//! # Consistency model
//!
//! The store guarantees document-level last-writer-wins only — there is no
//! field-level merge for the nested `players` map. Two clients that each
//! read the record, modify their own copy, and write back can silently
//! clobber each other. To make that race detectable, every committed
//! record carries a store-assigned **version**: [`RoomStore::update_room`]
//! is a compare-and-swap on that version and fails with
//! [`StoreError::Conflict`] when the record moved underneath the caller.
//! Writers re-read and rebuild their patch on conflict.
//!
//! # Feature Flags
//!
//! - `memory` (default) — in-process [`MemoryStore`]

mod error;
#[cfg(feature = "memory")]
mod memory;

pub use error::StoreError;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;

use std::collections::BTreeMap;
use std::future::Future;

use nightfall_protocol::{Player, PlayerId, RoomCode, RoomRecord, Settings};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// RoomPatch
// ---------------------------------------------------------------------------

/// A partial update: the top-level fields to replace in a stored record.
///
/// Merging happens per top-level field — a patch that carries `players`
/// replaces the entire players map, it does not merge individual entries.
/// That is exactly the document-level semantics the consistency model
/// describes, which is why updates go through compare-and-swap.
#[derive(Debug, Clone, Default)]
pub struct RoomPatch {
    pub players: Option<BTreeMap<PlayerId, Player>>,
    pub settings: Option<Settings>,
    pub game_started: Option<bool>,
    pub all_ready: Option<bool>,
}

impl RoomPatch {
    /// An empty patch. Build it up with the `with_*` methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the players map.
    pub fn with_players(mut self, players: BTreeMap<PlayerId, Player>) -> Self {
        self.players = Some(players);
        self
    }

    /// Replaces the settings.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Sets the game-started flag.
    pub fn with_game_started(mut self, started: bool) -> Self {
        self.game_started = Some(started);
        self
    }

    /// Sets the all-ready flag.
    pub fn with_all_ready(mut self, all_ready: bool) -> Self {
        self.all_ready = Some(all_ready);
        self
    }

    /// True if the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.players.is_none()
            && self.settings.is_none()
            && self.game_started.is_none()
            && self.all_ready.is_none()
    }

    /// Applies the patch to a record in place.
    pub fn apply(self, record: &mut RoomRecord) {
        if let Some(players) = self.players {
            record.players = players;
        }
        if let Some(settings) = self.settings {
            record.settings = settings;
        }
        if let Some(started) = self.game_started {
            record.game_started = started;
        }
        if let Some(all_ready) = self.all_ready {
            record.all_ready = all_ready;
        }
    }
}

// ---------------------------------------------------------------------------
// Change feed
// ---------------------------------------------------------------------------

/// One notification on a room's change feed.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// The record was replaced. Carries the full committed record and its
    /// new version stamp.
    Changed { record: RoomRecord, version: u64 },

    /// The record was removed (host left, room torn down).
    Deleted,
}

/// A live subscription to one room's change feed.
///
/// Exactly one subscription is active per client at a time; starting a new
/// one must release the old. Release is a scoped resource: call
/// [`unsubscribe`](Subscription::unsubscribe) explicitly (idempotent), or
/// let `Drop` do it on any exit path.
pub struct Subscription {
    code: RoomCode,
    events: mpsc::UnboundedReceiver<RoomEvent>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Assembles a subscription from its parts. Backends call this;
    /// consumers only receive.
    pub fn new(
        code: RoomCode,
        events: mpsc::UnboundedReceiver<RoomEvent>,
        release: Box<dyn FnOnce() + Send>,
    ) -> Self {
        Self {
            code,
            events,
            release: Some(release),
        }
    }

    /// The room this subscription watches.
    pub fn room_code(&self) -> &RoomCode {
        &self.code
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the feed is closed — after unsubscribing, or
    /// once the backend dropped the sender (room deleted).
    pub async fn recv(&mut self) -> Option<RoomEvent> {
        self.events.recv().await
    }

    /// Non-blocking variant of [`recv`](Subscription::recv).
    pub fn try_recv(&mut self) -> Option<RoomEvent> {
        self.events.try_recv().ok()
    }

    /// Stops delivery. Safe to call multiple times; later calls are no-ops.
    pub fn unsubscribe(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            self.events.close();
            tracing::debug!(room_code = %self.code, "subscription released");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("code", &self.code)
            .field("released", &self.release.is_none())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// RoomStore
// ---------------------------------------------------------------------------

/// The contract a room store backend must satisfy.
///
/// All operations are async and fallible. Versions are store-assigned,
/// monotonically increasing per room, and returned from every committing
/// operation so the caller always knows the version it last observed.
///
/// Methods are declared as `impl Future + Send` rather than plain
/// `async fn` so callers can move store operations into spawned tasks
/// (teardown cleanup runs in one). Implementors still just write
/// `async fn` — the compiler checks their futures are `Send`.
pub trait RoomStore: Send + Sync + 'static {
    /// Persists a brand-new room record.
    ///
    /// Returns the committed record and its initial version.
    ///
    /// # Errors
    /// [`StoreError::DuplicateRoomCode`] if the code is already taken.
    fn create_room(
        &self,
        record: RoomRecord,
    ) -> impl Future<Output = Result<(RoomRecord, u64), StoreError>> + Send;

    /// Point-in-time fetch of a room record and its current version.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if no such room exists.
    fn get_room(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<(RoomRecord, u64), StoreError>> + Send;

    /// Merges the patch's top-level fields into the stored record,
    /// provided the stored version still equals `expected_version`.
    ///
    /// Returns the new version on success.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if the room vanished concurrently.
    /// - [`StoreError::Conflict`] if another client committed first.
    fn update_room(
        &self,
        code: &RoomCode,
        patch: RoomPatch,
        expected_version: u64,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Removes the room record. Subscribers receive [`RoomEvent::Deleted`].
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the room does not exist.
    fn delete_room(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Opens a change feed for the room.
    ///
    /// Delivers at-least-once notifications for every commit and for
    /// deletion. Subscribing does not replay current state — follow up
    /// with [`get_room`](RoomStore::get_room) to seed the first snapshot.
    fn subscribe(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<Subscription, StoreError>> + Send;
}

// =========================================================================
// Tests
// =========================================================================
