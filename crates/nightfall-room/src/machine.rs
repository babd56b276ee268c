//! The room state machine: one per client, reconciling remote snapshots
//! into a local phase + derived view, and translating commands into
//! read-modify-write operations against the store.
//!
//! Two input streams drive it, processed one item at a time on the
//! client's event loop: local commands (from the lobby client) and remote
//! events (from the store subscription). The machine never blocks and
//! holds no locks — cross-client coordination happens entirely through
//! the store's compare-and-swap updates.

use std::fmt;
use std::sync::Arc;

use nightfall_protocol::{
    Player, PlayerId, RoleId, RoomCode, RoomRecord, Settings, SettingsDelta,
};
use nightfall_session::Session;
use nightfall_store::{RoomEvent, RoomPatch, RoomStore, StoreError};

use crate::distribute::distribute;
use crate::view::LobbyView;
use crate::LobbyError;

/// How many times a read-modify-write command re-reads and retries after
/// a version conflict before surfacing the error.
pub const CAS_ATTEMPTS: u32 = 3;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The local client's position in the lobby flow.
///
/// ```text
/// Idle → Creating ─→ InLobby ──────┐
///      → Joining ─→ AwaitingStart ─┴→ RoleRevealed → AllReady
/// ```
///
/// Leaving returns to `Idle` from any phase; a deletion notification
/// forces `Idle` from any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not bound to any room.
    Idle,
    /// Create command in flight.
    Creating,
    /// Join command in flight.
    Joining,
    /// In the lobby as host: sees settings and the role plan.
    InLobby,
    /// In the lobby as guest: waiting for the host to start.
    AwaitingStart,
    /// Game started; the local player's role card is showing.
    RoleRevealed,
    /// Everyone has confirmed their role.
    AllReady,
}

impl Phase {
    /// True once the client is bound to a room (command completed).
    pub fn is_in_room(self) -> bool {
        matches!(
            self,
            Self::InLobby | Self::AwaitingStart | Self::RoleRevealed | Self::AllReady
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Creating => "Creating",
            Self::Joining => "Joining",
            Self::InLobby => "InLobby",
            Self::AwaitingStart => "AwaitingStart",
            Self::RoleRevealed => "RoleRevealed",
            Self::AllReady => "AllReady",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// LobbyUpdate
// ---------------------------------------------------------------------------

/// What applying a remote event changed, for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyUpdate {
    /// The derived view changed; re-render the current screen.
    ViewChanged,
    /// The game started and this is the local player's role.
    /// Emitted exactly once per game instance.
    RoleRevealed(RoleId),
    /// Every player has confirmed their role.
    AllReady,
    /// The room was deleted remotely; the machine is back to idle.
    RoomClosed,
}

// ---------------------------------------------------------------------------
// RoomMachine
// ---------------------------------------------------------------------------

/// Per-client room state machine. See the module docs for the data flow.
pub struct RoomMachine<S> {
    store: Arc<S>,
    session: Option<Session>,
    phase: Phase,
    view: LobbyView,
    /// Version of the last snapshot applied; older deliveries are ignored.
    last_version: u64,
    /// One-shot guard: the false→true flip of `game_started` has been
    /// reacted to. Repeated snapshots must not re-trigger the reveal.
    started_seen: bool,
}

impl<S: RoomStore> RoomMachine<S> {
    /// A machine in the idle phase, bound to a store but no room.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            session: None,
            phase: Phase::Idle,
            view: LobbyView::default(),
            last_version: 0,
            started_seen: false,
        }
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The current derived view.
    pub fn view(&self) -> &LobbyView {
        &self.view
    }

    /// The active session, if bound to a room.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Discards all room-bound state and returns to idle.
    pub fn reset(&mut self) {
        self.session = None;
        self.phase = Phase::Idle;
        self.view = LobbyView::default();
        self.last_version = 0;
        self.started_seen = false;
    }

    // -- Commands ---------------------------------------------------------

    /// Creates the room and binds the host session.
    pub async fn create(
        &mut self,
        session: Session,
        settings: Settings,
    ) -> Result<(RoomRecord, u64), LobbyError> {
        if let Some(existing) = &self.session {
            return Err(LobbyError::AlreadyInRoom(existing.room_code.clone()));
        }
        self.phase = Phase::Creating;
        let record = RoomRecord::new(
            session.room_code.clone(),
            session.player_id.clone(),
            session.player_name.clone(),
            settings,
        );

        match self.store.create_room(record).await {
            Ok((record, version)) => {
                tracing::info!(
                    room_code = %record.room_code,
                    host = %session.player_id,
                    "room created"
                );
                self.session = Some(session);
                self.phase = Phase::InLobby;
                Ok((record, version))
            }
            Err(e) => {
                self.phase = Phase::Idle;
                Err(e.into())
            }
        }
    }

    /// Adds this player to an existing room and binds the guest session.
    ///
    /// Rejected with [`LobbyError::GameAlreadyStarted`] when the host has
    /// already dealt roles — late joiners would have none.
    pub async fn join(&mut self, session: Session) -> Result<(), LobbyError> {
        if let Some(existing) = &self.session {
            return Err(LobbyError::AlreadyInRoom(existing.room_code.clone()));
        }
        self.phase = Phase::Joining;
        let code = session.room_code.clone();
        let player_id = session.player_id.clone();
        let name = session.player_name.clone();

        let result = Self::read_modify_write(&self.store, &code, |record| {
            if record.game_started {
                return Err(LobbyError::GameAlreadyStarted(
                    record.room_code.clone(),
                ));
            }
            record
                .players
                .insert(player_id.clone(), Player::new(name.clone(), false));
            Ok(RoomPatch::new().with_players(record.players.clone()))
        })
        .await;

        match result {
            Ok((record, _)) => {
                tracing::info!(
                    room_code = %code,
                    player = %session.player_id,
                    players = record.player_count(),
                    "joined room"
                );
                self.session = Some(session);
                self.phase = Phase::AwaitingStart;
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Idle;
                Err(e)
            }
        }
    }

    /// Leaves the room: the host deletes it, a guest removes their entry.
    ///
    /// Local state returns to idle regardless of the store outcome — the
    /// player is gone either way. A room that already vanished counts as
    /// a successful leave.
    pub async fn leave(&mut self) -> Result<(), LobbyError> {
        let session = self.session.take().ok_or(LobbyError::NotInRoom)?;
        let code = session.room_code.clone();

        let result = if session.is_host {
            match self.store.delete_room(&code).await {
                Ok(()) | Err(StoreError::NotFound(_)) => Ok(()),
                Err(e) => Err(e.into()),
            }
        } else {
            let player_id = session.player_id.clone();
            let removed =
                Self::read_modify_write(&self.store, &code, |record| {
                    record.players.remove(&player_id);
                    Ok(RoomPatch::new().with_players(record.players.clone()))
                })
                .await;
            match removed {
                Ok(_) => Ok(()),
                Err(LobbyError::Store(StoreError::NotFound(_))) => Ok(()),
                Err(e) => Err(e),
            }
        };

        self.reset();
        tracing::info!(room_code = %code, is_host = session.is_host, "left room");
        result
    }

    /// Marks the local player ready and recomputes `all_ready` as the AND
    /// over every player's flag, writing both fields together.
    ///
    /// Readiness is one-way: confirming twice is a harmless overwrite of
    /// `true` with `true`.
    pub async fn set_ready(&mut self) -> Result<(), LobbyError> {
        let session = self.session.as_ref().ok_or(LobbyError::NotInRoom)?;
        let code = session.room_code.clone();
        let player_id = session.player_id.clone();

        let result = Self::read_modify_write(&self.store, &code, |record| {
            if !record.game_started {
                return Err(LobbyError::GameNotStarted);
            }
            let player = record
                .players
                .get_mut(&player_id)
                .ok_or(LobbyError::NotInRoom)?;
            player.ready = true;
            let all_ready = record.everyone_ready();
            Ok(RoomPatch::new()
                .with_players(record.players.clone())
                .with_all_ready(all_ready))
        })
        .await;

        self.surface(result).map(|_| ())
    }

    /// Applies one settings adjustment. Bounds are validated by the
    /// caller; this just persists the change.
    pub async fn update_settings(
        &mut self,
        delta: SettingsDelta,
    ) -> Result<Settings, LobbyError> {
        let session = self.session.as_ref().ok_or(LobbyError::NotInRoom)?;
        let code = session.room_code.clone();

        let result = Self::read_modify_write(&self.store, &code, |record| {
            record.settings.apply(delta);
            Ok(RoomPatch::new().with_settings(record.settings))
        })
        .await;

        self.surface(result).map(|(record, _)| record.settings)
    }

    /// Deals roles and starts the game: distributes over the freshest
    /// roster, then writes the full player map plus `game_started = true`
    /// in a single update.
    pub async fn start(&mut self) -> Result<(), LobbyError> {
        let session = self.session.as_ref().ok_or(LobbyError::NotInRoom)?;
        let code = session.room_code.clone();

        let result = Self::read_modify_write(&self.store, &code, |record| {
            let order: Vec<PlayerId> = record.players.keys().cloned().collect();
            let mut rng = rand::rng();
            let assignment = distribute(&order, &record.settings, &mut rng);
            for (player_id, role) in assignment {
                if let Some(player) = record.players.get_mut(&player_id) {
                    player.role = Some(role);
                }
            }
            record.game_started = true;
            Ok(RoomPatch::new()
                .with_players(record.players.clone())
                .with_game_started(true))
        })
        .await;

        match self.surface(result) {
            Ok((record, _)) => {
                tracing::info!(
                    room_code = %code,
                    players = record.player_count(),
                    "game started, roles dealt"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    // -- Remote events ----------------------------------------------------

    /// Processes one event from the store subscription.
    pub fn apply_event(&mut self, event: RoomEvent) -> Vec<LobbyUpdate> {
        match event {
            RoomEvent::Changed { record, version } => {
                self.apply_snapshot(record, version)
            }
            RoomEvent::Deleted => {
                if self.session.is_none() {
                    return Vec::new();
                }
                tracing::info!(phase = %self.phase, "room closed remotely");
                self.reset();
                vec![LobbyUpdate::RoomClosed]
            }
        }
    }

    /// Reconciles one remote snapshot into the derived view.
    ///
    /// Applying the same snapshot twice yields the same view and no
    /// duplicate transitions; snapshots older than the last applied
    /// version are discarded (the feed is at-least-once, not ordered).
    pub fn apply_snapshot(
        &mut self,
        record: RoomRecord,
        version: u64,
    ) -> Vec<LobbyUpdate> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        if version < self.last_version {
            tracing::debug!(
                version,
                last = self.last_version,
                "stale snapshot discarded"
            );
            return Vec::new();
        }
        self.last_version = version;

        let new_view = LobbyView::derive(&record, session);
        let mut updates = Vec::new();

        if new_view != self.view {
            updates.push(LobbyUpdate::ViewChanged);
        }

        if record.game_started && !self.started_seen {
            self.started_seen = true;
            if let Some(role) = new_view.my_role {
                self.phase = Phase::RoleRevealed;
                tracing::info!(role = %role, "role revealed");
                updates.push(LobbyUpdate::RoleRevealed(role));
            }
        }

        if record.all_ready && self.phase != Phase::AllReady {
            self.phase = Phase::AllReady;
            tracing::info!("all players ready");
            updates.push(LobbyUpdate::AllReady);
        }

        self.view = new_view;
        updates
    }

    // -- Internals --------------------------------------------------------

    /// Post-processes a command result: a `NotFound` means the room
    /// vanished mid-command (host left), which forces the machine idle
    /// before the error is surfaced.
    fn surface(
        &mut self,
        result: Result<(RoomRecord, u64), LobbyError>,
    ) -> Result<(RoomRecord, u64), LobbyError> {
        if let Err(LobbyError::Store(StoreError::NotFound(_))) = &result {
            tracing::info!("room vanished mid-command, returning to idle");
            self.reset();
        }
        result
    }

    /// Runs one read-modify-write cycle with bounded conflict retries.
    ///
    /// `mutate` receives the freshest record, edits it in place, and
    /// returns the patch describing the top-level fields it touched. On a
    /// version conflict the record is re-read and `mutate` runs again
    /// against the new state, up to [`CAS_ATTEMPTS`] times.
    async fn read_modify_write<F>(
        store: &Arc<S>,
        code: &RoomCode,
        mut mutate: F,
    ) -> Result<(RoomRecord, u64), LobbyError>
    where
        F: FnMut(&mut RoomRecord) -> Result<RoomPatch, LobbyError>,
    {
        for attempt in 1..=CAS_ATTEMPTS {
            let (mut record, version) = store.get_room(code).await?;
            let patch = mutate(&mut record)?;
            match store.update_room(code, patch, version).await {
                Ok(new_version) => return Ok((record, new_version)),
                Err(StoreError::Conflict { .. }) if attempt < CAS_ATTEMPTS => {
                    tracing::debug!(
                        room_code = %code,
                        attempt,
                        "version conflict, re-reading"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        // The final attempt either returned Ok or surfaced its error above.
        unreachable!("read_modify_write exits from within the loop")
    }
}

// =========================================================================
// Tests
// =========================================================================
