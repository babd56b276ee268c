//! `LobbyClient`: one local participant's command surface.
//!
//! The client ties the layers together for a single participant: it
//! validates input locally, hands commands to the room machine, and owns
//! the store subscription — exactly one at a time, released on every exit
//! path (leave, remote deletion, teardown, drop).
//!
//! The presentation layer drives it from a single-threaded event loop:
//! call commands on user actions, call
//! [`recv_update`](LobbyClient::recv_update) to process one remote event
//! at a time, and render [`view`](LobbyClient::view) after either.

use std::sync::Arc;

use nightfall_protocol::{RoomCode, Settings, SettingsDelta};
use nightfall_room::{LobbyUpdate, LobbyView, Phase, RoomMachine};
use nightfall_session::{validate, Session};
use nightfall_store::{RoomStore, Subscription};

use crate::CommandError;

/// One client's binding of identity, machine, and subscription.
pub struct LobbyClient<S: RoomStore> {
    store: Arc<S>,
    machine: RoomMachine<S>,
    subscription: Option<Subscription>,
}

impl<S: RoomStore> LobbyClient<S> {
    /// A client bound to a store, not yet in any room.
    pub fn new(store: Arc<S>) -> Self {
        let machine = RoomMachine::new(Arc::clone(&store));
        Self {
            store,
            machine,
            subscription: None,
        }
    }

    /// The current derived view.
    pub fn view(&self) -> &LobbyView {
        self.machine.view()
    }

    /// The current lobby phase.
    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    /// The active session, if in a room.
    pub fn session(&self) -> Option<&Session> {
        self.machine.session()
    }

    // -- Commands ---------------------------------------------------------

    /// Creates a room with a fresh random code and default settings,
    /// then subscribes to it. Returns the shareable code.
    pub async fn create_room(
        &mut self,
        name: &str,
    ) -> Result<RoomCode, CommandError> {
        let name = validate::player_name(name)?;
        let code = RoomCode::generate(&mut rand::rng());
        let session = Session::host(name, code.clone());

        self.machine.create(session, Settings::default()).await?;
        self.watch(&code).await?;
        Ok(code)
    }

    /// Joins an existing room by hand-typed code, then subscribes to it.
    pub async fn join_room(
        &mut self,
        code: &str,
        name: &str,
    ) -> Result<(), CommandError> {
        let name = validate::player_name(name)?;
        let code = validate::room_code(code)?;
        let session = Session::guest(name, code.clone());

        self.machine.join(session).await?;
        self.watch(&code).await?;
        Ok(())
    }

    /// Leaves the current room and releases the subscription.
    pub async fn leave_room(&mut self) -> Result<(), CommandError> {
        self.subscription = None;
        self.machine.leave().await?;
        Ok(())
    }

    /// Confirms the local player has seen their role.
    pub async fn set_ready(&mut self) -> Result<(), CommandError> {
        self.machine.set_ready().await?;
        Ok(())
    }

    /// Adjusts one setting. Host only; mafia counts are bounded by the
    /// current roster before anything is written.
    pub async fn adjust_settings(
        &mut self,
        delta: SettingsDelta,
    ) -> Result<(), CommandError> {
        let session = self.machine.session();
        validate::host_only(
            session.is_some_and(|s| s.is_host),
            "change settings",
        )?;
        if let SettingsDelta::MafiaCount(requested) = delta {
            validate::mafia_count(requested, self.view().player_count)?;
        }

        self.machine.update_settings(delta).await?;
        Ok(())
    }

    /// Deals roles and starts the game. Host only; requires enough
    /// players for the configured roles.
    pub async fn start_game(&mut self) -> Result<(), CommandError> {
        let session = self.machine.session();
        validate::host_only(
            session.is_some_and(|s| s.is_host),
            "start the game",
        )?;
        let view = self.view();
        validate::can_start(view.player_count, &view.settings)?;

        self.machine.start().await?;
        Ok(())
    }

    // -- Remote events ----------------------------------------------------

    /// Waits for the next remote event, applies it, and reports what
    /// changed. Returns `None` when there is no live subscription (idle,
    /// or the feed closed).
    pub async fn recv_update(&mut self) -> Option<Vec<LobbyUpdate>> {
        let sub = self.subscription.as_mut()?;
        let event = sub.recv().await?;
        let updates = self.machine.apply_event(event);
        if updates.contains(&LobbyUpdate::RoomClosed) {
            self.subscription = None;
        }
        Some(updates)
    }

    /// Applies every already-delivered event without waiting.
    pub fn drain_updates(&mut self) -> Vec<LobbyUpdate> {
        let mut all = Vec::new();
        if let Some(sub) = self.subscription.as_mut() {
            while let Some(event) = sub.try_recv() {
                all.extend(self.machine.apply_event(event));
            }
        }
        if all.contains(&LobbyUpdate::RoomClosed) {
            self.subscription = None;
        }
        all
    }

    /// Best-effort teardown: release the subscription and leave the room.
    ///
    /// Failures are logged and swallowed — the client is going away and
    /// there is nobody left to retry for.
    pub async fn shutdown(&mut self) {
        self.subscription = None;
        if self.machine.session().is_some() {
            if let Err(e) = self.machine.leave().await {
                tracing::warn!(
                    error = %e,
                    "best-effort leave at teardown failed"
                );
            }
        }
    }

    // -- Internals --------------------------------------------------------

    /// Replaces the active subscription with one for `code` and seeds the
    /// machine with a point-in-time snapshot — the push feed does not
    /// replay current state.
    ///
    /// The room can vanish between the command commit and this call (the
    /// host left at just the wrong moment); that is a room-closed outcome
    /// like any other, so the machine returns to idle.
    async fn watch(&mut self, code: &RoomCode) -> Result<(), CommandError> {
        self.subscription = None;
        match self.try_watch(code).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if e.is_room_closed() {
                    self.subscription = None;
                    self.machine.reset();
                }
                Err(e)
            }
        }
    }

    async fn try_watch(&mut self, code: &RoomCode) -> Result<(), CommandError> {
        let subscription = self.store.subscribe(code).await?;
        self.subscription = Some(subscription);

        let (record, version) = self.store.get_room(code).await?;
        self.machine.apply_snapshot(record, version);
        Ok(())
    }
}

/// Abrupt teardown (drop without [`shutdown`](LobbyClient::shutdown))
/// still tries to leave: the machine is handed to a fire-and-forget task
/// if a runtime is available. Best-effort only — with no runtime the room
/// entry is left behind for the store's own lifecycle policy.
impl<S: RoomStore> Drop for LobbyClient<S> {
    fn drop(&mut self) {
        if self.machine.session().is_none() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no runtime at teardown, skipping leave");
            return;
        };
        self.subscription = None;
        let mut machine = std::mem::replace(
            &mut self.machine,
            RoomMachine::new(Arc::clone(&self.store)),
        );
        handle.spawn(async move {
            if let Err(e) = machine.leave().await {
                tracing::warn!(error = %e, "leave on drop failed");
            }
        });
    }
}
