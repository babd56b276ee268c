//! The derived view: what the presentation layer renders.
//!
//! A [`LobbyView`] is recomputed from scratch on every remote snapshot.
//! It carries no behavior and borrows nothing — the presentation layer
//! can hold it across frames, diff it, or throw it away.

use nightfall_protocol::{RoleId, RoomCode, RoomRecord, Settings};
use nightfall_session::Session;

use crate::distribute::{role_plan, RolePlan};

/// One row in the rendered player roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEntry {
    pub name: String,
    pub is_host: bool,
    pub ready: bool,
}

/// One row of the host's end-of-reveal role summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSummaryEntry {
    pub name: String,
    pub role: RoleId,
}

/// Everything the presentation layer needs to draw the current screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LobbyView {
    /// The room this view reflects, if any.
    pub room_code: Option<RoomCode>,
    /// Roster in stable record order.
    pub players: Vec<PlayerEntry>,
    pub player_count: usize,
    pub ready_count: usize,
    /// Current settings, for the host's controls.
    pub settings: Settings,
    /// Role breakdown preview. Host only.
    pub role_plan: Option<RolePlan>,
    /// The local player's assigned role, once the game has started.
    pub my_role: Option<RoleId>,
    pub game_started: bool,
    pub all_ready: bool,
    /// Full player → role mapping for the summary screen. Host only,
    /// populated once everyone is ready.
    pub role_summary: Option<Vec<RoleSummaryEntry>>,
}

impl LobbyView {
    /// Derives the full view from one room snapshot.
    pub fn derive(record: &RoomRecord, session: &Session) -> Self {
        let players: Vec<PlayerEntry> = record
            .players
            .values()
            .map(|p| PlayerEntry {
                name: p.name.clone(),
                is_host: p.is_host,
                ready: p.ready,
            })
            .collect();

        let my_role = record
            .players
            .get(&session.player_id)
            .and_then(|p| p.role);

        let role_plan = session
            .is_host
            .then(|| role_plan(record.player_count(), &record.settings));

        let role_summary = (session.is_host && record.all_ready).then(|| {
            record
                .players
                .values()
                .filter_map(|p| {
                    p.role.map(|role| RoleSummaryEntry {
                        name: p.name.clone(),
                        role,
                    })
                })
                .collect()
        });

        Self {
            room_code: Some(record.room_code.clone()),
            player_count: players.len(),
            ready_count: record.ready_count(),
            players,
            settings: record.settings,
            role_plan,
            my_role,
            game_started: record.game_started,
            all_ready: record.all_ready,
            role_summary,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use nightfall_protocol::{Player, PlayerId};

    fn sample_record() -> (RoomRecord, Session) {
        let session = Session::host("Alice", RoomCode("ABCD".into()));
        let mut record = RoomRecord::new(
            RoomCode("ABCD".into()),
            session.player_id.clone(),
            "Alice",
            Settings::default(),
        );
        record
            .players
            .insert(PlayerId("player_2_bob".into()), Player::new("Bob", false));
        (record, session)
    }

    #[test]
    fn test_derive_builds_roster_in_record_order() {
        let (record, session) = sample_record();

        let view = LobbyView::derive(&record, &session);

        assert_eq!(view.player_count, 2);
        let names: Vec<_> =
            view.players.iter().map(|p| p.name.as_str()).collect();
        let expected: Vec<_> =
            record.players.values().map(|p| p.name.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_derive_host_gets_role_plan_guest_does_not() {
        let (record, host) = sample_record();
        let guest = Session::guest("Bob", RoomCode("ABCD".into()));

        assert!(LobbyView::derive(&record, &host).role_plan.is_some());
        assert!(LobbyView::derive(&record, &guest).role_plan.is_none());
    }

    #[test]
    fn test_derive_my_role_read_from_own_entry() {
        let (mut record, session) = sample_record();
        record
            .players
            .get_mut(&session.player_id)
            .unwrap()
            .role = Some(RoleId::Detective);

        let view = LobbyView::derive(&record, &session);

        assert_eq!(view.my_role, Some(RoleId::Detective));
    }

    #[test]
    fn test_derive_survives_missing_own_entry() {
        // A racing write may have pruned this player; the view simply
        // reflects the record.
        let (mut record, session) = sample_record();
        record.players.remove(&session.player_id);
        record.host_id = PlayerId("player_2_bob".into());

        let view = LobbyView::derive(&record, &session);

        assert_eq!(view.player_count, 1);
        assert_eq!(view.my_role, None);
    }

    #[test]
    fn test_derive_role_summary_only_for_host_when_all_ready() {
        let (mut record, host) = sample_record();
        for player in record.players.values_mut() {
            player.ready = true;
            player.role = Some(RoleId::Civilian);
        }
        record.game_started = true;

        // Not yet all_ready → no summary.
        assert!(LobbyView::derive(&record, &host).role_summary.is_none());

        record.all_ready = true;
        let view = LobbyView::derive(&record, &host);
        let summary = view.role_summary.expect("host should see the summary");
        assert_eq!(summary.len(), 2);

        let guest = Session::guest("Bob", RoomCode("ABCD".into()));
        assert!(LobbyView::derive(&record, &guest).role_summary.is_none());
    }

    #[test]
    fn test_derive_counts_ready_players() {
        let (mut record, session) = sample_record();
        record
            .players
            .get_mut(&session.player_id)
            .unwrap()
            .ready = true;

        let view = LobbyView::derive(&record, &session);

        assert_eq!(view.ready_count, 1);
        assert!(!view.all_ready);
    }
}
