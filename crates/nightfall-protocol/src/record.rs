//! The shared room record and the types nested inside it.
//!
//! One [`RoomRecord`] per active room, identified by its [`RoomCode`] and
//! persisted in the room store. Every mutation a client makes — joining,
//! readying up, changing settings, starting the game — is expressed as a
//! replacement of one or more of the record's top-level fields.
//!
//! Wire shape: top-level fields are snake_case, the fields nested inside
//! [`Player`] and [`Settings`] are camelCase. This is the format the store
//! persists, so the serde attributes here are load-bearing.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{ProtocolError, RoleId};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The alphabet room codes are drawn from.
///
/// 32 symbols, uppercase, with the ambiguous 0/1/O/I removed so codes
/// survive being read aloud or scrawled on a napkin.
pub const ROOM_CODE_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a room code.
pub const ROOM_CODE_LEN: usize = 4;

/// A session-scoped opaque identifier for a player.
///
/// Generated client-side from a timestamp plus a random suffix. The format
/// is not a wire contract — only collision resistance matters. Ids are not
/// reused across sessions; rejoining a room mints a fresh one.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Mints a new id: `player_<unix-millis>_<9 base-36 chars>`.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        const SUFFIX: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut rng = rand::rng();
        let suffix: String = (0..9)
            .map(|_| SUFFIX[rng.random_range(0..SUFFIX.len())] as char)
            .collect();
        Self(format!("player_{millis}_{suffix}"))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 4-character human-shareable room identifier.
///
/// Uniqueness among active rooms is probabilistic, not enforced — with a
/// 32-symbol alphabet there are ~1M codes, and lobbies are short-lived.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Draws a uniformly random code from [`ROOM_CODE_ALPHABET`].
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let alphabet = ROOM_CODE_ALPHABET.as_bytes();
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
            .collect();
        Self(code)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A participant's stored state within a room.
///
/// Created on join; `role` is set exactly once at game start; `ready` is
/// set once by its player and never unset within a game; the whole entry
/// is removed only when the player leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name, as entered on the landing screen.
    pub name: String,
    /// Whether this player hosts the room.
    #[serde(rename = "isHost")]
    pub is_host: bool,
    /// Whether the player has confirmed seeing their role.
    pub ready: bool,
    /// Assigned role; `None` until the game starts.
    pub role: Option<RoleId>,
}

impl Player {
    /// A fresh lobby entry: not ready, no role yet.
    pub fn new(name: impl Into<String>, is_host: bool) -> Self {
        Self {
            name: name.into(),
            is_host,
            ready: false,
            role: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Host-configurable role counts.
///
/// The start-time invariant `mafia_count + specials <= player_count` is
/// checked when the host presses start, not continuously — settings may
/// transiently exceed the player count while people are still joining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// How many mafia to deal. Always at least 1.
    #[serde(rename = "mafiaCount")]
    pub mafia_count: u32,
    /// Deal one doctor if capacity allows.
    #[serde(rename = "includeDoctor")]
    pub include_doctor: bool,
    /// Deal one detective if capacity allows.
    #[serde(rename = "includeDetective")]
    pub include_detective: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mafia_count: 1,
            include_doctor: true,
            include_detective: true,
        }
    }
}

impl Settings {
    /// Number of enabled special roles (doctor + detective).
    pub fn special_count(&self) -> u32 {
        u32::from(self.include_doctor) + u32::from(self.include_detective)
    }

    /// Roles required at start time: mafia plus enabled specials.
    pub fn required_roles(&self) -> u32 {
        self.mafia_count + self.special_count()
    }

    /// Applies one adjustment from the host's settings panel.
    pub fn apply(&mut self, delta: SettingsDelta) {
        match delta {
            SettingsDelta::MafiaCount(n) => self.mafia_count = n,
            SettingsDelta::IncludeDoctor(on) => self.include_doctor = on,
            SettingsDelta::IncludeDetective(on) => self.include_detective = on,
        }
    }
}

/// One host-issued settings adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsDelta {
    /// Set the mafia count to an absolute value.
    MafiaCount(u32),
    /// Enable or disable the doctor.
    IncludeDoctor(bool),
    /// Enable or disable the detective.
    IncludeDetective(bool),
}

// ---------------------------------------------------------------------------
// RoomRecord
// ---------------------------------------------------------------------------

/// The authoritative shared record for one game instance.
///
/// Players are kept in a `BTreeMap` so every client enumerates them in the
/// same stable order regardless of insertion history — rosters render
/// identically everywhere and the distributor assigns over a fixed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// The room's identity.
    pub room_code: RoomCode,
    /// Which player hosts. Mirrors the single `is_host` entry in `players`.
    pub host_id: PlayerId,
    /// Current role-count configuration.
    pub settings: Settings,
    /// Everyone currently in the room, keyed by player id.
    pub players: BTreeMap<PlayerId, Player>,
    /// Flipped to true exactly once, when the host starts the game.
    pub game_started: bool,
    /// True once every player has confirmed their role.
    pub all_ready: bool,
}

impl RoomRecord {
    /// A freshly created room containing only its host.
    pub fn new(
        room_code: RoomCode,
        host_id: PlayerId,
        host_name: impl Into<String>,
        settings: Settings,
    ) -> Self {
        let mut players = BTreeMap::new();
        players.insert(host_id.clone(), Player::new(host_name, true));
        Self {
            room_code,
            host_id,
            settings,
            players,
            game_started: false,
            all_ready: false,
        }
    }

    /// Number of players currently in the room.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Number of players who have confirmed their role.
    pub fn ready_count(&self) -> usize {
        self.players.values().filter(|p| p.ready).count()
    }

    /// True iff every player's ready flag is set.
    pub fn everyone_ready(&self) -> bool {
        self.players.values().all(|p| p.ready)
    }

    /// Checks the structural invariants of a well-formed record.
    ///
    /// Useful as a debug assertion and in tests; clients never persist a
    /// record that fails this.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let hosts: Vec<_> =
            self.players.iter().filter(|(_, p)| p.is_host).collect();
        match hosts.as_slice() {
            [(id, _)] if **id == self.host_id => {}
            [] => {
                return Err(ProtocolError::InvalidRecord(
                    "no host entry in players".into(),
                ));
            }
            [(id, _)] => {
                return Err(ProtocolError::InvalidRecord(format!(
                    "host flag on {id} but host_id is {}",
                    self.host_id
                )));
            }
            _ => {
                return Err(ProtocolError::InvalidRecord(
                    "more than one host entry".into(),
                ));
            }
        }

        if self.game_started && self.players.values().any(|p| p.role.is_none())
        {
            return Err(ProtocolError::InvalidRecord(
                "game started but a player has no role".into(),
            ));
        }

        if self.all_ready && (!self.game_started || !self.everyone_ready()) {
            return Err(ProtocolError::InvalidRecord(
                "all_ready set but not every player is ready in a started game"
                    .into(),
            ));
        }

        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The persisted record format is shared with every other client, so
    //! these tests pin the exact JSON field names the serde attributes
    //! produce: snake_case at the top level, camelCase inside players and
    //! settings, lowercase role strings.

    use super::*;

    fn pid(s: &str) -> PlayerId {
        PlayerId(s.to_string())
    }

    fn sample_room() -> RoomRecord {
        RoomRecord::new(
            RoomCode("ABCD".into()),
            pid("player_1_host"),
            "Alice",
            Settings::default(),
        )
    }

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&pid("player_42_abc")).unwrap();
        assert_eq!(json, "\"player_42_abc\"");
    }

    #[test]
    fn test_player_id_generate_has_expected_shape() {
        let id = PlayerId::generate();
        let parts: Vec<_> = id.as_str().splitn(3, '_').collect();
        assert_eq!(parts[0], "player");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 9);
    }

    #[test]
    fn test_player_id_generate_is_collision_resistant() {
        let ids: std::collections::HashSet<_> =
            (0..1000).map(|_| PlayerId::generate()).collect();
        assert_eq!(ids.len(), 1000, "1000 generated ids should be distinct");
    }

    #[test]
    fn test_room_code_generate_uses_only_alphabet_chars() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let code = RoomCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), ROOM_CODE_LEN);
            assert!(
                code.as_str().chars().all(|c| ROOM_CODE_ALPHABET.contains(c)),
                "code {code} contains a char outside the alphabet"
            );
        }
    }

    #[test]
    fn test_room_code_alphabet_excludes_ambiguous_chars() {
        for c in ['0', '1', 'O', 'I'] {
            assert!(!ROOM_CODE_ALPHABET.contains(c));
        }
        assert_eq!(ROOM_CODE_ALPHABET.len(), 32);
    }

    // =====================================================================
    // Wire shape
    // =====================================================================

    #[test]
    fn test_player_serializes_with_camel_case_host_flag() {
        let player = Player::new("Bob", false);
        let json: serde_json::Value = serde_json::to_value(&player).unwrap();

        assert_eq!(json["name"], "Bob");
        assert_eq!(json["isHost"], false);
        assert_eq!(json["ready"], false);
        assert!(json["role"].is_null());
    }

    #[test]
    fn test_settings_serializes_with_camel_case_fields() {
        let json: serde_json::Value =
            serde_json::to_value(Settings::default()).unwrap();

        assert_eq!(json["mafiaCount"], 1);
        assert_eq!(json["includeDoctor"], true);
        assert_eq!(json["includeDetective"], true);
    }

    #[test]
    fn test_room_record_top_level_fields_are_snake_case() {
        let json: serde_json::Value =
            serde_json::to_value(sample_room()).unwrap();

        assert_eq!(json["room_code"], "ABCD");
        assert_eq!(json["host_id"], "player_1_host");
        assert_eq!(json["game_started"], false);
        assert_eq!(json["all_ready"], false);
        assert_eq!(json["players"]["player_1_host"]["isHost"], true);
    }

    #[test]
    fn test_room_record_round_trip() {
        let mut room = sample_room();
        room.players
            .insert(pid("player_2_bob"), Player::new("Bob", false));
        room.players.get_mut(&pid("player_2_bob")).unwrap().role =
            Some(RoleId::Doctor);

        let bytes = serde_json::to_vec(&room).unwrap();
        let decoded: RoomRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(room, decoded);
    }

    // =====================================================================
    // Record helpers and invariants
    // =====================================================================

    #[test]
    fn test_new_room_contains_only_the_host() {
        let room = sample_room();
        assert_eq!(room.player_count(), 1);
        assert_eq!(room.ready_count(), 0);
        let host = &room.players[&pid("player_1_host")];
        assert!(host.is_host);
        assert_eq!(host.name, "Alice");
    }

    #[test]
    fn test_everyone_ready_tracks_all_flags() {
        let mut room = sample_room();
        room.players
            .insert(pid("player_2_bob"), Player::new("Bob", false));
        assert!(!room.everyone_ready());

        for player in room.players.values_mut() {
            player.ready = true;
        }
        assert!(room.everyone_ready());
        assert_eq!(room.ready_count(), 2);
    }

    #[test]
    fn test_validate_accepts_well_formed_room() {
        assert!(sample_room().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_host_entry() {
        let mut room = sample_room();
        room.players.get_mut(&pid("player_1_host")).unwrap().is_host = false;

        let err = room.validate().unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidRecord(_)));
    }

    #[test]
    fn test_validate_rejects_host_id_mismatch() {
        let mut room = sample_room();
        room.host_id = pid("player_9_ghost");

        assert!(room.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_started_game_with_missing_role() {
        let mut room = sample_room();
        room.game_started = true;

        assert!(room.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_all_ready_before_start() {
        let mut room = sample_room();
        room.players.get_mut(&pid("player_1_host")).unwrap().ready = true;
        room.all_ready = true;

        assert!(room.validate().is_err());
    }

    #[test]
    fn test_settings_apply_deltas() {
        let mut settings = Settings::default();
        settings.apply(SettingsDelta::MafiaCount(2));
        settings.apply(SettingsDelta::IncludeDoctor(false));

        assert_eq!(settings.mafia_count, 2);
        assert!(!settings.include_doctor);
        assert!(settings.include_detective);
        assert_eq!(settings.required_roles(), 3);
    }
}
