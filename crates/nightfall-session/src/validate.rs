//! Client-side command preconditions.
//!
//! Each check is local and synchronous: it runs before the command's store
//! round-trip and rejects bad input without touching the network. The
//! bounds mirror what the lobby UI enforces — a well-behaved presentation
//! layer never triggers these, but the core does not trust it to behave.

use nightfall_protocol::{RoomCode, Settings, ROOM_CODE_LEN};

use crate::ValidationError;

/// Minimum players required to start a game.
pub const MIN_PLAYERS: usize = 3;

/// Minimum configurable mafia count.
pub const MIN_MAFIA: u32 = 1;

/// Upper bound for the mafia count given the current roster.
///
/// Half the room may be mafia, but small lobbies always get headroom up
/// to 3 so the host can dial settings in while players are still joining.
pub fn max_mafia(player_count: usize) -> u32 {
    ((player_count / 2) as u32).max(3)
}

/// Validates and normalizes a player name: trimmed, non-empty.
pub fn player_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Validates and normalizes a hand-typed room code: trimmed, uppercased,
/// exactly [`ROOM_CODE_LEN`] characters.
pub fn room_code(raw: &str) -> Result<RoomCode, ValidationError> {
    let code = raw.trim().to_uppercase();
    if code.chars().count() != ROOM_CODE_LEN {
        return Err(ValidationError::BadRoomCode {
            got: code.chars().count(),
        });
    }
    Ok(RoomCode(code))
}

/// Checks the start-game preconditions: enough players, and the configured
/// roles fit in the roster.
pub fn can_start(
    player_count: usize,
    settings: &Settings,
) -> Result<(), ValidationError> {
    if player_count < MIN_PLAYERS {
        return Err(ValidationError::NotEnoughPlayers {
            have: player_count,
            min: MIN_PLAYERS,
        });
    }
    let required = settings.required_roles();
    if required as usize > player_count {
        return Err(ValidationError::TooManyRoles {
            required,
            players: player_count,
        });
    }
    Ok(())
}

/// Checks a requested mafia count against the allowed band
/// `[MIN_MAFIA, max_mafia(player_count)]`.
pub fn mafia_count(
    requested: u32,
    player_count: usize,
) -> Result<(), ValidationError> {
    let max = max_mafia(player_count);
    if requested < MIN_MAFIA || requested > max {
        return Err(ValidationError::MafiaCountOutOfRange {
            requested,
            min: MIN_MAFIA,
            max,
        });
    }
    Ok(())
}

/// Rejects host-only commands from non-hosts.
pub fn host_only(
    is_host: bool,
    command: &'static str,
) -> Result<(), ValidationError> {
    if !is_host {
        return Err(ValidationError::HostOnly(command));
    }
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // player_name
    // =====================================================================

    #[test]
    fn test_player_name_trims_whitespace() {
        assert_eq!(player_name("  Alice  ").unwrap(), "Alice");
    }

    #[test]
    fn test_player_name_empty_rejected() {
        assert_eq!(player_name("").unwrap_err(), ValidationError::EmptyName);
        assert_eq!(player_name("   ").unwrap_err(), ValidationError::EmptyName);
    }

    // =====================================================================
    // room_code
    // =====================================================================

    #[test]
    fn test_room_code_uppercases_input() {
        assert_eq!(room_code("abcd").unwrap().as_str(), "ABCD");
        assert_eq!(room_code(" wxyz ").unwrap().as_str(), "WXYZ");
    }

    #[test]
    fn test_room_code_wrong_length_rejected() {
        assert!(matches!(
            room_code("ABC").unwrap_err(),
            ValidationError::BadRoomCode { got: 3 }
        ));
        assert!(matches!(
            room_code("ABCDE").unwrap_err(),
            ValidationError::BadRoomCode { got: 5 }
        ));
        assert!(matches!(
            room_code("").unwrap_err(),
            ValidationError::BadRoomCode { got: 0 }
        ));
    }

    // =====================================================================
    // can_start
    // =====================================================================

    #[test]
    fn test_can_start_requires_three_players() {
        let settings = Settings {
            mafia_count: 1,
            include_doctor: false,
            include_detective: false,
        };
        assert!(matches!(
            can_start(2, &settings).unwrap_err(),
            ValidationError::NotEnoughPlayers { have: 2, min: 3 }
        ));
        assert!(can_start(3, &settings).is_ok());
    }

    #[test]
    fn test_can_start_rejects_role_overflow() {
        // 2 mafia + doctor + detective = 4 roles > 3 players.
        let settings = Settings {
            mafia_count: 2,
            include_doctor: true,
            include_detective: true,
        };
        assert!(matches!(
            can_start(3, &settings).unwrap_err(),
            ValidationError::TooManyRoles {
                required: 4,
                players: 3
            }
        ));
        assert!(can_start(4, &settings).is_ok());
    }

    // =====================================================================
    // mafia_count
    // =====================================================================

    #[test]
    fn test_mafia_count_lower_bound() {
        assert!(mafia_count(0, 6).is_err());
        assert!(mafia_count(1, 6).is_ok());
    }

    #[test]
    fn test_mafia_count_upper_bound_is_half_roster() {
        // 8 players → up to 4 mafia.
        assert!(mafia_count(4, 8).is_ok());
        assert!(mafia_count(5, 8).is_err());
    }

    #[test]
    fn test_mafia_count_small_lobby_floor_is_three() {
        // 4 players → floor(4/2) = 2, but the band extends to 3.
        assert_eq!(max_mafia(4), 3);
        assert!(mafia_count(3, 4).is_ok());
        assert!(mafia_count(4, 4).is_err());
    }

    // =====================================================================
    // host_only
    // =====================================================================

    #[test]
    fn test_host_only_rejects_guests() {
        assert!(host_only(true, "start the game").is_ok());
        assert_eq!(
            host_only(false, "start the game").unwrap_err(),
            ValidationError::HostOnly("start the game")
        );
    }
}
