//! Fair random role distribution.
//!
//! Called exactly once per game instance, when the host starts the game.
//! The algorithm builds a role multiset the size of the roster, shuffles
//! it uniformly, and deals it over a stable player order — so every
//! permutation of roles-to-players is equally likely, independent of who
//! joined when.

use std::collections::BTreeMap;

use nightfall_protocol::{PlayerId, RoleId, Settings};
use rand::seq::SliceRandom;
use rand::Rng;

/// Assigns a role to every player in `players`.
///
/// The multiset is constructed in order: `mafia_count` mafia (capped at
/// the roster size), one doctor if enabled and a slot remains, one
/// detective if enabled and a slot remains, civilians for the rest.
/// Doctor and detective are silently dropped when mafia already consumed
/// every slot — a deliberate degrade-gracefully policy, not an error.
///
/// `players` must be in a stable order (callers pass the record's sorted
/// key order); the shuffle supplies all the randomness, so the order only
/// needs to be consistent, not secret.
///
/// The result is a total map: every input player appears exactly once,
/// and no role appears that was not in the constructed multiset.
pub fn distribute<R: Rng + ?Sized>(
    players: &[PlayerId],
    settings: &Settings,
    rng: &mut R,
) -> BTreeMap<PlayerId, RoleId> {
    let total = players.len();
    let mut roles = Vec::with_capacity(total);

    let mafia = (settings.mafia_count as usize).min(total);
    roles.resize(mafia, RoleId::Mafia);

    if settings.include_doctor && roles.len() < total {
        roles.push(RoleId::Doctor);
    }
    if settings.include_detective && roles.len() < total {
        roles.push(RoleId::Detective);
    }
    roles.resize(total, RoleId::Civilian);

    roles.shuffle(rng);

    players.iter().cloned().zip(roles).collect()
}

// ---------------------------------------------------------------------------
// RolePlan
// ---------------------------------------------------------------------------

/// The role breakdown previewed in the host's lobby.
///
/// This is the *configured* plan, not the dealt multiset: the mafia count
/// is shown as-is even while it still exceeds the roster, and civilians
/// are clamped at zero. The host uses it to sanity-check settings before
/// pressing start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePlan {
    pub mafia: u32,
    pub civilians: u32,
    pub doctor: bool,
    pub detective: bool,
}

/// Computes the lobby preview for the current roster and settings.
pub fn role_plan(player_count: usize, settings: &Settings) -> RolePlan {
    let reserved = settings.mafia_count + settings.special_count();
    let civilians = (player_count as u32).saturating_sub(reserved);
    RolePlan {
        mafia: settings.mafia_count,
        civilians,
        doctor: settings.include_doctor,
        detective: settings.include_detective,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pid(n: usize) -> PlayerId {
        PlayerId(format!("player_{n}_abcdefghi"))
    }

    fn roster(n: usize) -> Vec<PlayerId> {
        (0..n).map(pid).collect()
    }

    fn count(assignment: &BTreeMap<PlayerId, RoleId>, role: RoleId) -> usize {
        assignment.values().filter(|r| **r == role).count()
    }

    fn settings(mafia: u32, doctor: bool, detective: bool) -> Settings {
        Settings {
            mafia_count: mafia,
            include_doctor: doctor,
            include_detective: detective,
        }
    }

    #[test]
    fn test_distribute_covers_every_player_exactly_once() {
        let players = roster(6);
        let mut rng = StdRng::seed_from_u64(7);

        let assignment = distribute(&players, &settings(2, true, true), &mut rng);

        assert_eq!(assignment.len(), 6);
        for player in &players {
            assert!(assignment.contains_key(player));
        }
    }

    #[test]
    fn test_distribute_five_players_full_multiset() {
        // 5 players, 2 mafia, both specials → {mafia, mafia, doctor,
        // detective, civilian}.
        let players = roster(5);
        let mut rng = StdRng::seed_from_u64(42);

        let assignment = distribute(&players, &settings(2, true, true), &mut rng);

        assert_eq!(count(&assignment, RoleId::Mafia), 2);
        assert_eq!(count(&assignment, RoleId::Doctor), 1);
        assert_eq!(count(&assignment, RoleId::Detective), 1);
        assert_eq!(count(&assignment, RoleId::Civilian), 1);
    }

    #[test]
    fn test_distribute_three_players_one_mafia_one_doctor() {
        let players = roster(3);
        let mut rng = StdRng::seed_from_u64(1);

        let assignment = distribute(&players, &settings(1, true, false), &mut rng);

        assert_eq!(count(&assignment, RoleId::Mafia), 1);
        assert_eq!(count(&assignment, RoleId::Doctor), 1);
        assert_eq!(count(&assignment, RoleId::Civilian), 1);
        assert_eq!(count(&assignment, RoleId::Detective), 0);
    }

    #[test]
    fn test_distribute_drops_specials_when_mafia_fills_room() {
        // 3 players, 3 mafia: doctor and detective are enabled but there
        // is no capacity left. They are dropped silently.
        let players = roster(3);
        let mut rng = StdRng::seed_from_u64(5);

        let assignment = distribute(&players, &settings(3, true, true), &mut rng);

        assert_eq!(count(&assignment, RoleId::Mafia), 3);
        assert_eq!(count(&assignment, RoleId::Doctor), 0);
        assert_eq!(count(&assignment, RoleId::Detective), 0);
    }

    #[test]
    fn test_distribute_drops_detective_when_one_slot_remains() {
        // 2 slots after mafia: doctor takes the first, detective is out.
        let players = roster(4);
        let mut rng = StdRng::seed_from_u64(5);

        let assignment = distribute(&players, &settings(3, true, true), &mut rng);

        assert_eq!(count(&assignment, RoleId::Mafia), 3);
        assert_eq!(count(&assignment, RoleId::Doctor), 1);
        assert_eq!(count(&assignment, RoleId::Detective), 0);
    }

    #[test]
    fn test_distribute_caps_mafia_at_roster_size() {
        let players = roster(2);
        let mut rng = StdRng::seed_from_u64(9);

        let assignment = distribute(&players, &settings(5, false, false), &mut rng);

        assert_eq!(assignment.len(), 2);
        assert_eq!(count(&assignment, RoleId::Mafia), 2);
    }

    #[test]
    fn test_distribute_fairness_each_player_equally_likely_mafia() {
        // 4 players, 1 mafia → every player should draw mafia about a
        // quarter of the time. Seeded rng keeps this deterministic.
        let players = roster(4);
        let mut rng = StdRng::seed_from_u64(1234);
        let trials = 4000;

        let mut mafia_draws = BTreeMap::new();
        for _ in 0..trials {
            let assignment =
                distribute(&players, &settings(1, false, false), &mut rng);
            for (player, role) in &assignment {
                if *role == RoleId::Mafia {
                    *mafia_draws.entry(player.clone()).or_insert(0u32) += 1;
                }
            }
        }

        let expected = trials / 4;
        for (player, draws) in &mafia_draws {
            let deviation = (*draws as i64 - expected as i64).abs();
            assert!(
                deviation < (expected / 5) as i64,
                "player {player} drew mafia {draws} times, expected ~{expected}"
            );
        }
    }

    // =====================================================================
    // role_plan
    // =====================================================================

    #[test]
    fn test_role_plan_counts_remaining_civilians() {
        let plan = role_plan(7, &settings(2, true, true));
        assert_eq!(plan.mafia, 2);
        assert_eq!(plan.civilians, 3);
        assert!(plan.doctor);
        assert!(plan.detective);
    }

    #[test]
    fn test_role_plan_clamps_civilians_at_zero() {
        // Settings transiently exceed the roster while players are still
        // joining; the preview just shows zero civilians.
        let plan = role_plan(2, &settings(3, true, false));
        assert_eq!(plan.civilians, 0);
    }
}
