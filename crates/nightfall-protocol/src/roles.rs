//! The role catalog: a closed set of roles with static display metadata.
//!
//! Roles are a tagged enum, not string keys. Any [`RoleId`] the rest of
//! the system produces is guaranteed to have an entry in the catalog —
//! the lookup is an exhaustive `match`, so an "unknown role" is impossible
//! for internal values. Strings only appear at the store boundary, where
//! parsing an unrecognized one fails with a typed error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// RoleId
// ---------------------------------------------------------------------------

/// One of the four roles a player can be assigned.
///
/// Serialized lowercase on the wire (`"mafia"`, `"civilian"`, ...) to match
/// the persisted record format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RoleId {
    Mafia,
    Civilian,
    Doctor,
    Detective,
}

/// Which side a role wins with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Mafia,
    Town,
}

/// Static display metadata for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleInfo {
    /// Display name shown on the role card.
    pub name: &'static str,
    /// Team affiliation (mafia wins with mafia, everyone else with town).
    pub team: Team,
    /// Emoji shown on the card front.
    pub icon: &'static str,
    /// Flavor text explaining what the role does.
    pub description: &'static str,
    /// Style hook for the presentation layer.
    pub style_class: &'static str,
}

impl RoleId {
    /// Every role, in catalog order.
    pub const ALL: [RoleId; 4] =
        [RoleId::Mafia, RoleId::Civilian, RoleId::Doctor, RoleId::Detective];

    /// Looks up the static metadata for this role.
    ///
    /// Exhaustive over the closed enum — this cannot fail.
    pub fn info(self) -> &'static RoleInfo {
        match self {
            RoleId::Mafia => &RoleInfo {
                name: "Mafia",
                team: Team::Mafia,
                icon: "🔪",
                description: "Eliminate civilians at night. Work with your \
                              fellow mafia to take over the town.",
                style_class: "mafia",
            },
            RoleId::Civilian => &RoleInfo {
                name: "Civilian",
                team: Team::Town,
                icon: "👤",
                description: "Find and eliminate the mafia during the day. \
                              Stay alive and vote wisely!",
                style_class: "civilian",
            },
            RoleId::Doctor => &RoleInfo {
                name: "Doctor",
                team: Team::Town,
                icon: "💊",
                description: "Each night, choose one player to protect from \
                              the mafia. You can save lives!",
                style_class: "doctor",
            },
            RoleId::Detective => &RoleInfo {
                name: "Detective",
                team: Team::Town,
                icon: "🔍",
                description: "Each night, investigate one player to learn if \
                              they are mafia or innocent.",
                style_class: "detective",
            },
        }
    }

    /// Team affiliation, derived from the role.
    pub fn team(self) -> Team {
        self.info().team
    }

    /// The lowercase wire name of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            RoleId::Mafia => "mafia",
            RoleId::Civilian => "civilian",
            RoleId::Doctor => "doctor",
            RoleId::Detective => "detective",
        }
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mafia" => Ok(RoleId::Mafia),
            "civilian" => Ok(RoleId::Civilian),
            "doctor" => Ok(RoleId::Doctor),
            "detective" => Ok(RoleId::Detective),
            other => Err(ProtocolError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Mafia => write!(f, "Mafia"),
            Team::Town => write!(f, "Town"),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
