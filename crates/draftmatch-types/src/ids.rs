//! Identifiers used throughout Draftmatch.
//!
//! Participant, lobby, and map handles are opaque strings supplied by the
//! outer layers. Match and connection identifiers are UUIDv7 so they sort by
//! creation time.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Opaque handle naming an authenticated participant.
///
/// Unique within one admission queue, but not across matches: a player may
/// rejoin a later queue once their match concludes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// LobbyId
// ---------------------------------------------------------------------------

/// Logical matchmaking context: one admission queue, at most one live draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LobbyId(pub String);

impl LobbyId {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LobbyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lobby:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MapId
// ---------------------------------------------------------------------------

/// Identifier of a playable map in the veto pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub String);

impl MapId {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MapId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ConnectionId
// ---------------------------------------------------------------------------

/// A single viewer connection. Rejections are replied to this handle only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MatchId
// ---------------------------------------------------------------------------

/// Identifier of one formed match, from draft start to finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MatchId(pub Uuid);

impl MatchId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_id_uniqueness() {
        let a = MatchId::new();
        let b = MatchId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn match_id_ordering() {
        let a = MatchId::new();
        let b = MatchId::new();
        assert!(a < b);
    }

    #[test]
    fn identity_display_is_raw_name() {
        assert_eq!(Identity::from("alice").to_string(), "alice");
        assert_eq!(LobbyId::from("eu-1").to_string(), "lobby:eu-1");
    }

    #[test]
    fn string_ids_serialize_transparently() {
        let json = serde_json::to_string(&Identity::from("bob")).unwrap();
        assert_eq!(json, "\"bob\"");
        let map: MapId = serde_json::from_str("\"Dune\"").unwrap();
        assert_eq!(map, MapId::from("Dune"));
    }
}
