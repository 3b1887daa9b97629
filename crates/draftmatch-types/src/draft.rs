//! Draft model: match modes, phases, and the in-flight `DraftState`.
//!
//! A draft runs two phases in order:
//! **PICKING → VETO**
//!
//! During PICKING, captains move players from the pool onto their teams.
//! During VETO, captains ban maps until exactly one remains; that map
//! becomes `final_map` and the draft is COMPLETE. Duel mode has no pool and
//! starts directly in VETO.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Identity, MapId, MatchId, RatedPlayer, constants};

/// The fixed set of supported match sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Two captains, no pool: straight to the map veto.
    Duel,
    /// Ten players: two captains draft the remaining eight.
    Squad,
}

impl MatchMode {
    /// Queue size at which a batch forms, and the exact size of that batch.
    #[must_use]
    pub fn player_count(self) -> usize {
        match self {
            Self::Duel => constants::DUEL_PLAYERS,
            Self::Squad => constants::SQUAD_PLAYERS,
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duel => write!(f, "DUEL"),
            Self::Squad => write!(f, "SQUAD"),
        }
    }
}

/// Where a draft currently stands. Derived from the state, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPhase {
    /// Pool non-empty; only picks are accepted.
    Picking,
    /// Pool empty, more than one map unbanned; only bans are accepted.
    Veto,
    /// Exactly one map left; `final_map` is set.
    Complete,
}

impl fmt::Display for DraftPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Picking => write!(f, "PICKING"),
            Self::Veto => write!(f, "VETO"),
            Self::Complete => write!(f, "COMPLETE"),
        }
    }
}

/// One of the two teams, identified by its captain's seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Led by `captains[0]`.
    Team1,
    /// Led by `captains[1]`.
    Team2,
}

impl Side {
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Team1 => 0,
            Self::Team2 => 1,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Self {
        if index % 2 == 0 { Self::Team1 } else { Self::Team2 }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Team1 => write!(f, "team1"),
            Self::Team2 => write!(f, "team2"),
        }
    }
}

// ---------------------------------------------------------------------------
// DraftState
// ---------------------------------------------------------------------------

/// The single in-flight draft of a lobby.
///
/// Invariants upheld by every accepted transition:
/// - every player is in exactly one of `pool`, `team1`, `team2`
/// - `banned_maps` is a duplicate-free subset of `candidate_maps` that only grows
/// - `final_map` is set iff exactly one candidate remains unbanned, and is that map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftState {
    /// Identifier of this match.
    pub match_id: MatchId,
    /// Match size.
    pub mode: MatchMode,
    /// The two highest-rated entrants, seated as `team1[0]` and `team2[0]`.
    pub captains: [RatedPlayer; 2],
    /// Team led by `captains[0]`, in pick order.
    pub team1: Vec<RatedPlayer>,
    /// Team led by `captains[1]`, in pick order.
    pub team2: Vec<RatedPlayer>,
    /// Players not yet picked, in descending rating order.
    pub pool: Vec<RatedPlayer>,
    /// Maps on the table at draft start.
    pub candidate_maps: Vec<MapId>,
    /// Maps removed by veto, in ban order.
    pub banned_maps: Vec<MapId>,
    /// The surviving map, once the veto converges.
    pub final_map: Option<MapId>,
    /// When the batch was formed.
    pub formed_at: DateTime<Utc>,
}

impl DraftState {
    /// Seat two captains and lay out the pool and map table.
    ///
    /// Callers are responsible for passing at least two distinct maps; with a
    /// single map the state is born complete.
    #[must_use]
    pub fn new(
        match_id: MatchId,
        mode: MatchMode,
        captains: [RatedPlayer; 2],
        pool: Vec<RatedPlayer>,
        candidate_maps: Vec<MapId>,
    ) -> Self {
        let team1 = vec![captains[0].clone()];
        let team2 = vec![captains[1].clone()];
        let final_map = match candidate_maps.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        };
        Self {
            match_id,
            mode,
            captains,
            team1,
            team2,
            pool,
            candidate_maps,
            banned_maps: Vec::new(),
            final_map,
            formed_at: Utc::now(),
        }
    }

    /// Current phase, derived from pool and veto progress.
    #[must_use]
    pub fn phase(&self) -> DraftPhase {
        if !self.pool.is_empty() {
            DraftPhase::Picking
        } else if self.final_map.is_none() {
            DraftPhase::Veto
        } else {
            DraftPhase::Complete
        }
    }

    /// Which side `identity` captains, if any.
    #[must_use]
    pub fn captain_side(&self, identity: &Identity) -> Option<Side> {
        self.captains
            .iter()
            .position(|c| &c.identity == identity)
            .map(Side::from_index)
    }

    #[must_use]
    pub fn captain(&self, side: Side) -> &RatedPlayer {
        &self.captains[side.index()]
    }

    #[must_use]
    pub fn team(&self, side: Side) -> &[RatedPlayer] {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    #[must_use]
    pub fn pool_position(&self, identity: &Identity) -> Option<usize> {
        self.pool.iter().position(|p| &p.identity == identity)
    }

    /// Whether `identity` takes part in this draft (pool or either team).
    #[must_use]
    pub fn involves(&self, identity: &Identity) -> bool {
        self.players().any(|p| &p.identity == identity)
    }

    /// Every player in the draft: team1, team2, then pool.
    pub fn players(&self) -> impl Iterator<Item = &RatedPlayer> {
        self.team1.iter().chain(&self.team2).chain(&self.pool)
    }

    /// Number of picks accepted so far (captains are seated, not picked).
    #[must_use]
    pub fn picks_made(&self) -> usize {
        (self.team1.len() + self.team2.len()).saturating_sub(2)
    }

    #[must_use]
    pub fn is_banned(&self, map: &MapId) -> bool {
        self.banned_maps.contains(map)
    }

    /// Candidate maps not yet banned, in candidate order.
    pub fn remaining_maps(&self) -> impl Iterator<Item = &MapId> {
        self.candidate_maps.iter().filter(|m| !self.is_banned(m))
    }

    /// SHA-256 over the order-sensitive content of the draft.
    ///
    /// Two states with the same digest have the same teams, pool, bans and
    /// final map in the same order.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"draftmatch:draft:v1:");
        hasher.update(self.match_id.0.as_bytes());
        hasher.update(self.mode.to_string().as_bytes());
        for section in [&self.team1, &self.team2, &self.pool] {
            hasher.update((section.len() as u64).to_le_bytes());
            for player in section {
                hash_str(&mut hasher, player.identity.as_str());
                hasher.update(player.rating.to_le_bytes());
            }
        }
        for section in [&self.candidate_maps, &self.banned_maps] {
            hasher.update((section.len() as u64).to_le_bytes());
            for map in section {
                hash_str(&mut hasher, map.as_str());
            }
        }
        match &self.final_map {
            Some(map) => {
                hasher.update([1u8]);
                hash_str(&mut hasher, map.as_str());
            }
            None => hasher.update([0u8]),
        }

        let result = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        digest
    }

    /// Hex form of [`DraftState::digest`], for logs.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}

/// Length-prefixed so `("ab", "c")` and `("a", "bc")` hash differently.
fn hash_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-helpers"))]
impl DraftState {
    /// The stock map pool as `MapId`s.
    pub fn default_maps() -> Vec<MapId> {
        constants::DEFAULT_MAPS.iter().map(|m| MapId::from(*m)).collect()
    }

    /// alice (1200) vs bob (1000), stock maps, veto phase.
    pub fn dummy_duel() -> Self {
        Self::new(
            MatchId::from_bytes([7; 16]),
            MatchMode::Duel,
            [
                RatedPlayer::dummy("alice", 1200),
                RatedPlayer::dummy("bob", 1000),
            ],
            Vec::new(),
            Self::default_maps(),
        )
    }

    /// `p0`..`p9` rated 1500 down to 600; `p0`/`p1` captain, stock maps.
    pub fn dummy_squad() -> Self {
        let players: Vec<RatedPlayer> = (0..10u32)
            .map(|i| RatedPlayer::dummy(&format!("p{i}"), 1500 - i * 100))
            .collect();
        Self::new(
            MatchId::from_bytes([9; 16]),
            MatchMode::Squad,
            [players[0].clone(), players[1].clone()],
            players[2..].to_vec(),
            Self::default_maps(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_player_counts() {
        assert_eq!(MatchMode::Duel.player_count(), 2);
        assert_eq!(MatchMode::Squad.player_count(), 10);
    }

    #[test]
    fn captains_are_seated() {
        let state = DraftState::dummy_squad();
        assert_eq!(state.team1, vec![state.captains[0].clone()]);
        assert_eq!(state.team2, vec![state.captains[1].clone()]);
        assert_eq!(state.pool.len(), 8);
        assert_eq!(state.players().count(), 10);
        assert_eq!(state.picks_made(), 0);
    }

    #[test]
    fn phase_follows_progress() {
        assert_eq!(DraftState::dummy_squad().phase(), DraftPhase::Picking);
        let mut duel = DraftState::dummy_duel();
        assert_eq!(duel.phase(), DraftPhase::Veto);
        duel.final_map = Some(MapId::from("Dune"));
        assert_eq!(duel.phase(), DraftPhase::Complete);
    }

    #[test]
    fn single_map_is_born_complete() {
        let state = DraftState::new(
            MatchId::new(),
            MatchMode::Duel,
            [RatedPlayer::dummy("a", 1), RatedPlayer::dummy("b", 0)],
            Vec::new(),
            vec![MapId::from("Dune")],
        );
        assert_eq!(state.final_map, Some(MapId::from("Dune")));
        assert_eq!(state.phase(), DraftPhase::Complete);
    }

    #[test]
    fn captain_side_lookup() {
        let state = DraftState::dummy_duel();
        assert_eq!(state.captain_side(&Identity::from("alice")), Some(Side::Team1));
        assert_eq!(state.captain_side(&Identity::from("bob")), Some(Side::Team2));
        assert_eq!(state.captain_side(&Identity::from("carol")), None);
        assert_eq!(state.captain(Side::Team2).identity.as_str(), "bob");
        assert_eq!(state.team(Side::Team1), &[state.captains[0].clone()]);
    }

    #[test]
    fn remaining_maps_skip_banned() {
        let mut state = DraftState::dummy_duel();
        state.banned_maps.push(MapId::from("Rust"));
        let remaining: Vec<&str> = state.remaining_maps().map(MapId::as_str).collect();
        assert_eq!(remaining.len(), 6);
        assert!(!remaining.contains(&"Rust"));
    }

    #[test]
    fn digest_is_deterministic_and_order_sensitive() {
        let a = DraftState::dummy_squad();
        let b = a.clone();
        assert_eq!(a.digest(), b.digest());

        let mut c = a.clone();
        c.pool.swap(0, 1);
        assert_ne!(a.digest(), c.digest(), "pool order must affect digest");
    }

    #[test]
    fn draft_state_serde_roundtrip() {
        let state = DraftState::dummy_squad();
        let json = serde_json::to_string(&state).unwrap();
        let back: DraftState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }

    #[test]
    fn phase_display() {
        assert_eq!(DraftPhase::Picking.to_string(), "PICKING");
        assert_eq!(DraftPhase::Veto.to_string(), "VETO");
        assert_eq!(MatchMode::Squad.to_string(), "SQUAD");
    }
}
