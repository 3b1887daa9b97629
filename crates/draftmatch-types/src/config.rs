//! Configuration types for Draftmatch lobbies.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{DraftmatchError, MapId, MatchMode, Result, constants};

/// Who may act next during picks and bans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPolicy {
    /// Either captain may act at any time.
    #[default]
    Free,
    /// Captains alternate, `captains[0]` first, separately for picks and bans.
    Alternating,
}

/// Configuration for one lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    /// Match size; also the queue threshold.
    pub mode: MatchMode,
    /// Candidate maps for every draft, in display order.
    pub maps: Vec<MapId>,
    /// Pick/ban turn discipline.
    pub turn_policy: TurnPolicy,
    /// Rating for identities a directory built from this config does not
    /// know. A caller-supplied directory keeps its own baseline.
    pub rating_baseline: u32,
    /// Maximum identities the queue may hold.
    pub max_pending: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Squad,
            maps: constants::DEFAULT_MAPS.iter().map(|m| MapId::from(*m)).collect(),
            turn_policy: TurnPolicy::Free,
            rating_baseline: constants::DEFAULT_RATING,
            max_pending: constants::DEFAULT_MAX_PENDING,
        }
    }
}

impl LobbyConfig {
    /// Default squad lobby.
    #[must_use]
    pub fn squad() -> Self {
        Self::default()
    }

    /// Default duel lobby.
    #[must_use]
    pub fn duel() -> Self {
        Self {
            mode: MatchMode::Duel,
            ..Self::default()
        }
    }

    /// Queue size that triggers formation.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.mode.player_count()
    }

    /// Check the values a draft depends on.
    ///
    /// # Errors
    /// Returns `Configuration` for fewer than two maps, duplicate maps, or a
    /// queue cap below the threshold.
    pub fn validate(&self) -> Result<()> {
        if self.maps.len() < 2 {
            return Err(DraftmatchError::Configuration(format!(
                "at least 2 maps required, got {}",
                self.maps.len()
            )));
        }
        let mut seen = HashSet::with_capacity(self.maps.len());
        for map in &self.maps {
            if !seen.insert(map) {
                return Err(DraftmatchError::Configuration(format!(
                    "duplicate map: {map}"
                )));
            }
        }
        if self.max_pending < self.threshold() {
            return Err(DraftmatchError::Configuration(format!(
                "max_pending {} is below the {} threshold of {}",
                self.max_pending,
                self.mode,
                self.threshold()
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| DraftmatchError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
