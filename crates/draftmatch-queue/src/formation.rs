//! Match formation: turns a drained batch into a seeded `DraftState`.
//!
//! 1. Snapshot each identity's rating (the directory is never consulted again
//!    for this draft)
//! 2. Top up short batches through the fill policy
//! 3. Stable-sort by rating, descending; ties keep queue arrival order
//! 4. Seat the top two as captains; the rest form the pool

use std::collections::HashSet;

use draftmatch_types::{
    DraftState, DraftmatchError, Identity, LobbyConfig, MapId, MatchId, MatchMode, RatedPlayer,
    Result,
};

use crate::fill::{FillPolicy, NoFill};
use crate::rating::RatingDirectory;

/// Builds the initial draft for one lobby's mode and map pool.
pub struct MatchFormer {
    mode: MatchMode,
    maps: Vec<MapId>,
    fill: Box<dyn FillPolicy>,
}

impl MatchFormer {
    /// Former that never fills short batches.
    #[must_use]
    pub fn new(mode: MatchMode, maps: Vec<MapId>) -> Self {
        Self {
            mode,
            maps,
            fill: Box::new(NoFill),
        }
    }

    /// Former for a lobby config.
    ///
    /// Lobbies only ever hand over full batches, so this former never fills.
    #[must_use]
    pub fn from_config(config: &LobbyConfig) -> Self {
        Self::new(config.mode, config.maps.clone())
    }

    /// Replace the fill policy, for callers that form short batches.
    #[must_use]
    pub fn with_fill_policy(mut self, fill: Box<dyn FillPolicy>) -> Self {
        self.fill = fill;
        self
    }

    #[must_use]
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Form a draft under a fresh `MatchId`.
    ///
    /// # Errors
    /// - `InsufficientPlayers` if the batch is short even after filling
    /// - `BatchOverflow` if the batch has more distinct identities than the mode seats
    /// - `Configuration` if fewer than two maps are configured
    pub fn form(&self, batch: &[Identity], ratings: &dyn RatingDirectory) -> Result<DraftState> {
        self.form_as(MatchId::new(), batch, ratings)
    }

    /// Form a draft under a caller-chosen `MatchId`.
    ///
    /// Identical batches and ratings always yield identical drafts.
    pub fn form_as(
        &self,
        match_id: MatchId,
        batch: &[Identity],
        ratings: &dyn RatingDirectory,
    ) -> Result<DraftState> {
        if self.maps.len() < 2 {
            return Err(DraftmatchError::Configuration(format!(
                "at least 2 maps required, got {}",
                self.maps.len()
            )));
        }

        let needed = self.mode.player_count();

        // Snapshot ratings once, dropping repeated identities.
        let mut seen = HashSet::with_capacity(batch.len());
        let mut players: Vec<RatedPlayer> = batch
            .iter()
            .filter(|identity| seen.insert(*identity))
            .map(|identity| RatedPlayer::new(identity.clone(), ratings.rating_of(identity)))
            .collect();

        if players.len() > needed {
            return Err(DraftmatchError::BatchOverflow {
                mode: self.mode,
                capacity: needed,
                got: players.len(),
            });
        }
        if players.len() < needed {
            let missing = needed - players.len();
            self.fill.fill(&mut players, missing);
        }
        if players.len() != needed {
            return Err(DraftmatchError::InsufficientPlayers {
                mode: self.mode,
                needed,
                got: players.len(),
            });
        }

        // `sort_by` is stable: equal ratings keep arrival order.
        players.sort_by(|a, b| b.rating.cmp(&a.rating));

        let pool = players.split_off(2);
        let mut seeded = players.into_iter();
        let (Some(first), Some(second)) = (seeded.next(), seeded.next()) else {
            return Err(DraftmatchError::Internal(
                "fewer than two players after seeding".to_string(),
            ));
        };

        let state = DraftState::new(match_id, self.mode, [first, second], pool, self.maps.clone());

        tracing::info!(
            match_id = %state.match_id,
            mode = %state.mode,
            captain1 = %state.captains[0].identity,
            captain2 = %state.captains[1].identity,
            pool = state.pool.len(),
            digest = %state.digest_hex(),
            "Match formed"
        );

        Ok(state)
    }
}
