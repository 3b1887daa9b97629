//! Fill policies for short formation batches.
//!
//! Formation calls the policy only when a batch is below the mode's player
//! count. Tests keep the default [`NoFill`] so batches stay exactly as given.

use draftmatch_types::{Identity, RatedPlayer, constants};

/// Hook that may top up a short batch before captains are seeded.
pub trait FillPolicy: Send + Sync {
    /// Append up to `missing` players to `batch`.
    fn fill(&self, batch: &mut Vec<RatedPlayer>, missing: usize);
}

/// Leaves short batches short.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFill;

impl FillPolicy for NoFill {
    fn fill(&self, _batch: &mut Vec<RatedPlayer>, _missing: usize) {}
}

/// Tops up with synthetic `bot-<n>` players at a fixed rating.
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderFill {
    rating: u32,
}

impl PlaceholderFill {
    #[must_use]
    pub fn new(rating: u32) -> Self {
        Self { rating }
    }
}

impl Default for PlaceholderFill {
    fn default() -> Self {
        Self::new(constants::DEFAULT_PLACEHOLDER_RATING)
    }
}

impl FillPolicy for PlaceholderFill {
    fn fill(&self, batch: &mut Vec<RatedPlayer>, missing: usize) {
        let mut n = 0usize;
        let mut added = 0usize;
        while added < missing {
            n += 1;
            let identity = Identity::new(format!("{}{n}", constants::PLACEHOLDER_PREFIX));
            // Skip names a real player already holds.
            if batch.iter().any(|p| p.identity == identity) {
                continue;
            }
            batch.push(RatedPlayer::new(identity, self.rating));
            added += 1;
        }
    }
}
