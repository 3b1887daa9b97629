//! Read-only rating lookup.
//!
//! The directory itself lives outside the core (a database, a ranking
//! service). Formation only needs a total function from identity to rating,
//! so unknown identities resolve to a baseline instead of failing.

use std::collections::HashMap;

use draftmatch_types::{Identity, constants};

/// Total rating lookup consumed by Match Formation.
pub trait RatingDirectory: Send + Sync {
    /// Rating of `identity`, or the directory's baseline if it has none.
    fn rating_of(&self, identity: &Identity) -> u32;
}

/// A rating directory backed by a `HashMap`.
pub struct InMemoryRatings {
    ratings: HashMap<Identity, u32>,
    baseline: u32,
}

impl InMemoryRatings {
    /// Empty directory: everyone resolves to `baseline`.
    #[must_use]
    pub fn new(baseline: u32) -> Self {
        Self {
            ratings: HashMap::new(),
            baseline,
        }
    }

    /// Set or overwrite a rating.
    pub fn insert(&mut self, identity: Identity, rating: u32) {
        self.ratings.insert(identity, rating);
    }

    #[must_use]
    pub fn baseline(&self) -> u32 {
        self.baseline
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

impl Default for InMemoryRatings {
    fn default() -> Self {
        Self::new(constants::DEFAULT_RATING)
    }
}

impl FromIterator<(Identity, u32)> for InMemoryRatings {
    fn from_iter<I: IntoIterator<Item = (Identity, u32)>>(iter: I) -> Self {
        let mut directory = Self::default();
        directory.ratings.extend(iter);
        directory
    }
}

impl RatingDirectory for InMemoryRatings {
    fn rating_of(&self, identity: &Identity) -> u32 {
        self.ratings.get(identity).copied().unwrap_or(self.baseline)
    }
}
