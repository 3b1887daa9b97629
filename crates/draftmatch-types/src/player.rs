//! Rated participants and display skill levels.

use serde::{Deserialize, Serialize};

use crate::{Identity, constants};

/// A participant together with the rating snapshot taken at formation time.
///
/// The snapshot is never refreshed during a draft, so captain seeding stays
/// stable even if the rating directory changes underneath.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatedPlayer {
    /// Who the player is.
    pub identity: Identity,
    /// Rating at formation time.
    pub rating: u32,
    /// Display level (1-10) derived from `rating`.
    pub level: u8,
}

impl RatedPlayer {
    #[must_use]
    pub fn new(identity: Identity, rating: u32) -> Self {
        Self {
            identity,
            rating,
            level: skill_level(rating),
        }
    }
}

/// Map a rating onto the 1-10 display level shown next to player names.
#[must_use]
pub fn skill_level(rating: u32) -> u8 {
    let below = constants::SKILL_LEVEL_BOUNDS
        .iter()
        .take_while(|bound| rating >= **bound)
        .count();
    // At most 9 bounds, so this always fits.
    u8::try_from(below + 1).unwrap_or(10)
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-helpers"))]
impl RatedPlayer {
    pub fn dummy(name: &str, rating: u32) -> Self {
        Self::new(Identity::from(name), rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_thresholds() {
        assert_eq!(skill_level(0), 1);
        assert_eq!(skill_level(1000), 1);
        assert_eq!(skill_level(1149), 1);
        assert_eq!(skill_level(1150), 2);
        assert_eq!(skill_level(1499), 3);
        assert_eq!(skill_level(1500), 4);
        assert_eq!(skill_level(2199), 6);
        assert_eq!(skill_level(2999), 9);
        assert_eq!(skill_level(3000), 10);
        assert_eq!(skill_level(u32::MAX), 10);
    }

    #[test]
    fn new_derives_level() {
        let p = RatedPlayer::dummy("alice", 1720);
        assert_eq!(p.level, 5);
        assert_eq!(p.identity.as_str(), "alice");
    }
}
