//! Turn discipline for picks and bans.
//!
//! Under [`TurnPolicy::Free`] nobody is ever "due". Under
//! [`TurnPolicy::Alternating`] the seat that must act next follows from the
//! state alone: picks and bans each start with `captains[0]` and alternate.

use draftmatch_types::{DraftState, DraftmatchError, Identity, Result, Side, TurnPolicy};

/// The side due to pick next, or `None` if either may.
#[must_use]
pub fn expected_picker(policy: TurnPolicy, draft: &DraftState) -> Option<Side> {
    match policy {
        TurnPolicy::Free => None,
        TurnPolicy::Alternating => Some(Side::from_index(draft.picks_made())),
    }
}

/// The side due to ban next, or `None` if either may.
#[must_use]
pub fn expected_banner(policy: TurnPolicy, draft: &DraftState) -> Option<Side> {
    match policy {
        TurnPolicy::Free => None,
        TurnPolicy::Alternating => Some(Side::from_index(draft.banned_maps.len())),
    }
}

pub(crate) fn ensure_turn(expected: Option<Side>, acting: Side, captain: &Identity) -> Result<()> {
    match expected {
        Some(due) if due != acting => Err(DraftmatchError::NotYourTurn(captain.clone())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use draftmatch_types::MapId;

    use super::*;

    #[test]
    fn free_policy_never_constrains() {
        let draft = DraftState::dummy_squad();
        assert_eq!(expected_picker(TurnPolicy::Free, &draft), None);
        assert_eq!(expected_banner(TurnPolicy::Free, &draft), None);
        assert!(ensure_turn(None, Side::Team2, &Identity::from("p1")).is_ok());
    }

    #[test]
    fn alternating_picks_follow_pick_count() {
        let mut draft = DraftState::dummy_squad();
        assert_eq!(
            expected_picker(TurnPolicy::Alternating, &draft),
            Some(Side::Team1)
        );
        let picked = draft.pool.remove(0);
        draft.team1.push(picked);
        assert_eq!(
            expected_picker(TurnPolicy::Alternating, &draft),
            Some(Side::Team2)
        );
    }

    #[test]
    fn alternating_bans_follow_ban_count() {
        let mut draft = DraftState::dummy_duel();
        assert_eq!(
            expected_banner(TurnPolicy::Alternating, &draft),
            Some(Side::Team1)
        );
        draft.banned_maps.push(MapId::from("Dune"));
        assert_eq!(
            expected_banner(TurnPolicy::Alternating, &draft),
            Some(Side::Team2)
        );
    }

    #[test]
    fn out_of_turn_is_rejected() {
        let err = ensure_turn(Some(Side::Team1), Side::Team2, &Identity::from("bob")).unwrap_err();
        assert_eq!(err, DraftmatchError::NotYourTurn(Identity::from("bob")));
    }
}
