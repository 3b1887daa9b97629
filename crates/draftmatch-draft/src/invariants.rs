//! Structural checks on a `DraftState`.
//!
//! The state machine runs these on every draft it is handed and, in debug
//! builds, after every accepted transition.

use std::collections::HashSet;

use draftmatch_types::{DraftState, DraftmatchError, Result};

/// Verify player placement, veto bookkeeping and final-map convergence.
///
/// # Errors
/// Returns `Internal` naming the first violated rule.
pub fn check_invariants(draft: &DraftState) -> Result<()> {
    // Every player sits in exactly one of pool / team1 / team2.
    let mut seen = HashSet::new();
    for player in draft.players() {
        if !seen.insert(&player.identity) {
            return Err(violation(format!(
                "player {} placed more than once",
                player.identity
            )));
        }
    }
    if seen.len() != draft.mode.player_count() {
        return Err(violation(format!(
            "{} players placed, {} expected",
            seen.len(),
            draft.mode.player_count()
        )));
    }
    if draft.captains[0].identity == draft.captains[1].identity {
        return Err(violation("both captain seats hold the same player".to_string()));
    }
    if draft.team1.first() != Some(&draft.captains[0])
        || draft.team2.first() != Some(&draft.captains[1])
    {
        return Err(violation("captains are not at the head of their teams".to_string()));
    }

    // Bans are a duplicate-free subset of the candidates.
    let mut banned = HashSet::new();
    for map in &draft.banned_maps {
        if !draft.candidate_maps.contains(map) {
            return Err(violation(format!("banned map {map} is not a candidate")));
        }
        if !banned.insert(map) {
            return Err(violation(format!("map {map} banned twice")));
        }
    }

    // final_map is set iff exactly one candidate survives, and is that one.
    let mut remaining = draft.remaining_maps();
    let survivor = match (remaining.next(), remaining.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    };
    if draft.final_map.as_ref() != survivor {
        return Err(violation(format!(
            "final map {:?} does not match surviving map {:?}",
            draft.final_map, survivor
        )));
    }

    Ok(())
}

fn violation(reason: String) -> DraftmatchError {
    DraftmatchError::Internal(format!("draft invariant violated: {reason}"))
}

#[cfg(test)]
mod tests {
    use draftmatch_types::{MapId, RatedPlayer};

    use super::*;

    #[test]
    fn fresh_drafts_pass() {
        assert!(check_invariants(&DraftState::dummy_duel()).is_ok());
        assert!(check_invariants(&DraftState::dummy_squad()).is_ok());
    }

    #[test]
    fn duplicated_player_fails() {
        let mut draft = DraftState::dummy_squad();
        let dup = draft.pool[0].clone();
        draft.team1.push(dup);
        let err = check_invariants(&draft).unwrap_err();
        assert!(err.to_string().contains("more than once"), "{err}");
    }

    #[test]
    fn lost_player_fails() {
        let mut draft = DraftState::dummy_squad();
        draft.pool.pop();
        assert!(check_invariants(&draft).is_err());
    }

    #[test]
    fn foreign_ban_fails() {
        let mut draft = DraftState::dummy_duel();
        draft.banned_maps.push(MapId::from("Atlantis"));
        assert!(check_invariants(&draft).is_err());
    }

    #[test]
    fn double_ban_fails() {
        let mut draft = DraftState::dummy_duel();
        draft.banned_maps.push(MapId::from("Dune"));
        draft.banned_maps.push(MapId::from("Dune"));
        let err = check_invariants(&draft).unwrap_err();
        assert!(err.to_string().contains("banned twice"));
    }

    #[test]
    fn premature_final_map_fails() {
        let mut draft = DraftState::dummy_duel();
        draft.final_map = Some(MapId::from("Dune"));
        assert!(check_invariants(&draft).is_err());
    }

    #[test]
    fn missing_final_map_fails() {
        let mut draft = DraftState::dummy_duel();
        let all: Vec<MapId> = draft.candidate_maps.clone();
        draft.banned_maps = all[1..].to_vec();
        assert!(check_invariants(&draft).is_err());
        draft.final_map = Some(all[0].clone());
        assert!(check_invariants(&draft).is_ok());
    }

    #[test]
    fn captain_off_team_head_fails() {
        let mut draft = DraftState::dummy_duel();
        draft.team1[0] = RatedPlayer::dummy("impostor", 1200);
        assert!(check_invariants(&draft).is_err());
    }
}
