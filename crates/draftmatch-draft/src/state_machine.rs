//! The draft/veto state machine.
//!
//! ```text
//! Idle ──start──▶ Drafting ──last ban──▶ Finalized ──reset──▶ Idle
//! ```
//!
//! Every action is checked in full against the current state before anything
//! is written. A rejected action returns its error and leaves the draft
//! exactly as it was, so replaying a stale action is always safe.

use draftmatch_types::{
    DraftPhase, DraftState, DraftmatchError, Identity, MapId, Result, Side, TurnPolicy,
};

use crate::invariants::check_invariants;
use crate::turn::{ensure_turn, expected_banner, expected_picker};

/// Where the machine stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineState {
    /// No draft; the lobby may form one.
    Idle,
    /// A draft is accepting picks and bans.
    Drafting(DraftState),
    /// The veto converged; waiting for the lobby to reset.
    Finalized(DraftState),
}

/// A captain action against the live draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftAction {
    Pick { captain: Identity, target: Identity },
    Ban { captain: Identity, map: MapId },
}

/// The result of an accepted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The draft moved on and is still live.
    Updated(DraftState),
    /// The last ban landed; `final_map` is set.
    Finalized(DraftState),
}

impl Transition {
    #[must_use]
    pub fn draft(&self) -> &DraftState {
        match self {
            Self::Updated(draft) | Self::Finalized(draft) => draft,
        }
    }
}

/// Owns at most one draft and arbitrates every change to it.
pub struct DraftMachine {
    state: MachineState,
    turn_policy: TurnPolicy,
}

impl DraftMachine {
    /// An idle machine.
    #[must_use]
    pub fn new(turn_policy: TurnPolicy) -> Self {
        Self {
            state: MachineState::Idle,
            turn_policy,
        }
    }

    #[must_use]
    pub fn state(&self) -> &MachineState {
        &self.state
    }

    #[must_use]
    pub fn turn_policy(&self) -> TurnPolicy {
        self.turn_policy
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, MachineState::Idle)
    }

    #[must_use]
    pub fn is_drafting(&self) -> bool {
        matches!(self.state, MachineState::Drafting(_))
    }

    /// The live or just-finalized draft.
    #[must_use]
    pub fn draft(&self) -> Option<&DraftState> {
        match &self.state {
            MachineState::Idle => None,
            MachineState::Drafting(draft) | MachineState::Finalized(draft) => Some(draft),
        }
    }

    /// Take ownership of a freshly formed draft.
    ///
    /// # Errors
    /// - `DraftInProgress` unless the machine is idle
    /// - `Internal` if the draft breaks a structural invariant
    pub fn start(&mut self, draft: DraftState) -> Result<()> {
        if !self.is_idle() {
            return Err(DraftmatchError::DraftInProgress);
        }
        check_invariants(&draft)?;
        tracing::debug!(
            match_id = %draft.match_id,
            phase = %draft.phase(),
            "Draft started"
        );
        self.state = if draft.phase() == DraftPhase::Complete {
            MachineState::Finalized(draft)
        } else {
            MachineState::Drafting(draft)
        };
        Ok(())
    }

    /// Dispatch a captain action.
    pub fn apply(&mut self, action: &DraftAction) -> Result<Transition> {
        match action {
            DraftAction::Pick { captain, target } => self.pick_player(captain, target),
            DraftAction::Ban { captain, map } => self.ban_map(captain, map),
        }
    }

    /// Move `target` from the pool onto `captain`'s team.
    ///
    /// # Errors
    /// - `NoActiveDraft` unless drafting
    /// - `NotACaptain` if `captain` holds neither captain seat
    /// - `WrongPhase` once the pool is empty
    /// - `NotYourTurn` under strict alternation
    /// - `PlayerNotInPool` if `target` is not waiting in the pool
    pub fn pick_player(&mut self, captain: &Identity, target: &Identity) -> Result<Transition> {
        let turn_policy = self.turn_policy;
        let MachineState::Drafting(draft) = &mut self.state else {
            return Err(DraftmatchError::NoActiveDraft);
        };

        // ── validate ────────────────────────────────────────────────
        let side = draft
            .captain_side(captain)
            .ok_or_else(|| DraftmatchError::NotACaptain(captain.clone()))?;
        let phase = draft.phase();
        if phase != DraftPhase::Picking {
            return Err(DraftmatchError::WrongPhase {
                expected: DraftPhase::Picking,
                actual: phase,
            });
        }
        ensure_turn(expected_picker(turn_policy, draft), side, captain)?;
        let index = draft
            .pool_position(target)
            .ok_or_else(|| DraftmatchError::PlayerNotInPool(target.clone()))?;

        // ── apply ───────────────────────────────────────────────────
        let player = draft.pool.remove(index);
        match side {
            Side::Team1 => draft.team1.push(player),
            Side::Team2 => draft.team2.push(player),
        }
        debug_assert!(check_invariants(draft).is_ok());

        tracing::debug!(
            match_id = %draft.match_id,
            captain = %captain,
            target = %target,
            side = %side,
            pool = draft.pool.len(),
            "Player picked"
        );

        Ok(Transition::Updated(draft.clone()))
    }

    /// Ban `map`. Banning down to one survivor finalizes the match.
    ///
    /// # Errors
    /// - `NoActiveDraft` unless drafting
    /// - `NotACaptain` if `captain` holds neither captain seat
    /// - `WrongPhase` while the pool still has players
    /// - `NotYourTurn` under strict alternation
    /// - `InvalidMapOrAlreadyBanned` for unknown or repeated maps
    pub fn ban_map(&mut self, captain: &Identity, map: &MapId) -> Result<Transition> {
        let turn_policy = self.turn_policy;
        let MachineState::Drafting(draft) = &mut self.state else {
            return Err(DraftmatchError::NoActiveDraft);
        };

        // ── validate ────────────────────────────────────────────────
        let side = draft
            .captain_side(captain)
            .ok_or_else(|| DraftmatchError::NotACaptain(captain.clone()))?;
        let phase = draft.phase();
        if phase != DraftPhase::Veto {
            return Err(DraftmatchError::WrongPhase {
                expected: DraftPhase::Veto,
                actual: phase,
            });
        }
        ensure_turn(expected_banner(turn_policy, draft), side, captain)?;
        if !draft.candidate_maps.contains(map) || draft.is_banned(map) {
            return Err(DraftmatchError::InvalidMapOrAlreadyBanned(map.clone()));
        }

        // ── apply ───────────────────────────────────────────────────
        draft.banned_maps.push(map.clone());
        let survivor = {
            let mut remaining = draft.remaining_maps();
            match (remaining.next(), remaining.next()) {
                (Some(only), None) => Some(only.clone()),
                _ => None,
            }
        };
        draft.final_map = survivor;
        debug_assert!(check_invariants(draft).is_ok());

        tracing::debug!(
            match_id = %draft.match_id,
            captain = %captain,
            map = %map,
            banned = draft.banned_maps.len(),
            "Map banned"
        );

        if draft.final_map.is_none() {
            return Ok(Transition::Updated(draft.clone()));
        }

        let finished = draft.clone();
        tracing::info!(
            match_id = %finished.match_id,
            final_map = ?finished.final_map,
            digest = %finished.digest_hex(),
            "Match finalized"
        );
        self.state = MachineState::Finalized(finished.clone());
        Ok(Transition::Finalized(finished))
    }

    /// Discard the draft and return to idle, handing back what was dropped.
    pub fn reset(&mut self) -> Option<DraftState> {
        match std::mem::replace(&mut self.state, MachineState::Idle) {
            MachineState::Idle => None,
            MachineState::Drafting(draft) | MachineState::Finalized(draft) => Some(draft),
        }
    }
}

impl Default for DraftMachine {
    fn default() -> Self {
        Self::new(TurnPolicy::Free)
    }
}
