//! Inbound actions and outbound events.
//!
//! Inbound traffic is a tagged [`Action`] inside an [`Envelope`] naming the
//! lobby and the sending connection. Outbound traffic is either a
//! [`Broadcast`] (every viewer of the lobby, in acceptance order) or a
//! [`Rejection`] (the sending connection only).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ConnectionId, DraftState, DraftmatchError, Identity, LobbyId, MapId};

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Everything a client may ask a lobby to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    /// Enter the admission queue.
    JoinQueue { identity: Identity },
    /// Move `target` from the pool onto the acting captain's team.
    PickPlayer {
        acting_captain: Identity,
        target: Identity,
    },
    /// Remove `map` from the veto table.
    BanMap { acting_captain: Identity, map: MapId },
}

impl Action {
    /// Wire name of the action, as used in logs and rejections.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinQueue { .. } => "join-queue",
            Self::PickPlayer { .. } => "pick-player",
            Self::BanMap { .. } => "ban-map",
        }
    }

    /// The identity performing the action.
    #[must_use]
    pub fn actor(&self) -> &Identity {
        match self {
            Self::JoinQueue { identity } => identity,
            Self::PickPlayer { acting_captain, .. } | Self::BanMap { acting_captain, .. } => {
                acting_captain
            }
        }
    }
}

/// An action addressed to a lobby, sent over one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub lobby_id: LobbyId,
    pub connection_id: ConnectionId,
    pub action: Action,
}

impl Envelope {
    #[must_use]
    pub fn new(lobby_id: LobbyId, connection_id: ConnectionId, action: Action) -> Self {
        Self {
            lobby_id,
            connection_id,
            action,
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// State transitions announced to every viewer of a lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum LobbyEvent {
    /// The admission queue changed size (sent on every join).
    QueueSizeUpdate { size: usize, threshold: usize },
    /// A batch formed; captains are seated.
    DraftStarted(DraftState),
    /// A pick or ban was accepted and the draft continues.
    DraftUpdate(DraftState),
    /// The veto converged; `final_map` is set.
    MatchFinalized(DraftState),
}

impl LobbyEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::QueueSizeUpdate { .. } => "queue-size-update",
            Self::DraftStarted(_) => "draft-started",
            Self::DraftUpdate(_) => "draft-update",
            Self::MatchFinalized(_) => "match-finalized",
        }
    }

    /// The draft snapshot carried by the event, if any.
    #[must_use]
    pub fn draft(&self) -> Option<&DraftState> {
        match self {
            Self::QueueSizeUpdate { .. } => None,
            Self::DraftStarted(state) | Self::DraftUpdate(state) | Self::MatchFinalized(state) => {
                Some(state)
            }
        }
    }
}

/// A lobby event stamped with its position in the lobby's event stream.
///
/// `sequence` grows by exactly one per broadcast within a lobby context, so a
/// viewer can detect a gap and resynchronise instead of acting on stale state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broadcast {
    pub lobby_id: LobbyId,
    pub sequence: u64,
    pub emitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: LobbyEvent,
}

/// Single-recipient notice that an action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub lobby_id: LobbyId,
    /// Wire name of the refused action.
    pub action: String,
    /// Machine-readable error kind, e.g. `NOT_A_CAPTAIN`.
    pub kind: String,
    /// Human-readable message with the `DM_ERR_` code.
    pub message: String,
}

impl Rejection {
    #[must_use]
    pub fn new(lobby_id: LobbyId, action: &Action, err: &DraftmatchError) -> Self {
        Self {
            lobby_id,
            action: action.name().to_string(),
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_wire_format() {
        let json = r#"{"type":"pick-player","acting_captain":"alice","target":"carol"}"#;
        let action: Action = serde_json::from_str(json).unwrap();
        assert_eq!(
            action,
            Action::PickPlayer {
                acting_captain: Identity::from("alice"),
                target: Identity::from("carol"),
            }
        );
        assert_eq!(action.name(), "pick-player");
        assert_eq!(action.actor().as_str(), "alice");
    }

    #[test]
    fn broadcast_flattens_event() {
        let msg = Broadcast {
            lobby_id: LobbyId::from("eu"),
            sequence: 3,
            emitted_at: Utc::now(),
            event: LobbyEvent::QueueSizeUpdate {
                size: 4,
                threshold: 10,
            },
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["event"], "queue-size-update");
        assert_eq!(value["payload"]["size"], 4);
        assert_eq!(value["sequence"], 3);
    }

    #[test]
    fn rejection_carries_kind_and_code() {
        let action = Action::BanMap {
            acting_captain: Identity::from("alice"),
            map: MapId::from("Dune"),
        };
        let err = DraftmatchError::InvalidMapOrAlreadyBanned(MapId::from("Dune"));
        let rejection = Rejection::new(LobbyId::from("eu"), &action, &err);
        assert_eq!(rejection.action, "ban-map");
        assert_eq!(rejection.kind, "INVALID_MAP_OR_ALREADY_BANNED");
        assert!(rejection.message.starts_with("DM_ERR_202"));
    }

    #[test]
    fn event_draft_accessor() {
        let state = DraftState::dummy_duel();
        assert!(LobbyEvent::DraftUpdate(state.clone()).draft().is_some());
        assert!(
            LobbyEvent::QueueSizeUpdate {
                size: 0,
                threshold: 2
            }
            .draft()
            .is_none()
        );
        assert_eq!(LobbyEvent::MatchFinalized(state).name(), "match-finalized");
    }
}
