//! Error types for the Draftmatch core.
//!
//! All errors use the `DM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Queue and formation errors
//! - 2xx: Draft / veto errors
//! - 3xx: Lobby errors
//! - 9xx: General / internal errors
//!
//! Every error raised by an inbound action is terminal for that action only:
//! it is replied to the sender and never mutates lobby state.

use thiserror::Error;

use crate::{DraftPhase, Identity, MapId, MatchMode};

/// Central error enum for all Draftmatch operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftmatchError {
    // =================================================================
    // Queue / Formation Errors (1xx)
    // =================================================================
    /// A formation batch is smaller than the mode requires, even after fill.
    #[error("DM_ERR_100: Insufficient players for {mode}: need {needed}, got {got}")]
    InsufficientPlayers {
        mode: MatchMode,
        needed: usize,
        got: usize,
    },

    /// A formation batch is larger than the mode can seat.
    #[error("DM_ERR_101: Batch overflow for {mode}: capacity {capacity}, got {got}")]
    BatchOverflow {
        mode: MatchMode,
        capacity: usize,
        got: usize,
    },

    /// The admission queue is at its configured cap.
    #[error("DM_ERR_102: Queue full ({capacity} pending)")]
    QueueFull { capacity: usize },

    // =================================================================
    // Draft / Veto Errors (2xx)
    // =================================================================
    /// The acting identity is not one of the two captains.
    #[error("DM_ERR_200: Not a captain: {0}")]
    NotACaptain(Identity),

    /// The pick target is not waiting in the pool.
    #[error("DM_ERR_201: Player not in pool: {0}")]
    PlayerNotInPool(Identity),

    /// The map is not a candidate, or has already been banned.
    #[error("DM_ERR_202: Invalid or already banned map: {0}")]
    InvalidMapOrAlreadyBanned(MapId),

    /// The lobby has no draft accepting actions.
    #[error("DM_ERR_203: No active draft")]
    NoActiveDraft,

    /// The action belongs to a different draft phase.
    #[error("DM_ERR_204: Wrong draft phase: expected {expected}, got {actual}")]
    WrongPhase {
        expected: DraftPhase,
        actual: DraftPhase,
    },

    /// Strict alternation is on and the other captain is due to act.
    #[error("DM_ERR_205: Not your turn: {0}")]
    NotYourTurn(Identity),

    // =================================================================
    // Lobby Errors (3xx)
    // =================================================================
    /// A new draft was started while another is still live.
    #[error("DM_ERR_300: Draft already in progress")]
    DraftInProgress,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("DM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("DM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad values, etc.).
    #[error("DM_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("DM_ERR_903: I/O error: {0}")]
    Io(String),
}

impl DraftmatchError {
    /// Stable machine-readable kind, sent to clients in rejection replies.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientPlayers { .. } => "INSUFFICIENT_PLAYERS",
            Self::BatchOverflow { .. } => "BATCH_OVERFLOW",
            Self::QueueFull { .. } => "QUEUE_FULL",
            Self::NotACaptain(_) => "NOT_A_CAPTAIN",
            Self::PlayerNotInPool(_) => "PLAYER_NOT_IN_POOL",
            Self::InvalidMapOrAlreadyBanned(_) => "INVALID_MAP_OR_ALREADY_BANNED",
            Self::NoActiveDraft => "NO_ACTIVE_DRAFT",
            Self::WrongPhase { .. } => "WRONG_PHASE",
            Self::NotYourTurn(_) => "NOT_YOUR_TURN",
            Self::DraftInProgress => "DRAFT_IN_PROGRESS",
            Self::Internal(_) => "INTERNAL",
            Self::Serialization(_) => "SERIALIZATION",
            Self::Configuration(_) => "CONFIGURATION",
            Self::Io(_) => "IO",
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, DraftmatchError>;

impl From<std::io::Error> for DraftmatchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DraftmatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
