//! # draftmatch-types
//!
//! Shared types, errors, and configuration for the **Draftmatch** core.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Identity`], [`LobbyId`], [`ConnectionId`], [`MatchId`], [`MapId`]
//! - **Player model**: [`RatedPlayer`], [`skill_level`]
//! - **Draft model**: [`MatchMode`], [`DraftPhase`], [`DraftState`], [`Side`]
//! - **Messages**: [`Action`], [`Envelope`], [`LobbyEvent`], [`Broadcast`], [`Rejection`]
//! - **Configuration**: [`LobbyConfig`], [`TurnPolicy`]
//! - **Errors**: [`DraftmatchError`] with `DM_ERR_` prefix codes
//! - **Constants**: thresholds, defaults, and the stock map pool

pub mod config;
pub mod constants;
pub mod draft;
pub mod error;
pub mod ids;
pub mod message;
pub mod player;

pub use config::*;
pub use draft::*;
pub use error::*;
pub use ids::*;
pub use message::*;
pub use player::*;

// Constants are accessed via `draftmatch_types::constants::FOO`
// (not re-exported to avoid name collisions).
