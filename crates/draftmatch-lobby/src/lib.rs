//! # draftmatch-lobby
//!
//! **Lobby plane**: ties the admission queue, match formation and the draft
//! state machine together per lobby, and delivers the results.
//!
//! ## Architecture
//!
//! 1. **Lobby**: one queue + one draft machine; turns an [`Action`] into an
//!    ordered list of [`Broadcast`]s or a single error
//! 2. **Coordinator**: lobbies keyed by id, created on first join and dropped
//!    once finalized and empty; serialises actions per lobby
//! 3. **Gateway**: delivers broadcasts to viewers and rejections to senders
//!
//! ## Action Flow
//!
//! ```text
//! Envelope → Coordinator.dispatch() → Lobby.handle()
//!     → Ok(broadcasts) → Gateway.broadcast()  (every viewer, in order)
//!     → Err(e)         → Gateway.reply()      (sender only)
//! ```
//!
//! [`Action`]: draftmatch_types::Action
//! [`Broadcast`]: draftmatch_types::Broadcast

pub mod coordinator;
pub mod gateway;
pub mod lobby;

pub use coordinator::Coordinator;
pub use gateway::{ChannelGateway, Gateway, RecordingGateway};
pub use lobby::Lobby;
